use leptos::prelude::*;
use voyage_session::ApiError;

#[derive(Clone, Debug, PartialEq)]
pub enum ToastLevel {
    Success,
    Error,
    Warning,
}

#[derive(Clone, Debug)]
pub struct Toast {
    pub id: u64,
    pub message: String,
    pub level: ToastLevel,
}

#[derive(Clone, Copy)]
pub struct ToastContext {
    toasts: ReadSignal<Vec<Toast>>,
    set_toasts: WriteSignal<Vec<Toast>>,
    next_id: ReadSignal<u64>,
    set_next_id: WriteSignal<u64>,
}

impl ToastContext {
    pub fn push(&self, message: String, level: ToastLevel) {
        let currentId = self.next_id.get_untracked();
        self.set_next_id.set(currentId + 1);

        let toast = Toast {
            id: currentId,
            message,
            level,
        };

        self.set_toasts.update(|toasts| {
            toasts.push(toast);
        });

        let setToasts = self.set_toasts;
        let dismissId = currentId;
        set_timeout(
            move || {
                setToasts.update(|toasts| {
                    toasts.retain(|t| t.id != dismissId);
                });
            },
            std::time::Duration::from_secs(5),
        );
    }

    pub fn push_api_error(&self, err: &ApiError) {
        if let Some((message, level)) = toast_for_error(err) {
            self.push(message, level);
        }
    }
}

/// Toast text and level for a failed API call. Unauthorized errors are
/// handled by the session cleanup, so they produce no toast.
pub fn toast_for_error(err: &ApiError) -> Option<(String, ToastLevel)> {
    match err {
        ApiError::Unauthorized { .. } => None,
        ApiError::Network(_) | ApiError::NotConfigured => {
            Some((err.user_message(), ToastLevel::Warning))
        }
        _ => Some((err.user_message(), ToastLevel::Error)),
    }
}

/// Provides toast context and renders the toast container.
/// Place this once near the root of your app.
#[component]
pub fn ToastProvider(children: Children) -> impl IntoView {
    let (toasts, setToasts) = signal(Vec::<Toast>::new());
    let (nextId, setNextId) = signal(0u64);

    let ctx = ToastContext {
        toasts,
        set_toasts: setToasts,
        next_id: nextId,
        set_next_id: setNextId,
    };

    provide_context(ctx);

    view! {
        {children()}
        <div class="toast-container">
            <For
                each=move || toasts.get()
                key=|toast| toast.id
                let:toast
            >
                <div class=move || {
                    let levelClass = match toast.level {
                        ToastLevel::Success => "toast-success",
                        ToastLevel::Error => "toast-error",
                        ToastLevel::Warning => "toast-warning",
                    };
                    format!("toast {levelClass}")
                }>
                    {toast.message.clone()}
                </div>
            </For>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use http::StatusCode;

    use super::*;

    #[test]
    fn unauthorized_is_silent() {
        let err = ApiError::Unauthorized {
            message: "jwt expired".into(),
        };
        assert_eq!(toast_for_error(&err), None);
    }

    #[test]
    fn server_errors_use_body_message() {
        let err = ApiError::from_status(StatusCode::CONFLICT, Some("Seat already booked".into()));
        assert_eq!(
            toast_for_error(&err),
            Some(("Seat already booked".to_string(), ToastLevel::Error))
        );
    }

    #[test]
    fn network_failures_warn() {
        let err = ApiError::Network("network error: offline".into());
        assert_eq!(
            toast_for_error(&err).map(|(_, level)| level),
            Some(ToastLevel::Warning)
        );
    }
}
