use std::sync::Arc;

use leptos::prelude::*;
use voyage_session::config::{BACKEND_URL_ENV, REQUEST_TIMEOUT_ENV, TOKEN_KEY_ENV};
use voyage_session::{ApiClient, SessionConfig, SessionContext, Surface};
use voyage_types::AuthUser;

/// Session handle shared through Leptos context.
#[derive(Clone)]
pub struct SessionHandle {
    pub session: Arc<SessionContext>,
    pub client: Arc<ApiClient>,
    /// Mirror of the session's user snapshot. Written only by the session.
    pub user: RwSignal<Option<AuthUser>>,
}

pub fn use_session() -> SessionHandle {
    expect_context::<SessionHandle>()
}

/// Keeps the unauthorized handling in step with client-side navigation.
/// Call from each surface's root view.
pub fn use_surface(surface: Surface) {
    use_session().session.switch_surface(surface);
}

pub fn surface_for_path(path: &str) -> Surface {
    if path == "/admin" || path.starts_with("/admin/") {
        Surface::Admin
    } else {
        Surface::Storefront
    }
}

/// Browser builds have no process environment, so the values are baked in
/// at compile time.
pub fn build_config(surface: Surface) -> SessionConfig {
    SessionConfig::from_lookup(surface, |key| match key {
        BACKEND_URL_ENV => option_env!("VOYAGE_BACKEND_URL").map(str::to_string),
        REQUEST_TIMEOUT_ENV => option_env!("VOYAGE_REQUEST_TIMEOUT_SECS").map(str::to_string),
        TOKEN_KEY_ENV => option_env!("VOYAGE_TOKEN_KEY").map(str::to_string),
        _ => None,
    })
}

#[cfg(feature = "hydrate")]
fn build_session() -> Arc<SessionContext> {
    use crate::browser::{DocumentCookies, WebStorage, WindowPrompt};
    use voyage_session::BrowserStorage;

    // Initial surface only; route views call `use_surface` after that.
    let path = window().location().pathname().unwrap_or_default();
    let storage = BrowserStorage::new(
        Arc::new(WebStorage::local()),
        Arc::new(WebStorage::session()),
        Arc::new(DocumentCookies),
    );
    SessionContext::new(
        build_config(surface_for_path(&path)),
        storage,
        Arc::new(WindowPrompt),
    )
}

#[cfg(not(feature = "hydrate"))]
fn build_session() -> Arc<SessionContext> {
    SessionContext::in_memory(build_config(Surface::Storefront))
}

/// Owns the page's session: builds it, exposes it as context, picks up OAuth
/// redirect tokens and rehydrates the user on mount.
#[component]
pub fn SessionProvider(children: Children) -> impl IntoView {
    let user = RwSignal::new(Option::<AuthUser>::None);
    let session = build_session();
    session.on_user_change(Arc::new(move |current: Option<&AuthUser>| {
        user.set(current.cloned());
    }));

    let handle = SessionHandle {
        client: Arc::new(ApiClient::from_session(session.clone())),
        session,
        user,
    };
    provide_context(handle.clone());

    #[cfg(feature = "hydrate")]
    {
        use crate::components::toast::ToastContext;
        use wasm_bindgen_futures::spawn_local;

        let toasts = use_context::<ToastContext>();
        if let Ok(href) = window().location().href() {
            if let Err(e) = handle.session.accept_redirect(&href) {
                leptos::logging::warn!("could not store redirect token: {e}");
            }
        }
        // Another tab may clear the token without a cleanup running here;
        // re-reading the user drops the stale snapshot and the observer
        // updates the signal.
        let recheck = |session: Arc<SessionContext>| {
            move |_: web_sys::Event| {
                session.current_user();
            }
        };
        let storageListener =
            window_event_listener_untyped("storage", recheck(handle.session.clone()));
        let focusListener = window_event_listener_untyped("focus", recheck(handle.session.clone()));
        on_cleanup(move || {
            storageListener.remove();
            focusListener.remove();
        });

        let client = handle.client.clone();
        spawn_local(async move {
            if let Err(e) = client.rehydrate().await {
                if let Some(toasts) = toasts {
                    toasts.push_api_error(&e);
                }
            }
        });
    }

    children()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_paths_map_to_admin_surface() {
        assert_eq!(surface_for_path("/admin"), Surface::Admin);
        assert_eq!(surface_for_path("/admin/bookings"), Surface::Admin);
        assert_eq!(surface_for_path("/administrator"), Surface::Storefront);
        assert_eq!(surface_for_path("/packages/bali"), Surface::Storefront);
    }
}
