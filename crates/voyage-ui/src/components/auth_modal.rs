use leptos::prelude::*;
use voyage_types::AuthUser;

use crate::components::login_form::LoginForm;

/// Login dialog opened by the `open-auth-modal` window event.
#[component]
pub fn AuthModal() -> impl IntoView {
    #[allow(unused_variables)]
    let (open, setOpen) = signal(false);

    #[cfg(feature = "hydrate")]
    {
        use crate::browser::set_auth_modal_mounted;
        use voyage_types::OPEN_AUTH_MODAL_EVENT;

        set_auth_modal_mounted(true);
        let listener =
            window_event_listener_untyped(OPEN_AUTH_MODAL_EVENT, move |_| setOpen.set(true));
        on_cleanup(move || {
            set_auth_modal_mounted(false);
            listener.remove();
        });
    }

    let close = Callback::new(move |_user: AuthUser| setOpen.set(false));

    view! {
        <Show when=move || open.get()>
            <div class="modal-backdrop" on:click=move |_| setOpen.set(false)>
                <div class="modal-card login-card" on:click=|ev| ev.stop_propagation()>
                    <div class="login-header">
                        <h1>"Session expired"</h1>
                        <p>"Sign in again to continue"</p>
                    </div>
                    <LoginForm on_success=close />
                </div>
            </div>
        </Show>
    }
}
