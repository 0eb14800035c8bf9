use leptos::prelude::*;
use leptos_router::components::Redirect;
use voyage_types::AuthUser;

use crate::components::login_form::LoginForm;

#[component]
pub fn LoginPage() -> impl IntoView {
    let (signedIn, setSignedIn) = signal(false);
    let onSuccess = Callback::new(move |_user: AuthUser| setSignedIn.set(true));

    view! {
        <Show when=move || signedIn.get()>
            <Redirect path="/" />
        </Show>
        <div class="login-page">
            <div class="login-card">
                <div class="login-header">
                    <div class="login-icon">"V"</div>
                    <h1>"Voyage"</h1>
                    <p>"Sign in to manage your trips and bookings"</p>
                </div>
                <LoginForm on_success=onSuccess />
            </div>
        </div>
    }
}
