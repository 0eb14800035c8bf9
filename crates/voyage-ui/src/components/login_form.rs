use leptos::prelude::*;
use voyage_types::AuthUser;

use crate::components::toast::ToastContext;
use crate::session::use_session;

#[allow(unused_variables)]
#[component]
pub fn LoginForm(#[prop(optional)] on_success: Option<Callback<AuthUser>>) -> impl IntoView {
    let (email, setEmail) = signal(String::new());
    let (password, setPassword) = signal(String::new());
    #[allow(unused_variables)]
    let (pending, setPending) = signal(false);
    #[allow(unused_variables)]
    let (errorText, setErrorText) = signal(Option::<String>::None);

    #[allow(unused_variables)]
    let handle = use_session();
    #[allow(unused_variables)]
    let toasts = use_context::<ToastContext>();

    let onSubmit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        #[cfg(feature = "hydrate")]
        {
            use crate::components::toast::ToastLevel;
            use wasm_bindgen_futures::spawn_local;

            let client = handle.client.clone();
            let emailValue = email.get_untracked();
            let passwordValue = password.get_untracked();
            setPending.set(true);
            setErrorText.set(None);
            spawn_local(async move {
                match client.login(&emailValue, &passwordValue).await {
                    Ok(user) => {
                        if let Some(toasts) = toasts {
                            toasts.push(format!("Welcome back, {}", user.name), ToastLevel::Success);
                        }
                        if let Some(callback) = on_success {
                            callback.run(user);
                        }
                    }
                    Err(e) => setErrorText.set(Some(e.user_message())),
                }
                setPending.set(false);
            });
        }
    };

    view! {
        {move || {
            errorText
                .get()
                .map(|message| view! { <div class="login-error">{message}</div> })
        }}
        <form on:submit=onSubmit>
            <div class="form-group">
                <label for="email">"Email"</label>
                <input
                    type="email"
                    id="email"
                    name="email"
                    placeholder="you@example.com"
                    required
                    prop:value=email
                    on:input=move |ev| setEmail.set(event_target_value(&ev))
                />
            </div>
            <div class="form-group">
                <label for="password">"Password"</label>
                <input
                    type="password"
                    id="password"
                    name="password"
                    placeholder="Your password"
                    required
                    prop:value=password
                    on:input=move |ev| setPassword.set(event_target_value(&ev))
                />
            </div>
            <button type="submit" class="btn btn-primary" disabled=move || pending.get()>
                {move || if pending.get() { "Signing in..." } else { "Sign In" }}
            </button>
        </form>
    }
}
