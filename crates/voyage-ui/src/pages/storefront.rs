use leptos::prelude::*;

use crate::session::use_session;

#[component]
pub fn StorefrontPage() -> impl IntoView {
    let user = use_session().user;

    let openLogin = move |_: leptos::ev::MouseEvent| {
        #[cfg(feature = "hydrate")]
        {
            use crate::browser::WindowPrompt;
            use voyage_session::AuthPrompt;

            if !WindowPrompt.open_auth_modal() {
                let _ = window().location().assign("/login");
            }
        }
    };

    view! {
        <div class="dashboard-header">
            <h1>"Explore"</h1>
            <p class="subtitle">"Packages, destinations and your upcoming trips"</p>
        </div>
        {move || match user.get() {
            Some(current) => {
                view! {
                    <div class="card">
                        <div class="card-title">{format!("Welcome back, {}", current.name)}</div>
                        {current
                            .referral_code
                            .map(|code| {
                                view! {
                                    <p class="metric-row">
                                        <span class="metric-label">"Your referral code"</span>
                                        <span class="metric-value">{code}</span>
                                    </p>
                                }
                            })}
                    </div>
                }
                    .into_any()
            }
            None => {
                view! {
                    <div class="card">
                        <p>"Sign in to see your bookings and referral rewards."</p>
                        <button class="btn btn-primary" on:click=openLogin>
                            "Sign in"
                        </button>
                    </div>
                }
                    .into_any()
            }
        }}
    }
}
