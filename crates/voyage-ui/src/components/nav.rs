use leptos::prelude::*;

use crate::session::use_session;

#[component]
pub fn Nav() -> impl IntoView {
    let handle = use_session();
    let user = handle.user;

    #[allow(unused_variables)]
    let onLogout = move |_: leptos::ev::MouseEvent| {
        #[cfg(feature = "hydrate")]
        {
            use wasm_bindgen_futures::spawn_local;

            let client = handle.client.clone();
            spawn_local(async move {
                client.logout().await;
            });
        }
    };

    view! {
        <nav class="nav-sidebar">
            <div class="nav-brand">
                <div class="brand-icon">"V"</div>
                <span class="brand-text">"Voyage"</span>
            </div>
            <ul class="nav-links">
                <li class="nav-item">
                    <a href="/">
                        <span class="nav-icon">"\u{2708}"</span>
                        <span>"Packages"</span>
                    </a>
                </li>
                <Show when=move || user.get().is_some_and(|u| u.is_admin())>
                    <li class="nav-item">
                        <a href="/admin">
                            <span class="nav-icon">"\u{25A3}"</span>
                            <span>"Admin"</span>
                        </a>
                    </li>
                </Show>
            </ul>
            <div class="nav-account">
                {move || match user.get() {
                    Some(current) => {
                        view! {
                            <span class="nav-user">{current.name}</span>
                            <button class="btn btn-secondary" on:click=onLogout.clone()>
                                "Sign out"
                            </button>
                        }
                            .into_any()
                    }
                    None => view! { <a class="btn btn-primary" href="/login">"Sign in"</a> }.into_any(),
                }}
            </div>
        </nav>
    }
}
