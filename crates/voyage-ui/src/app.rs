use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::{
    components::{Route, Router, Routes},
    StaticSegment,
};

use crate::components::auth_modal::AuthModal;
use crate::components::nav::Nav;
use crate::components::toast::ToastProvider;
use crate::pages::admin::AdminPage;
use crate::pages::login::LoginPage;
use crate::pages::storefront::StorefrontPage;
use crate::session::{use_surface, SessionProvider};
use voyage_session::Surface;

pub fn shell(options: LeptosOptions) -> impl IntoView {
    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8" />
                <meta name="viewport" content="width=device-width, initial-scale=1" />
                <link rel="icon" href="/favicon.svg" type="image/svg+xml" />
                <AutoReload options=options.clone() />
                <HydrationScripts options />
                <MetaTags />
            </head>
            <body>
                <App />
            </body>
        </html>
    }
}

#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    view! {
        <Stylesheet id="leptos" href="/pkg/voyage-console.css" />
        <Title text="Voyage" />
        <ToastProvider>
            <SessionProvider>
                <Router>
                    <Routes fallback=|| view! { <p>"Page not found."</p> }.into_any()>
                        <Route path=StaticSegment("") view=StorefrontView />
                        <Route path=StaticSegment("admin") view=AdminView />
                        <Route path=StaticSegment("login") view=LoginPage />
                    </Routes>
                </Router>
            </SessionProvider>
        </ToastProvider>
    }
}

#[component]
fn StorefrontView() -> impl IntoView {
    use_surface(Surface::Storefront);
    view! {
        <div class="app-layout">
            <Nav />
            <main class="main-content">
                <StorefrontPage />
            </main>
            <AuthModal />
        </div>
    }
}

// No auth modal here: the admin surface redirects home on 401.
#[component]
fn AdminView() -> impl IntoView {
    use_surface(Surface::Admin);
    view! {
        <div class="app-layout">
            <Nav />
            <main class="main-content">
                <AdminPage />
            </main>
        </div>
    }
}
