use leptos::prelude::*;
use voyage_types::AuthUser;

use crate::session::use_session;

#[component]
pub fn AdminPage() -> impl IntoView {
    let user = use_session().user;

    view! {
        <div class="dashboard-header">
            <h1>"Admin"</h1>
            <p class="subtitle">"Users, packages, bookings and layout content"</p>
        </div>
        {move || match user.get() {
            None => {
                view! {
                    <div class="card">
                        <p>"Sign in with an admin account to continue."</p>
                        <a class="btn btn-primary" href="/login">"Sign in"</a>
                    </div>
                }
                    .into_any()
            }
            Some(current) if !current.is_admin() => {
                view! {
                    <div class="card">
                        <p class="login-error">"This account is not allowed to use the admin dashboard."</p>
                    </div>
                }
                    .into_any()
            }
            Some(current) => view! { <AccountCard user=current /> }.into_any(),
        }}
    }
}

#[component]
fn AccountCard(user: AuthUser) -> impl IntoView {
    view! {
        <div class="card">
            <div class="card-title">"Signed in as"</div>
            <table>
                <tbody>
                    <tr>
                        <td>"ID"</td>
                        <td>{user.id}</td>
                    </tr>
                    <tr>
                        <td>"Name"</td>
                        <td>{user.name}</td>
                    </tr>
                    <tr>
                        <td>"Email"</td>
                        <td>{user.email}</td>
                    </tr>
                    <tr>
                        <td>"Phone"</td>
                        <td>{user.phone.unwrap_or_else(|| "-".to_string())}</td>
                    </tr>
                </tbody>
            </table>
        </div>
    }
}
