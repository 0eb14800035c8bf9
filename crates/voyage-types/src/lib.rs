pub mod auth;
pub use auth::*;

/// Storage key shared by local storage, session storage and the cookie jar.
pub const TOKEN_KEY: &str = "token";

/// Window event asking the page shell to reopen the login surface.
pub const OPEN_AUTH_MODAL_EVENT: &str = "open-auth-modal";

pub const PROFILE_PATH: &str = "/user/profile";
pub const LOGIN_PATH: &str = "/auth/login";
pub const LOGOUT_PATH: &str = "/auth/logout";
