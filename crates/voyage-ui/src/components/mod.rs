pub mod auth_modal;
pub mod login_form;
pub mod nav;
pub mod toast;
