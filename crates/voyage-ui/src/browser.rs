//! `voyage-session` storage and prompt adapters backed by the real browser.

use std::sync::atomic::{AtomicBool, Ordering};

use voyage_session::{AuthPrompt, CookieStore, KeyValueStore, StorageError};
use voyage_types::OPEN_AUTH_MODAL_EVENT;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CustomEvent, HtmlDocument, Storage, Window};

const EXPIRED: &str = "Thu, 01 Jan 1970 00:00:00 GMT";

static AUTH_MODAL_MOUNTED: AtomicBool = AtomicBool::new(false);

/// Set by the auth modal while it is listening for open requests.
pub fn set_auth_modal_mounted(mounted: bool) {
    AUTH_MODAL_MOUNTED.store(mounted, Ordering::Release);
}

fn js_error(e: JsValue) -> StorageError {
    StorageError::Operation(format!("{e:?}"))
}

fn window() -> Result<Window, StorageError> {
    web_sys::window().ok_or_else(|| StorageError::Unavailable("no window".into()))
}

fn html_document() -> Result<HtmlDocument, StorageError> {
    window()?
        .document()
        .ok_or_else(|| StorageError::Unavailable("no document".into()))?
        .dyn_into::<HtmlDocument>()
        .map_err(|_| StorageError::Unavailable("document is not an html document".into()))
}

#[derive(Clone, Copy, Debug)]
enum StorageArea {
    Local,
    Session,
}

/// `window.localStorage` or `window.sessionStorage`. Looked up on every
/// call, since either can be disabled by the browser at any time.
#[derive(Clone, Copy, Debug)]
pub struct WebStorage {
    area: StorageArea,
}

impl WebStorage {
    pub fn local() -> Self {
        Self {
            area: StorageArea::Local,
        }
    }

    pub fn session() -> Self {
        Self {
            area: StorageArea::Session,
        }
    }

    fn storage(&self) -> Result<Storage, StorageError> {
        let window = window()?;
        let storage = match self.area {
            StorageArea::Local => window.local_storage(),
            StorageArea::Session => window.session_storage(),
        };
        storage
            .map_err(|e| StorageError::Unavailable(format!("{e:?}")))?
            .ok_or_else(|| StorageError::Unavailable(format!("{:?} storage disabled", self.area)))
    }
}

impl KeyValueStore for WebStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage()?.get_item(key).map_err(js_error)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage()?.set_item(key, value).map_err(js_error)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.storage()?.remove_item(key).map_err(js_error)
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.storage()?.clear().map_err(js_error)
    }
}

/// `document.cookie`.
#[derive(Clone, Copy, Debug, Default)]
pub struct DocumentCookies;

impl CookieStore for DocumentCookies {
    fn cookie_header(&self) -> Result<String, StorageError> {
        html_document()?.cookie().map_err(js_error)
    }

    fn set_cookie(&self, name: &str, value: &str) -> Result<(), StorageError> {
        html_document()?
            .set_cookie(&format!("{name}={value}; path=/; SameSite=Lax"))
            .map_err(js_error)
    }

    fn expire(&self, name: &str) -> Result<(), StorageError> {
        let document = html_document()?;
        let location = window()?.location();
        let hostname = location.hostname().unwrap_or_default();
        let pathname = location.pathname().unwrap_or_else(|_| "/".into());

        let mut paths = vec!["/".to_string()];
        if pathname != "/" {
            paths.push(pathname);
        }
        let mut domains = vec![None];
        if !hostname.is_empty() {
            domains.push(Some(hostname.clone()));
            domains.push(Some(format!(".{hostname}")));
        }

        for path in &paths {
            for domain in &domains {
                let mut cookie = format!("{name}=; expires={EXPIRED}; path={path}");
                if let Some(domain) = domain {
                    cookie.push_str(&format!("; domain={domain}"));
                }
                document.set_cookie(&cookie).map_err(js_error)?;
            }
        }
        Ok(())
    }
}

/// Dispatches `open-auth-modal` on `window`, or navigates home.
#[derive(Clone, Copy, Debug, Default)]
pub struct WindowPrompt;

impl AuthPrompt for WindowPrompt {
    fn open_auth_modal(&self) -> bool {
        if !AUTH_MODAL_MOUNTED.load(Ordering::Acquire) {
            return false;
        }
        let Ok(window) = window() else {
            return false;
        };
        match CustomEvent::new(OPEN_AUTH_MODAL_EVENT) {
            Ok(event) => window.dispatch_event(&event).is_ok(),
            Err(_) => false,
        }
    }

    fn redirect_home(&self) {
        if let Ok(window) = window() {
            if let Err(e) = window.location().assign("/") {
                leptos::logging::warn!("redirect home failed: {e:?}");
            }
        }
    }
}
