use std::{env, fmt::Display, str::FromStr, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};
use url::Url;

use crate::error::ApiError;

pub const BACKEND_URL_ENV: &str = "VOYAGE_BACKEND_URL";
pub const REQUEST_TIMEOUT_ENV: &str = "VOYAGE_REQUEST_TIMEOUT_SECS";
pub const TOKEN_KEY_ENV: &str = "VOYAGE_TOKEN_KEY";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

/// Which app surface a session belongs to.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Surface {
    #[default]
    Storefront,
    Admin,
}

/// What the cleanup routine does once credentials are gone.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UnauthorizedAction {
    OpenAuthModal,
    RedirectHome,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    pub backend_url: Option<String>,
    pub token_key: String,
    pub request_timeout_secs: u64,
    pub surface: Surface,
    pub unauthorized_action: Option<UnauthorizedAction>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            backend_url: None,
            token_key: voyage_types::TOKEN_KEY.into(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            surface: Surface::default(),
            unauthorized_action: None,
        }
    }
}

impl SessionConfig {
    pub fn for_surface(surface: Surface) -> Self {
        Self {
            surface,
            ..Self::default()
        }
    }

    pub fn with_backend_url(mut self, backendUrl: impl Into<String>) -> Self {
        self.backend_url = normalize_backend_url(Some(backendUrl.into()));
        self
    }

    pub fn with_unauthorized_action(mut self, action: UnauthorizedAction) -> Self {
        self.unauthorized_action = Some(action);
        self
    }

    pub fn from_env(surface: Surface) -> Self {
        Self::from_lookup(surface, |key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable lookup.
    pub fn from_lookup(surface: Surface, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let backendUrl = normalize_backend_url(lookup(BACKEND_URL_ENV));
        if backendUrl.is_none() {
            warn!("{BACKEND_URL_ENV} not set, session treated as logged out");
        }

        Self {
            backend_url: backendUrl,
            token_key: lookup(TOKEN_KEY_ENV)
                .filter(|key| !key.trim().is_empty())
                .unwrap_or_else(|| voyage_types::TOKEN_KEY.into()),
            request_timeout_secs: try_load(
                &lookup,
                REQUEST_TIMEOUT_ENV,
                DEFAULT_REQUEST_TIMEOUT_SECS,
            ),
            surface,
            unauthorized_action: None,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.backend_url.is_some()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Explicit setting first, otherwise the surface default.
    pub fn unauthorized_action(&self) -> UnauthorizedAction {
        self.action_for(self.surface)
    }

    pub fn action_for(&self, surface: Surface) -> UnauthorizedAction {
        self.unauthorized_action.unwrap_or(match surface {
            Surface::Storefront => UnauthorizedAction::OpenAuthModal,
            Surface::Admin => UnauthorizedAction::RedirectHome,
        })
    }

    /// Absolute URL for an API path. Absolute inputs pass through.
    pub fn endpoint(&self, path: &str) -> Result<String, ApiError> {
        if path.starts_with("http://") || path.starts_with("https://") {
            return Ok(path.to_string());
        }
        let base = self.backend_url.as_deref().ok_or(ApiError::NotConfigured)?;
        let base = base.trim_end_matches('/');
        if path.starts_with('/') {
            Ok(format!("{base}{path}"))
        } else {
            Ok(format!("{base}/{path}"))
        }
    }
}

fn normalize_backend_url(raw: Option<String>) -> Option<String> {
    let raw = raw?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    match Url::parse(trimmed) {
        Ok(_) => Some(trimmed.trim_end_matches('/').to_string()),
        Err(e) => {
            warn!("invalid backend url {trimmed}: {e}");
            None
        }
    }
}

fn try_load<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match lookup(key) {
        None => {
            info!("{key} not set, using default: {default}");
            default
        }
        Some(raw) => raw.trim().parse().unwrap_or_else(|e| {
            warn!("invalid {key} value {raw:?}: {e}, using default: {default}");
            default
        }),
    }
}
