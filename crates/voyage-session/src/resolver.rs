use std::fmt;

use tracing::{debug, warn};

use crate::storage::BrowserStorage;

/// A place a session token can be read from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenSource {
    Local,
    Session,
    Cookie,
}

impl fmt::Display for TokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenSource::Local => "local storage",
            TokenSource::Session => "session storage",
            TokenSource::Cookie => "cookie",
        };
        f.write_str(name)
    }
}

/// Lookup order used by both the storefront and the admin surface.
pub const DEFAULT_PRIORITY: [TokenSource; 3] =
    [TokenSource::Local, TokenSource::Session, TokenSource::Cookie];

/// A token together with where it was found.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedToken {
    pub value: String,
    pub source: TokenSource,
}

/// Reads the session token from storage in a fixed priority order.
///
/// No shape or expiry check happens here; the next request decides whether
/// the token is still good.
#[derive(Clone)]
pub struct TokenResolver {
    storage: BrowserStorage,
    tokenKey: String,
    priority: Vec<TokenSource>,
    enabled: bool,
}

impl TokenResolver {
    pub fn new(storage: BrowserStorage, tokenKey: impl Into<String>) -> Self {
        Self {
            storage,
            tokenKey: tokenKey.into(),
            priority: DEFAULT_PRIORITY.to_vec(),
            enabled: true,
        }
    }

    pub fn with_priority(mut self, priority: Vec<TokenSource>) -> Self {
        self.priority = priority;
        self
    }

    /// A disabled resolver always reports "logged out".
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn priority(&self) -> &[TokenSource] {
        &self.priority
    }

    pub fn token_key(&self) -> &str {
        &self.tokenKey
    }

    pub fn resolve(&self) -> Option<String> {
        self.resolve_with_source().map(|resolved| resolved.value)
    }

    /// First non-empty token across the priority list.
    pub fn resolve_with_source(&self) -> Option<ResolvedToken> {
        if !self.enabled {
            return None;
        }
        let resolved = self.priority.iter().find_map(|source| {
            self.read(*source).map(|value| ResolvedToken {
                value,
                source: *source,
            })
        });
        if let Some(found) = &resolved {
            debug!(source = %found.source, "resolved session token");
        }
        resolved
    }

    /// Reads a single source, ignoring the priority list.
    pub fn resolve_from(&self, source: TokenSource) -> Option<String> {
        if !self.enabled {
            return None;
        }
        self.read(source)
    }

    fn read(&self, source: TokenSource) -> Option<String> {
        let result = match source {
            TokenSource::Local => self.storage.local.get(&self.tokenKey),
            TokenSource::Session => self.storage.session.get(&self.tokenKey),
            TokenSource::Cookie => self.storage.cookies.cookie(&self.tokenKey),
        };
        match result {
            Ok(value) => value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            Err(e) => {
                warn!(source = %source, error = %e, "failed to read session token");
                None
            }
        }
    }
}
