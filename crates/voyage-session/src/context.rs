use std::sync::Arc;

use http::header::{HeaderName, HeaderValue};
use http::HeaderMap;
use tracing::{debug, info, warn};
use url::Url;
use voyage_types::AuthUser;

use crate::cleanup::{AuthPrompt, CleanupOutcome, NoopPrompt, SessionCleanup};
use crate::config::{SessionConfig, Surface};
use crate::error::StorageError;
use crate::resolver::{TokenResolver, TokenSource};
use crate::state::{SessionState, UserObserver};
use crate::storage::BrowserStorage;

/// The one owner of client-side session state.
///
/// Holds the storage handles, the user snapshot and the shared request
/// defaults. Everything that needs the session gets an `Arc` of this
/// instead of reaching for globals.
pub struct SessionContext {
    config: SessionConfig,
    storage: BrowserStorage,
    resolver: TokenResolver,
    state: Arc<SessionState>,
    cleanup: SessionCleanup,
}

impl SessionContext {
    pub fn new(
        config: SessionConfig,
        storage: BrowserStorage,
        prompt: Arc<dyn AuthPrompt>,
    ) -> Arc<Self> {
        let mut resolver = TokenResolver::new(storage.clone(), config.token_key.clone());
        if !config.is_configured() {
            resolver = resolver.disabled();
        }
        let state = Arc::new(SessionState::default());
        let cleanup = SessionCleanup::new(
            storage.clone(),
            config.token_key.clone(),
            state.clone(),
            prompt,
            config.unauthorized_action(),
        );

        Arc::new(Self {
            config,
            storage,
            resolver,
            state,
            cleanup,
        })
    }

    /// In-memory storage and no page shell.
    pub fn in_memory(config: SessionConfig) -> Arc<Self> {
        Self::new(config, BrowserStorage::in_memory(), Arc::new(NoopPrompt))
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn storage(&self) -> &BrowserStorage {
        &self.storage
    }

    pub fn resolver(&self) -> &TokenResolver {
        &self.resolver
    }

    pub fn token(&self) -> Option<String> {
        self.resolver.resolve()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// The user snapshot, dropped first if no token resolves anymore.
    pub fn current_user(&self) -> Option<AuthUser> {
        if self.token().is_none() {
            if self.state.user().is_some() {
                debug!("token gone, dropping stale user snapshot");
                self.state.set_user(None);
            }
            return None;
        }
        self.state.user()
    }

    pub fn set_user(&self, user: Option<AuthUser>) {
        self.state.set_user(user);
    }

    pub fn on_user_change(&self, observer: UserObserver) {
        self.state.set_observer(observer);
    }

    /// Persists the token, preferring local storage and falling back to
    /// session storage when local storage refuses the write.
    pub fn store_token(&self, token: &str) -> Result<TokenSource, StorageError> {
        let key = &self.config.token_key;
        match self.storage.local.set(key, token) {
            Ok(()) => Ok(TokenSource::Local),
            Err(e) => {
                warn!(error = %e, "local storage rejected token, using session storage");
                self.storage.session.set(key, token)?;
                Ok(TokenSource::Session)
            }
        }
    }

    /// Swaps a token the backend rejected for one it accepted, in whichever
    /// storage still holds the rejected value. Cookies are left alone.
    pub fn replace_rejected_token(&self, rejected: &str, accepted: &str) {
        let key = &self.config.token_key;
        let stores = [
            (TokenSource::Local, &self.storage.local),
            (TokenSource::Session, &self.storage.session),
        ];
        for (source, store) in stores {
            match store.get(key) {
                Ok(Some(current)) if current.trim() == rejected => {
                    if let Err(e) = store.set(key, accepted) {
                        warn!(source = %source, error = %e, "could not replace rejected token, removing it");
                        if let Err(e) = store.remove(key) {
                            warn!(source = %source, error = %e, "could not remove rejected token");
                        }
                    } else {
                        debug!(source = %source, "replaced rejected token");
                    }
                }
                Ok(_) => {}
                Err(e) => warn!(source = %source, error = %e, "token storage unavailable"),
            }
        }
    }

    /// Moves the unauthorized handling to the surface now on screen.
    pub fn switch_surface(&self, surface: Surface) {
        let action = self.config.action_for(surface);
        if self.cleanup.action() != action {
            debug!(?surface, ?action, "unauthorized handling switched");
            self.cleanup.set_action(action);
        }
    }

    pub fn sign_in(&self, token: &str, user: AuthUser) -> Result<(), StorageError> {
        let source = self.store_token(token)?;
        info!(user_id = %user.id, source = %source, "signed in");
        self.state.set_user(Some(user));
        Ok(())
    }

    /// Picks up the `token` query parameter an OAuth provider redirects back
    /// with. Returns the token if one was found and stored.
    pub fn accept_redirect(&self, redirectUrl: &str) -> Result<Option<String>, StorageError> {
        let parsed = match Url::parse(redirectUrl) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(error = %e, "ignoring unparsable redirect url");
                return Ok(None);
            }
        };
        let token = parsed
            .query_pairs()
            .find(|(name, _)| name == self.config.token_key.as_str())
            .map(|(_, value)| value.trim().to_string())
            .filter(|value| !value.is_empty());

        match token {
            Some(token) => {
                self.store_token(&token)?;
                info!("stored token from oauth redirect");
                Ok(Some(token))
            }
            None => Ok(None),
        }
    }

    pub fn set_default_header(&self, name: HeaderName, value: HeaderValue) {
        self.state.update_defaults(|defaults| {
            defaults.insert(name, value);
        });
    }

    pub fn default_headers(&self) -> HeaderMap {
        self.state.defaults()
    }

    pub fn cleanup(&self) -> CleanupOutcome {
        self.cleanup.run()
    }

    pub fn cleanup_runs(&self) -> u64 {
        self.cleanup.runs()
    }
}
