use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use tracing::{debug, info, warn};

use crate::config::UnauthorizedAction;
use crate::error::StorageError;
use crate::state::SessionState;
use crate::storage::BrowserStorage;

/// Hook into the page shell for re-authentication.
pub trait AuthPrompt: Send + Sync {
    /// Dispatches the `open-auth-modal` event. Returns `false` when nothing
    /// could be dispatched.
    fn open_auth_modal(&self) -> bool;

    /// Hard navigation to the home route.
    fn redirect_home(&self);
}

/// Prompt for contexts without a page shell, such as native tools.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPrompt;

impl AuthPrompt for NoopPrompt {
    fn open_auth_modal(&self) -> bool {
        false
    }

    fn redirect_home(&self) {}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CleanupStep {
    RemoveLocalToken,
    RemoveSessionToken,
    ClearLocal,
    ClearSession,
    ListCookies,
    ExpireCookie(String),
}

impl fmt::Display for CleanupStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CleanupStep::RemoveLocalToken => f.write_str("remove local token"),
            CleanupStep::RemoveSessionToken => f.write_str("remove session token"),
            CleanupStep::ClearLocal => f.write_str("clear local storage"),
            CleanupStep::ClearSession => f.write_str("clear session storage"),
            CleanupStep::ListCookies => f.write_str("list cookies"),
            CleanupStep::ExpireCookie(name) => write!(f, "expire cookie {name}"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PromptOutcome {
    ModalOpened,
    RedirectedHome,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CleanupReport {
    pub failures: Vec<(CleanupStep, StorageError)>,
    pub expired_cookies: usize,
    pub prompt: PromptOutcome,
}

impl CleanupReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CleanupOutcome {
    Completed(CleanupReport),
    /// Another run was already in progress and this call joined it.
    Coalesced,
}

/// Clears every client-held credential and the in-memory session.
///
/// Safe to call any number of times, from any number of in-flight requests.
/// Calls that overlap a running pass return [`CleanupOutcome::Coalesced`].
pub struct SessionCleanup {
    storage: BrowserStorage,
    tokenKey: String,
    state: Arc<SessionState>,
    prompt: Arc<dyn AuthPrompt>,
    action: RwLock<UnauthorizedAction>,
    running: AtomicBool,
    runs: AtomicU64,
}

struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl SessionCleanup {
    pub(crate) fn new(
        storage: BrowserStorage,
        tokenKey: String,
        state: Arc<SessionState>,
        prompt: Arc<dyn AuthPrompt>,
        action: UnauthorizedAction,
    ) -> Self {
        Self {
            storage,
            tokenKey,
            state,
            prompt,
            action: RwLock::new(action),
            running: AtomicBool::new(false),
            runs: AtomicU64::new(0),
        }
    }

    /// Number of completed passes.
    pub fn runs(&self) -> u64 {
        self.runs.load(Ordering::Acquire)
    }

    pub fn action(&self) -> UnauthorizedAction {
        *self
            .action
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn set_action(&self, action: UnauthorizedAction) {
        *self
            .action
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = action;
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn run(&self) -> CleanupOutcome {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("session cleanup already running, coalescing");
            return CleanupOutcome::Coalesced;
        }
        let _guard = RunningGuard(&self.running);

        let mut failures = Vec::new();
        let mut guarded = |step: CleanupStep, result: Result<(), StorageError>| {
            if let Err(e) = result {
                warn!(step = %step, error = %e, "session cleanup step failed");
                failures.push((step, e));
            }
        };

        guarded(
            CleanupStep::RemoveLocalToken,
            self.storage.local.remove(&self.tokenKey),
        );
        guarded(
            CleanupStep::RemoveSessionToken,
            self.storage.session.remove(&self.tokenKey),
        );
        guarded(CleanupStep::ClearLocal, self.storage.local.clear());
        guarded(CleanupStep::ClearSession, self.storage.session.clear());

        let mut expiredCookies = 0;
        match self.storage.cookies.names() {
            Ok(names) => {
                for name in names {
                    let result = self.storage.cookies.expire(&name);
                    if result.is_ok() {
                        expiredCookies += 1;
                    }
                    guarded(CleanupStep::ExpireCookie(name), result);
                }
            }
            Err(e) => guarded(CleanupStep::ListCookies, Err(e)),
        }

        self.state.set_user(None);
        self.state.update_defaults(|defaults| defaults.clear());

        let prompt = match self.action() {
            UnauthorizedAction::OpenAuthModal if self.prompt.open_auth_modal() => {
                PromptOutcome::ModalOpened
            }
            UnauthorizedAction::OpenAuthModal => {
                debug!("auth modal could not be opened, redirecting home");
                self.prompt.redirect_home();
                PromptOutcome::RedirectedHome
            }
            UnauthorizedAction::RedirectHome => {
                self.prompt.redirect_home();
                PromptOutcome::RedirectedHome
            }
        };

        self.runs.fetch_add(1, Ordering::AcqRel);
        info!(
            expired_cookies = expiredCookies,
            failures = failures.len(),
            "session cleared"
        );

        CleanupOutcome::Completed(CleanupReport {
            failures,
            expired_cookies: expiredCookies,
            prompt,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::sync::{Mutex, OnceLock};

    use http::header::{HeaderValue, ACCEPT_LANGUAGE};
    use voyage_types::AuthUser;

    use super::*;
    use crate::storage::{CookieStore, KeyValueStore, MemoryCookieJar, MemoryStore};

    #[derive(Default)]
    struct RecordingPrompt {
        modalAvailable: bool,
        modals: AtomicUsize,
        redirects: AtomicUsize,
    }

    impl AuthPrompt for RecordingPrompt {
        fn open_auth_modal(&self) -> bool {
            if self.modalAvailable {
                self.modals.fetch_add(1, Ordering::SeqCst);
            }
            self.modalAvailable
        }

        fn redirect_home(&self) {
            self.redirects.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct DisabledStore;

    impl KeyValueStore for DisabledStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable("private mode".into()))
        }
        fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("private mode".into()))
        }
        fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("private mode".into()))
        }
        fn clear(&self) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("private mode".into()))
        }
    }

    fn user() -> AuthUser {
        AuthUser {
            id: "u-1".into(),
            name: "Grace".into(),
            email: "grace@example.com".into(),
            role: Default::default(),
            phone: None,
            referral_code: None,
        }
    }

    fn seeded(storage: &BrowserStorage) {
        storage.local.set("token", "abc").unwrap();
        storage.local.set("recent_destinations", "[\"Lisbon\"]").unwrap();
        storage.session.set("token", "abc").unwrap();
        storage.cookies.set_cookie("token", "abc").unwrap();
        storage.cookies.set_cookie("currency", "EUR").unwrap();
    }

    fn cleanup_with(
        storage: BrowserStorage,
        prompt: Arc<RecordingPrompt>,
        action: UnauthorizedAction,
    ) -> (SessionCleanup, Arc<SessionState>) {
        let state = Arc::new(SessionState::default());
        state.set_user(Some(user()));
        state.update_defaults(|defaults| {
            defaults.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en"));
        });
        let cleanup = SessionCleanup::new(storage, "token".into(), state.clone(), prompt, action);
        (cleanup, state)
    }

    fn assert_empty(storage: &BrowserStorage) {
        assert_eq!(storage.local.get("token").unwrap(), None);
        assert_eq!(storage.local.get("recent_destinations").unwrap(), None);
        assert_eq!(storage.session.get("token").unwrap(), None);
        assert_eq!(storage.cookies.cookie_header().unwrap(), "");
    }

    #[test]
    fn clears_storage_cookies_user_and_defaults() {
        let storage = BrowserStorage::in_memory();
        seeded(&storage);
        let prompt = Arc::new(RecordingPrompt {
            modalAvailable: true,
            ..Default::default()
        });
        let (cleanup, state) =
            cleanup_with(storage.clone(), prompt.clone(), UnauthorizedAction::OpenAuthModal);

        let outcome = cleanup.run();

        assert_empty(&storage);
        assert_eq!(state.user(), None);
        assert!(state.defaults().is_empty());
        assert_eq!(
            outcome,
            CleanupOutcome::Completed(CleanupReport {
                failures: Vec::new(),
                expired_cookies: 2,
                prompt: PromptOutcome::ModalOpened,
            })
        );
        assert_eq!(prompt.modals.load(Ordering::SeqCst), 1);
        assert_eq!(prompt.redirects.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn running_twice_leaves_the_same_empty_state() {
        let storage = BrowserStorage::in_memory();
        seeded(&storage);
        let prompt = Arc::new(RecordingPrompt::default());
        let (cleanup, state) =
            cleanup_with(storage.clone(), prompt, UnauthorizedAction::RedirectHome);

        cleanup.run();
        let afterFirst = storage.cookies.cookie_header().unwrap();
        let second = cleanup.run();

        assert_empty(&storage);
        assert_eq!(storage.cookies.cookie_header().unwrap(), afterFirst);
        assert_eq!(state.user(), None);
        assert_eq!(cleanup.runs(), 2);
        match second {
            CleanupOutcome::Completed(report) => {
                assert!(report.is_clean());
                assert_eq!(report.expired_cookies, 0);
            }
            CleanupOutcome::Coalesced => panic!("sequential runs must not coalesce"),
        }
    }

    #[test]
    fn a_failing_store_does_not_stop_other_steps() {
        let cookies = Arc::new(MemoryCookieJar::default());
        cookies.set_cookie("token", "abc").unwrap();
        let session = Arc::new(MemoryStore::default());
        session.set("token", "abc").unwrap();
        let storage = BrowserStorage::new(Arc::new(DisabledStore), session.clone(), cookies.clone());
        let prompt = Arc::new(RecordingPrompt::default());
        let (cleanup, state) = cleanup_with(storage, prompt, UnauthorizedAction::RedirectHome);

        let CleanupOutcome::Completed(report) = cleanup.run() else {
            panic!("expected a completed run");
        };

        let failedSteps: Vec<CleanupStep> =
            report.failures.iter().map(|(step, _)| step.clone()).collect();
        assert_eq!(
            failedSteps,
            vec![CleanupStep::RemoveLocalToken, CleanupStep::ClearLocal]
        );
        assert!(session.is_empty());
        assert_eq!(cookies.cookie_header().unwrap(), "");
        assert_eq!(state.user(), None);
    }

    #[test]
    fn modal_falls_back_to_redirect() {
        let prompt = Arc::new(RecordingPrompt::default());
        let (cleanup, _) = cleanup_with(
            BrowserStorage::in_memory(),
            prompt.clone(),
            UnauthorizedAction::OpenAuthModal,
        );

        let CleanupOutcome::Completed(report) = cleanup.run() else {
            panic!("expected a completed run");
        };
        assert_eq!(report.prompt, PromptOutcome::RedirectedHome);
        assert_eq!(prompt.redirects.load(Ordering::SeqCst), 1);
    }

    /// Store whose `remove` re-enters cleanup, standing in for a second
    /// request hitting 401 while the first is still clearing.
    struct ReentrantStore {
        inner: MemoryStore,
        cleanup: OnceLock<Arc<SessionCleanup>>,
        nested: Mutex<Vec<CleanupOutcome>>,
    }

    impl KeyValueStore for ReentrantStore {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.get(key)
        }
        fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            self.inner.set(key, value)
        }
        fn remove(&self, key: &str) -> Result<(), StorageError> {
            if let Some(cleanup) = self.cleanup.get() {
                self.nested.lock().unwrap().push(cleanup.run());
            }
            self.inner.remove(key)
        }
        fn clear(&self) -> Result<(), StorageError> {
            self.inner.clear()
        }
    }

    #[test]
    fn overlapping_runs_coalesce_into_one() {
        let local = Arc::new(ReentrantStore {
            inner: MemoryStore::default(),
            cleanup: OnceLock::new(),
            nested: Mutex::new(Vec::new()),
        });
        let storage = BrowserStorage::new(
            local.clone(),
            Arc::new(MemoryStore::default()),
            Arc::new(MemoryCookieJar::default()),
        );
        let prompt = Arc::new(RecordingPrompt::default());
        let (cleanup, _) = cleanup_with(storage, prompt.clone(), UnauthorizedAction::RedirectHome);
        let cleanup = Arc::new(cleanup);
        let _ = local.cleanup.set(cleanup.clone());

        let outcome = cleanup.run();

        assert!(matches!(outcome, CleanupOutcome::Completed(_)));
        assert_eq!(*local.nested.lock().unwrap(), vec![CleanupOutcome::Coalesced]);
        assert_eq!(cleanup.runs(), 1);
        assert_eq!(prompt.redirects.load(Ordering::SeqCst), 1);
        assert!(!cleanup.is_running());
    }
}
