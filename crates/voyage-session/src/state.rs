use std::sync::{Arc, RwLock};

use http::HeaderMap;
use voyage_types::AuthUser;

pub type UserObserver = Arc<dyn Fn(Option<&AuthUser>) + Send + Sync>;

/// In-memory half of a session: the user snapshot and the defaults every
/// outgoing request starts from. Only `SessionContext` and the cleanup
/// routine mutate it.
#[derive(Default)]
pub(crate) struct SessionState {
    user: RwLock<Option<AuthUser>>,
    defaults: RwLock<HeaderMap>,
    observer: RwLock<Option<UserObserver>>,
}

impl SessionState {
    pub(crate) fn user(&self) -> Option<AuthUser> {
        self.user
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub(crate) fn set_user(&self, user: Option<AuthUser>) {
        let changed = {
            let mut current = self
                .user
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            let changed = *current != user;
            *current = user.clone();
            changed
        };
        if changed {
            self.notify(user.as_ref());
        }
    }

    pub(crate) fn defaults(&self) -> HeaderMap {
        self.defaults
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub(crate) fn update_defaults(&self, update: impl FnOnce(&mut HeaderMap)) {
        let mut defaults = self
            .defaults
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        update(&mut defaults);
    }

    pub(crate) fn set_observer(&self, observer: UserObserver) {
        *self
            .observer
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(observer);
    }

    fn notify(&self, user: Option<&AuthUser>) {
        let observer = self
            .observer
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();
        if let Some(observer) = observer {
            observer(user);
        }
    }
}
