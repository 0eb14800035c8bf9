use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::StorageError;

/// String key/value storage with the semantics of browser local and
/// session storage.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
    fn clear(&self) -> Result<(), StorageError>;
}

/// Cookies visible to the current document.
pub trait CookieStore: Send + Sync {
    /// Raw `name=value; name2=value2` header, like `document.cookie`.
    fn cookie_header(&self) -> Result<String, StorageError>;
    fn set_cookie(&self, name: &str, value: &str) -> Result<(), StorageError>;
    /// Expires the cookie on every path the document can address.
    fn expire(&self, name: &str) -> Result<(), StorageError>;

    fn cookie(&self, name: &str) -> Result<Option<String>, StorageError> {
        Ok(extract_cookie_value(&self.cookie_header()?, name))
    }

    fn names(&self) -> Result<Vec<String>, StorageError> {
        Ok(parse_cookie_header(&self.cookie_header()?)
            .into_iter()
            .map(|(name, _)| name)
            .collect())
    }
}

/// The three places a session token can live, in one handle.
#[derive(Clone)]
pub struct BrowserStorage {
    pub local: Arc<dyn KeyValueStore>,
    pub session: Arc<dyn KeyValueStore>,
    pub cookies: Arc<dyn CookieStore>,
}

impl BrowserStorage {
    pub fn new(
        local: Arc<dyn KeyValueStore>,
        session: Arc<dyn KeyValueStore>,
        cookies: Arc<dyn CookieStore>,
    ) -> Self {
        Self {
            local,
            session,
            cookies,
        }
    }

    /// Fresh in-memory storage, for native callers and tests.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemoryStore::default()),
            Arc::new(MemoryStore::default()),
            Arc::new(MemoryCookieJar::default()),
        )
    }
}

pub fn parse_cookie_header(cookieHeader: &str) -> Vec<(String, String)> {
    cookieHeader
        .split(';')
        .filter_map(|part| {
            let trimmed = part.trim();
            if trimmed.is_empty() {
                return None;
            }
            match trimmed.split_once('=') {
                Some((name, value)) => Some((name.trim().to_string(), value.trim().to_string())),
                None => Some((trimmed.to_string(), String::new())),
            }
        })
        .collect()
}

pub fn extract_cookie_value(cookieHeader: &str, name: &str) -> Option<String> {
    parse_cookie_header(cookieHeader)
        .into_iter()
        .find(|(cookieName, _)| cookieName == name)
        .map(|(_, value)| value)
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StorageError> {
    mutex
        .lock()
        .map_err(|_| StorageError::Operation("storage lock poisoned".into()))
}

#[derive(Default, Debug)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(lock(&self.entries)?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        lock(&self.entries)?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        lock(&self.entries)?.remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        lock(&self.entries)?.clear();
        Ok(())
    }
}

/// Cookie jar keeping insertion order, so the rendered header is stable.
#[derive(Default, Debug)]
pub struct MemoryCookieJar {
    cookies: Mutex<Vec<(String, String)>>,
}

impl CookieStore for MemoryCookieJar {
    fn cookie_header(&self) -> Result<String, StorageError> {
        Ok(lock(&self.cookies)?
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; "))
    }

    fn set_cookie(&self, name: &str, value: &str) -> Result<(), StorageError> {
        let mut cookies = lock(&self.cookies)?;
        match cookies.iter_mut().find(|(cookieName, _)| cookieName == name) {
            Some(entry) => entry.1 = value.to_string(),
            None => cookies.push((name.to_string(), value.to_string())),
        }
        Ok(())
    }

    fn expire(&self, name: &str) -> Result<(), StorageError> {
        lock(&self.cookies)?.retain(|(cookieName, _)| cookieName != name);
        Ok(())
    }
}
