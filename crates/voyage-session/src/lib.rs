#![allow(non_snake_case)]

//! Client-side session handling shared by the storefront and the admin
//! dashboard: where the token lives, how requests carry it, and what
//! happens when the backend stops accepting it.

pub mod cleanup;
pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod resolver;
mod state;
pub mod storage;
pub mod transport;

pub use cleanup::{AuthPrompt, CleanupOutcome, CleanupReport, CleanupStep, NoopPrompt, PromptOutcome};
pub use client::ApiClient;
pub use config::{SessionConfig, Surface, UnauthorizedAction};
pub use context::SessionContext;
pub use error::{ApiError, StorageError, TransportError};
pub use resolver::{ResolvedToken, TokenResolver, TokenSource};
pub use state::UserObserver;
pub use storage::{BrowserStorage, CookieStore, KeyValueStore, MemoryCookieJar, MemoryStore};
pub use transport::{ApiRequest, ApiResponse, ReqwestTransport, Transport};
