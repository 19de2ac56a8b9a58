//! `Centertech` Core Library
//!
//! Client-side utility layer for the Centertech raffle storefront:
//! - Persistent key-value store (JSON file or in-memory)
//! - Session role/token store and the mock user repository
//! - Auth guard for protected and admin-only locations
//! - Input sanitizers for free-text form fields
//! - Countdown computation and a cancellable ticker
//! - Remote user-listing client and download filename extraction

pub mod config;
pub mod content_disposition;
pub mod countdown;
pub mod error;
pub mod guard;
pub mod remote;
pub mod sanitize;
pub mod services;
pub mod session;
pub mod storage;
pub mod tracing_init;
pub mod users;

pub use config::Config;
pub use content_disposition::extract_filename_from_content_disposition;
pub use countdown::{Countdown, CountdownSnapshot, CountdownTicker};
pub use error::{Error, Result};
pub use guard::{AuthGuard, GuardDecision, Redirect, TokenLookup};
pub use services::Services;
pub use session::{Role, SessionStore};
pub use storage::{JsonFileStore, KeyValueStore, MemoryStore, StorageError};
pub use users::{UserRecord, UserRepository};
