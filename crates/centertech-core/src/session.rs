//! Session role and token persistence.
//!
//! Best-effort: a store that cannot be read or written behaves as if
//! nothing was ever stored. Failures are logged, never returned.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::storage::KeyValueStore;

/// Store key holding the bare role string.
pub const ROLE_KEY: &str = "role";
/// Store key holding the session token.
pub const TOKEN_KEY: &str = "token";

/// Storefront account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Cliente,
}

impl Role {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Cliente => "CLIENTE",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    /// Exact match only: stored values are written by [`SessionStore`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(Self::Admin),
            "CLIENTE" => Ok(Self::Cliente),
            _ => Err(format!("Invalid role '{s}': must be 'ADMIN' or 'CLIENTE'")),
        }
    }
}

/// Reads and writes the current role and session token.
#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore").finish_non_exhaustive()
    }
}

impl SessionStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Persist `role`, or remove the stored role when `None`.
    pub fn set_role(&self, role: Option<Role>) {
        let result = match role {
            Some(role) => self.store.set(ROLE_KEY, role.as_str()),
            None => self.store.remove(ROLE_KEY),
        };
        if let Err(e) = result {
            warn!(key = ROLE_KEY, error = %e, "Failed to persist role");
        }
    }

    /// The stored role. Anything other than a valid role reads as `None`.
    pub fn role(&self) -> Option<Role> {
        match self.store.get(ROLE_KEY) {
            Ok(value) => value.and_then(|v| v.parse().ok()),
            Err(e) => {
                warn!(key = ROLE_KEY, error = %e, "Failed to read role");
                None
            }
        }
    }

    pub fn clear_role(&self) {
        self.set_role(None);
    }

    /// Persist the session token, or remove it when `None`.
    pub fn set_token(&self, token: Option<&str>) {
        let result = match token {
            Some(token) => self.store.set(TOKEN_KEY, token),
            None => self.store.remove(TOKEN_KEY),
        };
        if let Err(e) = result {
            warn!(key = TOKEN_KEY, error = %e, "Failed to persist token");
        }
    }

    /// The stored token; blank values read as `None`.
    pub fn token(&self) -> Option<String> {
        match self.store.get(TOKEN_KEY) {
            Ok(value) => value.filter(|t| !t.trim().is_empty()),
            Err(e) => {
                warn!(key = TOKEN_KEY, error = %e, "Failed to read token");
                None
            }
        }
    }

    pub fn clear_token(&self) {
        self.set_token(None);
    }

    /// Forget both the token and the role.
    pub fn sign_out(&self) {
        self.clear_token();
        self.clear_role();
    }
}
