//! Mock user repository backed by the persistent store.
//!
//! The whole collection lives as one JSON array under [`USERS_KEY`]. Every
//! mutation is a read-modify-write of that array with no cross-process
//! locking: two writers racing on the same store can lose an update.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{SecondsFormat, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::storage::KeyValueStore;

/// Store key holding the JSON-encoded user list.
pub const USERS_KEY: &str = "users";

/// A stored user: generated `id` and `createdAt` plus whatever fields the
/// caller supplied (`nome`, `email`, `telefone`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: String,
    /// RFC 3339 creation timestamp (UTC, millisecond precision).
    pub created_at: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl UserRecord {
    /// A caller-supplied field as a string, if present and a string.
    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }
}

/// How new user identifiers are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdSource {
    /// Random UUID v4 from the OS random source, falling back to
    /// [`IdSource::Timestamp`] when the OS source fails.
    #[default]
    Random,
    /// `<millis>-<sequence>` in base 36. The sequence is process-wide, so
    /// ids created within the same millisecond still differ.
    Timestamp,
}

impl IdSource {
    fn generate(self) -> String {
        match self {
            Self::Random => {
                let mut bytes = [0u8; 16];
                match rand::rngs::OsRng.try_fill_bytes(&mut bytes) {
                    Ok(()) => uuid::Builder::from_random_bytes(bytes)
                        .into_uuid()
                        .to_string(),
                    Err(e) => {
                        warn!(error = %e, "OS random source unavailable, using timestamp id");
                        timestamp_id()
                    }
                }
            }
            Self::Timestamp => timestamp_id(),
        }
    }
}

static TIMESTAMP_SEQUENCE: AtomicU64 = AtomicU64::new(0);

fn timestamp_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    let seq = TIMESTAMP_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("{}-{}", to_base36(millis), to_base36(u128::from(seq)))
}

fn to_base36(mut n: u128) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".into();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

/// List/create/delete/clear over the persisted user collection.
///
/// Storage failures and malformed data never surface: reads degrade to an
/// empty list and failed writes are logged and dropped.
#[derive(Clone)]
pub struct UserRepository {
    store: Arc<dyn KeyValueStore>,
    ids: IdSource,
}

impl fmt::Debug for UserRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserRepository")
            .field("ids", &self.ids)
            .finish_non_exhaustive()
    }
}

impl UserRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_id_source(store, IdSource::default())
    }

    pub fn with_id_source(store: Arc<dyn KeyValueStore>, ids: IdSource) -> Self {
        Self { store, ids }
    }

    /// All users in insertion order.
    pub fn list(&self) -> Vec<UserRecord> {
        let raw = match self.store.get(USERS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(key = USERS_KEY, error = %e, "Failed to read users");
                return Vec::new();
            }
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!(key = USERS_KEY, error = %e, "Stored users are malformed, ignoring");
            Vec::new()
        })
    }

    pub fn get(&self, id: &str) -> Option<UserRecord> {
        self.list().into_iter().find(|u| u.id == id)
    }

    /// Create and persist a user. `id` and `createdAt` in `fields` are
    /// ignored; the generated values always win.
    pub fn create(&self, mut fields: Map<String, Value>) -> UserRecord {
        fields.remove("id");
        fields.remove("createdAt");

        let record = UserRecord {
            id: self.ids.generate(),
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            fields,
        };

        let mut users = self.list();
        users.push(record.clone());
        self.save(&users);
        debug!(id = %record.id, total = users.len(), "User created");
        record
    }

    /// Remove the user with `id`. Returns whether a user was removed.
    pub fn delete(&self, id: &str) -> bool {
        let mut users = self.list();
        let before = users.len();
        users.retain(|u| u.id != id);
        if users.len() == before {
            return false;
        }
        self.save(&users);
        true
    }

    /// Drop the whole collection.
    pub fn clear(&self) {
        if let Err(e) = self.store.remove(USERS_KEY) {
            warn!(key = USERS_KEY, error = %e, "Failed to clear users");
        }
    }

    fn save(&self, users: &[UserRecord]) {
        let json = match serde_json::to_string(users) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "Failed to serialize users");
                return;
            }
        };
        if let Err(e) = self.store.set(USERS_KEY, &json) {
            warn!(key = USERS_KEY, error = %e, "Failed to persist users");
        }
    }
}
