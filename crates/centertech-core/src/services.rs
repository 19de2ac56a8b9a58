//! Process-wide services built once and handed to consumers.

use std::sync::Arc;

use tracing::debug;

use crate::config::{AuthConfig, Config};
use crate::guard::AuthGuard;
use crate::session::SessionStore;
use crate::storage::{JsonFileStore, KeyValueStore};
use crate::users::UserRepository;

/// Session store, user repository and route guard over one shared store.
#[derive(Debug, Clone)]
pub struct Services {
    pub session: SessionStore,
    pub users: UserRepository,
    pub guard: AuthGuard<SessionStore>,
}

impl Services {
    pub fn new(store: Arc<dyn KeyValueStore>, auth: &AuthConfig) -> Self {
        let session = SessionStore::new(store.clone());
        Self {
            guard: AuthGuard::with_login_path(session.clone(), auth.login_path.clone()),
            users: UserRepository::new(store),
            session,
        }
    }

    /// Open the configured JSON file store and build the services on it.
    pub fn from_config(config: &Config) -> Self {
        let path = config.storage.resolved_path();
        debug!(path = %path.display(), "Using store");
        Self::new(Arc::new(JsonFileStore::open(path)), &config.auth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guard::GuardDecision;
    use crate::storage::MemoryStore;
    use serde_json::Map;

    #[test]
    fn services_share_one_store() {
        let store = Arc::new(MemoryStore::new());
        let services = Services::new(store.clone(), &AuthConfig::default());
        let again = Services::new(store, &AuthConfig::default());

        services.session.set_token(Some("tok"));
        let created = services.users.create(Map::new());

        assert_eq!(again.session.token().as_deref(), Some("tok"));
        assert_eq!(again.users.list(), vec![created]);
        assert_eq!(again.guard.check("/"), GuardDecision::Allow);
    }

    #[test]
    fn guard_uses_configured_login_path() {
        let auth = AuthConfig {
            login_path: "/entrar".into(),
        };
        let services = Services::new(Arc::new(MemoryStore::new()), &auth);
        assert_eq!(services.guard.login_path(), "/entrar");
    }
}
