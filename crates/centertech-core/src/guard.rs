//! Route guard for signed-in and admin-only locations.
//!
//! Pure decision logic: the guard says whether to render or where to
//! redirect. Performing the redirect is up to the caller.

use crate::session::{Role, SessionStore};

/// Default login location used when none is configured.
pub const DEFAULT_LOGIN_PATH: &str = "/login";

/// Something that can tell whether a session token exists.
pub trait TokenLookup {
    fn token(&self) -> Option<String>;
}

impl TokenLookup for SessionStore {
    fn token(&self) -> Option<String> {
        Self::token(self)
    }
}

impl<F> TokenLookup for F
where
    F: Fn() -> Option<String>,
{
    fn token(&self) -> Option<String> {
        self()
    }
}

/// Where to send an unauthenticated visitor, and where they came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub to: String,
    pub from: String,
}

impl Redirect {
    /// The login location with the original location attached as `from`,
    /// e.g. `/login?from=%2Fadmin%2Fusuarios`.
    pub fn location(&self) -> String {
        let sep = if self.to.contains('?') { '&' } else { '?' };
        format!("{}{sep}from={}", self.to, urlencoding::encode(&self.from))
    }
}

/// Outcome of a guard check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Render the protected content unchanged.
    Allow,
    /// No session: go to login, then come back.
    Redirect(Redirect),
    /// Signed in, but the stored role does not grant access.
    Forbidden { role: Option<Role> },
}

impl GuardDecision {
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

#[derive(Debug, Clone)]
pub struct AuthGuard<T> {
    lookup: T,
    login_path: String,
}

impl<T: TokenLookup> AuthGuard<T> {
    pub fn new(lookup: T) -> Self {
        Self::with_login_path(lookup, DEFAULT_LOGIN_PATH)
    }

    pub fn with_login_path(lookup: T, login_path: impl Into<String>) -> Self {
        Self {
            lookup,
            login_path: login_path.into(),
        }
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    /// Allow when a token is present, otherwise redirect to login carrying
    /// `location`.
    pub fn check(&self, location: &str) -> GuardDecision {
        if self.lookup.token().is_some() {
            GuardDecision::Allow
        } else {
            GuardDecision::Redirect(Redirect {
                to: self.login_path.clone(),
                from: location.to_string(),
            })
        }
    }

    /// Like [`AuthGuard::check`], additionally requiring the `ADMIN` role.
    pub fn check_admin(&self, location: &str, session: &SessionStore) -> GuardDecision {
        match self.check(location) {
            GuardDecision::Allow => match session.role() {
                Some(Role::Admin) => GuardDecision::Allow,
                role => GuardDecision::Forbidden { role },
            },
            other => other,
        }
    }
}
