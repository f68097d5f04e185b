//! Explicit application state for the signed-in user.
//!
//! State transitions are pure: [`AppState::login`] and [`AppState::logout`]
//! take the current state and return the next one. Persisting that state is
//! a separate step against an injected [`KeyValueStore`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::store::{KeyValueStore, StoreError};

/// Store key holding the signed-in user as JSON
pub const SESSION_KEY: &str = "ebook_user";

/// Errors from building or persisting a session
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Name must not be empty")]
    EmptyName,

    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    #[error("Session store error: {0}")]
    Store(#[from] StoreError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A signed-in reader
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub email: String,
    pub signed_in_at: DateTime<Utc>,
}

impl User {
    /// Build a user, trimming whitespace and checking the basics
    pub fn new(
        name: impl AsRef<str>,
        email: impl AsRef<str>,
        signed_in_at: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        let name = name.as_ref().trim();
        let email = email.as_ref().trim();

        if name.is_empty() {
            return Err(SessionError::EmptyName);
        }
        if !is_plausible_email(email) {
            return Err(SessionError::InvalidEmail(email.to_string()));
        }

        Ok(Self {
            name: name.to_string(),
            email: email.to_string(),
            signed_in_at,
        })
    }
}

/// `local@domain.tld`, no whitespace
fn is_plausible_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .map(|(host, tld)| !host.is_empty() && !tld.is_empty())
                    .unwrap_or(false)
        }
        None => false,
    }
}

/// Storefront state owned by the caller
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppState {
    /// Signed-in user, if any
    pub user: Option<User>,

    /// When the state last changed in this process
    pub last_updated: Option<DateTime<Utc>>,
}

impl AppState {
    /// The signed-out starting state
    pub fn signed_out() -> Self {
        Self::default()
    }

    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    /// State after `user` signs in; replaces any previous user
    pub fn login(&self, user: User, now: DateTime<Utc>) -> Self {
        Self {
            user: Some(user),
            last_updated: Some(now),
        }
    }

    /// State after signing out
    pub fn logout(&self, now: DateTime<Utc>) -> Self {
        Self {
            user: None,
            last_updated: Some(now),
        }
    }
}

/// Load the session from the store.
///
/// A missing key means signed out. An unreadable blob is dropped and also
/// treated as signed out.
pub fn restore(store: &dyn KeyValueStore) -> Result<AppState, SessionError> {
    let Some(blob) = store.get(SESSION_KEY)? else {
        return Ok(AppState::signed_out());
    };

    match serde_json::from_str::<User>(&blob) {
        Ok(user) => {
            debug!(user = %user.name, "Restored session");
            Ok(AppState {
                user: Some(user),
                last_updated: None,
            })
        }
        Err(e) => {
            warn!("Discarding unreadable session: {}", e);
            store.remove(SESSION_KEY)?;
            Ok(AppState::signed_out())
        }
    }
}

/// Write the session to the store, removing the key when signed out
pub fn persist(state: &AppState, store: &dyn KeyValueStore) -> Result<(), SessionError> {
    match &state.user {
        Some(user) => {
            let json = serde_json::to_string(user)?;
            store.set(SESSION_KEY, &json)?;
        }
        None => store.remove(SESSION_KEY)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn user() -> User {
        User::new("Jane Reader", "jane@example.com", Utc::now()).unwrap()
    }

    #[test]
    fn test_login_logout_transitions() {
        let now = Utc::now();
        let start = AppState::signed_out();
        assert!(!start.is_logged_in());

        let signed_in = start.login(user(), now);
        assert!(signed_in.is_logged_in());
        assert_eq!(signed_in.last_updated, Some(now));
        // Pure: the original is untouched
        assert!(!start.is_logged_in());

        let signed_out = signed_in.logout(now);
        assert!(!signed_out.is_logged_in());
        assert!(signed_in.is_logged_in());
    }

    #[test]
    fn test_user_validation() {
        let now = Utc::now();
        assert!(matches!(
            User::new("  ", "a@b.co", now),
            Err(SessionError::EmptyName)
        ));
        for bad in ["", "plain", "a@b", "@b.co", "a@@b.co", "a b@c.co", "a@.co"] {
            assert!(
                matches!(User::new("A", bad, now), Err(SessionError::InvalidEmail(_))),
                "accepted {bad:?}"
            );
        }
        let ok = User::new(" Ann ", " ann@mail.org ", now).unwrap();
        assert_eq!(ok.name, "Ann");
        assert_eq!(ok.email, "ann@mail.org");
    }

    #[test]
    fn test_persist_and_restore() {
        let store = MemoryStore::new();
        assert!(!restore(&store).unwrap().is_logged_in());

        let state = AppState::signed_out().login(user(), Utc::now());
        persist(&state, &store).unwrap();
        assert!(store.get(SESSION_KEY).unwrap().is_some());

        let restored = restore(&store).unwrap();
        assert_eq!(restored.user, state.user);

        persist(&restored.logout(Utc::now()), &store).unwrap();
        assert_eq!(store.get(SESSION_KEY).unwrap(), None);
    }

    #[test]
    fn test_corrupt_session_is_signed_out() {
        let store = MemoryStore::new();
        store.set(SESSION_KEY, "{not json").unwrap();

        let state = restore(&store).unwrap();
        assert!(!state.is_logged_in());
        assert_eq!(store.get(SESSION_KEY).unwrap(), None);
    }
}
