//! The single owned credential record.

use arc_swap::ArcSwapOption;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

use super::storage::CredentialStorage;
use crate::Result;

/// Public profile of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    pub id: u64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    pub image: String,
}

/// The persisted "user" record: the profile plus the current token pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    #[serde(flatten)]
    pub profile: UserProfile,
    pub access_token: String,
    pub refresh_token: String,
}

/// Read-only view of the current credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_token: String,
    pub refresh_token: String,
    pub user: UserProfile,
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedState {
    user: Option<AuthSession>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Persisted {
    state: PersistedState,
    #[serde(default)]
    version: u32,
}

/// Holds the live session and mirrors every change into durable storage.
///
/// Readers get lock-free snapshots; writes go through the `pub(crate)`
/// mutators, which only the auth coordinator calls. Writers are serialized
/// so that a swap and its persisted copy always land together.
pub struct AuthStore {
    session: ArcSwapOption<AuthSession>,
    storage: Arc<dyn CredentialStorage>,
    key: String,
    write: Mutex<()>,
}

impl AuthStore {
    /// Rehydrate from `storage`. A record that cannot be parsed is discarded.
    pub fn rehydrate(storage: Arc<dyn CredentialStorage>, key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        let session = match storage.load(&key)? {
            Some(raw) => match serde_json::from_str::<Persisted>(&raw) {
                Ok(persisted) => persisted.state.user,
                Err(e) => {
                    warn!(storage = storage.name(), key = key.as_str(), error = %e, "discarding unreadable credential record");
                    None
                }
            },
            None => None,
        };
        debug!(
            storage = storage.name(),
            signed_in = session.is_some(),
            "credential store rehydrated"
        );
        Ok(Self {
            session: ArcSwapOption::from(session.map(Arc::new)),
            storage,
            key,
            write: Mutex::new(()),
        })
    }

    pub fn session(&self) -> Option<Arc<AuthSession>> {
        self.session.load_full()
    }

    pub fn access_token(&self) -> Option<String> {
        self.session
            .load_full()
            .map(|s| s.access_token.clone())
            .filter(|t| !t.is_empty())
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.session
            .load_full()
            .map(|s| s.refresh_token.clone())
            .filter(|t| !t.is_empty())
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.session.load_full().map(|s| s.profile.clone())
    }

    pub fn credentials(&self) -> Option<Credentials> {
        self.session.load_full().map(|s| Credentials {
            access_token: s.access_token.clone(),
            refresh_token: s.refresh_token.clone(),
            user: s.profile.clone(),
        })
    }

    pub fn is_signed_in(&self) -> bool {
        self.session.load_full().is_some()
    }

    fn writer(&self) -> MutexGuard<'_, ()> {
        self.write.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub(crate) fn set_session(&self, session: Option<AuthSession>) {
        let _writer = self.writer();
        self.session.store(session.map(Arc::new));
        self.persist();
    }

    /// Install a freshly issued token pair. No-op when signed out.
    pub(crate) fn update_tokens(&self, access_token: String, refresh_token: Option<String>) -> bool {
        let _writer = self.writer();
        let Some(current) = self.session.load_full() else {
            return false;
        };
        let mut next = (*current).clone();
        next.access_token = access_token;
        if let Some(refresh_token) = refresh_token {
            next.refresh_token = refresh_token;
        }
        self.session.store(Some(Arc::new(next)));
        self.persist();
        true
    }

    pub(crate) fn clear(&self) {
        self.set_session(None);
    }

    /// Callers hold the writer lock.
    fn persist(&self) {
        let persisted = Persisted {
            state: PersistedState {
                user: self.session.load_full().map(|s| (*s).clone()),
            },
            version: 0,
        };
        let result = serde_json::to_string(&persisted)
            .map_err(crate::Error::from)
            .and_then(|raw| self.storage.save(&self.key, &raw));
        if let Err(e) = result {
            warn!(storage = self.storage.name(), error = %e, "failed to persist credentials");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::storage::MemoryStorage;
    use super::*;

    fn session(access: &str, refresh: &str) -> AuthSession {
        AuthSession {
            profile: UserProfile {
                id: 1,
                username: "emilys".into(),
                ..Default::default()
            },
            access_token: access.into(),
            refresh_token: refresh.into(),
        }
    }

    #[test]
    fn test_rehydrates_persisted_session() {
        let storage = Arc::new(MemoryStorage::new());
        let store = AuthStore::rehydrate(storage.clone(), "auth-storage").unwrap();
        assert!(!store.is_signed_in());
        store.set_session(Some(session("a1", "r1")));

        let raw = storage.load("auth-storage").unwrap().unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["state"]["user"]["accessToken"], "a1");
        assert_eq!(json["state"]["user"]["username"], "emilys");
        assert_eq!(json["version"], 0);

        let again = AuthStore::rehydrate(storage, "auth-storage").unwrap();
        assert_eq!(again.access_token().as_deref(), Some("a1"));
        assert_eq!(again.refresh_token().as_deref(), Some("r1"));
    }

    #[test]
    fn test_update_tokens_keeps_refresh_token_when_absent() {
        let store = AuthStore::rehydrate(Arc::new(MemoryStorage::new()), "k").unwrap();
        store.set_session(Some(session("a1", "r1")));
        assert!(store.update_tokens("a2".into(), None));
        let creds = store.credentials().unwrap();
        assert_eq!(creds.access_token, "a2");
        assert_eq!(creds.refresh_token, "r1");
        assert_eq!(creds.user.username, "emilys");
    }

    #[test]
    fn test_update_tokens_requires_session() {
        let store = AuthStore::rehydrate(Arc::new(MemoryStorage::new()), "k").unwrap();
        assert!(!store.update_tokens("a2".into(), Some("r2".into())));
        assert!(store.access_token().is_none());
    }

    #[test]
    fn test_clear_persists_null_user() {
        let storage = Arc::new(MemoryStorage::new());
        let store = AuthStore::rehydrate(storage.clone(), "k").unwrap();
        store.set_session(Some(session("a1", "r1")));
        store.clear();
        let raw = storage.load("k").unwrap().unwrap();
        assert!(raw.contains(r#""user":null"#));
        assert!(store.credentials().is_none());
    }

    #[test]
    fn test_sign_out_wins_over_concurrent_token_updates() {
        let storage = Arc::new(MemoryStorage::new());
        let store = Arc::new(AuthStore::rehydrate(storage.clone(), "k").unwrap());

        for round in 0..200 {
            store.set_session(Some(session("a1", "r1")));
            let updater = {
                let store = store.clone();
                std::thread::spawn(move || store.update_tokens(format!("a{}", round), None))
            };
            store.clear();
            let updated = updater.join().unwrap();

            // An update that lost the race finds no session; one that won was cleared.
            assert!(!store.is_signed_in(), "round {round}: updated={updated}");
        }
        let raw = storage.load("k").unwrap().unwrap();
        assert!(raw.contains(r#""user":null"#));
    }

    #[test]
    fn test_persisted_record_tracks_memory_under_contention() {
        let storage = Arc::new(MemoryStorage::new());
        let store = Arc::new(AuthStore::rehydrate(storage.clone(), "k").unwrap());
        store.set_session(Some(session("a0", "r0")));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for j in 0..50 {
                        store.update_tokens(format!("a{}-{}", i, j), None);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let raw = storage.load("k").unwrap().unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(
            json["state"]["user"]["accessToken"].as_str(),
            store.access_token().as_deref()
        );
    }

    #[test]
    fn test_corrupt_record_is_discarded() {
        let storage = Arc::new(MemoryStorage::new());
        storage.save("k", "{not json").unwrap();
        let store = AuthStore::rehydrate(storage, "k").unwrap();
        assert!(!store.is_signed_in());
    }
}
