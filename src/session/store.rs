use anyhow::Result;
use log::info;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use super::storage::SessionStorage;
use crate::domain::{Session, UserProfile};

const SESSION_KEY: &str = "session";

/// Change notification delivered to every subscriber
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    SignedIn(UserProfile),
    SignedOut,
    ProfileUpdated(UserProfile),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Arc<dyn Fn(&SessionEvent) + Send + Sync>;

/// Process-wide logged-in identity with observer-style change notification
pub struct SessionStore {
    storage: SessionStorage,
    current: Mutex<Option<Session>>,
    listeners: Mutex<Vec<(SubscriptionId, Listener)>>,
    next_id: AtomicU64,
}

impl SessionStore {
    /// Open the store, restoring any previously persisted session
    pub fn open(storage: SessionStorage) -> Self {
        let current = storage.load::<Session>(SESSION_KEY);
        if let Some(session) = &current {
            info!("Restored session for {}", session.user.display_label());
        }

        Self {
            storage,
            current: Mutex::new(current),
            listeners: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn current(&self) -> Option<Session> {
        lock(&self.current).clone()
    }

    pub fn token(&self) -> Option<String> {
        lock(&self.current).as_ref().and_then(|s| s.token.clone())
    }

    pub fn user(&self) -> Option<UserProfile> {
        lock(&self.current).as_ref().map(|s| s.user.clone())
    }

    pub fn user_id(&self) -> Option<String> {
        self.user().and_then(|u| u.id)
    }

    pub fn is_signed_in(&self) -> bool {
        lock(&self.current).is_some()
    }

    pub fn sign_in(&self, session: Session) -> Result<()> {
        self.storage.save(SESSION_KEY, &session)?;
        let user = session.user.clone();
        *lock(&self.current) = Some(session);

        self.notify(&SessionEvent::SignedIn(user));
        Ok(())
    }

    pub fn sign_out(&self) -> Result<()> {
        self.storage.remove(SESSION_KEY)?;
        let was_signed_in = lock(&self.current).take().is_some();

        if was_signed_in {
            self.notify(&SessionEvent::SignedOut);
        }
        Ok(())
    }

    /// Replace the cached user object, keeping the token
    pub fn update_user(&self, user: UserProfile) -> Result<()> {
        let updated = {
            let mut current = lock(&self.current);
            let token = current.as_ref().and_then(|s| s.token.clone());
            let session = Session {
                token,
                user: user.clone(),
            };
            self.storage.save(SESSION_KEY, &session)?;
            *current = Some(session);
            user
        };

        self.notify(&SessionEvent::ProfileUpdated(updated));
        Ok(())
    }

    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&SessionEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::SeqCst));
        lock(&self.listeners).push((id, Arc::new(listener)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = lock(&self.listeners);
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    // Listeners run outside the lock so they may subscribe or read the session.
    fn notify(&self, event: &SessionEvent) {
        let listeners: Vec<Listener> = lock(&self.listeners)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in listeners {
            listener(event);
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn user(id: &str) -> UserProfile {
        UserProfile {
            id: Some(id.to_string()),
            username: Some(format!("player{id}")),
            ..UserProfile::default()
        }
    }

    fn session(id: &str) -> Session {
        Session {
            token: Some("tok".to_string()),
            user: user(id),
        }
    }

    fn recorder(store: &SessionStore) -> (SubscriptionId, Arc<Mutex<Vec<SessionEvent>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let id = store.subscribe(move |event| sink.lock().expect("lock").push(event.clone()));
        (id, seen)
    }

    #[test]
    fn sign_in_persists_and_notifies() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = SessionStore::open(SessionStorage::new(dir.path()).expect("storage"));
        let (_, seen) = recorder(&store);

        store.sign_in(session("7")).expect("sign in");

        assert_eq!(store.token().as_deref(), Some("tok"));
        assert_eq!(*seen.lock().expect("lock"), vec![SessionEvent::SignedIn(user("7"))]);

        let reopened = SessionStore::open(SessionStorage::new(dir.path()).expect("storage"));
        assert_eq!(reopened.user_id().as_deref(), Some("7"));
    }

    #[test]
    fn every_open_view_hears_about_sign_out() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = SessionStore::open(SessionStorage::new(dir.path()).expect("storage"));
        store.sign_in(session("1")).expect("sign in");

        let (_, navbar) = recorder(&store);
        let (_, profile) = recorder(&store);
        store.sign_out().expect("sign out");

        assert_eq!(*navbar.lock().expect("lock"), vec![SessionEvent::SignedOut]);
        assert_eq!(*profile.lock().expect("lock"), vec![SessionEvent::SignedOut]);
        assert!(!store.is_signed_in());
    }

    #[test]
    fn unsubscribed_listeners_stay_quiet() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = SessionStore::open(SessionStorage::new(dir.path()).expect("storage"));
        let (id, seen) = recorder(&store);

        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.sign_in(session("2")).expect("sign in");

        assert!(seen.lock().expect("lock").is_empty());
    }

    #[test]
    fn profile_update_keeps_token() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = SessionStore::open(SessionStorage::new(dir.path()).expect("storage"));
        store.sign_in(session("3")).expect("sign in");

        let mut edited = user("3");
        edited.bio = Some("IGL".to_string());
        store.update_user(edited.clone()).expect("update");

        assert_eq!(store.token().as_deref(), Some("tok"));
        assert_eq!(store.user(), Some(edited));
    }

    #[test]
    fn listener_may_read_the_store() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = Arc::new(SessionStore::open(SessionStorage::new(dir.path()).expect("storage")));
        let observed = Arc::new(Mutex::new(None));

        let reader = Arc::clone(&store);
        let sink = Arc::clone(&observed);
        store.subscribe(move |_| *sink.lock().expect("lock") = reader.user_id());

        store.sign_in(session("9")).expect("sign in");
        assert_eq!(*observed.lock().expect("lock"), Some("9".to_string()));
    }
}
