//! Explicit session state for the signed-in user.
//!
//! The identity used to live in ambient browser storage and change
//! notifications went out as untyped global events. Here the session is an
//! ordinary value: construct one [`SessionContext`], hand it to every
//! component that needs identity, and subscribe for typed change events.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

/// The signed-in account, as much of it as the UI needs for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub email: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl UserIdentity {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            display_name: None,
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }
}

/// Session change notification delivered to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn(UserIdentity),
    SignedOut,
}

/// Handle returned by [`SessionContext::subscribe`]; pass it back to
/// [`SessionContext::unsubscribe`] to stop receiving events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Arc<dyn Fn(&SessionEvent) + Send + Sync>;

#[derive(Default)]
struct Inner {
    current: Option<UserIdentity>,
    next_id: u64,
    listeners: Vec<(u64, Listener)>,
}

/// Shared, thread-safe session state. Cheap to clone; clones observe the
/// same session.
#[derive(Clone, Default)]
pub struct SessionContext {
    inner: Arc<Mutex<Inner>>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// A panicking subscriber must not take the session down with it, so
    /// a poisoned lock is recovered rather than propagated.
    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// The currently signed-in user, if any.
    pub fn current_user(&self) -> Option<UserIdentity> {
        self.lock().current.clone()
    }

    pub fn is_signed_in(&self) -> bool {
        self.current_user().is_some()
    }

    /// Records `identity` as signed in and notifies subscribers.
    pub fn sign_in(&self, identity: UserIdentity) {
        let listeners = {
            let mut inner = self.lock();
            inner.current = Some(identity.clone());
            snapshot(&inner)
        };
        let event = SessionEvent::SignedIn(identity);
        for listener in listeners {
            listener(&event);
        }
    }

    /// Clears the session and notifies subscribers. Signing out while
    /// already signed out still emits the event; subscribers treat it as
    /// idempotent.
    pub fn sign_out(&self) {
        let listeners = {
            let mut inner = self.lock();
            inner.current = None;
            snapshot(&inner)
        };
        let event = SessionEvent::SignedOut;
        for listener in listeners {
            listener(&event);
        }
    }

    /// Registers `listener` for session changes. Callbacks run on the
    /// thread that triggered the change, outside the session lock, so a
    /// listener may query the context it subscribed to.
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&SessionEvent) + Send + Sync + 'static,
    {
        let mut inner = self.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.listeners.push((id, Arc::new(listener)));
        SubscriptionId(id)
    }

    /// Removes a subscription. Returns false if the id was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut inner = self.lock();
        let before = inner.listeners.len();
        inner.listeners.retain(|(listener_id, _)| *listener_id != id.0);
        inner.listeners.len() != before
    }
}

fn snapshot(inner: &Inner) -> Vec<Listener> {
    inner
        .listeners
        .iter()
        .map(|(_, listener)| Arc::clone(listener))
        .collect()
}
