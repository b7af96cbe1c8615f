//! Identity-service boundary and the in-process auth handle.
//!
//! SYSTEM CONTEXT
//! ==============
//! The identity service is external: it signs users in and decides the
//! session status. This module only describes how the application observes
//! that status (`IdentityService`) and provides `AuthHub`, the handle the
//! client publishes the reported status into.
//!
//! DESIGN
//! ======
//! Listeners follow the usual hosted-auth semantics: a listener registered
//! after the status is determined is called immediately with the current
//! status, then again on every change. Every registration returns a
//! `Subscription` that releases the listener when dropped.

#[cfg(test)]
#[path = "identity_test.rs"]
mod identity_test;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, TryLockError, Weak};

use crate::config::IdentityConfig;
use crate::session::{Identity, SessionStatus};

/// Callback invoked with each determined session status.
pub type AuthListener = Box<dyn FnMut(&SessionStatus) + Send>;

/// Observation surface of an external identity service.
pub trait IdentityService: Send + Sync {
    /// The currently signed-in user, if the status is already determined.
    fn current_user(&self) -> Option<Identity>;

    /// Register a listener for auth-state changes.
    fn on_auth_state_changed(&self, listener: AuthListener) -> Subscription;
}

// =============================================================================
// SUBSCRIPTION
// =============================================================================

/// Registration handle. Dropping it unregisters the listener.
#[must_use = "dropping a Subscription immediately unregisters the listener"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    pub fn new(release: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self { release: Some(Box::new(release)) }
    }

    /// A subscription with nothing to release.
    pub fn empty() -> Self {
        Self { release: None }
    }

    /// Explicitly unregister the listener.
    pub fn unsubscribe(mut self) {
        self.release_now();
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release_now();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("active", &self.release.is_some()).finish()
    }
}

// =============================================================================
// AUTH HUB
// =============================================================================

/// One registered listener.
///
/// Statuses are offered with the hub version they were published under and
/// delivered in version order; an older status offered late is dropped.
/// Whoever holds `delivery` drains `latest`, so a status offered while the
/// listener is running (from another thread, or re-entrantly from the
/// listener itself) is delivered right after the current call returns.
struct ListenerSlot {
    active: AtomicBool,
    delivery: Mutex<Delivery>,
    latest: Mutex<Option<(u64, SessionStatus)>>,
}

struct Delivery {
    listener: AuthListener,
    delivered: u64,
}

impl ListenerSlot {
    fn new(listener: AuthListener) -> Self {
        Self {
            active: AtomicBool::new(true),
            delivery: Mutex::new(Delivery { listener, delivered: 0 }),
            latest: Mutex::new(None),
        }
    }

    fn deactivate(&self) {
        self.active.store(false, Ordering::SeqCst);
    }

    fn offer(&self, version: u64, status: &SessionStatus) {
        {
            let mut latest = self.latest.lock().unwrap_or_else(PoisonError::into_inner);
            if latest.as_ref().is_none_or(|(held, _)| *held < version) {
                *latest = Some((version, status.clone()));
            }
        }
        self.drain();
    }

    fn drain(&self) {
        loop {
            let mut delivery = match self.delivery.try_lock() {
                Ok(guard) => guard,
                Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
                Err(TryLockError::WouldBlock) => return,
            };
            while let Some((version, status)) = self.take_latest() {
                if version <= delivery.delivered || !self.active.load(Ordering::SeqCst) {
                    continue;
                }
                delivery.delivered = version;
                (delivery.listener)(&status);
            }
            drop(delivery);

            // An offer that lost the race for `delivery` after the last take.
            if self.latest.lock().unwrap_or_else(PoisonError::into_inner).is_none() {
                return;
            }
        }
    }

    fn take_latest(&self) -> Option<(u64, SessionStatus)> {
        self.latest.lock().unwrap_or_else(PoisonError::into_inner).take()
    }
}

#[derive(Default)]
struct HubInner {
    status: SessionStatus,
    /// Bumped on every determined publish.
    version: u64,
    next_id: u64,
    listeners: BTreeMap<u64, Arc<ListenerSlot>>,
}

/// In-process auth handle: holds the last reported status and fans it out.
///
/// Clone is cheap; all clones share the same status and listeners.
#[derive(Clone, Default)]
pub struct AuthHub {
    inner: Arc<Mutex<HubInner>>,
}

impl AuthHub {
    /// A hub whose status is still pending.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Last reported status.
    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.lock().status.clone()
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.lock().listeners.len()
    }

    /// Record a new status and notify every listener.
    ///
    /// Publishing `Pending` resets the status without notifying anyone. A
    /// listener unsubscribed while this call is running is not notified.
    pub fn publish(&self, status: SessionStatus) {
        let (version, slots): (u64, Vec<Arc<ListenerSlot>>) = {
            let mut inner = self.lock();
            inner.status = status.clone();
            if status.is_pending() {
                return;
            }
            inner.version += 1;
            (inner.version, inner.listeners.values().cloned().collect())
        };
        tracing::debug!(authenticated = status.is_authenticated(), listeners = slots.len(), "auth state changed");
        for slot in slots {
            slot.offer(version, &status);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HubInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl IdentityService for AuthHub {
    fn current_user(&self) -> Option<Identity> {
        self.lock().status.identity().cloned()
    }

    fn on_auth_state_changed(&self, listener: AuthListener) -> Subscription {
        let slot = Arc::new(ListenerSlot::new(listener));
        let (id, version, current) = {
            let mut inner = self.lock();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.listeners.insert(id, Arc::clone(&slot));
            (id, inner.version, inner.status.clone())
        };

        if !current.is_pending() {
            slot.offer(version, &current);
        }

        let weak: Weak<Mutex<HubInner>> = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            slot.deactivate();
            if let Some(inner) = weak.upgrade() {
                inner.lock().unwrap_or_else(PoisonError::into_inner).listeners.remove(&id);
            }
        })
    }
}

impl fmt::Debug for AuthHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.lock();
        f.debug_struct("AuthHub")
            .field("status", &inner.status)
            .field("listeners", &inner.listeners.len())
            .finish()
    }
}

// =============================================================================
// APP HANDLE
// =============================================================================

/// Connection handle to the identity service, created once at start-up.
#[derive(Clone, Debug)]
pub struct IdentityApp {
    config: Arc<IdentityConfig>,
    auth: AuthHub,
}

impl IdentityApp {
    #[must_use]
    pub fn config(&self) -> &IdentityConfig {
        &self.config
    }

    /// The auth handle for this app.
    #[must_use]
    pub fn auth(&self) -> &AuthHub {
        &self.auth
    }
}

/// Initialize the identity-service handle from its project configuration.
#[must_use]
pub fn initialize_app(config: IdentityConfig) -> IdentityApp {
    initialize_app_with(config, AuthHub::new())
}

/// Initialize the handle around an auth hub that already has subscribers.
#[must_use]
pub fn initialize_app_with(config: IdentityConfig, auth: AuthHub) -> IdentityApp {
    tracing::info!(project_id = %config.project_id, "identity app initialized");
    IdentityApp { config: Arc::new(config), auth }
}
