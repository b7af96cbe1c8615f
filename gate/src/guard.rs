//! Navigation guard for protected routes.
//!
//! SYSTEM CONTEXT
//! ==============
//! A transition into a protected route is held until the identity service
//! reports a determined session status. A present identity lets the
//! transition through unchanged; anything else, including an identity
//! service that goes away without answering, redirects to the public route.
//!
//! DESIGN
//! ======
//! Each evaluation owns exactly one listener registration: it subscribes,
//! waits for the first determined status, then unsubscribes. Dropping the
//! evaluation future releases the listener too.
//!
//! Evaluations are stamped with a [`Ticket`] from a shared [`Generation`].
//! A ticket that is no longer current when its answer arrives yields
//! [`GuardOutcome::Superseded`], so a slow answer for an abandoned transition
//! can never override a newer navigation.

#[cfg(test)]
#[path = "guard_test.rs"]
mod guard_test;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::channel::oneshot;

use crate::identity::IdentityService;
use crate::route::AUTH_PATH;
use crate::session::SessionStatus;

/// An attempted route change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    pub from: String,
    pub to: String,
}

impl Transition {
    #[must_use]
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self { from: from.into(), to: to.into() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    /// Proceed to the originally requested target.
    Allow,
    /// Go to this location instead.
    Redirect(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardOutcome {
    Decided(Decision),
    /// A newer transition started before this one was decided.
    Superseded,
}

// =============================================================================
// GENERATION
// =============================================================================

/// Stamp identifying one transition attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// Monotonic transition counter shared by everything that navigates.
#[derive(Clone, Debug, Default)]
pub struct Generation(Arc<AtomicU64>);

impl Generation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new transition, superseding every earlier ticket.
    pub fn advance(&self) -> Ticket {
        Ticket(self.0.fetch_add(1, Ordering::SeqCst) + 1)
    }

    #[must_use]
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.0.load(Ordering::SeqCst) == ticket.0
    }
}

// =============================================================================
// GUARD
// =============================================================================

/// Gate for protected routes. Clones share one [`Generation`].
#[derive(Clone, Debug)]
pub struct NavigationGuard {
    redirect_to: String,
    generation: Generation,
}

impl Default for NavigationGuard {
    fn default() -> Self {
        Self::new(AUTH_PATH)
    }
}

impl NavigationGuard {
    /// A guard that sends unauthenticated transitions to `redirect_to`.
    #[must_use]
    pub fn new(redirect_to: impl Into<String>) -> Self {
        Self { redirect_to: redirect_to.into(), generation: Generation::new() }
    }

    #[must_use]
    pub fn redirect_target(&self) -> &str {
        &self.redirect_to
    }

    #[must_use]
    pub fn generation(&self) -> &Generation {
        &self.generation
    }

    /// Decision for a determined status; `None` while pending.
    #[must_use]
    pub fn decide(&self, status: &SessionStatus) -> Option<Decision> {
        match status {
            SessionStatus::Pending => None,
            SessionStatus::Authenticated(_) => Some(Decision::Allow),
            SessionStatus::Unauthenticated => Some(Decision::Redirect(self.redirect_to.clone())),
        }
    }

    /// Hold `transition` until the identity service reports, then decide.
    pub async fn evaluate<S>(&self, transition: &Transition, identity: &S) -> GuardOutcome
    where
        S: IdentityService + ?Sized,
    {
        let ticket = self.generation.advance();
        let status = first_status(identity).await;

        if !self.generation.is_current(ticket) {
            tracing::debug!(from = %transition.from, to = %transition.to, "guard result superseded");
            return GuardOutcome::Superseded;
        }

        let decision = self
            .decide(&status)
            .unwrap_or_else(|| Decision::Redirect(self.redirect_to.clone()));
        match &decision {
            Decision::Allow => tracing::debug!(from = %transition.from, to = %transition.to, "navigation allowed"),
            Decision::Redirect(target) => {
                tracing::debug!(from = %transition.from, to = %transition.to, %target, "navigation redirected");
            }
        }
        GuardOutcome::Decided(decision)
    }
}

/// Subscribe, wait for the first determined status, unsubscribe.
///
/// If the identity service releases the listener without ever reporting,
/// the session counts as unauthenticated.
pub async fn first_status<S>(identity: &S) -> SessionStatus
where
    S: IdentityService + ?Sized,
{
    let (tx, rx) = oneshot::channel::<SessionStatus>();
    let mut tx = Some(tx);

    let subscription = identity.on_auth_state_changed(Box::new(move |status: &SessionStatus| {
        if status.is_pending() {
            return;
        }
        if let Some(tx) = tx.take() {
            let _ = tx.send(status.clone());
        }
    }));

    let status = rx.await.unwrap_or(SessionStatus::Unauthenticated);
    subscription.unsubscribe();
    status
}
