//! Full navigation: redirect routes first, then the guard for protected ones.

#[cfg(test)]
#[path = "navigator_test.rs"]
mod navigator_test;

use std::sync::Arc;

use crate::guard::{Decision, GuardOutcome, NavigationGuard, Transition};
use crate::identity::IdentityService;
use crate::route::{RouteError, RouteTable, normalize_path};

/// Where a navigation ended up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// Landed on `path` (after any unconditional redirects).
    Resolved { path: String, route: Option<String> },
    /// The guard sent the navigation somewhere else.
    Redirected { requested: String, path: String },
    NotFound { path: String },
    /// A newer navigation started first; nothing should be applied.
    Superseded,
}

impl Resolution {
    /// Location to display, if any.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        match self {
            Self::Resolved { path, .. } | Self::Redirected { path, .. } | Self::NotFound { path } => Some(path.as_str()),
            Self::Superseded => None,
        }
    }

    /// True when the final location differs from `requested` by path.
    #[must_use]
    pub fn moved_from(&self, requested: &str) -> bool {
        self.location()
            .is_some_and(|path| normalize_path(path) != normalize_path(requested))
    }
}

/// Route table plus guard. Clones share the table and the guard generation.
#[derive(Clone, Debug, Default)]
pub struct Navigator {
    table: Arc<RouteTable>,
    guard: NavigationGuard,
}

impl Navigator {
    #[must_use]
    pub fn new(table: RouteTable, guard: NavigationGuard) -> Self {
        Self { table: Arc::new(table), guard }
    }

    /// Same table and redirect target, but an independent transition counter.
    ///
    /// Used where navigations are unrelated to each other, e.g. one per
    /// incoming HTTP request.
    #[must_use]
    pub fn fork(&self) -> Self {
        Self { table: Arc::clone(&self.table), guard: NavigationGuard::new(self.guard.redirect_target()) }
    }

    #[must_use]
    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    #[must_use]
    pub fn guard(&self) -> &NavigationGuard {
        &self.guard
    }

    /// Resolve a transition against the route table and, for protected
    /// routes, the identity service.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError`] when the target's redirect chain is broken.
    pub async fn navigate<S>(&self, transition: &Transition, identity: &S) -> Result<Resolution, RouteError>
    where
        S: IdentityService + ?Sized,
    {
        let target = self.table.follow_redirects(&transition.to)?;

        let Some(route) = self.table.match_path(&target) else {
            self.guard.generation().advance();
            return Ok(Resolution::NotFound { path: target });
        };
        let name = route.name.clone();

        if !route.is_protected() {
            self.guard.generation().advance();
            return Ok(Resolution::Resolved { path: target, route: name });
        }

        let guarded = Transition::new(transition.from.clone(), target.clone());
        let resolution = match self.guard.evaluate(&guarded, identity).await {
            GuardOutcome::Superseded => Resolution::Superseded,
            GuardOutcome::Decided(Decision::Allow) => Resolution::Resolved { path: target, route: name },
            GuardOutcome::Decided(Decision::Redirect(path)) => {
                Resolution::Redirected { requested: transition.to.clone(), path }
            }
        };
        Ok(resolution)
    }
}
