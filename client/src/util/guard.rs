//! Guarded programmatic navigation.
//!
//! `<ProtectedRoute>` covers URL-driven entry to `/home`. Pages that move the
//! user themselves (after sign-in, for example) go through the same navigator
//! so a stale, slower navigation can never land after a newer one.

#[cfg(test)]
#[path = "guard_test.rs"]
mod guard_test;

use gate::{AuthHub, Navigator, Resolution, Transition};
use leptos_router::NavigateOptions;

/// Resolve `from -> to` and return the location to apply, if any.
///
/// Superseded navigations and broken redirect chains yield `None`.
pub async fn guarded_location(navigator: &Navigator, hub: &AuthHub, from: &str, to: &str) -> Option<String> {
    match navigator.navigate(&Transition::new(from, to), hub).await {
        Ok(Resolution::Superseded) => None,
        Ok(resolution) => resolution.location().map(str::to_owned),
        Err(e) => {
            leptos::logging::warn!("navigation to {to} failed: {e}");
            None
        }
    }
}

/// Mark every in-flight guarded navigation as stale.
///
/// Called when the router's location changes by other means (links, history),
/// so an older `navigate_guarded` never overrides where the user went since.
pub fn supersede_pending(navigator: &Navigator) {
    navigator.guard().generation().advance();
}

/// Run a guarded navigation in the background and apply its result through
/// the router's `navigate` function.
pub fn navigate_guarded<F>(navigator: Navigator, hub: AuthHub, from: String, to: String, navigate: F)
where
    F: Fn(&str, NavigateOptions) + 'static,
{
    leptos::task::spawn_local(async move {
        if let Some(location) = guarded_location(&navigator, &hub, &from, &to).await {
            navigate(&location, NavigateOptions::default());
        }
    });
}
