//! Route table: which paths exist, which redirect, which are protected.
//!
//! DESIGN
//! ======
//! Redirect routes are followed before any guard runs, so `/` always lands on
//! `/home` first and only then meets the session check. Matching ignores the
//! query string, the fragment, and a trailing slash.

#[cfg(test)]
#[path = "route_test.rs"]
mod route_test;

pub const ROOT_PATH: &str = "/";
pub const HOME_PATH: &str = "/home";
pub const AUTH_PATH: &str = "/auth";

const MAX_REDIRECTS: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    #[error("redirect loop detected at {path}")]
    RedirectLoop { path: String },
    #[error("too many redirects starting from {path}")]
    TooManyRedirects { path: String },
}

/// Whether entering a route requires an authenticated session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouteAccess {
    Public,
    Protected,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Route {
    pub path: String,
    pub name: Option<String>,
    pub access: RouteAccess,
    /// Unconditional redirect target, applied before any guard.
    pub redirect: Option<String>,
}

impl Route {
    #[must_use]
    pub fn public(path: &str, name: &str) -> Self {
        Self { path: path.to_owned(), name: Some(name.to_owned()), access: RouteAccess::Public, redirect: None }
    }

    #[must_use]
    pub fn protected(path: &str, name: &str) -> Self {
        Self { path: path.to_owned(), name: Some(name.to_owned()), access: RouteAccess::Protected, redirect: None }
    }

    #[must_use]
    pub fn redirect(path: &str, to: &str) -> Self {
        Self { path: path.to_owned(), name: None, access: RouteAccess::Public, redirect: Some(to.to_owned()) }
    }

    #[must_use]
    pub fn is_protected(&self) -> bool {
        self.access == RouteAccess::Protected
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    #[must_use]
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    /// `/` redirects to `/home`; `/home` is protected; `/auth` is public.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(vec![
            Route::redirect(ROOT_PATH, HOME_PATH),
            Route::protected(HOME_PATH, "Home"),
            Route::public(AUTH_PATH, "Auth"),
        ])
    }

    #[must_use]
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Find the route for a location, ignoring query, fragment and trailing slash.
    #[must_use]
    pub fn match_path(&self, location: &str) -> Option<&Route> {
        let path = normalize_path(location);
        self.routes.iter().find(|route| route.path == path)
    }

    /// Follow redirect routes from `location` until a non-redirect path.
    ///
    /// Returns the location unchanged when it is not a redirect route. When a
    /// redirect was followed, the result is the final target path carrying the
    /// query and fragment of `location` (unless the target names its own).
    ///
    /// # Errors
    ///
    /// Returns [`RouteError`] for cycles and overly long chains.
    pub fn follow_redirects(&self, location: &str) -> Result<String, RouteError> {
        let mut current = location.to_owned();
        let mut seen: Vec<String> = Vec::new();

        for _ in 0..=MAX_REDIRECTS {
            let path = normalize_path(&current).to_owned();
            let Some(target) = self.match_path(&path).and_then(|r| r.redirect.clone()) else {
                if seen.is_empty() || current.contains(['?', '#']) {
                    return Ok(current);
                }
                current.push_str(location_suffix(location));
                return Ok(current);
            };
            if seen.contains(&path) {
                return Err(RouteError::RedirectLoop { path });
            }
            seen.push(path);
            current = target;
        }

        Err(RouteError::TooManyRedirects { path: location.to_owned() })
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Query and fragment of a location, including the leading `?` or `#`.
fn location_suffix(location: &str) -> &str {
    location.find(['?', '#']).map_or("", |idx| &location[idx..])
}

/// Path portion of a location: query and fragment stripped, trailing slash
/// removed (except for the root).
#[must_use]
pub fn normalize_path(location: &str) -> &str {
    let end = location.find(['?', '#']).unwrap_or(location.len());
    let path = &location[..end];
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() { ROOT_PATH } else { trimmed }
}
