//! Session-aware route gating shared by `client` and `server`.
//!
//! This crate owns the pieces that do not depend on a UI runtime or an HTTP
//! stack: the session status model, the identity-service boundary, the route
//! table, and the navigation guard that decides whether a transition into a
//! protected route may complete.
//!
//! The guard is executor-agnostic. It bridges identity-service callbacks onto
//! a `futures` oneshot channel, so the same code runs on the browser's
//! single-threaded executor and inside a tokio runtime.

pub mod config;
pub mod guard;
pub mod identity;
pub mod navigator;
pub mod route;
pub mod session;

pub use config::{ConfigError, IdentityConfig};
pub use guard::{Decision, Generation, GuardOutcome, NavigationGuard, Ticket, Transition, first_status};
pub use identity::{AuthHub, AuthListener, IdentityApp, IdentityService, Subscription, initialize_app, initialize_app_with};
pub use navigator::{Navigator, Resolution};
pub use route::{AUTH_PATH, HOME_PATH, ROOT_PATH, Route, RouteAccess, RouteError, RouteTable, normalize_path};
pub use session::{Identity, SessionStatus};
