//! Page modules for route-level screens.
//!
//! ARCHITECTURE
//! ============
//! Each page owns route-scoped orchestration: reading session context,
//! calling the server, and triggering navigation.

pub mod auth;
pub mod home;
