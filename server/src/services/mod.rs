//! Domain services used by HTTP routes and the route gate.
//!
//! ARCHITECTURE
//! ============
//! Service modules own the conversation with the hosted identity service so
//! route handlers can stay focused on protocol translation and cookies.

pub mod identity;
pub mod session;
