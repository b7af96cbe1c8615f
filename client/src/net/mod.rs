//! Network helpers for talking to the host server.

pub mod api;
