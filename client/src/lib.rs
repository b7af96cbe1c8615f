//! # client
//!
//! Leptos + WASM frontend for the gated single-page app.
//!
//! This crate contains the root component and route table, pages, the
//! browser-side session state, and REST helpers. Route protection itself is
//! delegated to the `gate` crate so the server host applies the same rules.

pub mod app;
pub mod net;
pub mod pages;
pub mod state;
pub mod util;

/// WASM entry point: hydrate the server-rendered document.
#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);
    leptos::mount::hydrate_body(app::App);
}
