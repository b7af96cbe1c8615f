//! Route gate for full-page requests.
//!
//! The browser router guards client-side navigations; this middleware applies
//! the same route table and guard to document requests so a deep link to a
//! protected page never renders for a signed-out visitor. Requests whose path
//! is not in the route table (API, assets, server functions) pass through.

use axum::extract::{Request, State};
use axum::http::{HeaderMap, Method, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;
use gate::{ROOT_PATH, Resolution, Transition, normalize_path};

use crate::routes::auth::session_token;
use crate::services::session::RequestIdentity;
use crate::state::AppState;

/// Path of the `Referer` header, used as the transition origin.
pub(crate) fn referer_path(headers: &HeaderMap) -> Option<String> {
    let referer = headers.get(header::REFERER)?.to_str().ok()?;
    let after_scheme = referer.split_once("://").map_or(referer, |(_, rest)| rest);
    let path = after_scheme.find('/').map_or("/", |idx| &after_scheme[idx..]);
    Some(normalize_path(path).to_owned())
}

/// Middleware: resolve document requests through the navigator and redirect
/// when the resolved location differs from the requested one.
pub async fn route_gate(State(state): State<AppState>, req: Request, next: Next) -> Response {
    if !matches!(*req.method(), Method::GET | Method::HEAD) {
        return next.run(req).await;
    }

    let requested = req
        .uri()
        .path_and_query()
        .map_or_else(|| req.uri().path().to_owned(), |pq| pq.as_str().to_owned());

    let table = state.navigator.table();
    if table.match_path(&requested).is_none() {
        return next.run(req).await;
    }

    let from = referer_path(req.headers()).unwrap_or_else(|| ROOT_PATH.to_owned());
    let token = session_token(&CookieJar::from_headers(req.headers()));
    let identity = RequestIdentity::new(state.identity.clone(), token);
    let transition = Transition::new(from, requested.clone());

    let resolution = match state.navigator.fork().navigate(&transition, &identity).await {
        Ok(resolution) => resolution,
        Err(e) => {
            tracing::error!(error = %e, path = %requested, "route table redirect failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, "route configuration error").into_response();
        }
    };

    match resolution {
        Resolution::Superseded => (StatusCode::CONFLICT, "navigation superseded").into_response(),
        Resolution::NotFound { .. } => next.run(req).await,
        ref moved if moved.moved_from(&requested) => {
            let location = moved.location().unwrap_or(ROOT_PATH);
            tracing::debug!(from = %requested, to = %location, "route gate redirect");
            Redirect::temporary(location).into_response()
        }
        Resolution::Resolved { .. } | Resolution::Redirected { .. } => next.run(req).await,
    }
}

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;
