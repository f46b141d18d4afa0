// src/ssr/mod.rs

//! Link-preview documents for crawlers.
//!
//! Content routes of the single-page application (`/blog/{slug}`,
//! `/teachers/{userId}`, ...) are answered with a small HTML document
//! carrying Open Graph and Twitter tags when the visitor is a crawler.
//! Everyone else falls through to the application shell.

pub mod detect;
pub mod render;
pub mod responder;

use axum::{
    extract::{Request, State},
    http::header::{REFERER, USER_AGENT},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::ssr::detect::{Visitor, classify};
use crate::state::AppState;

/// Middleware in front of the static site.
pub async fn crawler_gate(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let headers = request.headers();
    let visitor = Visitor {
        method: request.method(),
        path: request.uri().path(),
        user_agent: headers.get(USER_AGENT).and_then(|v| v.to_str().ok()),
        referer: headers.get(REFERER).and_then(|v| v.to_str().ok()),
    };

    let Some(route) = classify(&visitor, state.config.ssr_direct_links) else {
        return next.run(request).await;
    };

    tracing::debug!("Serving meta document for {}", route.path());
    responder::respond(&state.db, &state.config.site_url, &route)
        .await
        .into_response()
}
