//! API route handlers - maps HTTP endpoints to repository operations.
//!
//! Each submodule defines routes for a feature area:
//! - `repository`: Clone, fetch-all/list and delete
//! - `activity`: Recent activity feed for an author
//!
//! All routes are nested under the configured context path.

pub mod activity;
pub mod repository;

use axum::{http::StatusCode, response::IntoResponse, Json, Router};
use serde_json::json;

use crate::state::SharedContext;

pub fn create_router(ctx: SharedContext, context_path: &str) -> Router {
    let api = Router::new()
        .merge(repository::routes(ctx.clone()))
        .merge(activity::routes(ctx));

    let router = match normalize_context_path(context_path) {
        Some(prefix) => Router::new().nest(&prefix, api),
        None => api,
    };

    router.fallback(not_found)
}

/// `/`, `` and `//` mean no prefix; `api/` becomes `/api`.
fn normalize_context_path(context_path: &str) -> Option<String> {
    let trimmed = context_path.trim_matches('/');
    if trimmed.is_empty() {
        None
    } else {
        Some(format!("/{}", trimmed))
    }
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "not found" })))
}
