//! Activity feed endpoint.
//!
//! GET /repository/activity?author=<pattern>
//!
//! Returns the newest changed files (across all repositories) in which the
//! author added lines, as a JSON array of `ActivityItem`.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::activity::find_activity;
use crate::error::{AppError, Result};
use crate::models::ActivityItem;
use crate::state::SharedContext;

pub fn routes(ctx: SharedContext) -> Router {
    Router::new()
        .route("/repository/activity", get(get_activity))
        .with_state(ctx)
}

#[derive(Debug, Deserialize)]
struct ActivityQuery {
    author: Option<String>,
}

async fn get_activity(
    State(ctx): State<SharedContext>,
    Query(query): Query<ActivityQuery>,
) -> Result<Json<Vec<ActivityItem>>> {
    let author = query
        .author
        .filter(|author| !author.trim().is_empty())
        .ok_or_else(|| AppError::InvalidRequest("author is required".to_string()))?;

    let items = find_activity(&ctx, &author).await?;
    Ok(Json(items))
}
