//! Repository lifecycle endpoints.
//!
//! - POST /repository { name?: string, url: string }
//!   Clones `url` into the repository root. `name` defaults to the url's last segment.
//!
//! - GET /repository
//!   Fetches every tracked repository and lists their names.
//!
//! - DELETE /repository/{repo}
//!   Removes a repository's working copy.

use axum::{
    extract::{Path, State},
    routing::{delete, get},
    Json, Router,
};

use crate::error::Result;
use crate::models::{CreateRepositoryRequest, RepositoryList, RepositoryName};
use crate::state::SharedContext;

pub fn routes(ctx: SharedContext) -> Router {
    Router::new()
        .route("/repository", get(update_repositories).post(create_repository))
        .route("/repository/{repo}", delete(delete_repository))
        .with_state(ctx)
}

async fn create_repository(
    State(ctx): State<SharedContext>,
    Json(request): Json<CreateRepositoryRequest>,
) -> Result<Json<RepositoryName>> {
    let name = ctx
        .repositories
        .clone_repository(&request.url, request.name.as_deref())
        .await?;
    Ok(Json(RepositoryName { name }))
}

async fn update_repositories(State(ctx): State<SharedContext>) -> Result<Json<RepositoryList>> {
    let repositories = ctx.repositories.fetch_all().await?;
    Ok(Json(RepositoryList { repositories }))
}

async fn delete_repository(
    State(ctx): State<SharedContext>,
    Path(repo): Path<String>,
) -> Result<Json<RepositoryName>> {
    ctx.repositories.delete(&repo).await?;
    Ok(Json(RepositoryName { name: repo }))
}
