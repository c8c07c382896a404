use axum::{
    extract::{Path, State},
    Json,
};

use service::domain::Category;

use crate::errors::JsonApiError;
use crate::routes::auth::ServerState;

#[utoipa::path(get, path = "/api/categories", tag = "categories", responses((status = 200, description = "All categories")))]
pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<Category>>, JsonApiError> {
    Ok(Json(state.services.categories.list().await?))
}

#[utoipa::path(get, path = "/api/categories/{id}", tag = "categories", params(("id" = i32, Path, description = "Category id")), responses((status = 200, description = "Category"), (status = 404, description = "Not found")))]
pub async fn get(State(state): State<ServerState>, Path(id): Path<i32>) -> Result<Json<Category>, JsonApiError> {
    Ok(Json(state.services.categories.get(id).await?))
}
