use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;

use common::types::MessageBody;
use service::domain::{Business, BusinessFilter, CreateBusinessInput, UpdateBusinessInput};

use crate::auth::CurrentActor;
use crate::errors::JsonApiError;
use crate::routes::auth::ServerState;

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListingQuery {
    /// Defaults to 4, capped at 100.
    pub limit: Option<u64>,
}

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    pub q: Option<String>,
}

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(rename_all = "camelCase", parameter_in = Query)]
pub struct DirectoryQuery {
    pub category_id: Option<i32>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub is_verified: Option<bool>,
    pub is_paid: Option<bool>,
}

#[utoipa::path(get, path = "/api/businesses", tag = "businesses", params(DirectoryQuery), responses((status = 200, description = "Active listings")))]
pub async fn list(State(state): State<ServerState>, Query(q): Query<DirectoryQuery>) -> Result<Json<Vec<Business>>, JsonApiError> {
    let filter = BusinessFilter {
        category_id: q.category_id,
        city: q.city,
        state: q.state,
        is_verified: q.is_verified,
        is_paid: q.is_paid,
        is_active: Some(true),
        ..Default::default()
    };
    Ok(Json(state.services.businesses.list(&filter).await?))
}

#[utoipa::path(get, path = "/api/businesses/featured", tag = "businesses", params(ListingQuery), responses((status = 200, description = "Paid, active listings")))]
pub async fn featured(State(state): State<ServerState>, Query(q): Query<ListingQuery>) -> Result<Json<Vec<Business>>, JsonApiError> {
    Ok(Json(state.services.businesses.featured(q.limit).await?))
}

#[utoipa::path(get, path = "/api/businesses/trending", tag = "businesses", params(ListingQuery), responses((status = 200, description = "Most liked first")))]
pub async fn trending(State(state): State<ServerState>, Query(q): Query<ListingQuery>) -> Result<Json<Vec<Business>>, JsonApiError> {
    Ok(Json(state.services.businesses.trending(q.limit).await?))
}

#[utoipa::path(get, path = "/api/businesses/recent", tag = "businesses", params(ListingQuery), responses((status = 200, description = "Newest first")))]
pub async fn recent(State(state): State<ServerState>, Query(q): Query<ListingQuery>) -> Result<Json<Vec<Business>>, JsonApiError> {
    Ok(Json(state.services.businesses.recent(q.limit).await?))
}

#[utoipa::path(get, path = "/api/businesses/search", tag = "businesses", params(SearchQuery), responses((status = 200, description = "Matches"), (status = 400, description = "Missing query")))]
pub async fn search(State(state): State<ServerState>, Query(q): Query<SearchQuery>) -> Result<Json<Vec<Business>>, JsonApiError> {
    let query = q.q.unwrap_or_default();
    Ok(Json(state.services.businesses.search(&query).await?))
}

#[utoipa::path(get, path = "/api/businesses/category/{id}", tag = "businesses", params(("id" = i32, Path, description = "Category id")), responses((status = 200, description = "Active listings in the category")))]
pub async fn by_category(State(state): State<ServerState>, Path(id): Path<i32>) -> Result<Json<Vec<Business>>, JsonApiError> {
    Ok(Json(state.services.businesses.by_category(id).await?))
}

#[utoipa::path(get, path = "/api/businesses/{id}", tag = "businesses", params(("id" = i32, Path, description = "Business id")), responses((status = 200, description = "Listing"), (status = 404, description = "Not found")))]
pub async fn get(State(state): State<ServerState>, Path(id): Path<i32>) -> Result<Json<Business>, JsonApiError> {
    Ok(Json(state.services.businesses.get(id).await?))
}

#[utoipa::path(get, path = "/api/users/{id}/businesses", tag = "businesses", params(("id" = i32, Path, description = "User id")), responses((status = 200, description = "Listings owned by the user"), (status = 403, description = "Not the user")))]
pub async fn owned_by(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Path(user_id): Path<i32>,
) -> Result<Json<Vec<Business>>, JsonApiError> {
    Ok(Json(state.services.businesses.owned_by(actor, user_id).await?))
}

#[utoipa::path(post, path = "/api/businesses", tag = "businesses", request_body = crate::openapi::BusinessRequest, responses((status = 201, description = "Created"), (status = 400, description = "Validation error"), (status = 401, description = "Not signed in")))]
pub async fn create(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Json(input): Json<CreateBusinessInput>,
) -> Result<(StatusCode, Json<Business>), JsonApiError> {
    let b = state.services.businesses.create(actor, input).await?;
    Ok((StatusCode::CREATED, Json(b)))
}

#[utoipa::path(put, path = "/api/businesses/{id}", tag = "businesses", params(("id" = i32, Path, description = "Business id")), request_body = crate::openapi::BusinessRequest, responses((status = 200, description = "Updated"), (status = 403, description = "Not the owner"), (status = 404, description = "Not found")))]
pub async fn update(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<i32>,
    Json(input): Json<UpdateBusinessInput>,
) -> Result<Json<Business>, JsonApiError> {
    Ok(Json(state.services.businesses.update(actor, id, input).await?))
}

#[utoipa::path(delete, path = "/api/businesses/{id}", tag = "businesses", params(("id" = i32, Path, description = "Business id")), responses((status = 200, description = "Deactivated"), (status = 403, description = "Not the owner"), (status = 404, description = "Not found")))]
pub async fn delete(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<i32>,
) -> Result<Json<MessageBody>, JsonApiError> {
    state.services.businesses.delete(actor, id).await?;
    info!(business_id = id, "business_delete_request");
    Ok(Json(MessageBody::new("Business deleted successfully")))
}
