use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use common::types::MessageBody;
use service::domain::{Business, BusinessComment, BusinessLike, CommentInput};

use crate::auth::CurrentActor;
use crate::errors::JsonApiError;
use crate::routes::auth::ServerState;

#[utoipa::path(post, path = "/api/businesses/{id}/like", tag = "engagement", params(("id" = i32, Path, description = "Business id")), responses((status = 201, description = "Liked"), (status = 400, description = "Already liked"), (status = 404, description = "Business not found")))]
pub async fn like(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<i32>,
) -> Result<(StatusCode, Json<BusinessLike>), JsonApiError> {
    let like = state.services.engagement.like(actor, id).await?;
    Ok((StatusCode::CREATED, Json(like)))
}

#[utoipa::path(delete, path = "/api/businesses/{id}/like", tag = "engagement", params(("id" = i32, Path, description = "Business id")), responses((status = 200, description = "Unliked"), (status = 404, description = "Like not found")))]
pub async fn unlike(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<i32>,
) -> Result<Json<MessageBody>, JsonApiError> {
    state.services.engagement.unlike(actor, id).await?;
    Ok(Json(MessageBody::new("Like removed successfully")))
}

#[utoipa::path(get, path = "/api/businesses/{id}/likes", tag = "engagement", params(("id" = i32, Path, description = "Business id")), responses((status = 200, description = "Likes of the business")))]
pub async fn likes(State(state): State<ServerState>, Path(id): Path<i32>) -> Result<Json<Vec<BusinessLike>>, JsonApiError> {
    Ok(Json(state.services.engagement.likes_of(id).await?))
}

#[utoipa::path(get, path = "/api/users/{id}/likes", tag = "engagement", params(("id" = i32, Path, description = "User id")), responses((status = 200, description = "Businesses the user liked"), (status = 403, description = "Not the user")))]
pub async fn liked_by(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Path(user_id): Path<i32>,
) -> Result<Json<Vec<Business>>, JsonApiError> {
    Ok(Json(state.services.engagement.liked_businesses(actor, user_id).await?))
}

#[utoipa::path(get, path = "/api/businesses/{id}/comments", tag = "engagement", params(("id" = i32, Path, description = "Business id")), responses((status = 200, description = "Comments, newest first")))]
pub async fn comments(State(state): State<ServerState>, Path(id): Path<i32>) -> Result<Json<Vec<BusinessComment>>, JsonApiError> {
    Ok(Json(state.services.engagement.comments_of(id).await?))
}

#[utoipa::path(post, path = "/api/businesses/{id}/comments", tag = "engagement", params(("id" = i32, Path, description = "Business id")), request_body = crate::openapi::CommentRequest, responses((status = 201, description = "Comment added"), (status = 400, description = "Validation error"), (status = 404, description = "Business not found")))]
pub async fn comment(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<i32>,
    Json(input): Json<CommentInput>,
) -> Result<(StatusCode, Json<BusinessComment>), JsonApiError> {
    let comment = state.services.engagement.comment(actor, id, input).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}
