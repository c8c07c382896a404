use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use service::domain::{Message, SendMessageInput};

use crate::auth::CurrentActor;
use crate::errors::JsonApiError;
use crate::routes::auth::ServerState;

#[utoipa::path(get, path = "/api/messages", tag = "messages", responses((status = 200, description = "Messages sent or received by the caller")))]
pub async fn inbox(State(state): State<ServerState>, CurrentActor(actor): CurrentActor) -> Result<Json<Vec<Message>>, JsonApiError> {
    Ok(Json(state.services.messaging.inbox(actor).await?))
}

#[utoipa::path(get, path = "/api/businesses/{id}/messages", tag = "messages", params(("id" = i32, Path, description = "Business id")), responses((status = 200, description = "Messages about the business"), (status = 403, description = "Not the owner")))]
pub async fn for_business(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<i32>,
) -> Result<Json<Vec<Message>>, JsonApiError> {
    Ok(Json(state.services.messaging.business_messages(actor, id).await?))
}

#[utoipa::path(get, path = "/api/conversations/{business_id}/{other_user_id}", tag = "messages", params(("business_id" = i32, Path, description = "Business id"), ("other_user_id" = i32, Path, description = "Other participant")), responses((status = 200, description = "Conversation, oldest first"), (status = 403, description = "Not a participant")))]
pub async fn conversation(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Path((business_id, other_user_id)): Path<(i32, i32)>,
) -> Result<Json<Vec<Message>>, JsonApiError> {
    Ok(Json(state.services.messaging.conversation(actor, business_id, other_user_id).await?))
}

#[utoipa::path(post, path = "/api/messages", tag = "messages", request_body = crate::openapi::MessageRequest, responses((status = 201, description = "Sent"), (status = 400, description = "Validation error"), (status = 404, description = "Business or receiver not found")))]
pub async fn send(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Json(input): Json<SendMessageInput>,
) -> Result<(StatusCode, Json<Message>), JsonApiError> {
    let msg = state.services.messaging.send(actor, input).await?;
    Ok((StatusCode::CREATED, Json(msg)))
}

#[utoipa::path(patch, path = "/api/messages/{id}/read", tag = "messages", params(("id" = i32, Path, description = "Message id")), responses((status = 200, description = "Marked read"), (status = 403, description = "Not the receiver")))]
pub async fn mark_read(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<i32>,
) -> Result<Json<Message>, JsonApiError> {
    Ok(Json(state.services.messaging.mark_read(actor, id).await?))
}
