use axum::{
    extract::{Path, State},
    Json,
};

use common::types::{CountBody, MessageBody};
use service::domain::Notification;

use crate::auth::CurrentActor;
use crate::errors::JsonApiError;
use crate::routes::auth::ServerState;

#[utoipa::path(get, path = "/api/notifications", tag = "notifications", responses((status = 200, description = "Newest first")))]
pub async fn list(State(state): State<ServerState>, CurrentActor(actor): CurrentActor) -> Result<Json<Vec<Notification>>, JsonApiError> {
    Ok(Json(state.services.notifications.list(actor).await?))
}

#[utoipa::path(get, path = "/api/notifications/unread-count", tag = "notifications", responses((status = 200, description = "`{ count }`")))]
pub async fn unread_count(State(state): State<ServerState>, CurrentActor(actor): CurrentActor) -> Result<Json<CountBody>, JsonApiError> {
    let count = state.services.notifications.unread_count(actor).await?;
    Ok(Json(CountBody { count }))
}

#[utoipa::path(patch, path = "/api/notifications/{id}/read", tag = "notifications", params(("id" = i32, Path, description = "Notification id")), responses((status = 200, description = "Marked read"), (status = 403, description = "Not the recipient"), (status = 404, description = "Not found")))]
pub async fn mark_read(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<i32>,
) -> Result<Json<Notification>, JsonApiError> {
    Ok(Json(state.services.notifications.mark_read(actor, id).await?))
}

#[utoipa::path(patch, path = "/api/notifications/mark-all-read", tag = "notifications", responses((status = 200, description = "All marked read")))]
pub async fn mark_all_read(State(state): State<ServerState>, CurrentActor(actor): CurrentActor) -> Result<Json<MessageBody>, JsonApiError> {
    state.services.notifications.mark_all_read(actor).await?;
    Ok(Json(MessageBody::new("All notifications marked as read")))
}
