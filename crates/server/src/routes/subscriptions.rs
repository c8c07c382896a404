use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;

use service::domain::Subscription;
use service::services::subscriptions::{Checkout, Verified};

use crate::auth::CurrentActor;
use crate::errors::JsonApiError;
use crate::routes::auth::ServerState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessRef {
    pub business_id: Option<i32>,
}

impl BusinessRef {
    fn id(&self) -> Result<i32, JsonApiError> {
        self.business_id.ok_or_else(|| JsonApiError::bad_request("businessId: required"))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRef {
    #[serde(default)]
    pub order_id: String,
}

#[utoipa::path(post, path = "/api/create-subscription", tag = "subscriptions", request_body = crate::openapi::BusinessRefDoc, responses((status = 200, description = "Order created; approve at `approvalUrl`"), (status = 400, description = "Already subscribed"), (status = 403, description = "Not the owner"), (status = 502, description = "Payment provider failure")))]
pub async fn checkout(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Json(body): Json<BusinessRef>,
) -> Result<Json<Checkout>, JsonApiError> {
    Ok(Json(state.services.subscriptions.checkout(actor, body.id()?).await?))
}

#[utoipa::path(post, path = "/api/subscription/verify", tag = "subscriptions", request_body = crate::openapi::OrderRefDoc, responses((status = 200, description = "Payment captured, listing active"), (status = 400, description = "Order not approved"), (status = 404, description = "No subscription for the order")))]
pub async fn verify(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Json(body): Json<OrderRef>,
) -> Result<Json<Verified>, JsonApiError> {
    Ok(Json(state.services.subscriptions.verify(actor, &body.order_id).await?))
}

#[utoipa::path(post, path = "/api/subscription/activate-demo", tag = "subscriptions", request_body = crate::openapi::BusinessRefDoc, responses((status = 200, description = "Subscription active"), (status = 403, description = "Not the owner")))]
pub async fn activate_demo(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Json(body): Json<BusinessRef>,
) -> Result<Json<Subscription>, JsonApiError> {
    Ok(Json(state.services.subscriptions.activate_demo(actor, body.id()?).await?))
}

#[utoipa::path(post, path = "/api/subscription/cancel", tag = "subscriptions", request_body = crate::openapi::BusinessRefDoc, responses((status = 200, description = "Subscription canceled"), (status = 404, description = "No live subscription")))]
pub async fn cancel(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Json(body): Json<BusinessRef>,
) -> Result<Json<Subscription>, JsonApiError> {
    Ok(Json(state.services.subscriptions.cancel(actor, body.id()?).await?))
}

#[utoipa::path(get, path = "/api/businesses/{id}/subscription", tag = "subscriptions", params(("id" = i32, Path, description = "Business id")), responses((status = 200, description = "Active subscription, else the latest one, or null"), (status = 403, description = "Not the owner")))]
pub async fn current(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<i32>,
) -> Result<Json<Option<Subscription>>, JsonApiError> {
    Ok(Json(state.services.subscriptions.current(actor, id).await?))
}
