use axum::{
    routing::{get, patch, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;

use crate::openapi::ApiDoc;

pub mod auth;
pub mod businesses;
pub mod categories;
pub mod engagement;
pub mod messages;
pub mod notifications;
pub mod subscriptions;

use auth::ServerState;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "Service is up")))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the full application router: public reads, signed-in mutations, docs.
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    let account = Router::new()
        .route("/api/register", post(auth::register))
        .route("/api/login", post(auth::login))
        .route("/api/logout", post(auth::logout))
        .route("/api/me", get(auth::me).patch(auth::update_me));

    let directory = Router::new()
        .route("/api/categories", get(categories::list))
        .route("/api/categories/:id", get(categories::get))
        .route("/api/businesses", get(businesses::list).post(businesses::create))
        .route("/api/businesses/featured", get(businesses::featured))
        .route("/api/businesses/trending", get(businesses::trending))
        .route("/api/businesses/recent", get(businesses::recent))
        .route("/api/businesses/search", get(businesses::search))
        .route("/api/businesses/category/:id", get(businesses::by_category))
        .route(
            "/api/businesses/:id",
            get(businesses::get).put(businesses::update).delete(businesses::delete),
        )
        .route("/api/users/:id/businesses", get(businesses::owned_by));

    let engagement = Router::new()
        .route("/api/businesses/:id/like", post(engagement::like).delete(engagement::unlike))
        .route("/api/businesses/:id/likes", get(engagement::likes))
        .route(
            "/api/businesses/:id/comments",
            get(engagement::comments).post(engagement::comment),
        )
        .route("/api/users/:id/likes", get(engagement::liked_by));

    let messaging = Router::new()
        .route("/api/messages", get(messages::inbox).post(messages::send))
        .route("/api/messages/:id/read", patch(messages::mark_read))
        .route("/api/businesses/:id/messages", get(messages::for_business))
        .route(
            "/api/conversations/:business_id/:other_user_id",
            get(messages::conversation),
        )
        .route("/api/notifications", get(notifications::list))
        .route("/api/notifications/unread-count", get(notifications::unread_count))
        .route("/api/notifications/mark-all-read", patch(notifications::mark_all_read))
        .route("/api/notifications/:id/read", patch(notifications::mark_read));

    let billing = Router::new()
        .route("/api/create-subscription", post(subscriptions::checkout))
        .route("/api/subscription/verify", post(subscriptions::verify))
        .route("/api/subscription/activate-demo", post(subscriptions::activate_demo))
        .route("/api/subscription/cancel", post(subscriptions::cancel))
        .route("/api/businesses/:id/subscription", get(subscriptions::current));

    Router::new()
        .route("/health", get(health))
        .merge(account)
        .merge(directory)
        .merge(engagement)
        .merge(messaging)
        .merge(billing)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
