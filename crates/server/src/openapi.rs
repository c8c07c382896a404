//! OpenAPI document served at `/api-docs/openapi.json` (Swagger UI at `/docs`).
//! Request schemas are documentation mirrors of the service input types.
use serde::Serialize;
use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(ToSchema)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub name: Option<String>,
    pub avatar: Option<String>,
}

#[derive(ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(ToSchema)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BusinessRequest {
    pub name: String,
    pub description: String,
    pub category_id: i32,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub image: Option<String>,
}

#[derive(ToSchema)]
pub struct CommentRequest {
    pub content: String,
    /// 1 to 5
    pub rating: Option<i32>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessageRequest {
    pub receiver_id: i32,
    pub business_id: i32,
    pub content: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BusinessRefDoc {
    pub business_id: i32,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderRefDoc {
    pub order_id: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::auth::logout,
        crate::routes::auth::me,
        crate::routes::auth::update_me,
        crate::routes::categories::list,
        crate::routes::categories::get,
        crate::routes::businesses::list,
        crate::routes::businesses::featured,
        crate::routes::businesses::trending,
        crate::routes::businesses::recent,
        crate::routes::businesses::search,
        crate::routes::businesses::by_category,
        crate::routes::businesses::get,
        crate::routes::businesses::owned_by,
        crate::routes::businesses::create,
        crate::routes::businesses::update,
        crate::routes::businesses::delete,
        crate::routes::engagement::like,
        crate::routes::engagement::unlike,
        crate::routes::engagement::likes,
        crate::routes::engagement::liked_by,
        crate::routes::engagement::comments,
        crate::routes::engagement::comment,
        crate::routes::messages::inbox,
        crate::routes::messages::for_business,
        crate::routes::messages::conversation,
        crate::routes::messages::send,
        crate::routes::messages::mark_read,
        crate::routes::notifications::list,
        crate::routes::notifications::unread_count,
        crate::routes::notifications::mark_read,
        crate::routes::notifications::mark_all_read,
        crate::routes::subscriptions::checkout,
        crate::routes::subscriptions::verify,
        crate::routes::subscriptions::activate_demo,
        crate::routes::subscriptions::cancel,
        crate::routes::subscriptions::current,
    ),
    components(
        schemas(
            HealthResponse,
            RegisterRequest,
            LoginRequest,
            ProfilePatch,
            BusinessRequest,
            CommentRequest,
            MessageRequest,
            BusinessRefDoc,
            OrderRefDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "categories"),
        (name = "businesses"),
        (name = "engagement"),
        (name = "messages"),
        (name = "notifications"),
        (name = "subscriptions")
    )
)]
pub struct ApiDoc;
