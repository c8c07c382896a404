use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::info;

use service::auth::domain::{AuthSession, LoginInput, RegisterInput};
use service::domain::{User, UserPatch};
use service::Services;

use crate::auth::{CurrentActor, AUTH_COOKIE};
use crate::errors::JsonApiError;

#[derive(Clone)]
pub struct ServerState {
    pub services: Services,
    pub secure_cookies: bool,
}

fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::new(AUTH_COOKIE, token);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_secure(secure);
    cookie.set_same_site(SameSite::Lax);
    cookie
}

#[utoipa::path(post, path = "/api/register", tag = "auth", request_body = crate::openapi::RegisterRequest, responses((status = 201, description = "Registered and signed in"), (status = 400, description = "Validation error or duplicate username/email")))]
pub async fn register(
    State(state): State<ServerState>,
    jar: CookieJar,
    Json(input): Json<RegisterInput>,
) -> Result<(StatusCode, CookieJar, Json<AuthSession>), JsonApiError> {
    let session = state.services.auth.register(input).await?;
    let jar = jar.add(session_cookie(session.token.clone(), state.secure_cookies));
    Ok((StatusCode::CREATED, jar, Json(session)))
}

#[utoipa::path(post, path = "/api/login", tag = "auth", request_body = crate::openapi::LoginRequest, responses((status = 200, description = "Signed in"), (status = 401, description = "Invalid credentials")))]
pub async fn login(
    State(state): State<ServerState>,
    jar: CookieJar,
    Json(input): Json<LoginInput>,
) -> Result<(CookieJar, Json<AuthSession>), JsonApiError> {
    let session = state.services.auth.login(input).await?;
    let jar = jar.add(session_cookie(session.token.clone(), state.secure_cookies));
    Ok((jar, Json(session)))
}

#[utoipa::path(post, path = "/api/logout", tag = "auth", responses((status = 200, description = "Signed out")))]
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<common::types::MessageBody>) {
    let jar = jar.remove(Cookie::build(AUTH_COOKIE).path("/"));
    (jar, Json(common::types::MessageBody::new("Logged out successfully")))
}

#[utoipa::path(get, path = "/api/me", tag = "auth", responses((status = 200, description = "Current user"), (status = 401, description = "Not signed in")))]
pub async fn me(State(state): State<ServerState>, CurrentActor(actor): CurrentActor) -> Result<Json<User>, JsonApiError> {
    Ok(Json(state.services.auth.me(actor).await?))
}

#[utoipa::path(patch, path = "/api/me", tag = "auth", request_body = crate::openapi::ProfilePatch, responses((status = 200, description = "Profile updated"), (status = 401, description = "Not signed in")))]
pub async fn update_me(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Json(patch): Json<UserPatch>,
) -> Result<Json<User>, JsonApiError> {
    let user = state.services.auth.update_profile(actor, patch).await?;
    info!(user_id = user.id, "profile_updated");
    Ok(Json(user))
}
