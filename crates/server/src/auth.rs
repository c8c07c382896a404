//! Resolves the acting user from `Authorization: Bearer <token>`, falling back
//! to the `auth_token` cookie.
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::header;
use axum_extra::extract::cookie::CookieJar;

use service::Actor;

use crate::errors::JsonApiError;
use crate::routes::auth::ServerState;

pub const AUTH_COOKIE: &str = "auth_token";

/// Extractor for handlers that require a signed-in user.
#[derive(Debug, Clone, Copy)]
pub struct CurrentActor(pub Actor);

fn bearer_or_cookie(parts: &Parts) -> Result<Option<String>, JsonApiError> {
    if let Some(h) = parts.headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        let Some(token) = h.strip_prefix("Bearer ") else {
            tracing::warn!(path = %parts.uri.path(), "invalid Authorization format (expect Bearer)");
            return Err(JsonApiError::unauthenticated());
        };
        return Ok(Some(token.trim().to_string()));
    }
    let jar = CookieJar::from_headers(&parts.headers);
    Ok(jar.get(AUTH_COOKIE).map(|c| c.value().to_string()).filter(|t| !t.is_empty()))
}

#[axum::async_trait]
impl FromRequestParts<ServerState> for CurrentActor {
    type Rejection = JsonApiError;

    async fn from_request_parts(parts: &mut Parts, state: &ServerState) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_or_cookie(parts)? else {
            return Err(JsonApiError::unauthenticated());
        };
        match state.services.auth.verify_token(&token) {
            Ok(actor) => Ok(CurrentActor(actor)),
            Err(e) => {
                tracing::warn!(path = %parts.uri.path(), err = %e, "token validation failed");
                Err(JsonApiError::unauthenticated())
            }
        }
    }
}
