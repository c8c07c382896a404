use std::sync::Arc;

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header as JwtHeader, Validation};
use tracing::{debug, info, instrument};

use super::domain::{AuthSession, Claims, LoginInput, RegisterInput};
use super::errors::AuthError;
use super::hasher::CredentialHasher;
use crate::domain::{validate_registration, NewUser, User, UserPatch};
use crate::services::Actor;
use crate::storage::Storage;

/// Token signing configuration
#[derive(Clone)]
pub struct TokenConfig {
    pub jwt_secret: String,
    pub ttl_hours: i64,
}

impl From<&configs::AuthConfig> for TokenConfig {
    fn from(c: &configs::AuthConfig) -> Self {
        Self { jwt_secret: c.jwt_secret.clone(), ttl_hours: c.token_ttl_hours }
    }
}

/// Auth business service independent of web framework
pub struct AuthService {
    store: Arc<dyn Storage>,
    hasher: Arc<dyn CredentialHasher>,
    cfg: TokenConfig,
}

impl AuthService {
    pub fn new(store: Arc<dyn Storage>, hasher: Arc<dyn CredentialHasher>, cfg: TokenConfig) -> Self {
        Self { store, hasher, cfg }
    }

    /// Register a new user with a hashed password and return a signed-in session.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::auth::{AuthService, Argon2Hasher, TokenConfig, domain::RegisterInput};
    /// use service::storage::MemStorage;
    /// let svc = AuthService::new(
    ///     Arc::new(MemStorage::new()),
    ///     Arc::new(Argon2Hasher),
    ///     TokenConfig { jwt_secret: "secret".into(), ttl_hours: 1 },
    /// );
    /// let input = RegisterInput {
    ///     username: "alice".into(),
    ///     email: "alice@example.com".into(),
    ///     password: "Secret123".into(),
    ///     ..Default::default()
    /// };
    /// let session = tokio_test::block_on(svc.register(input)).unwrap();
    /// assert_eq!(session.user.username, "alice");
    /// assert!(!session.token.is_empty());
    /// ```
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn register(&self, input: RegisterInput) -> Result<AuthSession, AuthError> {
        validate_registration(&input.username, &input.email, &input.password)?;
        if self.store.get_user_by_username(&input.username).await?.is_some() {
            debug!("username taken");
            return Err(AuthError::Conflict("Username already exists".into()));
        }
        if self.store.get_user_by_email(&input.email).await?.is_some() {
            debug!("email taken");
            return Err(AuthError::Conflict("Email already exists".into()));
        }

        let password = self.hasher.hash(&input.password)?;
        let user = self
            .store
            .create_user(NewUser {
                username: input.username,
                email: input.email,
                password,
                name: input.name,
                avatar: input.avatar,
            })
            .await?;
        info!(user_id = user.id, username = %user.username, "user_registered");
        let token = self.issue_token(&user)?;
        Ok(AuthSession { user, token })
    }

    /// Authenticate by username and password. Unknown user and wrong password
    /// fail the same way.
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        if input.username.trim().is_empty() || input.password.is_empty() {
            return Err(AuthError::Validation("username and password are required".into()));
        }
        let user = self
            .store
            .get_user_by_username(&input.username)
            .await?
            .ok_or(AuthError::Unauthorized)?;
        if !self.hasher.verify(&user.password, &input.password) {
            debug!(user_id = user.id, "password mismatch");
            return Err(AuthError::Unauthorized);
        }
        info!(user_id = user.id, "user_logged_in");
        let token = self.issue_token(&user)?;
        Ok(AuthSession { user, token })
    }

    pub fn issue_token(&self, user: &User) -> Result<String, AuthError> {
        let exp = (chrono::Utc::now() + chrono::Duration::hours(self.cfg.ttl_hours)).timestamp() as usize;
        let claims = Claims { sub: user.id.to_string(), username: user.username.clone(), exp };
        encode(&JwtHeader::default(), &claims, &EncodingKey::from_secret(self.cfg.jwt_secret.as_bytes()))
            .map_err(|e| AuthError::TokenError(e.to_string()))
    }

    /// Resolves a bearer token to the acting user. Any defect is `Unauthorized`.
    pub fn verify_token(&self, token: &str) -> Result<Actor, AuthError> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.cfg.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| AuthError::Unauthorized)?;
        let user_id = data.claims.sub.parse::<i32>().map_err(|_| AuthError::Unauthorized)?;
        Ok(Actor { user_id })
    }

    pub async fn me(&self, actor: Actor) -> Result<User, AuthError> {
        self.store.get_user(actor.user_id).await?.ok_or(AuthError::NotFound)
    }

    #[instrument(skip(self, patch), fields(user_id = actor.user_id))]
    pub async fn update_profile(&self, actor: Actor, patch: UserPatch) -> Result<User, AuthError> {
        self.store.update_user(actor.user_id, patch).await?.ok_or(AuthError::NotFound)
    }
}
