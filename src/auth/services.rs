pub(crate) use crate::auth::dto::{Claims, JwtKeys, TokenKind};
use crate::config::JwtConfig;
use crate::error::ApiError;
use crate::state::AppState;
use argon2::{password_hash::SaltString, Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use axum::{async_trait, extract::{FromRef, FromRequestParts}, http::request::Parts};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use lazy_static::lazy_static;
use rand::rngs::OsRng;
use regex::Regex;
use std::time::Duration;
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::{debug, error, warn};
use uuid::Uuid;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex =
            Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex compiles");
    }
    EMAIL_RE.is_match(email)
}

/// Argon2id PHC string for a user's password, salted per call.
pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| anyhow::anyhow!("hashing user password: {e}"))
}

/// `Ok(false)` on a mismatch; `Err` only when the stored hash is unusable.
pub fn verify_password(password: &str, stored_hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(stored_hash).map_err(|e| {
        error!(error = %e, "stored password hash is not a PHC string");
        anyhow::anyhow!("stored password hash is unreadable: {e}")
    })?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(anyhow::anyhow!("verifying user password: {e}")),
    }
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        let JwtConfig {
            secret,
            issuer,
            audience,
            ttl_minutes,
            refresh_ttl_minutes,
        } = state.config.jwt.clone();
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
            audience,
            access_ttl: Duration::from_secs(ttl_minutes.max(0) as u64 * 60),
            refresh_ttl: Duration::from_secs(refresh_ttl_minutes.max(0) as u64 * 60),
        }
    }
}

impl JwtKeys {
    fn sign_with_kind(&self, user_id: Uuid, staff: bool, kind: TokenKind) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };
        let exp = now + TimeDuration::seconds(ttl.as_secs() as i64);
        let claims = Claims {
            sub: user_id,
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            kind,
            staff,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = %user_id, kind = ?kind, "jwt signed");
        Ok(token)
    }

    pub fn sign_access(&self, user_id: Uuid, staff: bool) -> anyhow::Result<String> {
        self.sign_with_kind(user_id, staff, TokenKind::Access)
    }
    pub fn sign_refresh(&self, user_id: Uuid, staff: bool) -> anyhow::Result<String> {
        self.sign_with_kind(user_id, staff, TokenKind::Refresh)
    }

    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        debug!(user_id = %data.claims.sub, kind = ?data.claims.kind, "jwt verified");
        Ok(data.claims)
    }

    pub fn verify_refresh(&self, token: &str) -> anyhow::Result<Claims> {
        let claims = self.verify(token)?;
        if claims.kind != TokenKind::Refresh {
            anyhow::bail!("not a refresh token");
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod password_tests {
    use super::*;
    use crate::error::ApiError;
    use crate::store::{MemoryStore, Store};
    use crate::users::dto::CreateUserRequest;
    use crate::users::repo_types::UserChanges;
    use crate::users::services::UserManager;
    use std::sync::Arc;

    #[test]
    fn stored_hashes_are_salted_argon2id() {
        let first = hash_password("meal-prep-sunday").unwrap();
        let second = hash_password("meal-prep-sunday").unwrap();
        assert!(first.starts_with("$argon2id$"));
        assert_ne!(first, second);
        assert!(verify_password("meal-prep-sunday", &second).unwrap());
        assert!(!verify_password("meal-prep-monday", &first).unwrap());
    }

    #[test]
    fn plain_text_in_the_hash_column_is_an_error() {
        assert!(verify_password("meal-prep-sunday", "meal-prep-sunday").is_err());
    }

    #[tokio::test]
    async fn account_password_checks_use_the_stored_hash() {
        let store = Arc::new(MemoryStore::new());
        let users = UserManager::new(store.clone());
        let user = users
            .create(
                CreateUserRequest {
                    username: "planner".into(),
                    email: "planner@example.com".into(),
                    password: "meal-prep-sunday".into(),
                    weight: None,
                    height: None,
                    age: None,
                    diet_type_id: None,
                },
                false,
            )
            .await
            .unwrap();
        let stored = store.get_user(user.id).await.unwrap().unwrap();
        assert!(verify_password("meal-prep-sunday", &stored.password_hash).unwrap());
        assert_eq!(users.verify_password(user.id, "meal-prep-sunday").await.unwrap(), Some(true));

        store
            .update_user(
                user.id,
                UserChanges {
                    password_hash: Some("not-a-phc-string".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let err = users.verify_password(user.id, "meal-prep-sunday").await.unwrap_err();
        assert!(matches!(err, ApiError::Internal(_)));
    }

    #[test]
    fn email_shape_check() {
        assert!(is_valid_email("cook@example.com"));
        assert!(!is_valid_email("cook@example"));
        assert!(!is_valid_email("no at sign.com"));
    }
}

/// Authenticated caller, taken from a `Bearer` access token.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub is_staff: bool,
}

impl AuthUser {
    /// Staff may act on anyone's records; everybody else only on their own.
    pub fn ensure_can_act_for(&self, owner_id: Uuid) -> Result<(), ApiError> {
        if self.is_staff || self.user_id == owner_id {
            Ok(())
        } else {
            warn!(user_id = %self.user_id, %owner_id, "ownership check failed");
            Err(ApiError::forbidden())
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .or_else(|| auth_header.strip_prefix("bearer "))
            .ok_or_else(|| ApiError::Unauthorized("Invalid Authorization header".to_string()))?;

        let claims = match keys.verify(token) {
            Ok(c) => c,
            Err(_) => {
                warn!("invalid or expired token");
                return Err(ApiError::Unauthorized("Invalid or expired token".to_string()));
            }
        };

        if claims.kind != TokenKind::Access {
            return Err(ApiError::Unauthorized("Access token required".to_string()));
        }

        Ok(AuthUser {
            user_id: claims.sub,
            is_staff: claims.staff,
        })
    }
}

#[cfg(test)]
mod jwt_tests {
    use super::*;
    use crate::config::AppConfig;
    use std::sync::Arc;

    fn make_keys() -> JwtKeys {
        let state = AppState::fake();
        JwtKeys::from_ref(&state)
    }

    #[tokio::test]
    async fn sign_and_verify_access_token() {
        let keys = make_keys();
        let user_id = Uuid::new_v4();
        let token = keys.sign_access(user_id, false).expect("sign access");
        let claims = keys.verify(&token).expect("verify token");
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.iss, "test-issuer");
        assert_eq!(claims.aud, "test-aud");
        assert_eq!(claims.kind, TokenKind::Access);
        assert!(!claims.staff);
    }

    #[tokio::test]
    async fn sign_and_verify_refresh_token_and_verify_refresh() {
        let keys = make_keys();
        let user_id = Uuid::new_v4();
        let token = keys.sign_refresh(user_id, true).expect("sign refresh");
        let claims = keys.verify_refresh(&token).expect("verify refresh");
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.kind, TokenKind::Refresh);
        assert!(claims.staff);
    }

    #[tokio::test]
    async fn verify_refresh_rejects_access_token() {
        let keys = make_keys();
        let token = keys.sign_access(Uuid::new_v4(), false).expect("sign access");
        let err = keys.verify_refresh(&token).unwrap_err();
        assert!(err.to_string().contains("not a refresh token"));
    }

    #[tokio::test]
    async fn verify_rejects_wrong_issuer_or_audience() {
        let good_keys = make_keys();
        let mut other = AppState::fake();
        let mut config = AppConfig::clone(&other.config);
        config.jwt.issuer = "bad-iss".into();
        config.jwt.audience = "bad-aud".into();
        other.config = Arc::new(config);
        let bad_keys = JwtKeys::from_ref(&other);

        let token = good_keys.sign_access(Uuid::new_v4(), false).expect("sign access");
        assert!(bad_keys.verify(&token).is_err());
    }

    #[test]
    fn ownership_check() {
        let owner = Uuid::new_v4();
        let me = AuthUser { user_id: owner, is_staff: false };
        let stranger = AuthUser { user_id: Uuid::new_v4(), is_staff: false };
        let staff = AuthUser { user_id: Uuid::new_v4(), is_staff: true };
        assert!(me.ensure_can_act_for(owner).is_ok());
        assert!(staff.ensure_can_act_for(owner).is_ok());
        assert!(matches!(
            stranger.ensure_can_act_for(owner),
            Err(ApiError::Forbidden(_))
        ));
    }
}
