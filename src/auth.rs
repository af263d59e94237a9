//! Bearer tokens, password hashing and the authenticated-caller extractor.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use chrono::{Duration, Utc};
use domain::authz::{Actor, require_role};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind};
use model::entities::user::{self, Role};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::error::{ApiError, ApiResult};
use crate::schemas::AppState;

/// Token payload. The role is trusted as issued until the token expires.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

pub fn issue_token(user: &user::Model, config: &AppConfig) -> ApiResult<String> {
    let now = Utc::now();
    let claims = Claims {
        sub: user.id,
        email: user.email.clone(),
        role: user.role,
        exp: (now + Duration::hours(config.jwt_expiry_hours)).timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(format!("sign token: {e}")))
}

pub fn verify_token(token: &str, secret: &str) -> ApiResult<Claims> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => ApiError::Unauthorized("Token has expired".to_string()),
        ErrorKind::InvalidToken
        | ErrorKind::InvalidSignature
        | ErrorKind::InvalidAlgorithm
        | ErrorKind::Base64(_)
        | ErrorKind::Json(_)
        | ErrorKind::Utf8(_) => ApiError::Unauthorized("Invalid token".to_string()),
        _ => ApiError::Internal(format!("verify token: {e}")),
    })?;
    Ok(data.claims)
}

pub fn hash_password(password: &str) -> ApiResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ApiError::Internal(format!("hash password: {e}")))?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> ApiResult<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| ApiError::Internal(format!("parse hash: {e}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// The caller behind a valid `Authorization: Bearer` header.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Claims);

impl CurrentUser {
    pub fn id(&self) -> Uuid {
        self.0.sub
    }

    pub fn actor(&self) -> Actor {
        Actor::new(self.0.sub, self.0.role)
    }

    /// Fails with 403 unless the caller holds one of `roles`.
    pub fn require(&self, roles: &[Role]) -> ApiResult<Actor> {
        let actor = self.actor();
        require_role(&actor, roles)?;
        Ok(actor)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        trace!("Authenticating request");

        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| {
                debug!("No authorization header");
                ApiError::Unauthorized("Authentication required".to_string())
            })?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::Unauthorized("Expected a bearer token".to_string()))?;

        let claims = verify_token(token.trim(), &state.config.jwt_secret).inspect_err(|e| {
            warn!("Rejected bearer token: {}", e);
        })?;
        debug!(user_id = %claims.sub, role = ?claims.role, "Request authenticated");
        Ok(CurrentUser(claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_utils::test_config;
    use model::entities::user::{AccountStatus, VerificationStatus};

    fn sample_user(role: Role) -> user::Model {
        let now = Utc::now();
        user::Model {
            id: Uuid::new_v4(),
            username: None,
            full_name: "Token Holder".to_string(),
            email: "holder@example.com".to_string(),
            phone: None,
            whatsapp_phone: None,
            gender: None,
            role,
            password_hash: None,
            email_verified: false,
            is_identity_verified: false,
            id_front_image_url: None,
            id_back_image_url: None,
            passport_image_url: None,
            id_number: None,
            identity_verification_status: VerificationStatus::NotSubmitted,
            verification_remarks: None,
            account_status: AccountStatus::Active,
            avatar_url: None,
            bio: None,
            visibility: "PUBLIC".to_string(),
            managed_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_token_round_trip_keeps_identity() {
        let config = test_config();
        let user = sample_user(Role::Owner);

        let token = issue_token(&user, &config).unwrap();
        let claims = verify_token(&token, &config.jwt_secret).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.role, Role::Owner);
        assert_eq!(claims.email, "holder@example.com");
    }

    #[test]
    fn test_wrong_secret_and_expired_tokens_are_unauthorized() {
        let mut config = test_config();
        let token = issue_token(&sample_user(Role::Student), &config).unwrap();
        assert!(matches!(
            verify_token(&token, "another-secret"),
            Err(ApiError::Unauthorized(_))
        ));

        config.jwt_expiry_hours = -2;
        let expired = issue_token(&sample_user(Role::Student), &config).unwrap();
        assert!(matches!(
            verify_token(&expired, &config.jwt_secret),
            Err(ApiError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_password_hash_verifies_only_the_same_password() {
        let hash = hash_password("s3cret-pass").unwrap();
        assert!(verify_password("s3cret-pass", &hash).unwrap());
        assert!(!verify_password("wrong-pass", &hash).unwrap());
    }
}
