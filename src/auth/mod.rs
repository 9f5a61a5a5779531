use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::header, http::request::Parts};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{Display, EnumString};
use uuid::Uuid;

use crate::{errors::ServiceError, AppState};

/// Employee role. Parsed into a closed enum at the boundary so a typo in a
/// stored role string fails loudly instead of silently granting or denying
/// access.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, utoipa::ToSchema,
)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Manager,
    Employee,
}

/// JWT claims carried in the bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Employee id
    pub sub: Uuid,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and validates tokens, and hashes credentials.
#[derive(Clone)]
pub struct AuthService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiration_secs: i64,
}

impl AuthService {
    pub fn new(secret: &str, expiration_secs: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiration_secs,
        }
    }

    pub fn hash_password(&self, password: &str) -> Result<String, ServiceError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| ServiceError::HashError(e.to_string()))
    }

    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool, ServiceError> {
        let parsed = PasswordHash::new(hash).map_err(|e| ServiceError::HashError(e.to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    pub fn issue_token(&self, employee_id: Uuid, role: Role) -> Result<String, ServiceError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: employee_id,
            role,
            iat: now,
            exp: now + self.expiration_secs,
        };
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| ServiceError::AuthError(e.to_string()))
    }

    pub fn decode_token(&self, token: &str) -> Result<Claims, ServiceError> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| ServiceError::Unauthorized("invalid or expired token".to_string()))
    }
}

/// Extractor for authenticated requests: validates the bearer token and
/// exposes the caller's id and role.
#[derive(Debug, Clone)]
pub struct AuthenticatedEmployee {
    pub id: Uuid,
    pub role: Role,
}

impl AuthenticatedEmployee {
    pub fn require_manager(&self) -> Result<(), ServiceError> {
        if self.role == Role::Manager {
            Ok(())
        } else {
            Err(ServiceError::Forbidden(
                "manager role required".to_string(),
            ))
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedEmployee {
    type Rejection = ServiceError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ServiceError::Unauthorized("missing bearer token".to_string()))?;

        let token = header_value
            .strip_prefix("Bearer ")
            .ok_or_else(|| ServiceError::Unauthorized("missing bearer token".to_string()))?
            .trim();

        let claims = state.auth.decode_token(token)?;
        Ok(AuthenticatedEmployee {
            id: claims.sub,
            role: claims.role,
        })
    }
}

/// Parses a stored role string, rejecting anything outside the closed set.
pub fn parse_role(raw: &str) -> Result<Role, ServiceError> {
    Role::from_str(raw)
        .map_err(|_| ServiceError::InternalError(format!("unknown role in store: {}", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_token() {
        let svc = AuthService::new("a-test-secret-that-is-long-enough-for-hs256", 3600);
        let id = Uuid::new_v4();
        let token = svc.issue_token(id, Role::Manager).unwrap();
        let claims = svc.decode_token(&token).unwrap();
        assert_eq!(claims.sub, id);
        assert_eq!(claims.role, Role::Manager);
    }

    #[test]
    fn rejects_garbage_token() {
        let svc = AuthService::new("a-test-secret-that-is-long-enough-for-hs256", 3600);
        assert!(svc.decode_token("not.a.token").is_err());
    }

    #[test]
    fn role_parsing_is_case_insensitive_and_closed() {
        assert_eq!(parse_role("Manager").unwrap(), Role::Manager);
        assert_eq!(parse_role("employee").unwrap(), Role::Employee);
        assert!(parse_role("managr").is_err());
    }

    #[test]
    fn password_hash_verifies() {
        let svc = AuthService::new("a-test-secret-that-is-long-enough-for-hs256", 3600);
        let hash = svc.hash_password("injera123").unwrap();
        assert!(svc.verify_password("injera123", &hash).unwrap());
        assert!(!svc.verify_password("wrong", &hash).unwrap());
    }
}
