//! JWT session tokens

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_core::traits::Id;
use ts_models::{Role, User};

use crate::context::AuthContext;

/// JWT claims
///
/// Carries the full identity assertion so handlers never need a user
/// lookup just to authorize.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
    /// JWT ID, used as the session key for revocation
    pub jti: String,
    /// Account role
    pub role: String,
    /// Department, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dept: Option<Id>,
}

/// JWT errors
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Token is expired")]
    Expired,
    #[error("Invalid token: {0}")]
    Invalid(String),
    #[error("Missing token")]
    Missing,
    #[error("Token encoding failed: {0}")]
    EncodingFailed(String),
}

/// JWT service for creating and validating tokens
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiration_seconds: i64,
}

impl JwtService {
    /// Create a new JWT service with the given secret
    pub fn new(secret: &[u8], expiration_seconds: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            expiration_seconds,
        }
    }

    /// Token lifetime this service issues
    pub fn expiration_seconds(&self) -> i64 {
        self.expiration_seconds
    }

    /// Issue a token for a user; returns the token and its jti
    pub fn issue(&self, user: &User) -> Result<(String, String), JwtError> {
        let user_id = user
            .id
            .ok_or_else(|| JwtError::EncodingFailed("user has no id".into()))?;
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))?
            .as_secs() as usize;
        let jti = uuid::Uuid::new_v4().to_string();

        let claims = Claims {
            sub: user_id.to_string(),
            exp: now + self.expiration_seconds as usize,
            iat: now,
            jti: jti.clone(),
            role: user.role.as_str().to_string(),
            dept: user.department_id,
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))?;
        Ok((token, jti))
    }

    /// Validate and decode a token
    pub fn validate(&self, token: &str) -> Result<Claims, JwtError> {
        let validation = Validation::default();
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
                _ => JwtError::Invalid(e.to_string()),
            })?;
        Ok(token_data.claims)
    }

    /// Validate a token and build the request's [`AuthContext`]
    pub fn authenticate(&self, token: &str) -> Result<(AuthContext, String), JwtError> {
        let claims = self.validate(token)?;
        let user_id: Id = claims
            .sub
            .parse()
            .map_err(|_| JwtError::Invalid("Invalid user ID in token".to_string()))?;
        let role = Role::normalize(&claims.role)
            .map_err(|e| JwtError::Invalid(e.to_string()))?;
        Ok((AuthContext::new(user_id, role, claims.dept), claims.jti))
    }
}

/// Extract bearer token from Authorization header
pub fn extract_bearer_token(authorization: &str) -> Option<&str> {
    if authorization.to_lowercase().starts_with("bearer ") {
        Some(authorization[7..].trim())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> JwtService {
        JwtService::new(b"test-secret-key-at-least-32-bytes", 3600)
    }

    fn user() -> User {
        let mut user = User::new("Test", "test@example.com", Role::Manager);
        user.id = Some(42);
        user.department_id = Some(7);
        user
    }

    #[test]
    fn test_issue_and_authenticate() {
        let service = service();
        let (token, jti) = service.issue(&user()).unwrap();
        let (ctx, token_jti) = service.authenticate(&token).unwrap();

        assert_eq!(ctx.user_id, 42);
        assert_eq!(ctx.role, Role::Manager);
        assert_eq!(ctx.department_id, Some(7));
        assert_eq!(jti, token_jti);
    }

    #[test]
    fn test_reject_garbage() {
        let service = service();
        assert!(matches!(
            service.authenticate("not-a-token"),
            Err(JwtError::Invalid(_))
        ));
    }

    #[test]
    fn test_reject_wrong_secret() {
        let (token, _) = service().issue(&user()).unwrap();
        let other = JwtService::new(b"another-secret-key-of-32-bytes!!", 3600);
        assert!(other.authenticate(&token).is_err());
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc123"), Some("abc123"));
        assert_eq!(extract_bearer_token("bearer abc123"), Some("abc123"));
        assert_eq!(extract_bearer_token("Basic abc123"), None);
    }
}
