use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config;

/// Signed token payload carried in `Authorization: Bearer <token>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: Uuid,
    pub username: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: Uuid, username: String) -> Self {
        let now = Utc::now();
        let expiry_hours = config::config().security.jwt_expiry_hours;
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            user_id,
            username,
            exp,
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),
    #[error("Invalid JWT secret")]
    InvalidSecret,
}

/// Sign claims with an explicit secret. Used by tests and operational tooling.
pub fn sign_with_secret(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    let header = Header::default();

    encode(&header, claims, &encoding_key).map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

/// Sign claims with the configured application secret.
pub fn generate_jwt(claims: &Claims) -> Result<String, JwtError> {
    sign_with_secret(claims, &config::config().security.jwt_secret)
}

/// Decode and verify a token against an explicit secret.
pub fn decode_with_secret(token: &str, secret: &str) -> Result<Claims, String> {
    if secret.is_empty() {
        return Err("JWT secret not configured".to_string());
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default();

    let token_data = decode::<Claims>(token, &decoding_key, &validation)
        .map_err(|e| format!("Invalid JWT token: {}", e))?;

    Ok(token_data.claims)
}

/// Decode and verify a token against the configured application secret.
pub fn decode_jwt(token: &str) -> Result<Claims, String> {
    decode_with_secret(token, &config::config().security.jwt_secret)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims() -> Claims {
        let now = Utc::now();
        Claims {
            user_id: Uuid::new_v4(),
            username: "alice".to_string(),
            exp: (now + Duration::hours(1)).timestamp(),
            iat: now.timestamp(),
        }
    }

    #[test]
    fn test_sign_and_decode_round_trip() {
        let claims = claims();
        let token = sign_with_secret(&claims, "test-secret").unwrap();
        let decoded = decode_with_secret(&token, "test-secret").unwrap();
        assert_eq!(decoded.user_id, claims.user_id);
        assert_eq!(decoded.username, "alice");
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = sign_with_secret(&claims(), "test-secret").unwrap();
        assert!(decode_with_secret(&token, "other-secret").is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let now = Utc::now();
        let expired = Claims {
            user_id: Uuid::new_v4(),
            username: "alice".to_string(),
            exp: (now - Duration::hours(2)).timestamp(),
            iat: (now - Duration::hours(3)).timestamp(),
        };
        let token = sign_with_secret(&expired, "test-secret").unwrap();
        assert!(decode_with_secret(&token, "test-secret").is_err());
    }

    #[test]
    fn test_empty_secret_rejected() {
        assert!(matches!(
            sign_with_secret(&claims(), ""),
            Err(JwtError::InvalidSecret)
        ));
        assert!(decode_with_secret("whatever", "").is_err());
    }
}
