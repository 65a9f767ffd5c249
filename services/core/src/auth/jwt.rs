use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Claims carried by the access tokens issued by the identity service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub role: Role,
    pub exp: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Learner,
    Admin,
}

#[derive(Debug, Error)]
pub enum AccessTokenError {
    #[error("Authorization value is not a bearer token.")]
    NotBearer,

    #[error("Access token rejected: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),
}

impl Default for Role {
    fn default() -> Self {
        Role::Learner
    }
}

/// Verifies an `Authorization` header value of the form `Bearer <jwt>` and returns its claims.
/// Tokens must be signed with HS256 using `secret` and must not be expired.
pub fn decode_bearer(header_value: &str, secret: &[u8]) -> Result<Claims, AccessTokenError> {
    let token = header_value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AccessTokenError::NotBearer)?;

    let data = decode::<Claims>(token, &DecodingKey::from_secret(secret), &Validation::new(Algorithm::HS256))?;
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use jsonwebtoken::{encode, EncodingKey, Header};

    use super::*;

    const SECRET: &[u8] = b"test-secret";

    fn claims(exp: usize) -> Claims {
        Claims {
            sub: "9b4a2a0e-5a53-4a8d-9d0e-3f1c1a0b7c11".to_owned(),
            email: "ada@example.com".to_owned(),
            first_name: "Ada".to_owned(),
            last_name: "Lovelace".to_owned(),
            role: Role::Admin,
            exp,
        }
    }

    fn far_future() -> usize {
        4_102_444_800 // 2100-01-01
    }

    #[test]
    fn decodes_valid_bearer() {
        let token = encode(&Header::default(), &claims(far_future()), &EncodingKey::from_secret(SECRET)).unwrap();

        let decoded = decode_bearer(&format!("Bearer {}", token), SECRET).unwrap();
        assert_eq!(claims(far_future()), decoded);
    }

    #[test]
    fn rejects_wrong_secret() {
        let token = encode(&Header::default(), &claims(far_future()), &EncodingKey::from_secret(SECRET)).unwrap();

        let err = decode_bearer(&format!("Bearer {}", token), b"other").unwrap_err();
        assert!(matches!(err, AccessTokenError::Invalid(_)));
    }

    #[test]
    fn rejects_expired_token() {
        let token = encode(&Header::default(), &claims(1), &EncodingKey::from_secret(SECRET)).unwrap();

        assert!(decode_bearer(&format!("Bearer {}", token), SECRET).is_err());
    }

    #[test]
    fn rejects_non_bearer_values() {
        assert!(matches!(decode_bearer("Basic abc", SECRET), Err(AccessTokenError::NotBearer)));
        assert!(matches!(decode_bearer("Bearer ", SECRET), Err(AccessTokenError::NotBearer)));
    }

    #[test]
    fn role_defaults_to_learner() {
        let json = serde_json::json!({
            "sub": "x",
            "email": "x@example.com",
            "firstName": "X",
            "lastName": "Y",
            "exp": 10,
        });

        let claims: Claims = serde_json::from_value(json).unwrap();
        assert_eq!(Role::Learner, claims.role);
    }
}
