use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};
use serde::{Deserialize, Serialize};

/// JWT claims extracted from Authorization: Bearer header.
/// Implements axum's FromRequestParts for use as an extractor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID (UUIDv7)
    pub sub: String,
    /// Login name, recorded as the acting party on approvals
    pub username: String,
    /// Account role ("admin", "staff", "doctor", ...)
    pub role: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
}

impl<S> FromRequestParts<S> for Claims
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, String);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Extract Bearer token from Authorization header
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or((StatusCode::UNAUTHORIZED, "No token provided".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or((StatusCode::UNAUTHORIZED, "No token provided".to_string()))?;

        // Get JWT secret from request extensions (set by middleware layer)
        let jwt_secret = parts.extensions.get::<JwtSecret>().ok_or((
            StatusCode::INTERNAL_SERVER_ERROR,
            "JWT secret missing".to_string(),
        ))?;

        // Validate and decode JWT
        crate::auth::jwt::validate_token(&jwt_secret.0, token)
            .map_err(|_| (StatusCode::FORBIDDEN, "Invalid token".to_string()))
    }
}

impl Claims {
    /// Guard for admin-only handlers. No state mutation, no audit entry,
    /// no notification happens when this rejects.
    pub fn require_admin(&self) -> Result<(), (StatusCode, String)> {
        if self.role == crate::db::models::ROLE_ADMIN {
            Ok(())
        } else {
            Err((StatusCode::FORBIDDEN, "Admin only".to_string()))
        }
    }
}

/// JWT secret stored in request extensions for the Claims extractor
#[derive(Clone)]
pub struct JwtSecret(pub Vec<u8>);
