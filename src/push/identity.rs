//! Identity resolution for incoming push connections.
//!
//! A connection may present a bearer token, explicit query parameters, or
//! nothing at all. A verified token always wins over explicit parameters;
//! a bad or expired token degrades to the parameters (logged, never fatal) —
//! the connection itself is never rejected.

use crate::auth::jwt;
use crate::db::models::ROLE_ADMIN;

/// Connection role derived once at registration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    User,
    Guest,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
            Role::Guest => "guest",
        }
    }
}

/// Immutable for the connection's lifetime.
#[derive(Debug, Clone)]
pub struct Identity {
    pub role: Role,
    pub subject_id: Option<String>,
}

/// Derive {role, subject_id} for a connection.
///
/// Token claims override any explicit parameters. Without a usable token,
/// role comes from the `role` parameter (defaulting to guest) and the
/// subject from the `userId` parameter.
pub fn resolve_identity(
    jwt_secret: &[u8],
    token: Option<&str>,
    role_param: Option<&str>,
    subject_param: Option<&str>,
) -> Identity {
    if let Some(token) = token {
        match jwt::validate_token(jwt_secret, token) {
            Ok(claims) => {
                let role = if claims.role == ROLE_ADMIN {
                    Role::Admin
                } else {
                    Role::User
                };
                return Identity {
                    role,
                    subject_id: Some(claims.sub),
                };
            }
            Err(err) => {
                // Degrade to the explicit parameters — never reject the connection
                tracing::warn!(error = %err, "push token verification failed, falling back");
            }
        }
    }

    let role = match role_param {
        Some("admin") => Role::Admin,
        Some("user") => Role::User,
        _ => Role::Guest,
    };

    Identity {
        role,
        subject_id: subject_param.map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::issue_token;

    const SECRET: &[u8] = b"push-identity-test-secret-32byte";

    #[test]
    fn verified_token_overrides_explicit_params() {
        let token = issue_token(SECRET, "42", "nurse42", "user").unwrap();
        let identity = resolve_identity(SECRET, Some(&token), Some("admin"), None);
        assert_eq!(identity.role, Role::User);
        assert_eq!(identity.subject_id.as_deref(), Some("42"));
    }

    #[test]
    fn admin_claim_resolves_to_admin() {
        let token = issue_token(SECRET, "1", "root", "admin").unwrap();
        let identity = resolve_identity(SECRET, Some(&token), None, Some("ignored"));
        assert_eq!(identity.role, Role::Admin);
        assert_eq!(identity.subject_id.as_deref(), Some("1"));
    }

    #[test]
    fn bad_token_falls_back_to_params() {
        let identity = resolve_identity(SECRET, Some("garbage"), Some("admin"), None);
        assert_eq!(identity.role, Role::Admin);
        assert!(identity.subject_id.is_none());
    }

    #[test]
    fn token_signed_with_other_secret_falls_back() {
        let token = issue_token(b"some-other-secret", "42", "x", "admin").unwrap();
        let identity = resolve_identity(SECRET, Some(&token), Some("user"), Some("7"));
        assert_eq!(identity.role, Role::User);
        assert_eq!(identity.subject_id.as_deref(), Some("7"));
    }

    #[test]
    fn no_credentials_defaults_to_guest() {
        let identity = resolve_identity(SECRET, None, None, None);
        assert_eq!(identity.role, Role::Guest);
        assert!(identity.subject_id.is_none());
    }

    #[test]
    fn unknown_role_param_is_guest() {
        let identity = resolve_identity(SECRET, None, Some("janitor"), Some("5"));
        assert_eq!(identity.role, Role::Guest);
        assert_eq!(identity.subject_id.as_deref(), Some("5"));
    }
}
