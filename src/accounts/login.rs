use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use serde_json::json;

use crate::auth::{jwt, password};
use crate::db::models::{STATUS_PENDING, STATUS_REJECTED};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// POST /api/auth/login
/// Status-gated login: pending and rejected accounts are refused even with
/// the correct password. Success issues a 24-hour access token.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let db = state.db.clone();
    let username = req.username.clone();
    let plain_password = req.password.clone();

    // (id, username, email, full_name, role, status) for the authenticated user
    let user = tokio::task::spawn_blocking(move || {
        let conn = db
            .lock()
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("DB lock: {}", e)))?;

        let row: Option<(String, String, String, String, String, String, String)> = conn
            .query_row(
                "SELECT id, username, email, full_name, role, status, password
                 FROM users WHERE username = ?1",
                [&username],
                |row| {
                    Ok((
                        row.get(0)?,
                        row.get(1)?,
                        row.get(2)?,
                        row.get(3)?,
                        row.get(4)?,
                        row.get(5)?,
                        row.get(6)?,
                    ))
                },
            )
            .ok();

        let (id, username, email, full_name, role, status, password_hash) = row.ok_or((
            StatusCode::UNAUTHORIZED,
            "Invalid credentials".to_string(),
        ))?;

        if !password::verify_password(&password_hash, &plain_password) {
            return Err((StatusCode::UNAUTHORIZED, "Invalid credentials".to_string()));
        }

        if status == STATUS_PENDING {
            return Err((
                StatusCode::FORBIDDEN,
                "Account pending admin approval".to_string(),
            ));
        }
        if status == STATUS_REJECTED {
            return Err((
                StatusCode::FORBIDDEN,
                "Account has been rejected".to_string(),
            ));
        }

        crate::audit::record(&conn, Some(&id), "LOGIN", Some("users"), Some(&id), &json!({}));

        Ok::<_, (StatusCode, String)>((id, username, email, full_name, role, status))
    })
    .await
    .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Task join: {}", e)))??;

    let (id, username, email, full_name, role, status) = user;

    let token = jwt::issue_token(&state.jwt_secret, &id, &username, &role)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("JWT: {}", e)))?;

    tracing::info!(username = %username, role = %role, "login");

    Ok(Json(json!({
        "token": token,
        "user": {
            "id": id,
            "username": username,
            "email": email,
            "fullName": full_name,
            "role": role,
            "status": status,
        }
    })))
}
