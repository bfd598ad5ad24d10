use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::auth::password;
use crate::db::models::STATUS_PENDING;
use crate::mailer;
use crate::push::{dispatch, NotificationEvent};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(rename = "fullName")]
    pub full_name: String,
    #[serde(default)]
    pub role: Option<String>,
}

/// POST /api/auth/signup
/// Create a pending account. The account cannot log in until an admin
/// approves it; connected admins are notified immediately.
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    if req.username.trim().is_empty()
        || req.email.trim().is_empty()
        || req.password.is_empty()
        || req.full_name.trim().is_empty()
    {
        return Err((
            StatusCode::BAD_REQUEST,
            "Missing required fields".to_string(),
        ));
    }

    let role = req.role.clone().unwrap_or_else(|| "staff".to_string());

    let db = state.db.clone();
    let username = req.username.clone();
    let email = req.email.clone();
    let full_name = req.full_name.clone();
    let plain_password = req.password.clone();
    let role_for_insert = role.clone();

    // Hash and insert on the blocking pool; scrypt is deliberately slow.
    // The SIGNUP audit entry lands in the same section, before any
    // notification is dispatched.
    let (user_id, created_at) = tokio::task::spawn_blocking(move || {
        let password_hash = password::hash_password(&plain_password)
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Hash: {}", e)))?;

        let conn = db
            .lock()
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("DB lock: {}", e)))?;

        let user_id = Uuid::now_v7().to_string();
        let now = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO users (id, username, email, password, full_name, role, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            rusqlite::params![
                user_id,
                username,
                email,
                password_hash,
                full_name,
                role_for_insert,
                STATUS_PENDING,
                now
            ],
        )
        .map_err(|e| {
            if e.sqlite_error_code() == Some(rusqlite::ErrorCode::ConstraintViolation) {
                (
                    StatusCode::CONFLICT,
                    "Username or email already exists".to_string(),
                )
            } else {
                (StatusCode::INTERNAL_SERVER_ERROR, "Signup failed".to_string())
            }
        })?;

        crate::audit::record(
            &conn,
            Some(&user_id),
            "SIGNUP",
            Some("users"),
            Some(&user_id),
            &json!({"username": username, "email": email, "role": role_for_insert}),
        );

        Ok::<_, (StatusCode, String)>((user_id, now))
    })
    .await
    .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Task join: {}", e)))??;

    tracing::info!(username = %req.username, user_id = %user_id, "pending account created");

    // Best-effort side channel: approval-request email to the admin address
    let (subject, body) =
        mailer::approval_request_email(&req.full_name, &req.username, &role, &req.email);
    mailer::send_best_effort(state.mailer.clone(), state.admin_email.clone(), subject, body);

    // Real-time: tell connected admins about the new pending account
    dispatch::broadcast_admins(
        &state.registry,
        &NotificationEvent::new(
            "new_pending_user",
            json!({
                "id": user_id,
                "username": req.username,
                "email": req.email,
                "fullName": req.full_name,
                "role": role,
                "status": STATUS_PENDING,
                "created_at": created_at,
            }),
        ),
    );

    Ok(Json(json!({
        "message": "Registration successful! Please wait for admin approval.",
        "user": {
            "id": user_id,
            "username": req.username,
            "email": req.email,
            "fullName": req.full_name,
            "role": role,
            "status": STATUS_PENDING,
        }
    })))
}
