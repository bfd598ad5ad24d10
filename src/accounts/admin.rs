//! Admin-only read endpoints: pending queue, user directory, audit trail.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::auth::middleware::Claims;
use crate::db::models::{AuditLogRow, UserRow, STATUS_PENDING};
use crate::state::AppState;

const USER_COLUMNS: &str =
    "id, username, email, full_name, role, status, created_at, approved_at, approved_by";

/// GET /api/admin/pending-users (admin only)
pub async fn pending_users(
    State(state): State<AppState>,
    claims: Claims,
) -> Result<Json<Vec<UserRow>>, (StatusCode, String)> {
    claims.require_admin()?;

    let db = state.db.clone();
    let users = tokio::task::spawn_blocking(move || {
        let conn = db
            .lock()
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("DB lock: {}", e)))?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {USER_COLUMNS} FROM users WHERE status = ?1 ORDER BY created_at DESC"
            ))
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Query: {}", e)))?;
        let users: Vec<UserRow> = stmt
            .query_map([STATUS_PENDING], UserRow::from_row)
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Query: {}", e)))?
            .filter_map(|r| r.ok())
            .collect();
        Ok::<_, (StatusCode, String)>(users)
    })
    .await
    .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Task join: {}", e)))??;

    Ok(Json(users))
}

/// GET /api/admin/users (admin only)
pub async fn list_users(
    State(state): State<AppState>,
    claims: Claims,
) -> Result<Json<Vec<UserRow>>, (StatusCode, String)> {
    claims.require_admin()?;

    let db = state.db.clone();
    let users = tokio::task::spawn_blocking(move || {
        let conn = db
            .lock()
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("DB lock: {}", e)))?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC"
            ))
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Query: {}", e)))?;
        let users: Vec<UserRow> = stmt
            .query_map([], UserRow::from_row)
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Query: {}", e)))?
            .filter_map(|r| r.ok())
            .collect();
        Ok::<_, (StatusCode, String)>(users)
    })
    .await
    .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Task join: {}", e)))??;

    Ok(Json(users))
}

#[derive(Debug, Deserialize)]
pub struct AuditQuery {
    pub limit: Option<i64>,
}

/// GET /api/admin/audit-logs?limit= (admin only)
pub async fn audit_logs(
    State(state): State<AppState>,
    claims: Claims,
    Query(params): Query<AuditQuery>,
) -> Result<Json<Vec<AuditLogRow>>, (StatusCode, String)> {
    claims.require_admin()?;

    let limit = params.limit.unwrap_or(100).clamp(1, 1000);
    let db = state.db.clone();
    let entries = tokio::task::spawn_blocking(move || {
        let conn = db
            .lock()
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("DB lock: {}", e)))?;
        let mut stmt = conn
            .prepare(
                "SELECT al.id, al.user_id, al.action, al.table_name, al.record_id,
                        al.details, al.created_at, u.username
                 FROM audit_logs al
                 LEFT JOIN users u ON al.user_id = u.id
                 ORDER BY al.created_at DESC
                 LIMIT ?1",
            )
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Query: {}", e)))?;
        let entries: Vec<AuditLogRow> = stmt
            .query_map([limit], |row| {
                Ok(AuditLogRow {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    action: row.get(2)?,
                    table_name: row.get(3)?,
                    record_id: row.get(4)?,
                    details: row.get(5)?,
                    created_at: row.get(6)?,
                    username: row.get(7)?,
                })
            })
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Query: {}", e)))?
            .filter_map(|r| r.ok())
            .collect();
        Ok::<_, (StatusCode, String)>(entries)
    })
    .await
    .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Task join: {}", e)))??;

    Ok(Json(entries))
}
