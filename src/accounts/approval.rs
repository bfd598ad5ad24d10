//! The approval workflow state machine.
//!
//! pending -> approved and pending -> rejected, both terminal. Each
//! transition mutates the stored account, writes its audit entry in the same
//! blocking section, and only then dispatches notifications — a client
//! reacting to an event always observes the updated status. The
//! confirmation email runs as a detached best-effort task and can neither
//! delay nor fail the transition.
//!
//! Re-deciding an already-decided account is accepted: the same terminal
//! status is rewritten and the same events re-emitted, so an admin
//! re-clicking gets consistent feedback rather than an error.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use crate::auth::middleware::Claims;
use crate::db::models::{STATUS_APPROVED, STATUS_REJECTED};
use crate::mailer;
use crate::push::{dispatch, NotificationEvent};
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    /// Terminal status written to the account row
    pub fn status(self) -> &'static str {
        match self {
            Decision::Approve => STATUS_APPROVED,
            Decision::Reject => STATUS_REJECTED,
        }
    }

    /// Audit trail action name
    pub fn action(self) -> &'static str {
        match self {
            Decision::Approve => "APPROVED_USER",
            Decision::Reject => "REJECTED_USER",
        }
    }

    /// Event name for the subject-targeted notification
    pub fn subject_event(self) -> &'static str {
        match self {
            Decision::Approve => "approved",
            Decision::Reject => "rejected",
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct RejectRequest {
    pub reason: Option<String>,
}

/// POST /api/admin/approve-user/{userId} (admin only)
pub async fn approve_user(
    State(state): State<AppState>,
    claims: Claims,
    Path(user_id): Path<String>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    decide(state, claims, user_id, Decision::Approve, None).await?;
    Ok(Json(json!({"message": "User approved successfully"})))
}

/// POST /api/admin/reject-user/{userId} (admin only)
pub async fn reject_user(
    State(state): State<AppState>,
    claims: Claims,
    Path(user_id): Path<String>,
    body: Option<Json<RejectRequest>>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let reason = body
        .and_then(|Json(req)| req.reason)
        .unwrap_or_else(|| "No reason provided".to_string());
    decide(state, claims, user_id, Decision::Reject, Some(reason)).await?;
    Ok(Json(json!({"message": "User rejected"})))
}

/// Apply one terminal transition: mutation + audit, then email (detached),
/// then notifications. Precondition failures return before any side effect.
async fn decide(
    state: AppState,
    claims: Claims,
    user_id: String,
    decision: Decision,
    reason: Option<String>,
) -> Result<(), (StatusCode, String)> {
    claims.require_admin()?;

    let db = state.db.clone();
    let target_id = user_id.clone();
    let actor_id = claims.sub.clone();
    let actor_name = claims.username.clone();
    let audit_reason = reason.clone();

    let (email, full_name) = tokio::task::spawn_blocking(move || {
        let conn = db
            .lock()
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("DB lock: {}", e)))?;

        let target = conn.query_row(
            "SELECT email, full_name FROM users WHERE id = ?1",
            [&target_id],
            |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
        );
        // An absent row is a precondition failure; anything else is the store
        let (email, full_name) = match target {
            Ok(pair) => pair,
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                return Err((StatusCode::NOT_FOUND, "User not found".to_string()));
            }
            Err(e) => {
                return Err((
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("User lookup: {}", e),
                ));
            }
        };

        let now = Utc::now().to_rfc3339();
        conn.execute(
            "UPDATE users SET status = ?1, approved_at = ?2, approved_by = ?3 WHERE id = ?4",
            rusqlite::params![decision.status(), now, actor_name, target_id],
        )
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Status update: {}", e),
            )
        })?;

        let details = match &audit_reason {
            Some(reason) => json!({"reason": reason}),
            None => json!({"approvedUser": email}),
        };
        crate::audit::record(
            &conn,
            Some(&actor_id),
            decision.action(),
            Some("users"),
            Some(&target_id),
            &details,
        );

        Ok::<_, (StatusCode, String)>((email, full_name))
    })
    .await
    .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Task join: {}", e)))??;

    tracing::info!(
        user_id = %user_id,
        status = decision.status(),
        actor = %claims.username,
        "account decision applied"
    );

    // Best-effort side channel: confirmation/rejection email
    let (subject, body) = match decision {
        Decision::Approve => mailer::account_approved_email(&full_name, &state.app_url),
        Decision::Reject => mailer::account_rejected_email(
            &full_name,
            reason.as_deref().unwrap_or("No reason provided"),
        ),
    };
    mailer::send_best_effort(state.mailer.clone(), email, subject, body);

    // Notify the affected subject (no-op if offline), then the admin group
    let subject_payload = match (decision, &reason) {
        (Decision::Approve, _) => json!({"message": "Your account has been approved"}),
        (Decision::Reject, reason) => json!({
            "message": "Your account registration was rejected",
            "reason": reason.as_deref().unwrap_or("No reason provided"),
        }),
    };
    dispatch::notify_subject(
        &state.registry,
        &user_id,
        &NotificationEvent::new(decision.subject_event(), subject_payload),
    );
    dispatch::broadcast_admins(
        &state.registry,
        &NotificationEvent::new(
            "user_status_changed",
            json!({"id": user_id, "status": decision.status()}),
        ),
    );

    Ok(())
}
