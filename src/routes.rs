//! HTTP route table and shared layers.

use axum::{
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::accounts::{admin, approval, login, signup};
use crate::auth::middleware::JwtSecret;
use crate::push::stream;
use crate::records;
use crate::state::AppState;

/// Build the application router with all routes and layers.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/auth/signup", post(signup::signup))
        .route("/api/auth/login", post(login::login))
        .route("/api/admin/pending-users", get(admin::pending_users))
        .route("/api/admin/users", get(admin::list_users))
        .route("/api/admin/audit-logs", get(admin::audit_logs))
        .route("/api/admin/approve-user/{userId}", post(approval::approve_user))
        .route("/api/admin/reject-user/{userId}", post(approval::reject_user))
        .route("/api/data", get(records::get_data))
        .route("/api/bulk", post(records::bulk_replace))
        .route("/events", get(stream::events))
        .route("/health", get(health))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            inject_jwt_secret,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Make the JWT secret available to the Claims extractor on every request.
async fn inject_jwt_secret(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    req.extensions_mut()
        .insert(JwtSecret(state.jwt_secret.clone()));
    next.run(req).await
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({"status": "ok"}))
}
