use std::sync::Arc;

use crate::db::DbPool;
use crate::mailer::Mailer;
use crate::push::registry::ConnectionRegistry;

/// Shared application state passed to all handlers via axum State extractor.
#[derive(Clone)]
pub struct AppState {
    /// SQLite connection wrapped in Arc<Mutex>
    pub db: DbPool,
    /// JWT signing secret (256-bit random key)
    pub jwt_secret: Vec<u8>,
    /// Live push connections (admin group + per-subject groups)
    pub registry: Arc<ConnectionRegistry>,
    /// Outbound email collaborator
    pub mailer: Arc<dyn Mailer>,
    /// Address that receives approval-request emails
    pub admin_email: String,
    /// Public base URL included in approval emails
    pub app_url: String,
}
