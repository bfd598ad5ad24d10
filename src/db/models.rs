/// Database row types for the account tables.
/// These correspond 1:1 to the SQLite schema defined in migrations.rs.
use serde::Serialize;

/// Account lifecycle states. pending -> approved and pending -> rejected
/// are the only transitions; both are terminal.
pub const STATUS_PENDING: &str = "pending";
pub const STATUS_APPROVED: &str = "approved";
pub const STATUS_REJECTED: &str = "rejected";

/// Role granted full administrative access
pub const ROLE_ADMIN: &str = "admin";

/// User record in the users table (password column deliberately omitted —
/// it is only ever read by the login handler).
#[derive(Debug, Clone, Serialize)]
pub struct UserRow {
    pub id: String,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub role: String,
    pub status: String,
    pub created_at: String,
    pub approved_at: Option<String>,
    pub approved_by: Option<String>,
}

impl UserRow {
    /// Map a SELECT over the standard column order:
    /// id, username, email, full_name, role, status, created_at, approved_at, approved_by
    pub fn from_row(row: &rusqlite::Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get(0)?,
            username: row.get(1)?,
            email: row.get(2)?,
            full_name: row.get(3)?,
            role: row.get(4)?,
            status: row.get(5)?,
            created_at: row.get(6)?,
            approved_at: row.get(7)?,
            approved_by: row.get(8)?,
        })
    }
}

/// Audit trail entry joined with the acting user's name
#[derive(Debug, Clone, Serialize)]
pub struct AuditLogRow {
    pub id: i64,
    pub user_id: Option<String>,
    pub action: String,
    pub table_name: Option<String>,
    pub record_id: Option<String>,
    pub details: Option<String>,
    pub created_at: String,
    pub username: Option<String>,
}
