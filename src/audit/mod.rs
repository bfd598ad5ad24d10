//! Best-effort audit trail.
//!
//! Audit writes share the blocking section (and connection lock) of the
//! mutation they describe, so a committed transition always has its entry in
//! place before any notification goes out. A failed write is logged and
//! swallowed — it never fails the operation it was recording.

use rusqlite::Connection;

/// Record one audit entry. Never returns an error to the caller.
pub fn record(
    conn: &Connection,
    actor_id: Option<&str>,
    action: &str,
    table_name: Option<&str>,
    record_id: Option<&str>,
    details: &serde_json::Value,
) {
    let result = conn.execute(
        "INSERT INTO audit_logs (user_id, action, table_name, record_id, details, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, datetime('now'))",
        rusqlite::params![actor_id, action, table_name, record_id, details.to_string()],
    );

    if let Err(err) = result {
        tracing::error!(action, error = %err, "audit log write failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_conn() -> Connection {
        let mut conn = Connection::open_in_memory().unwrap();
        crate::db::migrations::migrations().to_latest(&mut conn).unwrap();
        conn
    }

    #[test]
    fn record_inserts_one_row() {
        let conn = test_conn();
        record(
            &conn,
            Some("admin-1"),
            "APPROVED_USER",
            Some("users"),
            Some("u-7"),
            &json!({"approvedUser": "nurse@mmgh.local"}),
        );

        let (action, record_id): (String, String) = conn
            .query_row(
                "SELECT action, record_id FROM audit_logs",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!(action, "APPROVED_USER");
        assert_eq!(record_id, "u-7");
    }

    #[test]
    fn record_tolerates_missing_actor() {
        let conn = test_conn();
        record(&conn, None, "SIGNUP", Some("users"), None, &json!({}));
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM audit_logs", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }
}
