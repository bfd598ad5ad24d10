use rusqlite_migration::{Migrations, M};

/// Define all schema migrations.
/// Uses SQLite user_version pragma for tracking — no migration table needed.
pub fn migrations() -> Migrations<'static> {
    Migrations::new(vec![
        M::up(
            "-- Migration 1: Accounts and audit trail

CREATE TABLE users (
    id TEXT PRIMARY KEY,
    username TEXT NOT NULL UNIQUE,
    email TEXT NOT NULL UNIQUE,
    password TEXT NOT NULL,
    full_name TEXT NOT NULL,
    role TEXT NOT NULL DEFAULT 'staff',
    status TEXT NOT NULL DEFAULT 'pending',
    created_at TEXT NOT NULL,
    approved_at TEXT,
    approved_by TEXT
);

CREATE INDEX idx_users_status ON users(status);

CREATE TABLE audit_logs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id TEXT,
    action TEXT NOT NULL,
    table_name TEXT,
    record_id TEXT,
    details TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_audit_logs_created ON audit_logs(created_at);
",
        ),
        M::up(
            "-- Migration 2: Hospital domain tables (bulk-replaced by clients)

CREATE TABLE patients (
    id INTEGER PRIMARY KEY,
    first_name TEXT,
    last_name TEXT,
    dob TEXT,
    gender TEXT,
    phone TEXT,
    address TEXT,
    emergency_contact TEXT,
    blood_group TEXT,
    status TEXT
);

CREATE TABLE appointments (
    id INTEGER PRIMARY KEY,
    patient_id INTEGER,
    patient_name TEXT,
    doctor TEXT,
    date TEXT,
    time TEXT,
    reason TEXT,
    status TEXT,
    notes TEXT
);

CREATE TABLE records (
    id INTEGER PRIMARY KEY,
    patient_id INTEGER,
    patient_name TEXT,
    doctor TEXT,
    date TEXT,
    diagnosis TEXT,
    treatment TEXT,
    prescription TEXT,
    vitals TEXT,
    notes TEXT
);

CREATE TABLE staff (
    id INTEGER PRIMARY KEY,
    first_name TEXT,
    last_name TEXT,
    role TEXT,
    department TEXT,
    phone TEXT,
    email TEXT,
    address TEXT,
    join_date TEXT,
    status TEXT
);
",
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_valid() {
        assert!(migrations().validate().is_ok());
    }
}
