//! Hospital domain tables: full dump and bulk replace.
//!
//! Clients own these tables. GET /api/data hands back everything; POST
//! /api/bulk replaces all four tables inside one transaction so readers
//! never observe a half-applied snapshot.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::auth::middleware::Claims;
use crate::state::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: Option<i64>,
    #[serde(rename = "firstName", alias = "first_name")]
    pub first_name: Option<String>,
    #[serde(rename = "lastName", alias = "last_name")]
    pub last_name: Option<String>,
    pub dob: Option<String>,
    pub gender: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    #[serde(rename = "emergencyContact", alias = "emergency_contact")]
    pub emergency_contact: Option<String>,
    #[serde(rename = "bloodGroup", alias = "blood_group")]
    pub blood_group: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Option<i64>,
    #[serde(rename = "patientId", alias = "patient_id")]
    pub patient_id: Option<i64>,
    #[serde(rename = "patientName", alias = "patient_name")]
    pub patient_name: Option<String>,
    pub doctor: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub reason: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicalRecord {
    pub id: Option<i64>,
    #[serde(rename = "patientId", alias = "patient_id")]
    pub patient_id: Option<i64>,
    #[serde(rename = "patientName", alias = "patient_name")]
    pub patient_name: Option<String>,
    pub doctor: Option<String>,
    pub date: Option<String>,
    pub diagnosis: Option<String>,
    pub treatment: Option<String>,
    pub prescription: Option<String>,
    pub vitals: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffMember {
    pub id: Option<i64>,
    #[serde(rename = "firstName", alias = "first_name")]
    pub first_name: Option<String>,
    #[serde(rename = "lastName", alias = "last_name")]
    pub last_name: Option<String>,
    pub role: Option<String>,
    pub department: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    #[serde(rename = "joinDate", alias = "join_date")]
    pub join_date: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BulkPayload {
    #[serde(default)]
    pub patients: Vec<Patient>,
    #[serde(default)]
    pub appointments: Vec<Appointment>,
    #[serde(default)]
    pub records: Vec<MedicalRecord>,
    #[serde(default)]
    pub staff: Vec<StaffMember>,
}

/// GET /api/data (authenticated)
pub async fn get_data(
    State(state): State<AppState>,
    _claims: Claims,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let db = state.db.clone();
    let payload = tokio::task::spawn_blocking(move || {
        let conn = db
            .lock()
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("DB lock: {}", e)))?;

        let patients = load_patients(&conn)
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Query: {}", e)))?;
        let appointments = load_appointments(&conn)
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Query: {}", e)))?;
        let records = load_records(&conn)
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Query: {}", e)))?;
        let staff = load_staff(&conn)
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Query: {}", e)))?;

        Ok::<_, (StatusCode, String)>(json!({
            "patients": patients,
            "appointments": appointments,
            "records": records,
            "staff": staff,
        }))
    })
    .await
    .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Task join: {}", e)))??;

    Ok(Json(payload))
}

/// POST /api/bulk (authenticated)
/// Replace all four tables with the submitted snapshot, atomically.
pub async fn bulk_replace(
    State(state): State<AppState>,
    claims: Claims,
    Json(payload): Json<BulkPayload>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let db = state.db.clone();
    let actor_id = claims.sub.clone();

    let counts = tokio::task::spawn_blocking(move || {
        let mut conn = db
            .lock()
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("DB lock: {}", e)))?;

        let counts = (
            payload.patients.len(),
            payload.appointments.len(),
            payload.records.len(),
            payload.staff.len(),
        );

        let tx = conn
            .transaction()
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Tx: {}", e)))?;
        replace_tables(&tx, &payload)
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Bulk save: {}", e)))?;
        tx.commit()
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Commit: {}", e)))?;

        crate::audit::record(
            &conn,
            Some(&actor_id),
            "BULK_SAVE",
            None,
            None,
            &json!({
                "patients": counts.0,
                "appointments": counts.1,
                "records": counts.2,
                "staff": counts.3,
            }),
        );

        Ok::<_, (StatusCode, String)>(counts)
    })
    .await
    .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Task join: {}", e)))??;

    tracing::debug!(
        patients = counts.0,
        appointments = counts.1,
        records = counts.2,
        staff = counts.3,
        "bulk snapshot saved"
    );

    Ok(Json(json!({"message": "Data saved"})))
}

fn replace_tables(
    tx: &rusqlite::Transaction<'_>,
    payload: &BulkPayload,
) -> Result<(), rusqlite::Error> {
    tx.execute("DELETE FROM patients", [])?;
    tx.execute("DELETE FROM appointments", [])?;
    tx.execute("DELETE FROM records", [])?;
    tx.execute("DELETE FROM staff", [])?;

    {
        let mut stmt = tx.prepare(
            "INSERT INTO patients (id, first_name, last_name, dob, gender, phone, address,
                                   emergency_contact, blood_group, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        )?;
        for p in &payload.patients {
            stmt.execute(rusqlite::params![
                p.id,
                p.first_name,
                p.last_name,
                p.dob,
                p.gender,
                p.phone,
                p.address,
                p.emergency_contact,
                p.blood_group,
                p.status,
            ])?;
        }
    }

    {
        let mut stmt = tx.prepare(
            "INSERT INTO appointments (id, patient_id, patient_name, doctor, date, time,
                                       reason, status, notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )?;
        for a in &payload.appointments {
            stmt.execute(rusqlite::params![
                a.id,
                a.patient_id,
                a.patient_name,
                a.doctor,
                a.date,
                a.time,
                a.reason,
                a.status,
                a.notes,
            ])?;
        }
    }

    {
        let mut stmt = tx.prepare(
            "INSERT INTO records (id, patient_id, patient_name, doctor, date, diagnosis,
                                  treatment, prescription, vitals, notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        )?;
        for r in &payload.records {
            stmt.execute(rusqlite::params![
                r.id,
                r.patient_id,
                r.patient_name,
                r.doctor,
                r.date,
                r.diagnosis,
                r.treatment,
                r.prescription,
                r.vitals,
                r.notes,
            ])?;
        }
    }

    {
        let mut stmt = tx.prepare(
            "INSERT INTO staff (id, first_name, last_name, role, department, phone, email,
                                address, join_date, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        )?;
        for s in &payload.staff {
            stmt.execute(rusqlite::params![
                s.id,
                s.first_name,
                s.last_name,
                s.role,
                s.department,
                s.phone,
                s.email,
                s.address,
                s.join_date,
                s.status,
            ])?;
        }
    }

    Ok(())
}

fn load_patients(conn: &rusqlite::Connection) -> Result<Vec<Patient>, rusqlite::Error> {
    let mut stmt = conn.prepare(
        "SELECT id, first_name, last_name, dob, gender, phone, address,
                emergency_contact, blood_group, status
         FROM patients",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(Patient {
            id: row.get(0)?,
            first_name: row.get(1)?,
            last_name: row.get(2)?,
            dob: row.get(3)?,
            gender: row.get(4)?,
            phone: row.get(5)?,
            address: row.get(6)?,
            emergency_contact: row.get(7)?,
            blood_group: row.get(8)?,
            status: row.get(9)?,
        })
    })?;
    rows.collect()
}

fn load_appointments(conn: &rusqlite::Connection) -> Result<Vec<Appointment>, rusqlite::Error> {
    let mut stmt = conn.prepare(
        "SELECT id, patient_id, patient_name, doctor, date, time, reason, status, notes
         FROM appointments",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(Appointment {
            id: row.get(0)?,
            patient_id: row.get(1)?,
            patient_name: row.get(2)?,
            doctor: row.get(3)?,
            date: row.get(4)?,
            time: row.get(5)?,
            reason: row.get(6)?,
            status: row.get(7)?,
            notes: row.get(8)?,
        })
    })?;
    rows.collect()
}

fn load_records(conn: &rusqlite::Connection) -> Result<Vec<MedicalRecord>, rusqlite::Error> {
    let mut stmt = conn.prepare(
        "SELECT id, patient_id, patient_name, doctor, date, diagnosis, treatment,
                prescription, vitals, notes
         FROM records",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(MedicalRecord {
            id: row.get(0)?,
            patient_id: row.get(1)?,
            patient_name: row.get(2)?,
            doctor: row.get(3)?,
            date: row.get(4)?,
            diagnosis: row.get(5)?,
            treatment: row.get(6)?,
            prescription: row.get(7)?,
            vitals: row.get(8)?,
            notes: row.get(9)?,
        })
    })?;
    rows.collect()
}

fn load_staff(conn: &rusqlite::Connection) -> Result<Vec<StaffMember>, rusqlite::Error> {
    let mut stmt = conn.prepare(
        "SELECT id, first_name, last_name, role, department, phone, email, address,
                join_date, status
         FROM staff",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(StaffMember {
            id: row.get(0)?,
            first_name: row.get(1)?,
            last_name: row.get(2)?,
            role: row.get(3)?,
            department: row.get(4)?,
            phone: row.get(5)?,
            email: row.get(6)?,
            address: row.get(7)?,
            join_date: row.get(8)?,
            status: row.get(9)?,
        })
    })?;
    rows.collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::migrations;
    use rusqlite::Connection;

    fn test_conn() -> Connection {
        let mut conn = Connection::open_in_memory().unwrap();
        migrations().to_latest(&mut conn).unwrap();
        conn
    }

    #[test]
    fn bulk_replace_is_atomic_snapshot() {
        let mut conn = test_conn();

        let payload = BulkPayload {
            patients: vec![Patient {
                id: Some(1),
                first_name: Some("Ada".into()),
                last_name: Some("Lovelace".into()),
                dob: None,
                gender: None,
                phone: None,
                address: None,
                emergency_contact: None,
                blood_group: Some("O+".into()),
                status: Some("active".into()),
            }],
            appointments: vec![],
            records: vec![],
            staff: vec![],
        };

        let tx = conn.transaction().unwrap();
        replace_tables(&tx, &payload).unwrap();
        tx.commit().unwrap();

        let patients = load_patients(&conn).unwrap();
        assert_eq!(patients.len(), 1);
        assert_eq!(patients[0].first_name.as_deref(), Some("Ada"));

        // A second snapshot fully replaces the first
        let empty = BulkPayload::default();
        let tx = conn.transaction().unwrap();
        replace_tables(&tx, &empty).unwrap();
        tx.commit().unwrap();
        assert!(load_patients(&conn).unwrap().is_empty());
    }

    #[test]
    fn camel_case_payload_deserializes() {
        let payload: BulkPayload = serde_json::from_str(
            r#"{"patients": [{"id": 2, "firstName": "Grace", "lastName": "Hopper"}],
                "staff": [{"id": 1, "firstName": "Jean", "joinDate": "2024-01-01"}]}"#,
        )
        .unwrap();
        assert_eq!(payload.patients[0].first_name.as_deref(), Some("Grace"));
        assert_eq!(payload.staff[0].join_date.as_deref(), Some("2024-01-01"));
        assert!(payload.appointments.is_empty());
    }
}
