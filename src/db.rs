// 💾 Persistence Collaborator - SQLite storage for athletes and audit events
// The engine treats persistence as an opaque read/replace boundary: it
// reads a full athlete, computes new state, writes the full athlete back.
// Enrollment history is serialized as a JSON array of record objects in a
// single column; no partial updates are ever issued.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::entities::athlete::{Athlete, LifecycleStatus};
use crate::entities::guardian::Guardian;
use crate::record::{CategoryTier, EnrollmentRecord};

// ============================================================================
// SCHEMA
// ============================================================================

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS athletes (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            category TEXT NOT NULL,
            lifecycle_status TEXT NOT NULL,
            guardian_id TEXT,
            registered_at TEXT NOT NULL,
            -- Ordered record sequence, one JSON object per record
            enrollment_history TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS guardians (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            phone TEXT
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS events (
            event_id TEXT PRIMARY KEY,
            timestamp TEXT NOT NULL,
            event_type TEXT NOT NULL,
            entity_type TEXT NOT NULL,
            entity_id TEXT NOT NULL,
            data TEXT NOT NULL,
            actor TEXT NOT NULL
        )",
        [],
    )?;

    Ok(())
}

// ============================================================================
// ATHLETES
// ============================================================================

/// Full-athlete write: inserts or replaces the whole row, enrollment
/// history included. The engine never issues partial updates.
pub fn save_athlete(
    conn: &Connection,
    athlete: &Athlete,
    history: &[EnrollmentRecord],
) -> Result<()> {
    let history_json =
        serde_json::to_string(history).context("Failed to serialize enrollment history")?;

    conn.execute(
        "INSERT OR REPLACE INTO athletes (
            id, name, category, lifecycle_status, guardian_id,
            registered_at, enrollment_history
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            athlete.id,
            athlete.name,
            athlete.category.as_str(),
            athlete.lifecycle_status.as_str(),
            athlete.guardian_id,
            athlete.registered_at.to_rfc3339(),
            history_json,
        ],
    )?;

    Ok(())
}

/// Load one athlete and its ordered enrollment history.
pub fn load_athlete(
    conn: &Connection,
    id: &str,
) -> Result<Option<(Athlete, Vec<EnrollmentRecord>)>> {
    conn.query_row(
        "SELECT id, name, category, lifecycle_status, guardian_id,
                registered_at, enrollment_history
         FROM athletes WHERE id = ?1",
        params![id],
        athlete_from_row,
    )
    .optional()
    .context("Failed to load athlete")
}

/// Load every athlete with its history, ordered by name for display.
pub fn load_all_athletes(conn: &Connection) -> Result<Vec<(Athlete, Vec<EnrollmentRecord>)>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, category, lifecycle_status, guardian_id,
                registered_at, enrollment_history
         FROM athletes ORDER BY name",
    )?;

    let athletes = stmt
        .query_map([], athlete_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(athletes)
}

fn athlete_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<(Athlete, Vec<EnrollmentRecord>)> {
    let category_str: String = row.get(2)?;
    let status_str: String = row.get(3)?;
    let registered_str: String = row.get(5)?;
    let history_json: String = row.get(6)?;

    let athlete = Athlete {
        id: row.get(0)?,
        name: row.get(1)?,
        category: CategoryTier::parse(&category_str).ok_or(rusqlite::Error::InvalidQuery)?,
        lifecycle_status: LifecycleStatus::parse(&status_str)
            .ok_or(rusqlite::Error::InvalidQuery)?,
        guardian_id: row.get(4)?,
        registered_at: DateTime::parse_from_rfc3339(&registered_str)
            .map_err(|_| rusqlite::Error::InvalidQuery)?
            .with_timezone(&Utc),
    };

    let history: Vec<EnrollmentRecord> =
        serde_json::from_str(&history_json).map_err(|_| rusqlite::Error::InvalidQuery)?;

    Ok((athlete, history))
}

// ============================================================================
// GUARDIANS
// ============================================================================

pub fn insert_guardian(conn: &Connection, guardian: &Guardian) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO guardians (id, name, phone) VALUES (?1, ?2, ?3)",
        params![guardian.id, guardian.name, guardian.phone],
    )?;
    Ok(())
}

pub fn find_guardian_by_id(conn: &Connection, id: &str) -> Result<Option<Guardian>> {
    conn.query_row(
        "SELECT id, name, phone FROM guardians WHERE id = ?1",
        params![id],
        |row| {
            Ok(Guardian {
                id: row.get(0)?,
                name: row.get(1)?,
                phone: row.get(2)?,
            })
        },
    )
    .optional()
    .context("Failed to look up guardian")
}

// ============================================================================
// AUDIT EVENTS
// ============================================================================

/// Audit trail event: every engine mutation produces one.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AuditEvent {
    pub event_id: String,
    pub timestamp: DateTime<Utc>,
    pub event_type: String,
    pub entity_type: String,
    pub entity_id: String,
    pub data: serde_json::Value,
    pub actor: String,
}

impl AuditEvent {
    pub fn new(
        event_type: &str,
        entity_type: &str,
        entity_id: &str,
        data: serde_json::Value,
        actor: &str,
    ) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            event_type: event_type.to_string(),
            entity_type: entity_type.to_string(),
            entity_id: entity_id.to_string(),
            data,
            actor: actor.to_string(),
        }
    }
}

pub fn insert_event(conn: &Connection, event: &AuditEvent) -> Result<()> {
    let data_json = serde_json::to_string(&event.data)?;

    conn.execute(
        "INSERT INTO events (
            event_id, timestamp, event_type, entity_type, entity_id, data, actor
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            event.event_id,
            event.timestamp.to_rfc3339(),
            event.event_type,
            event.entity_type,
            event.entity_id,
            data_json,
            event.actor,
        ],
    )?;

    Ok(())
}

pub fn get_events_for_entity(
    conn: &Connection,
    entity_type: &str,
    entity_id: &str,
) -> Result<Vec<AuditEvent>> {
    let mut stmt = conn.prepare(
        "SELECT event_id, timestamp, event_type, entity_type, entity_id, data, actor
         FROM events
         WHERE entity_type = ?1 AND entity_id = ?2
         ORDER BY timestamp DESC",
    )?;

    let events = stmt
        .query_map(params![entity_type, entity_id], |row| {
            let timestamp_str: String = row.get(1)?;
            let data_json: String = row.get(5)?;

            Ok(AuditEvent {
                event_id: row.get(0)?,
                timestamp: DateTime::parse_from_rfc3339(&timestamp_str)
                    .map_err(|_| rusqlite::Error::InvalidQuery)?
                    .with_timezone(&Utc),
                event_type: row.get(2)?,
                entity_type: row.get(3)?,
                entity_id: row.get(4)?,
                data: serde_json::from_str(&data_json)
                    .map_err(|_| rusqlite::Error::InvalidQuery)?,
                actor: row.get(6)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(events)
}

// ============================================================================
// ROSTER IMPORT
// ============================================================================

/// One row of a roster CSV as the foundation exports it.
#[derive(Debug, Deserialize)]
pub struct RosterRow {
    #[serde(rename = "Name")]
    pub name: String,

    #[serde(rename = "Category")]
    pub category: String,

    #[serde(rename = "Status")]
    pub status: String,

    #[serde(rename = "Guardian", default)]
    pub guardian: Option<String>,
}

/// Load a roster CSV into athlete rows. Invalid category or status values
/// fail the import with the offending line named.
pub fn load_roster_csv(csv_path: &Path) -> Result<Vec<(Athlete, Option<String>)>> {
    let mut rdr = csv::Reader::from_path(csv_path).context("Failed to open roster CSV")?;

    let mut athletes = Vec::new();

    for (index, result) in rdr.deserialize().enumerate() {
        let row: RosterRow = result.context("Failed to deserialize roster row")?;
        let line = index + 2; // header is line 1

        let category = CategoryTier::parse(&row.category)
            .with_context(|| format!("Line {}: unknown category '{}'", line, row.category))?;
        let status = LifecycleStatus::parse(&row.status)
            .with_context(|| format!("Line {}: unknown status '{}'", line, row.status))?;

        let mut athlete = Athlete::new(row.name.trim().to_string(), category, None);
        athlete.lifecycle_status = status;

        athletes.push((athlete, row.guardian.filter(|g| !g.trim().is_empty())));
    }

    Ok(athletes)
}

// ============================================================================
// TESTS
// ============================================================================
