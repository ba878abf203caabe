//! Database operations for the study tracker
//!
//! Handles SQLite initialization, whole-record CRUD for subjects (stored as
//! JSON documents keyed by id and owner) and the per-owner streak record.

use crate::error::{EngineError, StoreError, StoreResult};
use crate::models::streak::calendar_day;
use crate::models::{QuizAttempt, QuizOutcome, StreakState, Subject, complete_quiz};
use chrono::{DateTime, TimeZone};
use log::{info, warn};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;

/// Opens (or creates) the database file and makes sure the tables exist.
pub fn init_database<P: AsRef<Path>>(path: P) -> StoreResult<Connection> {
    let conn = Connection::open(path)?;
    create_schema(&conn)?;
    Ok(conn)
}

/// Creates the subject and streak tables.
pub fn create_schema(conn: &Connection) -> StoreResult<()> {
    // seq keeps insertion order for listing
    conn.execute(
        "CREATE TABLE IF NOT EXISTS subjects (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            id TEXT NOT NULL UNIQUE,
            owner_id TEXT NOT NULL,
            body TEXT NOT NULL
        )",
        (),
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_subjects_owner ON subjects(owner_id)",
        (),
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS streaks (
            owner_id TEXT PRIMARY KEY,
            count INTEGER NOT NULL DEFAULT 0,
            last_date TEXT NOT NULL DEFAULT ''
        )",
        (),
    )?;

    Ok(())
}

fn parse_subject(body: &str) -> StoreResult<Subject> {
    Subject::from_json(body).map_err(|e| {
        warn!("rejecting stored subject: {}", e);
        StoreError::from(e)
    })
}

/// Retrieves all subjects of an owner in creation order
pub fn get_subjects(owner_id: &str, conn: &Connection) -> StoreResult<Vec<Subject>> {
    let mut stmt = conn.prepare("SELECT body FROM subjects WHERE owner_id = ?1 ORDER BY seq")?;

    let bodies = stmt
        .query_map(params![owner_id], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;

    bodies.iter().map(|body| parse_subject(body)).collect()
}

pub fn get_subject(subject_id: &str, conn: &Connection) -> StoreResult<Subject> {
    let body: Option<String> = conn
        .query_row(
            "SELECT body FROM subjects WHERE id = ?1",
            params![subject_id],
            |row| row.get(0),
        )
        .optional()?;

    match body {
        Some(body) => parse_subject(&body),
        None => Err(StoreError::NotFound(format!("subject {}", subject_id))),
    }
}

/// Inserts a new subject. Fails if a subject with the same id exists.
pub fn create_subject(subject: &Subject, conn: &Connection) -> StoreResult<()> {
    subject.validate()?;
    let body = serde_json::to_string(subject)?;

    conn.execute(
        "INSERT INTO subjects (id, owner_id, body) VALUES (?1, ?2, ?3)",
        params![subject.id, subject.owner_id, body],
    )?;

    info!("subject '{}' created", subject.name);
    Ok(())
}

/// Replaces the whole stored record of an existing subject. Only a subject
/// stored under the same owner is replaced; ownership never changes.
pub fn update_subject(subject: &Subject, conn: &Connection) -> StoreResult<()> {
    subject.validate()?;
    let body = serde_json::to_string(subject)?;

    let changed = conn.execute(
        "UPDATE subjects SET body = ?1 WHERE id = ?2 AND owner_id = ?3",
        params![body, subject.id, subject.owner_id],
    )?;

    if changed == 0 {
        return Err(StoreError::NotFound(format!("subject {}", subject.id)));
    }
    info!("subject '{}' updated", subject.name);
    Ok(())
}

/// Deletes a subject and its topics. Deleting a missing id is not an error.
pub fn delete_subject(subject_id: &str, conn: &Connection) -> StoreResult<()> {
    let deleted = conn.execute("DELETE FROM subjects WHERE id = ?1", params![subject_id])?;
    if deleted > 0 {
        info!("subject {} deleted", subject_id);
    }
    Ok(())
}

/// Stores an imported subject under `owner_id`. A subject the owner already
/// has is replaced; an id held by another owner gets a fresh id instead.
pub fn save_imported_subject(
    mut subject: Subject,
    owner_id: &str,
    conn: &Connection,
) -> StoreResult<Subject> {
    subject.owner_id = owner_id.to_string();

    match get_subject(&subject.id, conn) {
        Ok(existing) if existing.owner_id == owner_id => update_subject(&subject, conn)?,
        Ok(_) => {
            warn!("subject id {} belongs to another owner, assigning a new id", subject.id);
            subject.id = uuid::Uuid::new_v4().to_string();
            create_subject(&subject, conn)?;
        }
        Err(StoreError::NotFound(_)) => create_subject(&subject, conn)?,
        Err(e) => return Err(e),
    }
    Ok(subject)
}

/// Streak of an owner; an owner without a record has an empty streak.
pub fn load_streak(owner_id: &str, conn: &Connection) -> StoreResult<StreakState> {
    let row: Option<(u32, String)> = conn
        .query_row(
            "SELECT count, last_date FROM streaks WHERE owner_id = ?1",
            params![owner_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    let Some((count, last_date)) = row else {
        return Ok(StreakState::default());
    };

    let last_date = calendar_day::parse(&last_date).map_err(|e| {
        EngineError::InvalidRecord(format!("streak date '{}': {}", last_date, e))
    })?;

    Ok(StreakState { count, last_date })
}

pub fn save_streak(owner_id: &str, streak: &StreakState, conn: &Connection) -> StoreResult<()> {
    conn.execute(
        "INSERT INTO streaks (owner_id, count, last_date) VALUES (?1, ?2, ?3)
         ON CONFLICT(owner_id) DO UPDATE SET count = excluded.count, last_date = excluded.last_date",
        params![owner_id, streak.count, calendar_day::format(streak.last_date)],
    )?;
    Ok(())
}

/// Completes a quiz on a stored topic and writes the updated subject and the
/// owner's streak in a single transaction.
pub fn record_quiz<Tz: TimeZone>(
    subject_id: &str,
    topic_id: &str,
    attempt: QuizAttempt,
    now: &DateTime<Tz>,
    conn: &Connection,
) -> StoreResult<QuizOutcome> {
    let mut subject = get_subject(subject_id, conn)?;
    let topic = subject
        .topic(topic_id)
        .ok_or_else(|| StoreError::NotFound(format!("topic {}", topic_id)))?;

    let streak = load_streak(&subject.owner_id, conn)?;
    let outcome = complete_quiz(topic, &streak, attempt, now)?;
    subject.replace_topic(outcome.topic.clone());

    let tx = conn.unchecked_transaction()?;
    update_subject(&subject, &tx)?;
    save_streak(&subject.owner_id, &outcome.streak, &tx)?;
    tx.commit()?;

    info!(
        "quiz on '{}' recorded, next review in {} days",
        outcome.topic.name, outcome.interval_days
    );
    Ok(outcome)
}
