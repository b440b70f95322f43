use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use rusqlite::{Connection, params};
use serde::Deserialize;

use crate::entry::{Selection, SelectionMode};
use crate::serialize::{SubmissionPayload, predictions_json};

const DATA_DIR: &str = "quiniela_terminal";
const DB_FILE: &str = "submissions.sqlite";

#[derive(Debug, Clone)]
pub struct StoredSubmission {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub mode: String,
    pub predictions_json: String,
    pub summary: String,
    pub created_at: String,
}

/// The `predictions_json` column read back into typed selections.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoredPredictions {
    pub name: String,
    pub phone: String,
    pub mode: SelectionMode,
    pub predictions: Vec<BTreeMap<String, Selection>>,
}

impl StoredSubmission {
    pub fn predictions(&self) -> Result<StoredPredictions> {
        serde_json::from_str(&self.predictions_json)
            .with_context(|| format!("decode predictions of submission #{}", self.id))
    }
}

pub fn default_db_path() -> Option<PathBuf> {
    if let Ok(base) = std::env::var("XDG_DATA_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(DATA_DIR).join(DB_FILE));
        }
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(
        PathBuf::from(home)
            .join(".local")
            .join("share")
            .join(DATA_DIR)
            .join(DB_FILE),
    )
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let conn =
        Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        CREATE TABLE IF NOT EXISTS submissions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            phone TEXT NOT NULL,
            mode TEXT NOT NULL,
            predictions_json TEXT NOT NULL,
            summary TEXT NOT NULL,
            created_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_submissions_created ON submissions(created_at);
        "#,
    )
    .context("create sqlite schema")?;
    Ok(())
}

pub fn insert_submission(conn: &Connection, payload: &SubmissionPayload) -> Result<i64> {
    let predictions = serde_json::to_string(&predictions_json(payload))
        .context("serialize predictions")?;
    let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    conn.execute(
        "INSERT INTO submissions (name, phone, mode, predictions_json, summary, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            payload.participant_name,
            payload.participant_phone,
            payload.mode.label().to_lowercase(),
            predictions,
            payload.summary(),
            created_at,
        ],
    )
    .context("insert submission")?;
    Ok(conn.last_insert_rowid())
}

/// Newest first.
pub fn list_submissions(conn: &Connection, limit: usize) -> Result<Vec<StoredSubmission>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, name, phone, mode, predictions_json, summary, created_at
             FROM submissions ORDER BY id DESC LIMIT ?1",
        )
        .context("prepare submissions query")?;
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    let rows = stmt
        .query_map(params![limit], |row| {
            Ok(StoredSubmission {
                id: row.get(0)?,
                name: row.get(1)?,
                phone: row.get(2)?,
                mode: row.get(3)?,
                predictions_json: row.get(4)?,
                summary: row.get(5)?,
                created_at: row.get(6)?,
            })
        })
        .context("query submissions")?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row.context("read submission row")?);
    }
    Ok(out)
}
