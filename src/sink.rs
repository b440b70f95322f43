use std::path::PathBuf;
use std::process::Command;
use std::sync::mpsc::{Receiver, Sender};
use std::thread;

use anyhow::{Context, Result, anyhow};
use rusqlite::Connection;

use crate::catalog::Catalog;
use crate::persist;
use crate::serialize::{SubmissionPayload, phone_digits, whatsapp_url};
use crate::state::{Delta, SinkCommand};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkOutcome {
    Accepted(String),
    Rejected(String),
}

/// Receives a finished submission. Runs on the submission worker thread and
/// may block for as long as it needs.
pub trait SubmissionSink: Send {
    fn name(&self) -> &'static str;
    fn submit(&mut self, payload: &SubmissionPayload, tx: &Sender<Delta>) -> SinkOutcome;
}

/// Match ids in the payload that the catalog does not know about.
pub fn unknown_match_ids(catalog: &Catalog, payload: &SubmissionPayload) -> Vec<String> {
    let mut unknown = Vec::new();
    for entry in &payload.entries {
        for id in entry.keys() {
            if !catalog.contains(id) && !unknown.iter().any(|u| u == id) {
                unknown.push(id.to_string());
            }
        }
    }
    unknown
}

fn warn_unknown(catalog: &Catalog, payload: &SubmissionPayload, tx: &Sender<Delta>) {
    for id in unknown_match_ids(catalog, payload) {
        let _ = tx.send(Delta::Log(format!(
            "[WARN] Received prediction for unknown match id: {id}"
        )));
    }
}

pub struct SqliteSink {
    catalog: Catalog,
    db_path: PathBuf,
    conn: Option<Connection>,
}

impl SqliteSink {
    pub fn new(catalog: Catalog, db_path: PathBuf) -> Self {
        Self {
            catalog,
            db_path,
            conn: None,
        }
    }

    pub fn with_connection(catalog: Catalog, conn: Connection) -> Result<Self> {
        persist::init_schema(&conn)?;
        Ok(Self {
            catalog,
            db_path: PathBuf::new(),
            conn: Some(conn),
        })
    }

    fn store(&mut self, payload: &SubmissionPayload) -> Result<i64> {
        if self.conn.is_none() {
            self.conn = Some(persist::open_db(&self.db_path)?);
        }
        let conn = self.conn.as_ref().context("sqlite connection unavailable")?;
        persist::insert_submission(conn, payload)
    }
}

impl SubmissionSink for SqliteSink {
    fn name(&self) -> &'static str {
        "store"
    }

    fn submit(&mut self, payload: &SubmissionPayload, tx: &Sender<Delta>) -> SinkOutcome {
        warn_unknown(&self.catalog, payload, tx);
        match self.store(payload) {
            Ok(id) => {
                let _ = tx.send(Delta::Log(format!("[INFO] Stored submission #{id}")));
                SinkOutcome::Accepted(
                    "Quiniela sent! Your predictions have been recorded.".to_string(),
                )
            }
            Err(err) => SinkOutcome::Rejected(format!("{err:#}")),
        }
    }
}

pub struct DeepLinkSink {
    catalog: Catalog,
    operator_phone: String,
    open_cmd: Option<String>,
}

impl DeepLinkSink {
    pub fn new(catalog: Catalog, operator_phone: &str, open_cmd: Option<String>) -> Self {
        Self {
            catalog,
            operator_phone: operator_phone.to_string(),
            open_cmd,
        }
    }

    pub fn link_for(&self, payload: &SubmissionPayload) -> Result<String> {
        if phone_digits(&self.operator_phone).is_empty() {
            return Err(anyhow!("operator WhatsApp number is not configured"));
        }
        Ok(whatsapp_url(&self.operator_phone, &payload.message()))
    }

    fn open(&self, url: &str) -> Result<()> {
        let Some(cmd) = self.open_cmd.as_deref() else {
            return Ok(());
        };
        let status = Command::new(cmd)
            .arg(url)
            .status()
            .with_context(|| format!("run {cmd}"))?;
        if !status.success() {
            return Err(anyhow!("{cmd} exited with {status}"));
        }
        Ok(())
    }
}

impl SubmissionSink for DeepLinkSink {
    fn name(&self) -> &'static str {
        "whatsapp"
    }

    fn submit(&mut self, payload: &SubmissionPayload, tx: &Sender<Delta>) -> SinkOutcome {
        warn_unknown(&self.catalog, payload, tx);
        let url = match self.link_for(payload) {
            Ok(url) => url,
            Err(err) => return SinkOutcome::Rejected(err.to_string()),
        };
        let _ = tx.send(Delta::Log(format!("[INFO] WhatsApp link: {url}")));
        match self.open(&url) {
            Ok(()) => SinkOutcome::Accepted(format!("Quiniela ready to send on WhatsApp: {url}")),
            Err(err) => SinkOutcome::Rejected(format!("{err:#}")),
        }
    }
}

/// Owns the sink on a background thread; one command at a time, each answered
/// with `Delta::SubmissionFinished`.
pub fn spawn_submission_worker(
    mut sink: Box<dyn SubmissionSink>,
    tx: Sender<Delta>,
    cmd_rx: Receiver<SinkCommand>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                SinkCommand::Submit(payload) => {
                    let outcome = sink.submit(&payload, &tx);
                    if tx.send(Delta::SubmissionFinished(outcome)).is_err() {
                        break;
                    }
                }
            }
        }
    })
}
