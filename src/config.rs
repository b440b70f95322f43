use std::env;
use std::path::PathBuf;

use crate::entry::SelectionMode;
use crate::persist;

const DEFAULT_WHATSAPP_PHONE: &str = "5215512345678";
const DEFAULT_DB_FILE: &str = "submissions.sqlite";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkKind {
    Store,
    WhatsApp,
}

impl SinkKind {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "store" | "db" | "sqlite" => Some(SinkKind::Store),
            "whatsapp" | "wa" | "link" => Some(SinkKind::WhatsApp),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub catalog_path: Option<PathBuf>,
    pub sink: SinkKind,
    pub whatsapp_phone: String,
    pub db_path: PathBuf,
    pub mode: SelectionMode,
    pub open_cmd: Option<String>,
}

impl Config {
    /// Loads `.env.local` and `.env` (if present) before reading the process env.
    pub fn from_env() -> Self {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|val| !val.trim().is_empty());
        Self {
            catalog_path: non_empty("QUINIELA_CATALOG").map(PathBuf::from),
            sink: non_empty("QUINIELA_SINK")
                .and_then(|val| SinkKind::parse(&val))
                .unwrap_or(SinkKind::Store),
            whatsapp_phone: non_empty("QUINIELA_WHATSAPP_PHONE")
                .unwrap_or_else(|| DEFAULT_WHATSAPP_PHONE.to_string()),
            db_path: non_empty("QUINIELA_DB")
                .map(PathBuf::from)
                .or_else(persist::default_db_path)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_FILE)),
            mode: non_empty("QUINIELA_MODE")
                .and_then(|val| SelectionMode::parse(&val))
                .unwrap_or(SelectionMode::Single),
            open_cmd: non_empty("QUINIELA_OPEN_CMD"),
        }
    }
}
