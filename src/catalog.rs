use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use once_cell::sync::OnceCell;
use serde::Deserialize;

const EMBEDDED_CATALOG: &str = include_str!("../data/matches.json");

static EMBEDDED: OnceCell<Catalog> = OnceCell::new();

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MatchDescriptor {
    pub id: String,
    #[serde(rename = "localTeam", alias = "homeName")]
    pub home_name: String,
    #[serde(rename = "visitorTeam", alias = "awayName")]
    pub away_name: String,
    #[serde(rename = "localLogoUrl", alias = "homeLogoRef", default)]
    pub home_logo_ref: String,
    #[serde(rename = "visitorLogoUrl", alias = "awayLogoRef", default)]
    pub away_logo_ref: String,
}

impl MatchDescriptor {
    pub fn new(id: &str, home: &str, away: &str) -> Self {
        Self {
            id: id.to_string(),
            home_name: home.to_string(),
            away_name: away.to_string(),
            home_logo_ref: String::new(),
            away_logo_ref: String::new(),
        }
    }

    pub fn label(&self) -> String {
        format!("{} vs {}", self.home_name, self.away_name)
    }

    /// Two-letter badge, used where a logo would be shown.
    pub fn short(name: &str) -> String {
        name.chars().take(2).collect::<String>().to_uppercase()
    }
}

/// Ordered, immutable list of matches for the current round.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    matches: Vec<MatchDescriptor>,
}

impl Catalog {
    pub fn new(matches: Vec<MatchDescriptor>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(matches.len());
        for m in &matches {
            let id = m.id.trim();
            if id.is_empty() {
                return Err(anyhow!("match with empty id ({})", m.label()));
            }
            if !seen.insert(id.to_string()) {
                return Err(anyhow!("duplicate match id in catalog: {id}"));
            }
        }
        Ok(Self { matches })
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let matches: Vec<MatchDescriptor> =
            serde_json::from_str(raw).context("parse match catalog json")?;
        Self::new(matches)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read match catalog {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("load match catalog {}", path.display()))
    }

    pub fn embedded() -> Result<&'static Catalog> {
        EMBEDDED.get_or_try_init(|| Self::from_json(EMBEDDED_CATALOG))
    }

    pub fn matches(&self) -> &[MatchDescriptor] {
        &self.matches
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&MatchDescriptor> {
        self.matches.iter().find(|m| m.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.matches.iter().map(|m| m.id.as_str())
    }
}
