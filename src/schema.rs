use crate::catalog::Catalog;
use crate::entry::{QuinielaEntry, SelectionMode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRule {
    pub match_id: String,
    pub label: String,
    pub mode: SelectionMode,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleViolation {
    pub match_id: String,
    pub label: String,
    pub message: String,
}

/// Per-match validation rules derived from the catalog. Rebuilt whenever the
/// catalog or the selection mode changes; never assumes a fixed match count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionSchema {
    mode: SelectionMode,
    rules: Vec<MatchRule>,
}

impl PredictionSchema {
    pub fn build(catalog: &Catalog, mode: SelectionMode) -> Self {
        let rules = catalog
            .matches()
            .iter()
            .map(|m| {
                let label = m.label();
                let message = match mode {
                    SelectionMode::Single => format!("Please select a result for {label}."),
                    SelectionMode::Multi => {
                        format!("Please select at least one result for {label}.")
                    }
                };
                MatchRule {
                    match_id: m.id.clone(),
                    label,
                    mode,
                    message,
                }
            })
            .collect();
        Self { mode, rules }
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    pub fn rules(&self) -> &[MatchRule] {
        &self.rules
    }

    pub fn is_stale(&self, catalog: &Catalog, mode: SelectionMode) -> bool {
        self.mode != mode
            || self.rules.len() != catalog.len()
            || self
                .rules
                .iter()
                .zip(catalog.ids())
                .any(|(rule, id)| rule.match_id != id)
    }

    /// Violations in catalog order. A slot fails when it is missing, empty, or
    /// shaped for the other mode.
    pub fn check(&self, entry: &QuinielaEntry) -> Vec<RuleViolation> {
        self.rules
            .iter()
            .filter(|rule| match entry.get(&rule.match_id) {
                Some(sel) => sel.is_empty() || sel.mode() != rule.mode,
                None => true,
            })
            .map(|rule| RuleViolation {
                match_id: rule.match_id.clone(),
                label: rule.label.clone(),
                message: rule.message.clone(),
            })
            .collect()
    }
}
