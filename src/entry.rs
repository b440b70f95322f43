use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SelectionValue {
    #[serde(rename = "local")]
    Home,
    #[serde(rename = "tie")]
    Tie,
    #[serde(rename = "visitor")]
    Away,
}

impl SelectionValue {
    pub const ALL: [SelectionValue; 3] = [
        SelectionValue::Home,
        SelectionValue::Tie,
        SelectionValue::Away,
    ];

    pub fn code(self) -> char {
        match self {
            SelectionValue::Home => 'L',
            SelectionValue::Tie => 'E',
            SelectionValue::Away => 'V',
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SelectionValue::Home => "Local",
            SelectionValue::Tie => "Empate",
            SelectionValue::Away => "Visita",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    Single,
    Multi,
}

impl SelectionMode {
    pub fn toggled(self) -> Self {
        match self {
            SelectionMode::Single => SelectionMode::Multi,
            SelectionMode::Multi => SelectionMode::Single,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SelectionMode::Single => "Single",
            SelectionMode::Multi => "Multi",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "single" | "simple" | "1" => Some(SelectionMode::Single),
            "multi" | "multiple" | "2" => Some(SelectionMode::Multi),
            _ => None,
        }
    }
}

/// One match slot. Multi keeps insertion order and never holds duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Selection {
    Single(Option<SelectionValue>),
    Multi(Vec<SelectionValue>),
}

impl Selection {
    pub fn empty(mode: SelectionMode) -> Self {
        match mode {
            SelectionMode::Single => Selection::Single(None),
            SelectionMode::Multi => Selection::Multi(Vec::new()),
        }
    }

    pub fn mode(&self) -> SelectionMode {
        match self {
            Selection::Single(_) => SelectionMode::Single,
            Selection::Multi(_) => SelectionMode::Multi,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Selection::Single(value) => value.is_none(),
            Selection::Multi(values) => values.is_empty(),
        }
    }

    pub fn contains(&self, value: SelectionValue) -> bool {
        match self {
            Selection::Single(current) => *current == Some(value),
            Selection::Multi(values) => values.contains(&value),
        }
    }

    /// Selected values in Home, Tie, Away order.
    pub fn values(&self) -> Vec<SelectionValue> {
        SelectionValue::ALL
            .into_iter()
            .filter(|v| self.contains(*v))
            .collect()
    }

    /// Single replaces, Multi toggles membership.
    pub fn apply(&mut self, value: SelectionValue) {
        match self {
            Selection::Single(current) => *current = Some(value),
            Selection::Multi(values) => {
                if let Some(pos) = values.iter().position(|v| *v == value) {
                    values.remove(pos);
                } else {
                    values.push(value);
                }
            }
        }
    }

    pub fn clear(&mut self) {
        *self = Selection::empty(self.mode());
    }

    /// Re-shapes the slot for `mode`. Returns true when values were dropped
    /// (Multi with more than one value downgraded to Single keeps the first inserted).
    pub fn convert(&mut self, mode: SelectionMode) -> bool {
        let (next, truncated) = match (&*self, mode) {
            (Selection::Single(_), SelectionMode::Single)
            | (Selection::Multi(_), SelectionMode::Multi) => return false,
            (Selection::Single(value), SelectionMode::Multi) => {
                (Selection::Multi(value.iter().copied().collect()), false)
            }
            (Selection::Multi(values), SelectionMode::Single) => {
                (Selection::Single(values.first().copied()), values.len() > 1)
            }
        };
        *self = next;
        truncated
    }
}

/// One prediction sheet: a slot per catalog match, in catalog order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuinielaEntry {
    slots: Vec<(String, Selection)>,
}

impl QuinielaEntry {
    pub fn empty(catalog: &Catalog, mode: SelectionMode) -> Self {
        Self {
            slots: catalog
                .ids()
                .map(|id| (id.to_string(), Selection::empty(mode)))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|(id, _)| id.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Selection)> {
        self.slots.iter().map(|(id, sel)| (id.as_str(), sel))
    }

    pub fn get(&self, match_id: &str) -> Option<&Selection> {
        self.slots
            .iter()
            .find(|(id, _)| id == match_id)
            .map(|(_, sel)| sel)
    }

    fn get_mut(&mut self, match_id: &str) -> Option<&mut Selection> {
        self.slots
            .iter_mut()
            .find(|(id, _)| id == match_id)
            .map(|(_, sel)| sel)
    }

    /// Returns false when `match_id` is not part of this entry.
    pub fn set_selection(&mut self, match_id: &str, value: SelectionValue) -> bool {
        let Some(slot) = self.get_mut(match_id) else {
            return false;
        };
        slot.apply(value);
        true
    }

    pub fn clear_selection(&mut self, match_id: &str) -> bool {
        let Some(slot) = self.get_mut(match_id) else {
            return false;
        };
        slot.clear();
        true
    }

    /// Number of slots that lost values.
    pub fn convert(&mut self, mode: SelectionMode) -> usize {
        self.slots
            .iter_mut()
            .map(|(_, sel)| sel.convert(mode))
            .filter(|truncated| *truncated)
            .count()
    }

    /// Re-keys to `catalog`, keeping selections of ids that survive.
    pub fn rekey(&mut self, catalog: &Catalog, mode: SelectionMode) {
        let mut previous = std::mem::take(&mut self.slots);
        self.slots = catalog
            .ids()
            .map(|id| {
                let mut sel = previous
                    .iter()
                    .position(|(old, _)| old == id)
                    .map(|pos| previous.swap_remove(pos).1)
                    .unwrap_or_else(|| Selection::empty(mode));
                sel.convert(mode);
                (id.to_string(), sel)
            })
            .collect();
    }

    pub fn filled_count(&self) -> usize {
        self.slots.iter().filter(|(_, sel)| !sel.is_empty()).count()
    }
}
