use serde_json::{Map, Value, json};

use crate::catalog::Catalog;
use crate::entry::{QuinielaEntry, Selection, SelectionMode};
use crate::error::FormError;
use crate::validate::is_populated;

const WHATSAPP_BASE_URL: &str = "https://wa.me";

/// Snapshot handed to a sink. Owned, so later edits to the session never leak in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionPayload {
    pub participant_name: String,
    pub participant_phone: String,
    pub mode: SelectionMode,
    pub entries: Vec<QuinielaEntry>,
    pub lines: Vec<String>,
    pub match_labels: Vec<String>,
}

impl SubmissionPayload {
    /// Header, prediction lines, then a legend mapping positions to matches.
    pub fn message(&self) -> String {
        let mut out = vec![
            "Quiniela".to_string(),
            format!("Name: {}", self.participant_name),
            format!("Phone: {}", self.participant_phone),
            String::new(),
        ];
        out.extend(self.lines.iter().cloned());
        if !self.match_labels.is_empty() {
            out.push(String::new());
            out.extend(
                self.match_labels
                    .iter()
                    .enumerate()
                    .map(|(idx, label)| format!("{}. {label}", idx + 1)),
            );
        }
        out.join("\n")
    }

    pub fn summary(&self) -> String {
        self.lines.join("\n")
    }
}

pub fn selection_code(selection: &Selection) -> String {
    let values = selection.values();
    if values.is_empty() {
        return "?".to_string();
    }
    values
        .iter()
        .map(|v| v.code().to_string())
        .collect::<Vec<_>>()
        .join("+")
}

pub fn entry_line(number: usize, entry: &QuinielaEntry) -> String {
    let codes = entry
        .iter()
        .map(|(_, sel)| selection_code(sel))
        .collect::<Vec<_>>()
        .join(",");
    format!("Prediction {number}: {codes}")
}

/// Saved entries first, then the active entry when it has any selection.
pub fn build_payload(
    catalog: &Catalog,
    name: &str,
    phone: &str,
    mode: SelectionMode,
    saved: &[QuinielaEntry],
    active: &QuinielaEntry,
) -> Result<SubmissionPayload, FormError> {
    let mut entries = saved.to_vec();
    if is_populated(active) {
        entries.push(active.clone());
    }
    if entries.is_empty() {
        return Err(FormError::EmptySubmission);
    }
    let lines = entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| entry_line(idx + 1, entry))
        .collect();
    Ok(SubmissionPayload {
        participant_name: name.trim().to_string(),
        participant_phone: phone.trim().to_string(),
        mode,
        entries,
        lines,
        match_labels: catalog.matches().iter().map(|m| m.label()).collect(),
    })
}

pub fn whatsapp_url(phone: &str, message: &str) -> String {
    let digits = phone_digits(phone);
    format!(
        "{WHATSAPP_BASE_URL}/{digits}?text={}",
        urlencoding::encode(message)
    )
}

pub fn phone_digits(phone: &str) -> String {
    phone.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Storage shape: one object per entry, match id -> selection.
pub fn predictions_json(payload: &SubmissionPayload) -> Value {
    let entries = payload
        .entries
        .iter()
        .map(|entry| {
            let mut obj = Map::new();
            for (id, sel) in entry.iter() {
                obj.insert(id.to_string(), json!(sel));
            }
            Value::Object(obj)
        })
        .collect::<Vec<_>>();
    json!({
        "name": payload.participant_name,
        "phone": payload.participant_phone,
        "mode": payload.mode,
        "predictions": entries,
    })
}

#[cfg(test)]
mod tests {
    use super::{phone_digits, whatsapp_url};

    #[test]
    fn whatsapp_url_strips_phone_and_encodes_text() {
        let url = whatsapp_url("+52 (55) 1234-5678", "Name: Ana\nPrediction 1: L+E,?");
        assert_eq!(
            url,
            "https://wa.me/525512345678?text=Name%3A%20Ana%0APrediction%201%3A%20L%2BE%2C%3F"
        );
    }

    #[test]
    fn phone_digits_drops_everything_else() {
        assert_eq!(phone_digits("abc"), "");
        assert_eq!(phone_digits(" 55-12 "), "5512");
    }
}
