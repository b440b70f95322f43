use crate::entry::QuinielaEntry;
use crate::error::{FormError, ParticipantField};
use crate::schema::PredictionSchema;

pub fn validate_participant(name: &str, phone: &str) -> Result<(), FormError> {
    let mut missing = Vec::new();
    if name.trim().is_empty() {
        missing.push(ParticipantField::Name);
    }
    if phone.trim().is_empty() {
        missing.push(ParticipantField::Phone);
    }
    if missing.is_empty() {
        Ok(())
    } else {
        Err(FormError::IncompleteParticipantInfo { missing })
    }
}

/// Strict completeness: every match in the schema needs at least one outcome.
/// Used for both adding an entry and submitting.
pub fn validate_entry(schema: &PredictionSchema, entry: &QuinielaEntry) -> Result<(), FormError> {
    let violations = schema.check(entry);
    if violations.is_empty() {
        return Ok(());
    }
    Err(FormError::IncompleteEntry {
        missing: violations.into_iter().map(|v| v.label).collect(),
    })
}

pub fn is_populated(entry: &QuinielaEntry) -> bool {
    entry.iter().any(|(_, sel)| !sel.is_empty())
}
