use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticipantField {
    Name,
    Phone,
}

impl fmt::Display for ParticipantField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParticipantField::Name => f.write_str("name"),
            ParticipantField::Phone => f.write_str("phone"),
        }
    }
}

/// Recoverable form errors. Every variant is surfaced as a notice and leaves
/// the session untouched (except for clearing the pending flag on sink rejection).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("participant info incomplete: {} required", join_fields(.missing))]
    IncompleteParticipantInfo { missing: Vec<ParticipantField> },
    #[error("not all matches have a prediction ({} missing: {})", .missing.len(), .missing.join(", "))]
    IncompleteEntry { missing: Vec<String> },
    #[error("nothing to submit: add at least one prediction")]
    EmptySubmission,
    #[error("submission failed: {0}")]
    SinkRejected(String),
    #[error("a submission is already in progress")]
    SubmissionPending,
}

fn join_fields(fields: &[ParticipantField]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" and ")
}
