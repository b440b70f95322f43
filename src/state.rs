use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::catalog::Catalog;
use crate::entry::{QuinielaEntry, SelectionMode, SelectionValue};
use crate::error::FormError;
use crate::schema::PredictionSchema;
use crate::serialize::{SubmissionPayload, build_payload};
use crate::sink::SinkOutcome;
use crate::validate::{is_populated, validate_entry, validate_participant};

const MAX_LOG_LINES: usize = 200;
const NOTICE_TTL: Duration = Duration::from_secs(6);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Name,
    Phone,
    Matches,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub message: String,
    pub shown_at: Instant,
}

#[derive(Debug, Clone)]
pub enum Delta {
    SubmissionFinished(SinkOutcome),
    Log(String),
}

#[derive(Debug, Clone)]
pub enum SinkCommand {
    Submit(SubmissionPayload),
}

/// What an in-flight submission carried, so acceptance only clears that.
#[derive(Debug, Clone)]
struct InFlight {
    entries: Vec<QuinielaEntry>,
    includes_active: bool,
}

#[derive(Debug, Clone)]
pub struct SessionState {
    pub catalog: Catalog,
    pub participant_name: String,
    pub participant_phone: String,
    pub mode: SelectionMode,
    pub active: QuinielaEntry,
    pub saved: Vec<QuinielaEntry>,
    pub schema: PredictionSchema,
    pub submission_pending: bool,
    pub focus: Focus,
    pub selected_match: usize,
    pub selected_value: usize,
    pub help_overlay: bool,
    pub logs: VecDeque<String>,
    pub notice: Option<Notice>,
    in_flight: Option<InFlight>,
}

impl SessionState {
    pub fn new(catalog: Catalog, mode: SelectionMode) -> Self {
        let active = QuinielaEntry::empty(&catalog, mode);
        let schema = PredictionSchema::build(&catalog, mode);
        Self {
            catalog,
            participant_name: String::new(),
            participant_phone: String::new(),
            mode,
            active,
            saved: Vec::new(),
            schema,
            submission_pending: false,
            focus: Focus::Name,
            selected_match: 0,
            selected_value: 0,
            help_overlay: false,
            logs: VecDeque::with_capacity(MAX_LOG_LINES),
            notice: None,
            in_flight: None,
        }
    }

    pub fn set_participant_name(&mut self, name: &str) {
        self.participant_name = name.to_string();
    }

    pub fn set_participant_phone(&mut self, phone: &str) {
        self.participant_phone = phone.to_string();
    }

    pub fn set_selection(&mut self, match_id: &str, value: SelectionValue) -> bool {
        self.active.set_selection(match_id, value)
    }

    pub fn clear_selection(&mut self, match_id: &str) -> bool {
        self.active.clear_selection(match_id)
    }

    pub fn add_active_to_saved(&mut self) -> Result<usize, FormError> {
        let result = self.try_add_active();
        match &result {
            Ok(count) => self.notify(
                NoticeKind::Success,
                "Saved",
                &format!("Prediction {count} added"),
            ),
            Err(err) => self.notify_error(err),
        }
        result
    }

    fn try_add_active(&mut self) -> Result<usize, FormError> {
        validate_participant(&self.participant_name, &self.participant_phone)?;
        if !is_populated(&self.active) {
            return Err(FormError::EmptySubmission);
        }
        self.refresh_schema();
        validate_entry(&self.schema, &self.active)?;
        let fresh = QuinielaEntry::empty(&self.catalog, self.mode);
        let entry = std::mem::replace(&mut self.active, fresh);
        self.saved.push(entry);
        Ok(self.saved.len())
    }

    pub fn remove_last_saved(&mut self) -> Option<QuinielaEntry> {
        let removed = self.saved.pop();
        if removed.is_some() {
            let msg = format!("[INFO] Removed prediction {}", self.saved.len() + 1);
            self.push_log(&msg);
        }
        removed
    }

    pub fn set_mode(&mut self, mode: SelectionMode) {
        if self.mode == mode {
            return;
        }
        self.mode = mode;
        let mut truncated = self.active.convert(mode);
        for entry in &mut self.saved {
            truncated += entry.convert(mode);
        }
        self.refresh_schema();
        let msg = format!("[INFO] Mode set to {}", mode.label());
        self.push_log(&msg);
        if truncated > 0 {
            let msg = format!("[INFO] {truncated} multi-selections truncated to their first value");
            self.push_log(&msg);
        }
    }

    pub fn toggle_mode(&mut self) {
        self.set_mode(self.mode.toggled());
        let msg = format!("Switched to {} selection", self.mode.label());
        self.notify(NoticeKind::Info, "Mode", &msg);
    }

    pub fn set_catalog(&mut self, catalog: Catalog) {
        self.active.rekey(&catalog, self.mode);
        for entry in &mut self.saved {
            entry.rekey(&catalog, self.mode);
        }
        self.catalog = catalog;
        self.selected_match = self
            .selected_match
            .min(self.catalog.len().saturating_sub(1));
        self.refresh_schema();
    }

    /// Captures the payload by value and marks the session as pending.
    pub fn begin_submit(&mut self) -> Result<SubmissionPayload, FormError> {
        let result = self.try_begin_submit();
        if let Err(err) = &result {
            self.notify_error(err);
        }
        result
    }

    fn try_begin_submit(&mut self) -> Result<SubmissionPayload, FormError> {
        if self.submission_pending {
            return Err(FormError::SubmissionPending);
        }
        validate_participant(&self.participant_name, &self.participant_phone)?;
        self.refresh_schema();
        if is_populated(&self.active) {
            validate_entry(&self.schema, &self.active)?;
        }
        let payload = build_payload(
            &self.catalog,
            &self.participant_name,
            &self.participant_phone,
            self.mode,
            &self.saved,
            &self.active,
        )?;
        self.submission_pending = true;
        self.in_flight = Some(InFlight {
            entries: payload.entries.clone(),
            includes_active: is_populated(&self.active),
        });
        let msg = format!(
            "[INFO] Submitting {} prediction(s) for {}",
            payload.entries.len(),
            payload.participant_name
        );
        self.push_log(&msg);
        Ok(payload)
    }

    /// Accepted clears what the payload carried and resets the session once
    /// nothing unsent is left (mode and catalog survive); rejected keeps
    /// everything so the user can retry.
    pub fn finish_submit(&mut self, outcome: SinkOutcome) {
        self.submission_pending = false;
        let in_flight = self.in_flight.take();
        match outcome {
            SinkOutcome::Accepted(message) => {
                self.push_log(&format!("[INFO] {message}"));
                match in_flight {
                    Some(sent) => self.clear_sent(&sent),
                    None => self.reset(),
                }
                self.notify(NoticeKind::Success, "Success", &message);
            }
            SinkOutcome::Rejected(reason) => {
                let err = FormError::SinkRejected(reason);
                self.notify_error(&err);
            }
        }
    }

    /// Drops the saved entries that went out unchanged, and the active entry
    /// when it was sent and not touched since. Anything edited while the
    /// submission was pending stays.
    fn clear_sent(&mut self, sent: &InFlight) {
        let matched = self
            .saved
            .iter()
            .zip(&sent.entries)
            .take_while(|(kept, out)| kept == out)
            .count();
        self.saved.drain(..matched);
        if sent.includes_active
            && matched < sent.entries.len()
            && sent.entries.last() == Some(&self.active)
        {
            self.active = QuinielaEntry::empty(&self.catalog, self.mode);
        }
        if self.saved.is_empty() && !is_populated(&self.active) {
            self.reset();
        } else {
            let kept = self.saved.len() + usize::from(is_populated(&self.active));
            self.push_log(&format!(
                "[INFO] Kept {kept} prediction(s) edited while sending"
            ));
        }
    }

    pub fn reset(&mut self) {
        self.participant_name.clear();
        self.participant_phone.clear();
        self.active = QuinielaEntry::empty(&self.catalog, self.mode);
        self.saved.clear();
        self.focus = Focus::Name;
        self.selected_match = 0;
        self.selected_value = 0;
    }

    fn refresh_schema(&mut self) {
        if self.schema.is_stale(&self.catalog, self.mode) {
            self.schema = PredictionSchema::build(&self.catalog, self.mode);
        }
    }

    pub fn selected_match_id(&self) -> Option<String> {
        self.catalog
            .matches()
            .get(self.selected_match)
            .map(|m| m.id.clone())
    }

    pub fn select_next(&mut self) {
        if self.selected_match + 1 < self.catalog.len() {
            self.selected_match += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected_match = self.selected_match.saturating_sub(1);
    }

    pub fn select_value_next(&mut self) {
        self.selected_value = (self.selected_value + 1).min(SelectionValue::ALL.len() - 1);
    }

    pub fn select_value_prev(&mut self) {
        self.selected_value = self.selected_value.saturating_sub(1);
    }

    pub fn toggle_selected(&mut self) {
        let Some(id) = self.selected_match_id() else {
            return;
        };
        let value = SelectionValue::ALL[self.selected_value.min(SelectionValue::ALL.len() - 1)];
        self.set_selection(&id, value);
    }

    pub fn cycle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Name => Focus::Phone,
            Focus::Phone => Focus::Matches,
            Focus::Matches => Focus::Name,
        };
    }

    pub fn focused_input_mut(&mut self) -> Option<&mut String> {
        match self.focus {
            Focus::Name => Some(&mut self.participant_name),
            Focus::Phone => Some(&mut self.participant_phone),
            Focus::Matches => None,
        }
    }

    pub fn push_log(&mut self, msg: &str) {
        if self.logs.len() >= MAX_LOG_LINES {
            self.logs.pop_front();
        }
        self.logs.push_back(msg.to_string());
    }

    pub fn notify(&mut self, kind: NoticeKind, title: &str, message: &str) {
        self.notice = Some(Notice {
            kind,
            title: title.to_string(),
            message: message.to_string(),
            shown_at: Instant::now(),
        });
    }

    fn notify_error(&mut self, err: &FormError) {
        let msg = format!("[WARN] {err}");
        self.push_log(&msg);
        self.notify(NoticeKind::Error, "Error", &err.to_string());
    }

    pub fn expire_notice(&mut self, now: Instant) {
        if self
            .notice
            .as_ref()
            .is_some_and(|n| now.duration_since(n.shown_at) >= NOTICE_TTL)
        {
            self.notice = None;
        }
    }
}

pub fn apply_delta(state: &mut SessionState, delta: Delta) {
    match delta {
        Delta::SubmissionFinished(outcome) => state.finish_submit(outcome),
        Delta::Log(msg) => state.push_log(&msg),
    }
}
