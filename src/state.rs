// src/state.rs
use crate::services::transcript::Transcript;

/// The identified user. Immutable once created.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    user_id: String,
}

impl Session {
    /// Trims the raw input; `None` when nothing is left.
    pub fn new(raw_user_id: &str) -> Option<Self> {
        let user_id = raw_user_id.trim();
        if user_id.is_empty() {
            None
        } else {
            Some(Self { user_id: user_id.to_string() })
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}

/// Where the widget is in its flow. `AwaitingReply` holds while any send
/// is outstanding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Unidentified,
    Identified,
    AwaitingReply { in_flight: usize },
}

#[derive(Debug, Default)]
pub(crate) struct WidgetState {
    pub(crate) session: Option<Session>,
    pub(crate) transcript: Transcript,
    pub(crate) in_flight: usize,
}

impl WidgetState {
    pub(crate) fn phase(&self) -> Phase {
        match (&self.session, self.in_flight) {
            (None, _) => Phase::Unidentified,
            (Some(_), 0) => Phase::Identified,
            (Some(_), in_flight) => Phase::AwaitingReply { in_flight },
        }
    }
}
