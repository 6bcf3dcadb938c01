// src/services/render.rs
use crate::message::ChatMessage;
use crate::state::Phase;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Line {
    pub sender: String,
    pub text: String,
}

impl std::fmt::Display for Line {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.sender, self.text)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum View {
    /// The user id form.
    Identification,
    /// Transcript lines in display order, plus the message input.
    Conversation { lines: Vec<Line> },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderOp {
    ShowIdentification,
    /// Replace whatever is shown with an empty conversation view.
    ShowConversation,
    AppendLine(Line),
}

pub fn render(phase: Phase, transcript: &[ChatMessage]) -> View {
    match phase {
        Phase::Unidentified => View::Identification,
        Phase::Identified | Phase::AwaitingReply { .. } => View::Conversation {
            lines: transcript
                .iter()
                .map(|m| Line { sender: m.sender_label().to_string(), text: m.text.clone() })
                .collect(),
        },
    }
}

/// Operations turning what the host shows (`previous`) into `next`.
/// The transcript only grows, so a conversation is updated by appending its
/// new tail; anything else is redrawn from scratch.
pub fn diff(previous: Option<&View>, next: &View) -> Vec<RenderOp> {
    match (previous, next) {
        (Some(View::Identification), View::Identification) => Vec::new(),
        (_, View::Identification) => vec![RenderOp::ShowIdentification],
        (Some(View::Conversation { lines: old }), View::Conversation { lines })
            if lines.starts_with(old) =>
        {
            lines[old.len()..].iter().cloned().map(RenderOp::AppendLine).collect()
        }
        (_, View::Conversation { lines }) => std::iter::once(RenderOp::ShowConversation)
            .chain(lines.iter().cloned().map(RenderOp::AppendLine))
            .collect(),
    }
}
