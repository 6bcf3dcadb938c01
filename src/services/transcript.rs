// src/services/transcript.rs
use std::collections::BTreeMap;

use crate::message::ChatMessage;

/// Append-only log of displayed messages.
///
/// Every user echo reserves a sequence number. Replies are held until all
/// earlier sequence numbers have completed, so they land in submission order
/// whatever order the backend answers in.
#[derive(Debug, Default)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
    next_seq: u64,
    next_release: u64,
    held: BTreeMap<u64, Option<ChatMessage>>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the user's message and return the sequence number its reply
    /// must be completed with.
    pub fn echo(&mut self, text: impl Into<String>) -> u64 {
        self.messages.push(ChatMessage::user(text));
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    /// Complete a reservation. `None` releases the slot without showing
    /// anything. Returns how many messages were appended.
    pub fn complete(&mut self, seq: u64, reply: Option<ChatMessage>) -> usize {
        if seq < self.next_release || seq >= self.next_seq || self.held.contains_key(&seq) {
            return 0;
        }
        self.held.insert(seq, reply);

        let before = self.messages.len();
        while let Some(entry) = self.held.remove(&self.next_release) {
            if let Some(msg) = entry {
                self.messages.push(msg);
            }
            self.next_release += 1;
        }
        self.messages.len() - before
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Replies still outstanding or held back behind an earlier one.
    pub fn pending(&self) -> usize {
        (self.next_seq - self.next_release) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn echo_then_reply() {
        let mut t = Transcript::new();
        let seq = t.echo("hello");
        assert_eq!(t.len(), 1);
        assert_eq!(t.pending(), 1);
        assert_eq!(t.complete(seq, Some(ChatMessage::assistant("Bot", "hi"))), 1);
        assert_eq!(t.messages()[1].text, "hi");
        assert_eq!(t.pending(), 0);
    }

    #[test]
    fn out_of_order_replies_are_held() {
        let mut t = Transcript::new();
        let a = t.echo("A");
        let b = t.echo("B");

        assert_eq!(t.complete(b, Some(ChatMessage::assistant("Bot", "reply B"))), 0);
        assert_eq!(t.len(), 2);

        assert_eq!(t.complete(a, Some(ChatMessage::assistant("Bot", "reply A"))), 2);
        let texts: Vec<&str> = t.messages().iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, ["A", "B", "reply A", "reply B"]);
    }

    #[test]
    fn silent_failure_still_releases_slot() {
        let mut t = Transcript::new();
        let a = t.echo("A");
        let b = t.echo("B");
        t.complete(b, Some(ChatMessage::assistant("Bot", "reply B")));
        assert_eq!(t.complete(a, None), 1);
        assert_eq!(t.messages().last().unwrap().text, "reply B");
        assert_eq!(t.pending(), 0);
    }

    #[test]
    fn completing_twice_or_unknown_seq_is_ignored() {
        let mut t = Transcript::new();
        let a = t.echo("A");
        assert_eq!(t.complete(a, Some(ChatMessage::assistant("Bot", "1"))), 1);
        assert_eq!(t.complete(a, Some(ChatMessage::assistant("Bot", "2"))), 0);
        assert_eq!(t.complete(7, Some(ChatMessage::assistant("Bot", "3"))), 0);
        assert_eq!(t.len(), 2);
    }
}
