//! The visible chat transcript.

use crate::types::ChatEvent;

/// One rendered block in the transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptEntry {
    /// A complete query/response turn from the server.
    Turn(ChatEvent),
    /// The user's own message, echoed locally.
    User(String),
    /// A system notice such as "Connected to AI".
    System(String),
}

/// Append-only list of transcript entries with a render cursor.
///
/// The cursor marks how far the view has been drawn.  Appending never moves
/// it; [`unrendered`](Self::unrendered) hands out everything past it and
/// moves it to the end, which keeps the view pinned to the newest entry.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
    rendered: usize,
}

impl Transcript {
    /// Creates an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a chat turn.
    pub fn push_turn(&mut self, event: ChatEvent) {
        self.entries.push(TranscriptEntry::Turn(event));
    }

    /// Appends a locally echoed user message.
    pub fn push_user<S: Into<String>>(&mut self, text: S) {
        self.entries.push(TranscriptEntry::User(text.into()));
    }

    /// Appends a system notice.
    pub fn push_system<S: Into<String>>(&mut self, text: S) {
        self.entries.push(TranscriptEntry::System(text.into()));
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing has been appended since the last clear.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries not yet drawn; marks them drawn.
    pub fn unrendered(&mut self) -> &[TranscriptEntry] {
        let start = self.rendered;
        self.rendered = self.entries.len();
        &self.entries[start..]
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.rendered = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_keep_order() {
        let mut transcript = Transcript::new();
        transcript.push_system("Connected to AI");
        transcript.push_user("hi");
        transcript.push_turn(ChatEvent::new("12:00", "hi", "hello!"));
        assert_eq!(
            transcript.entries(),
            &[
                TranscriptEntry::System("Connected to AI".to_string()),
                TranscriptEntry::User("hi".to_string()),
                TranscriptEntry::Turn(ChatEvent::new("12:00", "hi", "hello!")),
            ]
        );
    }

    #[test]
    fn unrendered_advances_to_end() {
        let mut transcript = Transcript::new();
        transcript.push_system("one");
        transcript.push_system("two");
        assert_eq!(transcript.unrendered().len(), 2);
        assert!(transcript.unrendered().is_empty());

        transcript.push_system("three");
        assert_eq!(
            transcript.unrendered(),
            &[TranscriptEntry::System("three".to_string())]
        );
    }

    #[test]
    fn clear_resets_cursor() {
        let mut transcript = Transcript::new();
        transcript.push_system("one");
        transcript.unrendered();
        transcript.clear();
        assert!(transcript.is_empty());

        transcript.push_system("two");
        assert_eq!(transcript.unrendered().len(), 1);
    }
}
