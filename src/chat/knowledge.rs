//! The knowledge panel: text staged for upload and the upload's progress.

use std::fmt;
use std::time::Duration;

use crate::types::MAX_KNOWLEDGE_CHARS;

/// How long a successful upload stays on screen before the panel closes.
pub const UPLOAD_CLOSE_DELAY: Duration = Duration::from_millis(1200);

/// Progress shown once an upload is in flight.
pub const PROGRESS_STARTED: u8 = 40;

/// Progress shown once an upload succeeded.
pub const PROGRESS_DONE: u8 = 100;

/// Status line under the knowledge panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UploadStatus {
    /// Nothing attempted yet.
    #[default]
    Idle,
    /// Submission refused locally: the text was blank.
    Empty,
    /// Upload in flight.
    Vectorizing,
    /// Upload accepted.
    Updated,
    /// Upload rejected or failed in transit.
    Failed,
}

impl UploadStatus {
    /// The status text.
    pub fn label(self) -> &'static str {
        match self {
            UploadStatus::Idle => "",
            UploadStatus::Empty => "⚠️ Text is empty",
            UploadStatus::Vectorizing => "Vectorizing...",
            UploadStatus::Updated => "✅ Knowledge Updated",
            UploadStatus::Failed => "❌ Error processing text",
        }
    }
}

/// Badge telling whether any knowledge was uploaded this session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KnowledgeBadge {
    /// Nothing uploaded yet.
    #[default]
    Inactive,
    /// At least one upload succeeded.
    Active,
}

impl KnowledgeBadge {
    /// The badge text.
    pub fn label(self) -> &'static str {
        match self {
            KnowledgeBadge::Inactive => "Knowledge Inactive",
            KnowledgeBadge::Active => "Knowledge Active",
        }
    }
}

/// Character counter for the knowledge text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharCount {
    /// Characters currently staged.
    pub len: usize,
    /// Above 90% of the soft limit.
    pub warning: bool,
}

impl CharCount {
    /// Count the characters of `text`.
    pub fn of(text: &str) -> Self {
        let len = text.chars().count();
        Self {
            len,
            warning: len * 10 > MAX_KNOWLEDGE_CHARS * 9,
        }
    }
}

impl fmt::Display for CharCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} / {}",
            group_thousands(self.len),
            group_thousands(MAX_KNOWLEDGE_CHARS)
        )
    }
}

fn group_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

/// Text staged for the knowledge base, plus the state of its upload.
#[derive(Debug, Clone, Default)]
pub struct KnowledgePanel {
    open: bool,
    input: String,
    status: UploadStatus,
    progress: u8,
    progress_visible: bool,
    progress_failed: bool,
    busy: bool,
    badge: KnowledgeBadge,
}

impl KnowledgePanel {
    /// Creates a closed, empty panel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the panel is showing.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Show the panel.
    pub fn open(&mut self) {
        self.open = true;
    }

    /// Hide the panel; staged text is kept.
    pub fn close(&mut self) {
        self.open = false;
    }

    /// The staged text.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Replace the staged text.
    pub fn set_input<S: Into<String>>(&mut self, text: S) {
        self.input = text.into();
    }

    /// Append one line of text.
    pub fn push_line(&mut self, line: &str) {
        if !self.input.is_empty() {
            self.input.push('\n');
        }
        self.input.push_str(line);
    }

    /// Counter for the staged text.
    pub fn char_count(&self) -> CharCount {
        CharCount::of(&self.input)
    }

    /// The status line.
    pub fn status(&self) -> UploadStatus {
        self.status
    }

    /// Progress bar width in percent.
    pub fn progress(&self) -> u8 {
        self.progress
    }

    /// Whether the progress bar is shown.
    pub fn progress_visible(&self) -> bool {
        self.progress_visible
    }

    /// Whether the progress bar shows the failure style.
    pub fn progress_failed(&self) -> bool {
        self.progress_failed
    }

    /// Whether the submit control is disabled.
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// The knowledge badge.
    pub fn badge(&self) -> KnowledgeBadge {
        self.badge
    }

    /// Start an upload.
    ///
    /// Returns the trimmed text to submit, or `None` (with the status set to
    /// [`UploadStatus::Empty`]) when there is nothing to send.
    pub fn begin_upload(&mut self) -> Option<String> {
        let content = self.input.trim();
        if content.is_empty() {
            self.status = UploadStatus::Empty;
            return None;
        }
        let content = content.to_string();
        self.busy = true;
        self.status = UploadStatus::Vectorizing;
        self.progress_visible = true;
        self.progress_failed = false;
        self.progress = PROGRESS_STARTED;
        Some(content)
    }

    /// Record how the upload started by [`begin_upload`](Self::begin_upload)
    /// ended.
    pub fn complete_upload(&mut self, succeeded: bool) {
        self.busy = false;
        if succeeded {
            self.progress = PROGRESS_DONE;
            self.status = UploadStatus::Updated;
            self.badge = KnowledgeBadge::Active;
        } else {
            self.status = UploadStatus::Failed;
            self.progress_failed = true;
        }
    }

    /// Close after a successful upload: hide and reset the progress bar and
    /// clear the staged text.
    pub fn finish(&mut self) {
        self.open = false;
        self.progress_visible = false;
        self.progress = 0;
        self.input.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn char_count_display() {
        assert_eq!(CharCount::of("").to_string(), "0 / 10,000");
        assert_eq!(CharCount::of("hello").to_string(), "5 / 10,000");
        assert_eq!(CharCount::of(&"x".repeat(1234)).to_string(), "1,234 / 10,000");
        assert_eq!(
            CharCount::of(&"x".repeat(123_456)).to_string(),
            "123,456 / 10,000"
        );
    }

    #[test]
    fn char_count_counts_chars_not_bytes() {
        assert_eq!(CharCount::of("héllo wörld").len, 11);
    }

    #[test]
    fn char_count_warning_threshold() {
        assert!(!CharCount::of(&"x".repeat(9_000)).warning);
        assert!(CharCount::of(&"x".repeat(9_001)).warning);
        assert!(CharCount::of(&"x".repeat(12_000)).warning);
    }

    #[test]
    fn blank_input_is_refused() {
        let mut panel = KnowledgePanel::new();
        panel.open();
        panel.set_input("   \n\t ");
        assert_eq!(panel.begin_upload(), None);
        assert_eq!(panel.status(), UploadStatus::Empty);
        assert_eq!(panel.status().label(), "⚠️ Text is empty");
        assert!(!panel.is_busy());
        assert!(!panel.progress_visible());
    }

    #[test]
    fn successful_upload_lifecycle() {
        let mut panel = KnowledgePanel::new();
        panel.open();
        panel.push_line("  Rust was first released in 2015.");
        panel.push_line("It has no garbage collector.  ");

        let content = panel.begin_upload().unwrap();
        assert_eq!(
            content,
            "Rust was first released in 2015.\nIt has no garbage collector."
        );
        assert!(panel.is_busy());
        assert_eq!(panel.status(), UploadStatus::Vectorizing);
        assert_eq!(panel.progress(), PROGRESS_STARTED);

        panel.complete_upload(true);
        assert!(!panel.is_busy());
        assert_eq!(panel.progress(), PROGRESS_DONE);
        assert_eq!(panel.status().label(), "✅ Knowledge Updated");
        assert_eq!(panel.badge(), KnowledgeBadge::Active);
        assert!(panel.is_open());

        panel.finish();
        assert!(!panel.is_open());
        assert!(!panel.progress_visible());
        assert_eq!(panel.progress(), 0);
        assert!(panel.input().is_empty());
        assert_eq!(panel.badge().label(), "Knowledge Active");
    }

    #[test]
    fn failed_upload_keeps_input() {
        let mut panel = KnowledgePanel::new();
        panel.open();
        panel.set_input("some text");
        panel.begin_upload().unwrap();
        panel.complete_upload(false);

        assert!(!panel.is_busy());
        assert!(panel.is_open());
        assert!(panel.progress_failed());
        assert_eq!(panel.status().label(), "❌ Error processing text");
        assert_eq!(panel.input(), "some text");
        assert_eq!(panel.badge(), KnowledgeBadge::Inactive);

        panel.begin_upload().unwrap();
        assert!(!panel.progress_failed());
    }
}
