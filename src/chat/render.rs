//! Output rendering for the chat application.
//!
//! This module provides a trait-based rendering abstraction for transcript
//! entries and client messages.  The default implementation writes to stdout
//! with optional ANSI styling.

use std::io::{self, Stdout, Write};

use crate::chat::knowledge::{KnowledgeBadge, KnowledgePanel};
use crate::chat::transcript::{Transcript, TranscriptEntry};

/// ANSI escape code for dim text (used for timestamps).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code for italic text (used for system notices).
const ANSI_ITALIC: &str = "\x1b[3m";

/// ANSI escape code for bold text (used for speaker labels).
const ANSI_BOLD: &str = "\x1b[1m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code for green text (used for the active knowledge badge).
const ANSI_GREEN: &str = "\x1b[32m";

/// ANSI escape code for yellow text (used for the character-count warning).
const ANSI_YELLOW: &str = "\x1b[33m";

/// ANSI escape code for red text (used for failures).
const ANSI_RED: &str = "\x1b[31m";

/// Trait for rendering chat output.
pub trait Renderer: Send {
    /// Print one transcript entry.
    fn print_entry(&mut self, entry: &TranscriptEntry);

    /// Print an inline error message.
    fn print_error(&mut self, error: &str);

    /// Print an informational message.
    fn print_info(&mut self, info: &str);

    /// Print the knowledge panel's status, counter, and progress.
    fn print_knowledge(&mut self, panel: &KnowledgePanel);
}

/// Print every entry not yet drawn and leave the view at the newest one.
pub fn render_transcript(renderer: &mut dyn Renderer, transcript: &mut Transcript) {
    for entry in transcript.unrendered() {
        renderer.print_entry(entry);
    }
}

/// Format a transcript entry as display text.
///
/// A chat turn is always timestamp first, then the echoed query, then the
/// response.
pub fn format_entry(entry: &TranscriptEntry, use_color: bool) -> String {
    let (dim, italic, bold, reset) = if use_color {
        (ANSI_DIM, ANSI_ITALIC, ANSI_BOLD, ANSI_RESET)
    } else {
        ("", "", "", "")
    };
    match entry {
        TranscriptEntry::Turn(event) => format!(
            "{dim}{}{reset}\n{bold}You:{reset} {}\n{bold}AI:{reset} {}\n",
            event.timestamp, event.query, event.data
        ),
        TranscriptEntry::User(text) => format!("{bold}You:{reset} {text}"),
        TranscriptEntry::System(text) => format!("{italic}{dim}-- {text} --{reset}"),
    }
}

/// Format the knowledge panel summary line.
pub fn format_knowledge(panel: &KnowledgePanel, use_color: bool) -> String {
    let count = panel.char_count();
    let mut line = if use_color && count.warning {
        format!("{ANSI_YELLOW}[{count}]{ANSI_RESET}")
    } else {
        format!("[{count}]")
    };
    if panel.progress_visible() {
        if use_color && panel.progress_failed() {
            line.push_str(&format!(" {ANSI_RED}{}%{ANSI_RESET}", panel.progress()));
        } else {
            line.push_str(&format!(" {}%", panel.progress()));
        }
    }
    let status = panel.status().label();
    if !status.is_empty() {
        line.push(' ');
        line.push_str(status);
    }
    line
}

/// Plain text renderer with optional ANSI styling.
pub struct PlainTextRenderer {
    stdout: Stdout,
    use_color: bool,
}

impl PlainTextRenderer {
    /// Creates a new PlainTextRenderer with ANSI colors enabled.
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// Creates a new PlainTextRenderer with specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self {
            stdout: io::stdout(),
            use_color,
        }
    }

    /// Whether ANSI styling is on.
    pub fn use_color(&self) -> bool {
        self.use_color
    }

    /// Format a badge label in the badge's colors.
    pub fn badge(&self, panel: &KnowledgePanel) -> String {
        let label = panel.badge().label();
        if self.use_color && panel.badge() == KnowledgeBadge::Active {
            format!("{ANSI_GREEN}{label}{ANSI_RESET}")
        } else {
            label.to_string()
        }
    }

    fn flush(&mut self) {
        let _ = self.stdout.flush();
    }
}

impl Default for PlainTextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for PlainTextRenderer {
    fn print_entry(&mut self, entry: &TranscriptEntry) {
        println!("{}", format_entry(entry, self.use_color));
        self.flush();
    }

    fn print_error(&mut self, error: &str) {
        if self.use_color {
            eprintln!("{ANSI_RED}Error: {error}{ANSI_RESET}");
        } else {
            eprintln!("Error: {error}");
        }
    }

    fn print_info(&mut self, info: &str) {
        println!("{info}");
        self.flush();
    }

    fn print_knowledge(&mut self, panel: &KnowledgePanel) {
        println!("{}", format_knowledge(panel, self.use_color));
        self.flush();
    }
}
