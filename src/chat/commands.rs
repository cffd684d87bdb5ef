//! Slash command parsing for the chat application.
//!
//! This module handles parsing of special commands that start with `/`,
//! allowing users to control the client without sending messages over the
//! stream.

use crate::types::ChatMode;

/// A parsed chat command.
///
/// These commands control the client and are never sent to the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatCommand {
    /// Switch the answering mode.
    Mode(ChatMode),

    /// Show the current answering mode.
    ShowMode,

    /// Open or close the knowledge panel.
    ToggleKnowledge,

    /// Upload the knowledge panel's text.
    SendKnowledge,

    /// Close the knowledge panel, keeping its text.
    CancelKnowledge,

    /// Clear the transcript.
    Clear,

    /// Show the stream state, mode, and knowledge badge.
    Status,

    /// Log in again, replacing the current credential.
    Login,

    /// Display help information.
    Help,

    /// Exit the chat application.
    Quit,

    /// Report a parsing error back to the caller.
    Invalid(String),
}

/// Parses user input for slash commands.
///
/// Returns `Some(ChatCommand)` if the input is a command, or `None` if it
/// should be treated as a chat message (or knowledge text).
///
/// # Examples
///
/// ```
/// # use ragchat::chat::parse_command;
/// assert!(parse_command("/quit").is_some());
/// assert!(parse_command("/mode rag").is_some());
/// assert!(parse_command("What is retrieval augmentation?").is_none());
/// ```
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let input = input.trim();

    let rest = input.strip_prefix('/')?;
    let mut parts = rest.splitn(2, ' ');
    let command = parts.next()?.to_lowercase();
    let argument = parts.next().map(|s| s.trim()).filter(|s| !s.is_empty());

    let result = match command.as_str() {
        "mode" => match argument {
            Some(arg) => match arg.parse::<ChatMode>() {
                Ok(mode) => ChatCommand::Mode(mode),
                Err(err) => ChatCommand::Invalid(format!("/mode: {err}")),
            },
            None => ChatCommand::ShowMode,
        },
        "rag" => ChatCommand::Mode(ChatMode::Rag),
        "context" => ChatCommand::Mode(ChatMode::Context),
        "kb" | "knowledge" => match argument.map(str::to_lowercase).as_deref() {
            None => ChatCommand::ToggleKnowledge,
            Some("send") | Some("upload") => ChatCommand::SendKnowledge,
            Some("cancel") | Some("close") => ChatCommand::CancelKnowledge,
            Some(_) => ChatCommand::Invalid(
                "Unrecognized /kb action (use /kb, /kb send, or /kb cancel)".to_string(),
            ),
        },
        "clear" => ChatCommand::Clear,
        "status" | "stats" => ChatCommand::Status,
        "login" => ChatCommand::Login,
        "help" | "?" => ChatCommand::Help,
        "quit" | "exit" | "q" => ChatCommand::Quit,
        _ => ChatCommand::Invalid(format!("Unknown command: /{command}")),
    };

    Some(result)
}

/// How a line typed while the knowledge panel is open is treated.
#[derive(Debug, Clone, PartialEq)]
pub enum KnowledgeInput {
    /// A command that still applies while the panel is open.
    Command(ChatCommand),
    /// Text to append to the knowledge block.
    Text(String),
}

/// Parses a line typed while the knowledge panel is open.
///
/// Only `/kb ...`, `/help`, and `/quit` are commands here; any other line,
/// including pasted paths such as `/etc/hosts`, is knowledge text.  A leading
/// `//` escapes a line that would otherwise be one of those commands.
pub fn parse_knowledge_input(input: &str) -> KnowledgeInput {
    let trimmed = input.trim_start();
    if let Some(rest) = trimmed.strip_prefix("//") {
        let indent = &input[..input.len() - trimmed.len()];
        return KnowledgeInput::Text(format!("{indent}/{rest}"));
    }
    let word = trimmed
        .strip_prefix('/')
        .and_then(|rest| rest.split_whitespace().next())
        .map(str::to_lowercase);
    match word.as_deref() {
        Some("kb" | "knowledge" | "help" | "?" | "quit" | "exit" | "q") => {
            match parse_command(input) {
                Some(cmd) => KnowledgeInput::Command(cmd),
                None => KnowledgeInput::Text(input.to_string()),
            }
        }
        _ => KnowledgeInput::Text(input.to_string()),
    }
}

/// Returns help text describing available commands.
pub fn help_text() -> &'static str {
    r#"Available commands:
  /mode [context|rag]    Show or switch the answering mode
  /rag, /context         Shorthand for /mode rag and /mode context
  /kb                    Open or close the knowledge panel
  /kb send               Upload the knowledge panel's text
  /kb cancel             Close the knowledge panel, keeping its text
  /clear                 Clear the transcript
  /status                Show connection state, mode, and knowledge badge
  /login                 Log in again with new credentials
  /help                  Show this help message
  /quit                  Exit the chat

While the knowledge panel is open, plain lines are added to its text and only
/kb, /help, and /quit are commands; start a line with // to add a literal /."#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_quit_commands() {
        assert_eq!(parse_command("/quit"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("/exit"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("/q"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("  /quit  "), Some(ChatCommand::Quit));
    }

    #[test]
    fn parse_mode() {
        assert_eq!(
            parse_command("/mode rag"),
            Some(ChatCommand::Mode(ChatMode::Rag))
        );
        assert_eq!(
            parse_command("/MODE Context"),
            Some(ChatCommand::Mode(ChatMode::Context))
        );
        assert_eq!(parse_command("/mode"), Some(ChatCommand::ShowMode));
        assert_eq!(parse_command("/rag"), Some(ChatCommand::Mode(ChatMode::Rag)));
        assert!(matches!(
            parse_command("/mode vector"),
            Some(ChatCommand::Invalid(msg)) if msg.contains("unknown chat mode")
        ));
    }

    #[test]
    fn parse_knowledge() {
        assert_eq!(parse_command("/kb"), Some(ChatCommand::ToggleKnowledge));
        assert_eq!(parse_command("/kb send"), Some(ChatCommand::SendKnowledge));
        assert_eq!(
            parse_command("/knowledge upload"),
            Some(ChatCommand::SendKnowledge)
        );
        assert_eq!(
            parse_command("/kb cancel"),
            Some(ChatCommand::CancelKnowledge)
        );
        assert!(matches!(
            parse_command("/kb shred"),
            Some(ChatCommand::Invalid(_))
        ));
    }

    #[test]
    fn parse_misc() {
        assert_eq!(parse_command("/clear"), Some(ChatCommand::Clear));
        assert_eq!(parse_command("/status"), Some(ChatCommand::Status));
        assert_eq!(parse_command("/login"), Some(ChatCommand::Login));
        assert_eq!(parse_command("/?"), Some(ChatCommand::Help));
        assert_eq!(
            parse_command("/frobnicate"),
            Some(ChatCommand::Invalid("Unknown command: /frobnicate".to_string()))
        );
    }

    #[test]
    fn non_commands() {
        assert_eq!(parse_command("Hello there"), None);
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("  "), None);
        assert_eq!(parse_command("path/to/file"), None);
    }

    #[test]
    fn knowledge_lines_keep_slashes() {
        assert_eq!(
            parse_knowledge_input("/etc/hosts maps names"),
            KnowledgeInput::Text("/etc/hosts maps names".to_string())
        );
        assert_eq!(
            parse_knowledge_input("/clear"),
            KnowledgeInput::Text("/clear".to_string())
        );
        assert_eq!(
            parse_knowledge_input("  plain text "),
            KnowledgeInput::Text("  plain text ".to_string())
        );
    }

    #[test]
    fn knowledge_commands() {
        assert_eq!(
            parse_knowledge_input("/kb send"),
            KnowledgeInput::Command(ChatCommand::SendKnowledge)
        );
        assert_eq!(
            parse_knowledge_input("/KB"),
            KnowledgeInput::Command(ChatCommand::ToggleKnowledge)
        );
        assert_eq!(
            parse_knowledge_input("/quit"),
            KnowledgeInput::Command(ChatCommand::Quit)
        );
        assert!(matches!(
            parse_knowledge_input("/kb shred"),
            KnowledgeInput::Command(ChatCommand::Invalid(_))
        ));
    }

    #[test]
    fn knowledge_escape() {
        assert_eq!(
            parse_knowledge_input("//kb send"),
            KnowledgeInput::Text("/kb send".to_string())
        );
        assert_eq!(
            parse_knowledge_input("  //quit"),
            KnowledgeInput::Text("  /quit".to_string())
        );
    }

    #[test]
    fn help_text_not_empty() {
        let help = help_text();
        assert!(help.contains("/quit"));
        assert!(help.contains("/kb send"));
        assert!(help.contains("/mode"));
    }
}
