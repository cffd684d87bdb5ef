//! Configuration types for the chat application.
//!
//! This module provides CLI argument parsing via `arrrg` and the resolved
//! configuration, including the client profile that selects between the
//! minimal and extended front-end behaviors.

use std::fmt;
use std::str::FromStr;

use arrrg_derive::CommandLine;

use crate::client::{DEFAULT_BASE_URL, Endpoints};
use crate::error::Result;
use crate::frame::FrameValidation;
use crate::stream::SessionPolicy;
use crate::types::PayloadShape;

/// Which of the two front-end behaviors to reproduce.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ClientProfile {
    /// Strict inbound frames, `{data}` payloads, local echo, no uploads.
    Minimal,
    /// Lenient inbound frames, `{data, mode}` payloads, knowledge uploads.
    #[default]
    Extended,
}

impl ClientProfile {
    /// Default inbound validation for this profile.
    pub fn frame_validation(self) -> FrameValidation {
        match self {
            ClientProfile::Minimal => FrameValidation::Strict,
            ClientProfile::Extended => FrameValidation::Lenient,
        }
    }

    /// Outbound payload shape for this profile.
    pub fn payload_shape(self) -> PayloadShape {
        match self {
            ClientProfile::Minimal => PayloadShape::DataOnly,
            ClientProfile::Extended => PayloadShape::WithMode,
        }
    }

    /// Whether outbound text is trimmed before sending.
    pub fn trims_outbound(self) -> bool {
        self == ClientProfile::Minimal
    }

    /// Whether the user's own message is echoed into the transcript.
    pub fn echoes_user_messages(self) -> bool {
        self == ClientProfile::Minimal
    }

    /// Whether the knowledge panel is available.
    pub fn allows_upload(self) -> bool {
        self == ClientProfile::Extended
    }
}

impl fmt::Display for ClientProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientProfile::Minimal => write!(f, "minimal"),
            ClientProfile::Extended => write!(f, "extended"),
        }
    }
}

impl FromStr for ClientProfile {
    type Err = ChatArgsError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "minimal" => Ok(ClientProfile::Minimal),
            "extended" => Ok(ClientProfile::Extended),
            _ => Err(ChatArgsError::UnknownProfile(s.to_string())),
        }
    }
}

/// Command-line arguments for the ragchat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Backend base URL.
    #[arrrg(optional, "Backend base URL (default: https://day1-backend-test.onrender.com)", "URL")]
    pub base_url: Option<String>,

    /// Client profile.
    #[arrrg(optional, "Client profile: minimal or extended (default: extended)", "PROFILE")]
    pub profile: Option<String>,

    /// Force strict inbound frame validation.
    #[arrrg(flag, "Drop inbound frames with missing fields")]
    pub strict_frames: bool,

    /// Force lenient inbound frame validation.
    #[arrrg(flag, "Show inbound frames with missing fields as undefined")]
    pub lenient_frames: bool,

    /// Username for the first login attempt.
    #[arrrg(optional, "Username to use for the first login attempt", "USER")]
    pub username: Option<String>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,

    /// Raise the log level for this crate.
    #[arrrg(flag, "Log stream diagnostics to stderr")]
    pub verbose: bool,
}

/// Errors turning [`ChatArgs`] into a [`ChatConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatArgsError {
    /// `--profile` was not `minimal` or `extended`.
    UnknownProfile(String),
    /// Both `--strict-frames` and `--lenient-frames` were given.
    ConflictingFrameValidation,
}

impl fmt::Display for ChatArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatArgsError::UnknownProfile(profile) => {
                write!(f, "unknown profile '{profile}' (use minimal or extended)")
            }
            ChatArgsError::ConflictingFrameValidation => {
                write!(f, "strict and lenient frame validation are mutually exclusive")
            }
        }
    }
}

impl std::error::Error for ChatArgsError {}

/// Configuration for a chat client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    /// HTTP base URL of the backend.
    pub base_url: String,

    /// Front-end behavior to reproduce.
    pub profile: ClientProfile,

    /// Inbound frame validation; defaults to the profile's.
    pub frame_validation: FrameValidation,

    /// Username for the first login attempt.
    pub username: Option<String>,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,

    /// Whether to log this crate at debug level.
    pub verbose: bool,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - Base URL: the compiled-in backend
    /// - Profile: extended
    /// - Color: enabled
    pub fn new() -> Self {
        let profile = ClientProfile::default();
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            profile,
            frame_validation: profile.frame_validation(),
            username: None,
            use_color: true,
            verbose: false,
        }
    }

    /// Sets the backend base URL.
    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the profile and resets frame validation to its default.
    pub fn with_profile(mut self, profile: ClientProfile) -> Self {
        self.profile = profile;
        self.frame_validation = profile.frame_validation();
        self
    }

    /// Overrides the frame validation policy.
    pub fn with_frame_validation(mut self, validation: FrameValidation) -> Self {
        self.frame_validation = validation;
        self
    }

    /// Sets the username for the first login attempt.
    pub fn with_username<S: Into<String>>(mut self, username: S) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }

    /// The service endpoints for the configured base URL.
    pub fn endpoints(&self) -> Result<Endpoints> {
        Endpoints::new(&self.base_url)
    }

    /// The stream framing policy.
    pub fn session_policy(&self) -> SessionPolicy {
        SessionPolicy {
            validation: self.frame_validation,
            payload: self.profile.payload_shape(),
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl TryFrom<ChatArgs> for ChatConfig {
    type Error = ChatArgsError;

    fn try_from(args: ChatArgs) -> std::result::Result<Self, Self::Error> {
        let profile = match args.profile.as_deref() {
            Some(profile) => profile.parse()?,
            None => ClientProfile::default(),
        };
        let frame_validation = match (args.strict_frames, args.lenient_frames) {
            (true, true) => return Err(ChatArgsError::ConflictingFrameValidation),
            (true, false) => FrameValidation::Strict,
            (false, true) => FrameValidation::Lenient,
            (false, false) => profile.frame_validation(),
        };
        Ok(ChatConfig {
            base_url: args
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            profile,
            frame_validation,
            username: args.username,
            use_color: !args.no_color,
            verbose: args.verbose,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ChatConfig::new();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.profile, ClientProfile::Extended);
        assert_eq!(config.frame_validation, FrameValidation::Lenient);
        assert!(config.username.is_none());
        assert!(config.use_color);
        assert!(!config.verbose);
    }

    #[test]
    fn profiles() {
        let minimal = ClientProfile::Minimal;
        assert_eq!(minimal.frame_validation(), FrameValidation::Strict);
        assert_eq!(minimal.payload_shape(), PayloadShape::DataOnly);
        assert!(minimal.trims_outbound());
        assert!(minimal.echoes_user_messages());
        assert!(!minimal.allows_upload());

        let extended = ClientProfile::Extended;
        assert_eq!(extended.frame_validation(), FrameValidation::Lenient);
        assert_eq!(extended.payload_shape(), PayloadShape::WithMode);
        assert!(!extended.trims_outbound());
        assert!(!extended.echoes_user_messages());
        assert!(extended.allows_upload());
    }

    #[test]
    fn config_from_args_defaults() {
        let config = ChatConfig::try_from(ChatArgs::default()).unwrap();
        assert_eq!(config, ChatConfig::new());
    }

    #[test]
    fn config_from_args_custom() {
        let args = ChatArgs {
            base_url: Some("http://localhost:8000".to_string()),
            profile: Some("Minimal".to_string()),
            strict_frames: false,
            lenient_frames: true,
            username: Some("alice".to_string()),
            no_color: true,
            verbose: true,
        };
        let config = ChatConfig::try_from(args).unwrap();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.profile, ClientProfile::Minimal);
        assert_eq!(config.frame_validation, FrameValidation::Lenient);
        assert_eq!(config.username.as_deref(), Some("alice"));
        assert!(!config.use_color);
        assert!(config.verbose);
        assert_eq!(
            config.session_policy(),
            SessionPolicy {
                validation: FrameValidation::Lenient,
                payload: PayloadShape::DataOnly,
            }
        );
    }

    #[test]
    fn config_from_args_errors() {
        let args = ChatArgs {
            profile: Some("fancy".to_string()),
            ..ChatArgs::default()
        };
        assert_eq!(
            ChatConfig::try_from(args),
            Err(ChatArgsError::UnknownProfile("fancy".to_string()))
        );

        let args = ChatArgs {
            strict_frames: true,
            lenient_frames: true,
            ..ChatArgs::default()
        };
        assert_eq!(
            ChatConfig::try_from(args),
            Err(ChatArgsError::ConflictingFrameValidation)
        );
    }

    #[test]
    fn config_builder_pattern() {
        let config = ChatConfig::new()
            .with_base_url("http://localhost:8000")
            .with_profile(ClientProfile::Minimal)
            .with_frame_validation(FrameValidation::Lenient)
            .with_username("alice")
            .without_color();

        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.profile, ClientProfile::Minimal);
        assert_eq!(config.frame_validation, FrameValidation::Lenient);
        assert_eq!(config.username.as_deref(), Some("alice"));
        assert!(!config.use_color);
        assert!(config.endpoints().is_ok());
    }
}
