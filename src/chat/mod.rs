//! Chat application module for the retrieval-augmented chat backend.
//!
//! This module provides the terminal front end built on top of the ragchat
//! client library. It supports:
//!
//! - Logging in and holding one chat stream per credential
//! - A transcript of chat turns and connection notices
//! - A knowledge panel for uploading text to the retrieval store
//! - Slash commands for session control
//!
//! # Architecture
//!
//! The module is organized into several components:
//!
//! - [`config`]: CLI argument parsing, profiles, and configuration
//! - [`controller`]: The [`ChatClient`] that owns all client state
//! - [`commands`]: Slash command parsing
//! - [`transcript`] and [`render`]: What is shown and how it is drawn
//! - [`knowledge`]: The knowledge panel and upload progress

pub mod commands;
pub mod config;
pub mod controller;
pub mod knowledge;
pub mod render;
pub mod transcript;

pub use commands::{ChatCommand, KnowledgeInput, help_text, parse_command, parse_knowledge_input};
pub use config::{ChatArgs, ChatArgsError, ChatConfig, ClientProfile};
pub use controller::{
    ChatClient, ClientStatus, INVALID_CREDENTIALS, KNOWLEDGE_UPDATED, SERVER_ERROR,
    UploadOutcome, View,
};
pub use knowledge::{CharCount, KnowledgeBadge, KnowledgePanel, UPLOAD_CLOSE_DELAY, UploadStatus};
pub use render::{PlainTextRenderer, Renderer, format_entry, format_knowledge, render_transcript};
pub use transcript::{Transcript, TranscriptEntry};
