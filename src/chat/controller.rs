//! The chat client: one login, one stream, one transcript.
//!
//! [`ChatClient`] owns every piece of mutable client state (credential,
//! stream session, transcript, knowledge panel, mode).  The REPL drives it
//! from a single task, so there is nothing to share or lock.

use std::time::Duration;

use tokio::time::Instant;

use crate::chat::config::{ChatConfig, ClientProfile};
use crate::chat::knowledge::{KnowledgeBadge, KnowledgePanel, UPLOAD_CLOSE_DELAY};
use crate::chat::transcript::Transcript;
use crate::client::{Backend, Endpoints};
use crate::error::{Error, Result};
use crate::frame::FrameValidation;
use crate::observability::{LOGIN_FAILURES, LOGINS, SENDS_DROPPED, UPLOAD_FAILURES, UPLOADS};
use crate::stream::{ChatSession, Connector, SendOutcome, SessionEvent, SessionPolicy, StreamState};
use crate::types::{ChatMode, Credential, LoginRequest, UploadTextRequest};

/// Inline error after the login endpoint rejected the credentials.
///
/// Both profiles use this pair of login messages.
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Inline error after any other login failure.
pub const SERVER_ERROR: &str = "Server error. Try again.";

/// Transcript notice after a successful knowledge upload.
pub const KNOWLEDGE_UPDATED: &str = "AI knowledge base successfully updated.";

/// Which view is showing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum View {
    /// Username and password prompt.
    #[default]
    Login,
    /// Transcript and message input.
    Chat,
}

/// Result of [`ChatClient::upload_knowledge`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    /// The profile has no knowledge panel.
    Unavailable,
    /// The staged text was blank; nothing was sent.
    Empty,
    /// The backend accepted the text.  The panel closes `close_after` from
    /// now; see [`ChatClient::close_knowledge_if_due`].
    Updated {
        /// How long the success state stays visible.
        close_after: Duration,
    },
    /// The upload failed; the staged text is kept.
    Failed,
}

/// A snapshot of the client for the `/status` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientStatus {
    /// The view showing.
    pub view: View,
    /// The configured profile.
    pub profile: ClientProfile,
    /// Inbound frame validation in effect.
    pub validation: FrameValidation,
    /// Answering mode for outbound messages.
    pub mode: ChatMode,
    /// Stream state, if a stream was ever opened.
    pub stream: Option<StreamState>,
    /// Whether a credential is held.
    pub logged_in: bool,
    /// Knowledge badge.
    pub badge: KnowledgeBadge,
    /// Entries in the transcript.
    pub transcript_len: usize,
}

/// Chat client state and operations.
pub struct ChatClient<B: Backend, C: Connector> {
    backend: B,
    connector: C,
    endpoints: Endpoints,
    profile: ClientProfile,
    policy: SessionPolicy,
    view: View,
    credential: Option<Credential>,
    login_error: Option<&'static str>,
    session: Option<ChatSession<C::Transport>>,
    transcript: Transcript,
    mode: ChatMode,
    knowledge: KnowledgePanel,
    knowledge_close_at: Option<Instant>,
}

impl<B: Backend, C: Connector> ChatClient<B, C> {
    /// Creates a logged-out client.
    pub fn new(
        backend: B,
        connector: C,
        endpoints: Endpoints,
        profile: ClientProfile,
        policy: SessionPolicy,
    ) -> Self {
        Self {
            backend,
            connector,
            endpoints,
            profile,
            policy,
            view: View::Login,
            credential: None,
            login_error: None,
            session: None,
            transcript: Transcript::new(),
            mode: ChatMode::default(),
            knowledge: KnowledgePanel::new(),
            knowledge_close_at: None,
        }
    }

    /// Creates a logged-out client from resolved configuration.
    pub fn from_config(backend: B, connector: C, config: &ChatConfig) -> Result<Self> {
        Ok(Self::new(
            backend,
            connector,
            config.endpoints()?,
            config.profile,
            config.session_policy(),
        ))
    }

    /// The request/response backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The stream connector.
    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// The configured profile.
    pub fn profile(&self) -> ClientProfile {
        self.profile
    }

    /// The view showing.
    pub fn view(&self) -> View {
        self.view
    }

    /// The credential from the last successful login.
    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    /// The inline error under the login form, if any.
    pub fn login_error(&self) -> Option<&'static str> {
        self.login_error
    }

    /// The current stream's state, if a stream was ever opened.
    pub fn stream_state(&self) -> Option<StreamState> {
        self.session.as_ref().map(ChatSession::state)
    }

    /// The current stream's URL.
    pub fn stream_url(&self) -> Option<&url::Url> {
        self.session.as_ref().map(ChatSession::url)
    }

    /// True while the stream may still produce events.
    pub fn is_streaming(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| !session.is_finished())
    }

    /// The transcript.
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// The transcript, for rendering.
    pub fn transcript_mut(&mut self) -> &mut Transcript {
        &mut self.transcript
    }

    /// Empties the transcript.
    pub fn clear_transcript(&mut self) {
        self.transcript.clear();
    }

    /// Answering mode for outbound messages.
    pub fn mode(&self) -> ChatMode {
        self.mode
    }

    /// Sets the answering mode.
    pub fn set_mode(&mut self, mode: ChatMode) {
        tracing::debug!(%mode, "chat mode changed");
        self.mode = mode;
    }

    /// The knowledge panel.
    pub fn knowledge(&self) -> &KnowledgePanel {
        &self.knowledge
    }

    /// The knowledge panel, for editing its text.
    pub fn knowledge_mut(&mut self) -> &mut KnowledgePanel {
        &mut self.knowledge
    }

    /// A snapshot for display.
    pub fn status(&self) -> ClientStatus {
        ClientStatus {
            view: self.view,
            profile: self.profile,
            validation: self.policy.validation,
            mode: self.mode,
            stream: self.stream_state(),
            logged_in: self.credential.is_some(),
            badge: self.knowledge.badge(),
            transcript_len: self.transcript.len(),
        }
    }

    /// Log in and open the chat stream.
    ///
    /// Both inputs are trimmed.  On failure the login view stays up with an
    /// inline error and any previous credential is kept.  On success any
    /// open stream is closed, the credential replaced, the chat view shown,
    /// and a new stream opened.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<()> {
        self.login_error = None;
        LOGINS.click();
        let request = LoginRequest::new(username.trim(), password.trim());
        let credential = match self.backend.login(&request).await {
            Ok(credential) => credential,
            Err(err) => {
                LOGIN_FAILURES.click();
                tracing::warn!(error = %err, "login failed");
                self.login_error = Some(if err.is_authentication() {
                    INVALID_CREDENTIALS
                } else {
                    SERVER_ERROR
                });
                return Err(err);
            }
        };
        self.close_session().await;
        let url = self.endpoints.chat(&credential)?;
        self.credential = Some(credential);
        self.view = View::Chat;
        let mut session = ChatSession::connect(&self.connector, url, self.policy).await;
        for event in session.drain_pending() {
            self.record(event);
        }
        self.session = Some(session);
        Ok(())
    }

    /// Show the login view again, leaving the current stream running until
    /// the next successful login.
    pub fn begin_relogin(&mut self) {
        self.login_error = None;
        self.view = View::Login;
    }

    /// Return to the chat view without logging in again.
    ///
    /// Returns false, leaving the login view up, when there is no credential.
    pub fn resume_chat(&mut self) -> bool {
        if self.credential.is_some() {
            self.login_error = None;
            self.view = View::Chat;
        }
        self.view == View::Chat
    }

    /// Send one chat message.
    ///
    /// Whitespace-only input is ignored.  The minimal profile trims the text
    /// and echoes it into the transcript once sent.
    pub async fn send_message(&mut self, text: &str) -> Result<SendOutcome> {
        if text.trim().is_empty() {
            return Ok(SendOutcome::Dropped);
        }
        let text = if self.profile.trims_outbound() {
            text.trim()
        } else {
            text
        };
        let Some(session) = self.session.as_mut() else {
            SENDS_DROPPED.click();
            return Ok(SendOutcome::Dropped);
        };
        match session.send(text, self.mode).await {
            Ok(outcome) => {
                if outcome == SendOutcome::Sent && self.profile.echoes_user_messages() {
                    self.transcript.push_user(text);
                }
                Ok(outcome)
            }
            Err(err) => {
                let notices = session.drain_pending();
                for event in notices {
                    self.record(event);
                }
                Err(err)
            }
        }
    }

    /// Wait for the next stream event and append it to the transcript.
    ///
    /// Returns false without waiting when there is no stream or it is over.
    pub async fn next_event(&mut self) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        match session.next_event().await {
            Some(event) => {
                self.record(event);
                true
            }
            None => false,
        }
    }

    /// Upload the knowledge panel's text.
    pub async fn upload_knowledge(&mut self) -> UploadOutcome {
        if !self.profile.allows_upload() {
            return UploadOutcome::Unavailable;
        }
        let Some(content) = self.knowledge.begin_upload() else {
            return UploadOutcome::Empty;
        };
        UPLOADS.click();
        let result = match self.credential.as_ref() {
            Some(credential) => {
                self.backend
                    .upload_text(credential, &UploadTextRequest::new(content))
                    .await
            }
            None => Err(Error::validation(
                "not logged in",
                Some("credential".to_string()),
            )),
        };
        match result {
            Ok(()) => {
                self.knowledge.complete_upload(true);
                self.knowledge_close_at = Some(Instant::now() + UPLOAD_CLOSE_DELAY);
                self.transcript.push_system(KNOWLEDGE_UPDATED);
                UploadOutcome::Updated {
                    close_after: UPLOAD_CLOSE_DELAY,
                }
            }
            Err(err) => {
                UPLOAD_FAILURES.click();
                tracing::warn!(error = %err, "knowledge upload failed");
                self.knowledge.complete_upload(false);
                UploadOutcome::Failed
            }
        }
    }

    /// When the knowledge panel closes after the last successful upload.
    pub fn knowledge_close_deadline(&self) -> Option<Instant> {
        self.knowledge_close_at
    }

    /// Close the knowledge panel if its close deadline has passed.
    pub fn close_knowledge_if_due(&mut self) -> bool {
        match self.knowledge_close_at {
            Some(at) if at <= Instant::now() => {
                self.finish_upload();
                true
            }
            _ => false,
        }
    }

    /// Close the knowledge panel after a successful upload.
    pub fn finish_upload(&mut self) {
        self.knowledge_close_at = None;
        self.knowledge.finish();
    }

    /// Close the stream, if any.
    pub async fn shutdown(&mut self) {
        self.close_session().await;
    }

    async fn close_session(&mut self) {
        if let Some(mut session) = self.session.take() {
            if let Err(err) = session.close().await {
                tracing::warn!(error = %err, "closing chat stream failed");
            }
            for event in session.drain_pending() {
                self.record(event);
            }
        }
    }

    fn record(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Notice(notice) => self.transcript.push_system(notice),
            SessionEvent::Turn(event) => self.transcript.push_turn(event),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::chat::knowledge::UploadStatus;
    use crate::chat::transcript::TranscriptEntry;
    use crate::stream::memory::MemoryConnector;
    use crate::types::ChatEvent;

    #[derive(Default)]
    struct FakeBackend {
        logins: Mutex<Vec<(String, String)>>,
        uploads: Mutex<Vec<String>>,
        fail_upload: bool,
    }

    #[async_trait]
    impl Backend for FakeBackend {
        async fn login(&self, request: &LoginRequest) -> Result<Credential> {
            self.logins
                .lock()
                .unwrap()
                .push((request.username.clone(), request.password.clone()));
            match (request.username.as_str(), request.password.as_str()) {
                ("alice", "secret") => Ok(Credential::new("abc123")),
                ("bob", "hunter2") => Ok(Credential::new("def456")),
                ("down", _) => Err(Error::connection("refused", None)),
                _ => Err(Error::authentication("HTTP 401")),
            }
        }

        async fn upload_text(
            &self,
            _: &Credential,
            request: &UploadTextRequest,
        ) -> Result<()> {
            self.uploads.lock().unwrap().push(request.content.clone());
            if self.fail_upload {
                Err(Error::api(500, "boom"))
            } else {
                Ok(())
            }
        }
    }

    fn client(profile: ClientProfile) -> ChatClient<FakeBackend, MemoryConnector> {
        ChatClient::new(
            FakeBackend::default(),
            MemoryConnector::new(),
            Endpoints::new("http://localhost:8000").unwrap(),
            profile,
            SessionPolicy {
                validation: profile.frame_validation(),
                payload: profile.payload_shape(),
            },
        )
    }

    fn system(text: &str) -> TranscriptEntry {
        TranscriptEntry::System(text.to_string())
    }

    #[tokio::test]
    async fn login_trims_and_connects() {
        let mut client = client(ClientProfile::Extended);
        let _peer = client.connector().accept();

        client.login("  alice ", " secret\n").await.unwrap();
        assert_eq!(
            client.backend().logins.lock().unwrap().as_slice(),
            &[("alice".to_string(), "secret".to_string())]
        );
        assert_eq!(client.view(), View::Chat);
        assert_eq!(client.credential(), Some(&Credential::new("abc123")));
        assert_eq!(client.stream_state(), Some(StreamState::Open));
        assert_eq!(
            client.stream_url().unwrap().as_str(),
            "ws://localhost:8000/api/v1/ai/chat?token=abc123"
        );
        assert_eq!(client.transcript().entries(), &[system("Connected to AI")]);
    }

    #[tokio::test]
    async fn login_errors_are_presentational() {
        for profile in [ClientProfile::Minimal, ClientProfile::Extended] {
            let mut client = client(profile);

            assert!(client.login("alice", "wrong").await.is_err());
            assert_eq!(client.login_error(), Some(INVALID_CREDENTIALS));
            assert_eq!(client.view(), View::Login);
            assert!(client.credential().is_none());

            assert!(client.login("down", "x").await.is_err());
            assert_eq!(client.login_error(), Some(SERVER_ERROR));
            assert!(client.connector().attempts().is_empty());

            let _peer = client.connector().accept();
            client.login("alice", "secret").await.unwrap();
            assert_eq!(client.login_error(), None);
        }
    }

    #[tokio::test]
    async fn relogin_closes_previous_stream() {
        let mut client = client(ClientProfile::Extended);
        let first = client.connector().accept();
        client.login("alice", "secret").await.unwrap();

        client.begin_relogin();
        assert_eq!(client.view(), View::Login);
        assert_eq!(client.stream_state(), Some(StreamState::Open));

        let _second = client.connector().accept();
        client.login("bob", "hunter2").await.unwrap();
        assert!(first.is_closed());
        assert_eq!(client.credential(), Some(&Credential::new("def456")));
        assert_eq!(
            client.transcript().entries(),
            &[
                system("Connected to AI"),
                system("Disconnected"),
                system("Connected to AI"),
            ]
        );
    }

    #[tokio::test]
    async fn failed_relogin_keeps_credential_and_stream() {
        let mut client = client(ClientProfile::Extended);
        let _peer = client.connector().accept();
        client.login("alice", "secret").await.unwrap();

        client.begin_relogin();
        assert!(client.login("alice", "nope").await.is_err());
        assert_eq!(client.credential(), Some(&Credential::new("abc123")));
        assert_eq!(client.stream_state(), Some(StreamState::Open));
        assert!(client.resume_chat());
        assert_eq!(client.view(), View::Chat);
    }

    #[tokio::test]
    async fn resume_requires_credential() {
        let mut client = client(ClientProfile::Extended);
        assert!(!client.resume_chat());
        assert_eq!(client.view(), View::Login);
    }

    #[tokio::test]
    async fn minimal_profile_trims_and_echoes() {
        let mut client = client(ClientProfile::Minimal);
        let mut peer = client.connector().accept();
        client.login("alice", "secret").await.unwrap();

        client.set_mode(ChatMode::Rag);
        let outcome = client.send_message("  hello  ").await.unwrap();
        assert_eq!(outcome, SendOutcome::Sent);
        assert_eq!(peer.sent(), vec![r#"{"data":"hello"}"#.to_string()]);
        assert_eq!(
            client.transcript().entries().last(),
            Some(&TranscriptEntry::User("hello".to_string()))
        );
    }

    #[tokio::test]
    async fn extended_profile_sends_as_typed_with_mode() {
        let mut client = client(ClientProfile::Extended);
        let mut peer = client.connector().accept();
        client.login("alice", "secret").await.unwrap();

        client.set_mode(ChatMode::Rag);
        client.send_message(" what is rust? ").await.unwrap();
        assert_eq!(
            client.send_message("  \t ").await.unwrap(),
            SendOutcome::Dropped
        );
        assert_eq!(
            peer.sent(),
            vec![r#"{"data":" what is rust? ","mode":"rag"}"#.to_string()]
        );
        assert_eq!(client.transcript().len(), 1);
    }

    #[tokio::test]
    async fn send_before_login_is_dropped() {
        let mut client = client(ClientProfile::Extended);
        assert_eq!(
            client.send_message("hello").await.unwrap(),
            SendOutcome::Dropped
        );
    }

    #[tokio::test]
    async fn events_land_in_transcript() {
        let mut client = client(ClientProfile::Extended);
        let peer = client.connector().accept();
        client.login("alice", "secret").await.unwrap();

        peer.push_text(r#"{"timestamp":"12:00","query":"hi","data":"hello!"}"#);
        peer.close();
        assert!(client.is_streaming());
        assert!(client.next_event().await);
        assert!(client.next_event().await);
        assert!(!client.is_streaming());
        assert!(!client.next_event().await);
        assert_eq!(
            client.transcript().entries(),
            &[
                system("Connected to AI"),
                TranscriptEntry::Turn(ChatEvent::new("12:00", "hi", "hello!")),
                system("Disconnected"),
            ]
        );
    }

    #[tokio::test]
    async fn upload_lifecycle() {
        let mut client = client(ClientProfile::Extended);
        let _peer = client.connector().accept();
        client.login("alice", "secret").await.unwrap();

        client.knowledge_mut().open();
        client.knowledge_mut().set_input("   ");
        assert_eq!(client.upload_knowledge().await, UploadOutcome::Empty);
        assert_eq!(client.knowledge().status(), UploadStatus::Empty);
        assert!(client.backend().uploads.lock().unwrap().is_empty());

        client.knowledge_mut().set_input(" Rust is fast. ");
        assert_eq!(
            client.upload_knowledge().await,
            UploadOutcome::Updated {
                close_after: Duration::from_millis(1200)
            }
        );
        assert_eq!(
            client.backend().uploads.lock().unwrap().as_slice(),
            &["Rust is fast.".to_string()]
        );
        assert_eq!(client.knowledge().badge(), KnowledgeBadge::Active);
        assert_eq!(
            client.transcript().entries().last(),
            Some(&system(KNOWLEDGE_UPDATED))
        );

        client.finish_upload();
        assert!(!client.knowledge().is_open());
        assert!(client.knowledge().input().is_empty());
    }

    #[tokio::test]
    async fn upload_failures_keep_text() {
        let mut client = ChatClient::new(
            FakeBackend {
                fail_upload: true,
                ..FakeBackend::default()
            },
            MemoryConnector::new(),
            Endpoints::default(),
            ClientProfile::Extended,
            SessionPolicy::default(),
        );

        client.knowledge_mut().set_input("facts");
        assert_eq!(client.upload_knowledge().await, UploadOutcome::Failed);
        assert!(client.backend().uploads.lock().unwrap().is_empty());

        client.connector().accept();
        client.login("alice", "secret").await.unwrap();
        assert_eq!(client.upload_knowledge().await, UploadOutcome::Failed);
        assert_eq!(client.knowledge().status(), UploadStatus::Failed);
        assert_eq!(client.knowledge().input(), "facts");
        assert!(!client.knowledge().is_busy());
        assert_eq!(client.knowledge().badge(), KnowledgeBadge::Inactive);
    }

    #[tokio::test(start_paused = true)]
    async fn panel_closes_at_deadline() {
        let mut client = client(ClientProfile::Extended);
        let _peer = client.connector().accept();
        client.login("alice", "secret").await.unwrap();
        assert_eq!(client.knowledge_close_deadline(), None);
        assert!(!client.close_knowledge_if_due());

        client.knowledge_mut().open();
        client.knowledge_mut().set_input("Rust is fast.");
        let started = Instant::now();
        client.upload_knowledge().await;
        assert_eq!(
            client.knowledge_close_deadline(),
            Some(started + Duration::from_millis(1200))
        );

        tokio::time::advance(Duration::from_millis(1199)).await;
        assert!(!client.close_knowledge_if_due());
        assert!(client.knowledge().is_open());

        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(client.close_knowledge_if_due());
        assert!(!client.knowledge().is_open());
        assert!(client.knowledge().input().is_empty());
        assert_eq!(client.knowledge_close_deadline(), None);
        assert!(!client.close_knowledge_if_due());
    }

    #[tokio::test]
    async fn failed_upload_sets_no_deadline() {
        let mut client = client(ClientProfile::Extended);
        client.knowledge_mut().set_input("facts");
        assert_eq!(client.upload_knowledge().await, UploadOutcome::Failed);
        assert_eq!(client.knowledge_close_deadline(), None);
    }

    #[tokio::test]
    async fn minimal_profile_has_no_uploads() {
        let mut client = client(ClientProfile::Minimal);
        client.knowledge_mut().set_input("facts");
        assert_eq!(client.upload_knowledge().await, UploadOutcome::Unavailable);
    }

    #[tokio::test]
    async fn shutdown_closes_stream() {
        let mut client = client(ClientProfile::Extended);
        let peer = client.connector().accept();
        client.login("alice", "secret").await.unwrap();

        client.shutdown().await;
        assert!(peer.is_closed());
        assert!(!client.is_streaming());
        assert_eq!(client.status().stream, None);
        assert!(client.status().logged_in);
    }
}
