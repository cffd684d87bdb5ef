use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Response};
use url::Url;

use crate::error::{Error, Result};
use crate::types::{Credential, LoginRequest, LoginResponse, UploadTextRequest};

/// Compiled-in address of the chat backend.
pub const DEFAULT_BASE_URL: &str = "https://day1-backend-test.onrender.com";

const LOGIN_PATH: &str = "api/v1/auth/login";
const CHAT_PATH: &str = "api/v1/ai/chat";
const UPLOAD_TEXT_PATH: &str = "api/v1/essays/upload-text";

/// The three service addresses, derived from one HTTP base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base: Url,
}

impl Endpoints {
    /// Derive endpoints from an `http` or `https` base URL.
    pub fn new(base_url: &str) -> Result<Self> {
        let mut base = Url::parse(base_url)?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(Error::validation(
                format!("base URL must be http or https, got {}", base.scheme()),
                Some("base_url".to_string()),
            ));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        base.set_query(None);
        base.set_fragment(None);
        Ok(Self { base })
    }

    /// The HTTP base URL.
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// `POST` target for logins.
    pub fn login(&self) -> Result<Url> {
        Ok(self.base.join(LOGIN_PATH)?)
    }

    /// `POST` target for knowledge uploads.
    pub fn upload_text(&self) -> Result<Url> {
        Ok(self.base.join(UPLOAD_TEXT_PATH)?)
    }

    /// WebSocket URL of the chat stream, scoped by `credential`.
    ///
    /// The stream handshake carries no auth header; the token travels as the
    /// `token` query parameter.
    pub fn chat(&self, credential: &Credential) -> Result<Url> {
        let mut url = self.base.join(CHAT_PATH)?;
        let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
        url.set_scheme(scheme).map_err(|_| {
            Error::validation(
                format!("cannot derive {scheme} URL from {}", self.base),
                Some("base_url".to_string()),
            )
        })?;
        url.query_pairs_mut()
            .append_pair("token", credential.as_str());
        Ok(url)
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            base: Url::parse(&format!("{DEFAULT_BASE_URL}/")).expect("default base URL is valid"),
        }
    }
}

/// The request/response half of the chat backend.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Exchange a username and password for a credential.
    ///
    /// Any non-success status is an [`Error::Authentication`]; transport and
    /// decoding failures are reported as other variants.
    async fn login(&self, request: &LoginRequest) -> Result<Credential>;

    /// Submit a knowledge block for later retrieval.
    async fn upload_text(&self, credential: &Credential, request: &UploadTextRequest)
    -> Result<()>;
}

/// [`Backend`] speaking JSON over HTTP.
///
/// No timeout is configured: an unresponsive backend stalls the call.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: ReqwestClient,
    endpoints: Endpoints,
}

impl HttpBackend {
    /// Create a backend client for the given endpoints.
    pub fn new(endpoints: Endpoints) -> Result<Self> {
        let client = ReqwestClient::builder().build().map_err(|e| {
            Error::http_client(
                format!("Failed to build HTTP client: {e}"),
                Some(Box::new(e)),
            )
        })?;
        Ok(Self { client, endpoints })
    }

    /// The endpoints this client talks to.
    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    fn default_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers
    }

    fn map_send_error(e: reqwest::Error) -> Error {
        if e.is_connect() {
            Error::connection(format!("Connection error: {e}"), Some(Box::new(e)))
        } else {
            Error::http_client(format!("Request failed: {e}"), Some(Box::new(e)))
        }
    }

    async fn error_body(response: Response) -> String {
        response.text().await.unwrap_or_default()
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn login(&self, request: &LoginRequest) -> Result<Credential> {
        let url = self.endpoints.login()?;
        tracing::debug!(%url, username = %request.username, "login request");

        let response = self
            .client
            .post(url)
            .headers(Self::default_headers())
            .json(request)
            .send()
            .await
            .map_err(Self::map_send_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = Self::error_body(response).await;
            tracing::debug!(status = status.as_u16(), %body, "login rejected");
            return Err(Error::authentication(format!(
                "login rejected with HTTP {}",
                status.as_u16()
            )));
        }

        let body: LoginResponse = response.json().await.map_err(|e| {
            Error::serialization(
                format!("Failed to parse login response: {e}"),
                Some(Box::new(e)),
            )
        })?;
        Ok(body.token)
    }

    async fn upload_text(
        &self,
        credential: &Credential,
        request: &UploadTextRequest,
    ) -> Result<()> {
        let url = self.endpoints.upload_text()?;
        let mut headers = Self::default_headers();
        let bearer = HeaderValue::from_str(&credential.bearer()).map_err(|e| {
            Error::validation(
                format!("credential is not a valid header value: {e}"),
                Some("token".to_string()),
            )
        })?;
        headers.insert(header::AUTHORIZATION, bearer);
        tracing::debug!(%url, chars = request.content.chars().count(), "upload-text request");

        let response = self
            .client
            .post(url)
            .headers(headers)
            .json(request)
            .send()
            .await
            .map_err(Self::map_send_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = Self::error_body(response).await;
            return Err(Error::api(status.as_u16(), body));
        }
        Ok(())
    }
}
