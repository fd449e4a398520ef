//! HTTP session probe.

use reqwest::Client;

use crate::error::FetchFailure;
use crate::providers::SessionStatus;

/// Remote session check over HTTP.
///
/// Calls the identity service's status endpoint with the visitor's token
/// and decodes the boolean answer. This is the production probe to hand
/// to `SessionValidator::register_probe`; tests use a scripted closure
/// instead.
///
/// # Example
///
/// ```no_run
/// use portal_guard::providers::HttpSessionProbe;
///
/// let probe = HttpSessionProbe::new("https://api.example.com".to_string());
/// ```
#[derive(Clone, Debug)]
pub struct HttpSessionProbe {
    /// Base URL of the identity service.
    base_url: String,

    /// Path of the session status endpoint.
    ///
    /// Default: "/v1/session"
    status_path: String,

    /// HTTP client for making requests.
    http_client: Client,
}

impl HttpSessionProbe {
    /// Create a new probe against `base_url`.
    ///
    /// A trailing slash on `base_url` is tolerated.
    #[must_use]
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            status_path: "/v1/session".to_string(),
            http_client: Client::new(),
        }
    }

    /// Set a custom status endpoint path.
    ///
    /// Default: `/v1/session`
    #[must_use]
    pub fn with_status_path(mut self, path: impl Into<String>) -> Self {
        self.status_path = path.into();
        self
    }

    /// Ask the identity service whether `token` still names a live session.
    ///
    /// # Errors
    ///
    /// Returns [`FetchFailure::Transport`] if the request never completed
    /// (DNS, connect, timeout) and [`FetchFailure::Status`] if the server
    /// answered with a non-success status or an undecodable body.
    pub async fn check_session(&self, token: &str) -> Result<SessionStatus, FetchFailure> {
        let response = self
            .http_client
            .get(self.endpoint_url())
            .bearer_auth(token)
            .send()
            .await
            .map_err(map_request_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(failure_from_parts(Some(status), body));
        }

        // The server answered; a body it serves that does not decode is
        // terminal, not a transport hiccup worth retrying.
        response
            .json::<SessionStatus>()
            .await
            .map_err(|err| failure_from_parts(Some(status), err.to_string()))
    }

    fn endpoint_url(&self) -> String {
        format!("{}{}", self.base_url, self.status_path)
    }
}

/// Map a `reqwest` error onto the guard's failure taxonomy.
fn map_request_error(err: reqwest::Error) -> FetchFailure {
    failure_from_parts(err.status(), err.to_string())
}

fn failure_from_parts(status: Option<reqwest::StatusCode>, detail: String) -> FetchFailure {
    match status {
        Some(status) => FetchFailure::Status {
            status: status.as_u16(),
            message: if detail.is_empty() {
                status.to_string()
            } else {
                detail
            },
        },
        None => FetchFailure::Transport { reason: detail },
    }
}
