use async_trait::async_trait;
use reqwest::Client;
use shared::{
    domain::{SafeMode, SubmissionId},
    error::ErrorBody,
    protocol::{ExecuteRequest, ExecuteResponse, RecentLogsResponse, RollbackResponse},
};
use tracing::debug;
use url::Url;

pub mod error;

pub use error::GatewayError;

/// Operations the executor service exposes to this console. `ExecutorClient`
/// is the real implementation; tests and the GUI backend can substitute a
/// double.
#[async_trait]
pub trait CommandGateway: Send + Sync {
    async fn execute(&self, command: &str) -> Result<ExecuteResponse, GatewayError>;
    async fn recent_logs(&self) -> Result<String, GatewayError>;
    async fn rollback_failsafe(&self) -> Result<String, GatewayError>;
    async fn toggle_safe_mode(&self) -> Result<SafeMode, GatewayError>;
}

/// HTTP gateway to the firewall command executor.
pub struct ExecutorClient {
    http: Client,
    base_url: Url,
}

impl ExecutorClient {
    pub fn new(server_url: &str) -> Result<Self, GatewayError> {
        Ok(Self {
            http: Client::new(),
            base_url: normalize_server_url(server_url)?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, GatewayError> {
        self.base_url
            .join(path)
            .map_err(|source| GatewayError::InvalidServerUrl {
                url: format!("{}{path}", self.base_url),
                source,
            })
    }
}

#[async_trait]
impl CommandGateway for ExecutorClient {
    /// Submits the command string exactly as entered. No trimming, no
    /// client-side validation; the executor owns interpretation.
    async fn execute(&self, command: &str) -> Result<ExecuteResponse, GatewayError> {
        let submission = SubmissionId::generate();
        debug!(%submission, command_len = command.len(), "submitting command");

        let response = self
            .http
            .post(self.endpoint("execute")?)
            .json(&ExecuteRequest {
                command: command.to_string(),
            })
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.bytes().await?;
        let outcome = decode_json_body::<ExecuteResponse>(status, &body);
        match &outcome {
            Ok(_) => debug!(%submission, status, "command executed"),
            Err(err) => debug!(%submission, status, error = %err, "command submission failed"),
        }
        outcome
    }

    async fn recent_logs(&self) -> Result<String, GatewayError> {
        let response = self.http.get(self.endpoint("logs")?).send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;
        let decoded: RecentLogsResponse = decode_json_body(status, &body)?;
        Ok(decoded.recent_logs)
    }

    async fn rollback_failsafe(&self) -> Result<String, GatewayError> {
        let response = self
            .http
            .post(self.endpoint("rollback_failsafe")?)
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;
        let decoded: RollbackResponse = decode_json_body(status, &body)?;
        Ok(decoded.result)
    }

    /// The toggle endpoint replies with a plain-text sentence, not JSON.
    async fn toggle_safe_mode(&self) -> Result<SafeMode, GatewayError> {
        let response = self
            .http
            .get(self.endpoint("toggle_safe_mode")?)
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        body.parse::<SafeMode>()
            .map_err(|source| GatewayError::SafeModeText { status, source })
    }
}

/// Body-shape-first decoding. The expected shape wins over the status
/// code: any status whose body decodes as `T` is a success, matching what
/// the executor's own dashboard renders. A body shaped like
/// `{"error": ...}` becomes a service refusal instead.
fn decode_json_body<T: serde::de::DeserializeOwned>(
    status: u16,
    body: &[u8],
) -> Result<T, GatewayError> {
    match serde_json::from_slice::<T>(body) {
        Ok(parsed) => Ok(parsed),
        Err(source) => {
            if let Ok(refusal) = serde_json::from_slice::<ErrorBody>(body) {
                return Err(GatewayError::Service {
                    status,
                    message: refusal.error,
                });
            }
            Err(GatewayError::Decode { status, source })
        }
    }
}

/// Accepts `host:port`, a full `http(s)://` URL, or either with a path;
/// guarantees the result ends with `/` so endpoint joins append instead of
/// replacing the last path segment.
pub fn normalize_server_url(server_url: &str) -> Result<Url, GatewayError> {
    let trimmed = server_url.trim();
    if trimmed.is_empty() {
        return Err(GatewayError::EmptyServerUrl);
    }

    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    };

    let mut url = Url::parse(&with_scheme).map_err(|source| GatewayError::InvalidServerUrl {
        url: server_url.to_string(),
        source,
    })?;

    if url.cannot_be_a_base() {
        return Err(GatewayError::InvalidServerUrl {
            url: server_url.to_string(),
            source: url::ParseError::RelativeUrlWithoutBase,
        });
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
