use shared::domain::ParseSafeModeError;
use thiserror::Error;

/// Everything that can go wrong between the console and the executor.
/// Front ends treat all of these the same way for rendering purposes: log,
/// keep the previous display contents, summarize in the status line.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("server url is empty")]
    EmptyServerUrl,

    #[error("invalid server url {url:?}: {source}")]
    InvalidServerUrl {
        url: String,
        source: url::ParseError,
    },

    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("executor refused the request (http {status}): {message}")]
    Service { status: u16, message: String },

    #[error("could not decode executor response (http {status}): {source}")]
    Decode {
        status: u16,
        source: serde_json::Error,
    },

    #[error("could not interpret safe mode response (http {status}): {source}")]
    SafeModeText {
        status: u16,
        source: ParseSafeModeError,
    },
}

impl GatewayError {
    /// True when retrying against a different URL could plausibly help,
    /// used by front ends to suggest checking the configured endpoint.
    pub fn is_transport(&self) -> bool {
        matches!(self, GatewayError::Transport(_))
    }
}
