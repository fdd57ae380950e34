//! UI/backend events and error modeling for the console controller.

use client_core::GatewayError;
use serde_json::Value;
use shared::domain::SafeMode;

pub enum UiEvent {
    GatewayReady {
        server_url: String,
    },
    Info(String),
    ExecutionCompleted {
        parsed_command: Value,
        execution_result: String,
    },
    RecentLogs {
        text: String,
    },
    RollbackCompleted {
        result: String,
    },
    SafeModeToggled(SafeMode),
    Error(UiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Configuration,
    Transport,
    Service,
    Decode,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    Connect,
    Execute,
    FetchLogs,
    Rollback,
    SafeModeToggle,
}

pub fn describe_transport_failure(message: &str) -> String {
    let lower = message.to_ascii_lowercase();
    if lower.contains("connection refused")
        || lower.contains("failed to connect")
        || lower.contains("dns")
        || lower.contains("timed out")
    {
        "Executor service unreachable; check the URL and network, then reconnect.".to_string()
    } else {
        format!("Transport error: {message}")
    }
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_gateway(context: UiErrorContext, err: &GatewayError) -> Self {
        let category = match err {
            GatewayError::EmptyServerUrl | GatewayError::InvalidServerUrl { .. } => {
                UiErrorCategory::Configuration
            }
            GatewayError::Transport(_) => UiErrorCategory::Transport,
            GatewayError::Service { .. } => UiErrorCategory::Service,
            GatewayError::Decode { .. } | GatewayError::SafeModeText { .. } => {
                UiErrorCategory::Decode
            }
        };
        Self {
            category,
            context,
            message: err.to_string(),
        }
    }

    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        Self {
            category: UiErrorCategory::Unknown,
            context,
            message: message.into(),
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categorizes_gateway_errors_by_variant() {
        let refusal = GatewayError::Service {
            status: 403,
            message: "Permission denied".to_string(),
        };
        let err = UiError::from_gateway(UiErrorContext::Execute, &refusal);
        assert_eq!(err.category(), UiErrorCategory::Service);
        assert_eq!(err.context(), UiErrorContext::Execute);
        assert!(err.message().contains("Permission denied"));

        let config = UiError::from_gateway(UiErrorContext::Connect, &GatewayError::EmptyServerUrl);
        assert_eq!(config.category(), UiErrorCategory::Configuration);
    }

    #[test]
    fn describes_unreachable_executor_for_transport_failures() {
        let text = describe_transport_failure("tcp connect error: Connection refused (os error 111)");
        assert!(text.contains("unreachable"));

        let other = describe_transport_failure("body size limit exceeded");
        assert!(other.contains("Transport error"));
    }
}
