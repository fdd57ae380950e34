use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /execute`. The command travels exactly as the operator
/// typed it; the executor owns all parsing and validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecuteRequest {
    pub command: String,
}

/// Successful `/execute` reply. `parsed_command` is whatever structured
/// interpretation the executor produced (shape not fixed by this client),
/// `execution_result` is the textual outcome of running it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecuteResponse {
    pub parsed_command: Value,
    pub execution_result: String,
}

/// `GET /logs` reply: the most recent security-log entries joined into a
/// single newline-separated string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentLogsResponse {
    pub recent_logs: String,
}

/// `POST /rollback_failsafe` reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollbackResponse {
    pub result: String,
}
