//! Backend commands queued from UI to backend worker.

pub enum BackendCommand {
    Connect { server_url: String },
    Execute { command: String },
    FetchRecentLogs,
    RollbackFailsafe,
    ToggleSafeMode,
}
