//! Backend worker: owns the tokio runtime and the executor gateway, drains
//! the UI command queue, and reports outcomes back as UI events.

use std::{sync::Arc, thread};

use client_core::{CommandGateway, ExecutorClient};
use crossbeam_channel::{Receiver, Sender};
use tracing::{error, info};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

pub fn launch(cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>) {
    thread::spawn(move || run_worker(cmd_rx, ui_tx));
}

fn run_worker(cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>) {
    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            error!("failed to build backend runtime: {err}");
            let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                UiErrorContext::BackendStartup,
                format!("backend worker startup failure: {err}"),
            )));
            return;
        }
    };

    runtime.block_on(async move {
        let mut gateway: Option<Arc<ExecutorClient>> = None;
        let _ = ui_tx.try_send(UiEvent::Info("Backend worker ready".to_string()));

        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                BackendCommand::Connect { server_url } => {
                    info!(%server_url, "backend: connect");
                    match ExecutorClient::new(&server_url) {
                        Ok(client) => {
                            let server_url = client.base_url().to_string();
                            gateway = Some(Arc::new(client));
                            let _ = ui_tx.try_send(UiEvent::GatewayReady { server_url });
                        }
                        Err(err) => {
                            error!("backend: connect failed: {err}");
                            let _ = ui_tx.try_send(UiEvent::Error(UiError::from_gateway(
                                UiErrorContext::Connect,
                                &err,
                            )));
                        }
                    }
                }
                BackendCommand::Execute { command } => {
                    let Some(client) = gateway.clone() else {
                        let _ = ui_tx.try_send(missing_gateway(UiErrorContext::Execute));
                        continue;
                    };
                    // Submissions are deliberately unserialized: each runs as
                    // its own task, two rapid submissions race, and the last
                    // response to arrive wins the render.
                    let ui_tx = ui_tx.clone();
                    tokio::spawn(async move {
                        match client.execute(&command).await {
                            Ok(outcome) => {
                                let _ = ui_tx.try_send(UiEvent::ExecutionCompleted {
                                    parsed_command: outcome.parsed_command,
                                    execution_result: outcome.execution_result,
                                });
                            }
                            Err(err) => {
                                error!("backend: execute failed: {err}");
                                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_gateway(
                                    UiErrorContext::Execute,
                                    &err,
                                )));
                            }
                        }
                    });
                }
                BackendCommand::FetchRecentLogs => {
                    let Some(client) = gateway.as_deref() else {
                        let _ = ui_tx.try_send(missing_gateway(UiErrorContext::FetchLogs));
                        continue;
                    };
                    info!("backend: fetch_recent_logs");
                    match client.recent_logs().await {
                        Ok(text) => {
                            let _ = ui_tx.try_send(UiEvent::RecentLogs { text });
                        }
                        Err(err) => {
                            error!("backend: fetch_recent_logs failed: {err}");
                            let _ = ui_tx.try_send(UiEvent::Error(UiError::from_gateway(
                                UiErrorContext::FetchLogs,
                                &err,
                            )));
                        }
                    }
                }
                BackendCommand::RollbackFailsafe => {
                    let Some(client) = gateway.as_deref() else {
                        let _ = ui_tx.try_send(missing_gateway(UiErrorContext::Rollback));
                        continue;
                    };
                    info!("backend: rollback_failsafe");
                    match client.rollback_failsafe().await {
                        Ok(result) => {
                            let _ = ui_tx.try_send(UiEvent::RollbackCompleted { result });
                        }
                        Err(err) => {
                            error!("backend: rollback_failsafe failed: {err}");
                            let _ = ui_tx.try_send(UiEvent::Error(UiError::from_gateway(
                                UiErrorContext::Rollback,
                                &err,
                            )));
                        }
                    }
                }
                BackendCommand::ToggleSafeMode => {
                    let Some(client) = gateway.as_deref() else {
                        let _ = ui_tx.try_send(missing_gateway(UiErrorContext::SafeModeToggle));
                        continue;
                    };
                    info!("backend: toggle_safe_mode");
                    match client.toggle_safe_mode().await {
                        Ok(mode) => {
                            let _ = ui_tx.try_send(UiEvent::SafeModeToggled(mode));
                        }
                        Err(err) => {
                            error!("backend: toggle_safe_mode failed: {err}");
                            let _ = ui_tx.try_send(UiEvent::Error(UiError::from_gateway(
                                UiErrorContext::SafeModeToggle,
                                &err,
                            )));
                        }
                    }
                }
            }
        }
    });
}

fn missing_gateway(context: UiErrorContext) -> UiEvent {
    UiEvent::Error(UiError::from_message(
        context,
        "no executor configured; connect first",
    ))
}
