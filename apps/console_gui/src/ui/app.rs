use std::time::Duration;

use chrono::{DateTime, Local};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use serde::{Deserialize, Serialize};
use shared::domain::SafeMode;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{
    describe_transport_failure, UiErrorCategory, UiErrorContext, UiEvent,
};
use crate::controller::orchestration::dispatch_backend_command;

pub const SETTINGS_STORAGE_KEY: &str = "fwconsole.settings";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedConsoleSettings {
    pub server_url: String,
}

/// Console shell. Owns all display state; the backend worker never touches
/// it directly — every change flows through `apply_event`, the single
/// writer over the two output regions.
pub struct ConsoleApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,

    server_url_input: String,
    connected_url: Option<String>,

    command_input: String,
    parsed_display: String,
    result_display: String,

    logs_display: String,
    logs_refreshed_at: Option<DateTime<Local>>,
    safe_mode: Option<SafeMode>,

    in_flight: usize,
    status: String,
}

impl ConsoleApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        server_url: String,
    ) -> Self {
        let mut status = String::new();
        dispatch_backend_command(
            &cmd_tx,
            BackendCommand::Connect {
                server_url: server_url.clone(),
            },
            &mut status,
        );

        Self {
            cmd_tx,
            ui_rx,
            server_url_input: server_url,
            connected_url: None,
            command_input: String::new(),
            parsed_display: String::new(),
            result_display: String::new(),
            logs_display: String::new(),
            logs_refreshed_at: None,
            safe_mode: None,
            in_flight: 0,
            status,
        }
    }

    fn apply_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::GatewayReady { server_url } => {
                self.status = format!("Gateway ready at {server_url}");
                self.connected_url = Some(server_url);
            }
            UiEvent::Info(text) => self.status = text,
            UiEvent::ExecutionCompleted {
                parsed_command,
                execution_result,
            } => {
                self.settle_execution();
                match serde_json::to_string_pretty(&parsed_command) {
                    Ok(pretty) => {
                        self.parsed_display = pretty;
                        self.result_display = execution_result;
                        self.status = "Command executed".to_string();
                    }
                    Err(err) => {
                        // Render failure is treated like any other failure:
                        // both regions keep their previous contents.
                        tracing::error!(error = %err, "could not render parsed command");
                        self.status = "Could not render parsed command; display unchanged"
                            .to_string();
                    }
                }
            }
            UiEvent::RecentLogs { text } => {
                self.logs_display = text;
                self.logs_refreshed_at = Some(Local::now());
            }
            UiEvent::RollbackCompleted { result } => {
                self.status = format!("Rollback: {result}");
            }
            UiEvent::SafeModeToggled(mode) => {
                self.status = format!("Safe mode is now {mode}");
                self.safe_mode = Some(mode);
            }
            UiEvent::Error(err) => {
                if err.context() == UiErrorContext::Execute {
                    self.settle_execution();
                }
                self.status = if err.category() == UiErrorCategory::Transport {
                    describe_transport_failure(err.message())
                } else {
                    err.message().to_string()
                };
            }
        }
    }

    fn settle_execution(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    /// Submits the command field exactly as typed. The field is not cleared
    /// and not trimmed; the executor owns interpretation.
    fn submit_command(&mut self) {
        let command = self.command_input.clone();
        if dispatch_backend_command(
            &self.cmd_tx,
            BackendCommand::Execute { command },
            &mut self.status,
        ) {
            self.in_flight += 1;
        }
    }

    fn show_command_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("command_bar").show(ctx, |ui| {
            ui.add_space(4.0);
            ui.horizontal(|ui| {
                ui.label("Command:");
                let input = ui.add_sized(
                    [
                        ui.available_width() - 96.0,
                        ui.spacing().interact_size.y,
                    ],
                    egui::TextEdit::singleline(&mut self.command_input)
                        .id_source("command_input")
                        .hint_text("block ip 192.168.1.100"),
                );
                let submit_with_enter =
                    input.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                let execute_clicked = ui.button("Execute").clicked();
                if submit_with_enter || execute_clicked {
                    self.submit_command();
                    if submit_with_enter {
                        input.request_focus();
                    }
                }
            });
            ui.horizontal(|ui| {
                ui.label("Executor:");
                ui.add_sized(
                    [240.0, ui.spacing().interact_size.y],
                    egui::TextEdit::singleline(&mut self.server_url_input)
                        .id_source("server_url_input"),
                );
                if ui.button("Reconnect").clicked() {
                    let server_url = self.server_url_input.clone();
                    dispatch_backend_command(
                        &self.cmd_tx,
                        BackendCommand::Connect { server_url },
                        &mut self.status,
                    );
                }
                ui.separator();
                let safe_mode_label = match self.safe_mode {
                    Some(mode) => format!("Safe mode: {mode}"),
                    None => "Safe mode: ?".to_string(),
                };
                ui.label(safe_mode_label);
                if ui.button("Toggle").clicked() {
                    dispatch_backend_command(
                        &self.cmd_tx,
                        BackendCommand::ToggleSafeMode,
                        &mut self.status,
                    );
                }
                if ui.button("Rollback failsafe").clicked() {
                    dispatch_backend_command(
                        &self.cmd_tx,
                        BackendCommand::RollbackFailsafe,
                        &mut self.status,
                    );
                }
            });
            ui.add_space(4.0);
        });
    }

    fn show_logs_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("recent_logs_panel")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("Recent logs");
                    if ui.button("Refresh").clicked() {
                        dispatch_backend_command(
                            &self.cmd_tx,
                            BackendCommand::FetchRecentLogs,
                            &mut self.status,
                        );
                    }
                });
                if let Some(refreshed_at) = self.logs_refreshed_at {
                    ui.small(format!("as of {}", refreshed_at.format("%H:%M:%S")));
                }
                ui.separator();
                egui::ScrollArea::vertical()
                    .id_source("recent_logs_scroll")
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        ui.monospace(&self.logs_display);
                    });
            });
    }

    fn show_status_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if self.in_flight > 0 {
                    ui.spinner();
                    ui.label(format!("{} awaiting response", self.in_flight));
                    ui.separator();
                }
                if let Some(url) = &self.connected_url {
                    ui.label(url);
                    ui.separator();
                }
                ui.label(&self.status);
            });
        });
    }

    fn show_output_panes(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.columns(2, |columns| {
                columns[0].heading("Parsed command");
                egui::ScrollArea::vertical()
                    .id_source("parsed_scroll")
                    .auto_shrink([false, false])
                    .show(&mut columns[0], |ui| {
                        ui.monospace(&self.parsed_display);
                    });
                columns[1].heading("Execution result");
                egui::ScrollArea::vertical()
                    .id_source("result_scroll")
                    .auto_shrink([false, false])
                    .show(&mut columns[1], |ui| {
                        ui.monospace(&self.result_display);
                    });
            });
        });
    }
}

impl eframe::App for ConsoleApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        while let Ok(event) = self.ui_rx.try_recv() {
            self.apply_event(event);
        }

        self.show_command_bar(ctx);
        self.show_logs_panel(ctx);
        self.show_status_bar(ctx);
        self.show_output_panes(ctx);

        if self.in_flight > 0 {
            ctx.request_repaint_after(Duration::from_millis(100));
        } else {
            ctx.request_repaint_after(Duration::from_millis(250));
        }
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        let settings = PersistedConsoleSettings {
            server_url: self.server_url_input.clone(),
        };
        if let Ok(text) = serde_json::to_string(&settings) {
            storage.set_string(SETTINGS_STORAGE_KEY, text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::events::UiError;
    use crossbeam_channel::bounded;
    use serde_json::json;

    fn test_app() -> (ConsoleApp, Receiver<BackendCommand>) {
        let (cmd_tx, cmd_rx) = bounded(8);
        let (_ui_tx, ui_rx) = bounded(8);
        let app = ConsoleApp::new(cmd_tx, ui_rx, "http://127.0.0.1:5000".to_string());
        let _ = cmd_rx.recv(); // startup connect
        (app, cmd_rx)
    }

    #[test]
    fn renders_execution_outcome_with_two_space_indent() {
        let (mut app, _cmd_rx) = test_app();
        app.in_flight = 1;

        app.apply_event(UiEvent::ExecutionCompleted {
            parsed_command: json!({"cmd": "ls", "args": ["-la"]}),
            execution_result: "file1\nfile2".to_string(),
        });

        assert_eq!(
            app.parsed_display,
            "{\n  \"args\": [\n    \"-la\"\n  ],\n  \"cmd\": \"ls\"\n}"
        );
        assert_eq!(app.result_display, "file1\nfile2");
        assert_eq!(app.in_flight, 0);
    }

    #[test]
    fn failed_execution_retains_previous_display() {
        let (mut app, _cmd_rx) = test_app();
        app.parsed_display = "{\n  \"cmd\": \"old\"\n}".to_string();
        app.result_display = "previous result".to_string();
        app.in_flight = 1;

        app.apply_event(UiEvent::Error(UiError::from_message(
            UiErrorContext::Execute,
            "connection refused",
        )));

        assert_eq!(app.parsed_display, "{\n  \"cmd\": \"old\"\n}");
        assert_eq!(app.result_display, "previous result");
        assert_eq!(app.in_flight, 0);
        assert!(!app.status.is_empty());
    }

    #[test]
    fn submit_queues_exactly_one_execute_with_raw_text() {
        let (mut app, cmd_rx) = test_app();
        app.command_input = "  ls -la ".to_string();

        app.submit_command();

        match cmd_rx.try_recv() {
            Ok(BackendCommand::Execute { command }) => assert_eq!(command, "  ls -la "),
            _ => panic!("expected exactly one queued execute command"),
        }
        assert!(cmd_rx.try_recv().is_err());
        assert_eq!(app.in_flight, 1);
        assert_eq!(app.command_input, "  ls -la ");
    }

    #[test]
    fn safe_mode_and_logs_events_update_ambient_state_only() {
        let (mut app, _cmd_rx) = test_app();
        app.parsed_display = "untouched".to_string();

        app.apply_event(UiEvent::SafeModeToggled(SafeMode::On));
        assert_eq!(app.safe_mode, Some(SafeMode::On));
        assert!(app.status.contains("ON"));

        app.apply_event(UiEvent::RecentLogs {
            text: "INFO: blocked ip\n".to_string(),
        });
        assert_eq!(app.logs_display, "INFO: blocked ip\n");
        assert!(app.logs_refreshed_at.is_some());

        assert_eq!(app.parsed_display, "untouched");
    }
}
