//! UI layer: console app shell and panels.

pub mod app;

pub use app::{ConsoleApp, PersistedConsoleSettings, SETTINGS_STORAGE_KEY};
