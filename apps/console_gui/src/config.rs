use std::{collections::HashMap, fs};

pub const ENV_SERVER_URL: &str = "FWCONSOLE_SERVER_URL";
pub const CONFIG_FILE: &str = "console.toml";
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";

#[derive(Debug, Clone)]
pub struct Settings {
    pub server_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
        }
    }
}

/// Defaults, overridden by `console.toml` in the working directory, then by
/// the environment.
pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(CONFIG_FILE) {
        apply_file_config(&mut settings, &raw);
    }

    if let Ok(v) = std::env::var(ENV_SERVER_URL) {
        settings.server_url = v;
    }

    settings
}

fn apply_file_config(settings: &mut Settings, raw: &str) {
    if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(raw) {
        if let Some(v) = file_cfg.get("server_url") {
            settings.server_url = v.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_config_overrides_server_url() {
        let mut settings = Settings::default();
        apply_file_config(&mut settings, "server_url = \"http://10.0.0.2:5000\"\n");
        assert_eq!(settings.server_url, "http://10.0.0.2:5000");
    }

    #[test]
    fn unknown_keys_and_invalid_toml_are_ignored() {
        let mut settings = Settings::default();
        apply_file_config(&mut settings, "theme = \"dark\"\n");
        assert_eq!(settings.server_url, DEFAULT_SERVER_URL);

        apply_file_config(&mut settings, "not toml at all [");
        assert_eq!(settings.server_url, DEFAULT_SERVER_URL);
    }
}
