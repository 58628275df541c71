use std::{collections::HashMap, fs, time::Duration};

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct Settings {
    /// Root of the remote REST store, e.g. `http://127.0.0.1:3000/api`.
    pub base_url: String,
    pub session_file: String,
    pub notification_ttl_ms: u64,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3000".into(),
            session_file: "./console-session.json".into(),
            notification_ttl_ms: 5000,
            request_timeout_secs: 10,
        }
    }
}

impl Settings {
    pub fn notification_ttl(&self) -> Duration {
        Duration::from_millis(self.notification_ttl_ms)
    }

    pub fn http_client(&self) -> anyhow::Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(Duration::from_secs(self.request_timeout_secs))
            .build()
            .context("building http client")
    }
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("console.toml") {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(&raw) {
            for (key, value) in &file_cfg {
                apply_file_value(&mut settings, key, value);
            }
        }
    }

    if let Ok(v) = std::env::var("CONSOLE_BASE_URL") {
        settings.base_url = v;
    }
    if let Ok(v) = std::env::var("APP__BASE_URL") {
        settings.base_url = v;
    }

    if let Ok(v) = std::env::var("APP__SESSION_FILE") {
        settings.session_file = v;
    }

    if let Ok(v) = std::env::var("APP__NOTIFICATION_TTL_MS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.notification_ttl_ms = parsed;
        }
    }

    if let Ok(v) = std::env::var("APP__REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.request_timeout_secs = parsed;
        }
    }

    settings
}

fn apply_file_value(settings: &mut Settings, key: &str, value: &str) {
    match key {
        "base_url" => settings.base_url = value.to_owned(),
        "session_file" => settings.session_file = value.to_owned(),
        "notification_ttl_ms" => {
            if let Ok(parsed) = value.parse::<u64>() {
                settings.notification_ttl_ms = parsed;
            }
        }
        "request_timeout_secs" => {
            if let Ok(parsed) = value.parse::<u64>() {
                settings.request_timeout_secs = parsed;
            }
        }
        _ => {}
    }
}
