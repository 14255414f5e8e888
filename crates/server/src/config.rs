use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use tracing::warn;

const SETTINGS_FILE: &str = "lab.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub bind_addr: String,
    pub submissions_path: PathBuf,
    pub assets_dir: PathBuf,
    pub teacher_password: Option<String>,
    pub reset_delay_seconds: u64,
    pub session_idle_minutes: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8501".into(),
            submissions_path: PathBuf::from("./data/submitted_logs.json"),
            assets_dir: PathBuf::from("./data/images"),
            teacher_password: None,
            reset_delay_seconds: 3,
            session_idle_minutes: 30,
        }
    }
}

impl Settings {
    pub fn reset_delay(&self) -> Duration {
        Duration::from_secs(self.reset_delay_seconds)
    }

    pub fn session_idle(&self) -> Duration {
        Duration::from_secs(self.session_idle_minutes * 60)
    }
}

pub fn load_settings() -> Settings {
    load_settings_from(Path::new(SETTINGS_FILE), |key| std::env::var(key).ok())
}

/// Defaults, then the flat settings file, then environment variables.
pub(crate) fn load_settings_from(path: &Path, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        match toml::from_str::<toml::Table>(&raw) {
            Ok(file_cfg) => apply_file(&mut settings, &file_cfg),
            Err(error) => {
                warn!(path = %path.display(), %error, "ignoring unreadable settings file")
            }
        }
    }

    if let Some(v) = env("LAB_BIND") {
        settings.bind_addr = v;
    }
    if let Some(v) = env("APP__BIND_ADDR") {
        settings.bind_addr = v;
    }

    if let Some(v) = env("SUBMISSIONS_PATH") {
        settings.submissions_path = PathBuf::from(v);
    }
    if let Some(v) = env("APP__SUBMISSIONS_PATH") {
        settings.submissions_path = PathBuf::from(v);
    }

    if let Some(v) = env("ASSETS_DIR") {
        settings.assets_dir = PathBuf::from(v);
    }
    if let Some(v) = env("APP__ASSETS_DIR") {
        settings.assets_dir = PathBuf::from(v);
    }

    if let Some(v) = env("TEACHER_PASSWORD") {
        settings.teacher_password = Some(v);
    }
    if let Some(v) = env("APP__TEACHER_PASSWORD") {
        settings.teacher_password = Some(v);
    }

    if let Some(v) = env("APP__RESET_DELAY_SECONDS") {
        match v.parse::<u64>() {
            Ok(parsed) => settings.reset_delay_seconds = parsed,
            Err(_) => warn!(value = %v, "APP__RESET_DELAY_SECONDS is not a whole number"),
        }
    }

    if let Some(v) = env("APP__SESSION_IDLE_MINUTES") {
        match v.parse::<u64>() {
            Ok(parsed) if parsed > 0 => settings.session_idle_minutes = parsed,
            _ => warn!(value = %v, "APP__SESSION_IDLE_MINUTES must be a positive whole number"),
        }
    }

    settings.teacher_password = settings
        .teacher_password
        .filter(|password| !password.is_empty());
    settings
}

fn apply_file(settings: &mut Settings, file_cfg: &toml::Table) {
    if let Some(v) = file_cfg.get("bind_addr").and_then(|v| v.as_str()) {
        settings.bind_addr = v.to_string();
    }
    if let Some(v) = file_cfg.get("submissions_path").and_then(|v| v.as_str()) {
        settings.submissions_path = PathBuf::from(v);
    }
    if let Some(v) = file_cfg.get("assets_dir").and_then(|v| v.as_str()) {
        settings.assets_dir = PathBuf::from(v);
    }
    if let Some(v) = file_cfg.get("teacher_password").and_then(|v| v.as_str()) {
        settings.teacher_password = Some(v.to_string());
    }
    if let Some(v) = file_cfg
        .get("reset_delay_seconds")
        .and_then(|v| v.as_integer())
        .and_then(|v| u64::try_from(v).ok())
    {
        settings.reset_delay_seconds = v;
    }
    if let Some(v) = file_cfg
        .get("session_idle_minutes")
        .and_then(|v| v.as_integer())
        .and_then(|v| u64::try_from(v).ok())
        .filter(|v| *v > 0)
    {
        settings.session_idle_minutes = v;
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
