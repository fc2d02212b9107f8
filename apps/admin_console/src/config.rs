use std::{
    fs,
    path::{Path, PathBuf},
};

use console_core::http::DEFAULT_API_URL;
use serde::Deserialize;

pub const SETTINGS_FILE: &str = "admin.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_url: String,
    pub token_path: PathBuf,
    pub log_level: String,
    pub page_limit: u32,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
            token_path: default_token_path(),
            log_level: "info".into(),
            page_limit: 10,
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_url: Option<String>,
    token_path: Option<PathBuf>,
    log_level: Option<String>,
    page_limit: Option<u32>,
    request_timeout_secs: Option<u64>,
}

fn default_token_path() -> PathBuf {
    dirs::config_dir()
        .or_else(dirs::home_dir)
        .map(|base| base.join("astrosway-admin").join("token"))
        .unwrap_or_else(|| PathBuf::from(".admin_token"))
}

pub fn load_settings() -> Settings {
    load_settings_from(Path::new(SETTINGS_FILE), |key| std::env::var(key).ok())
}

/// Defaults, then the settings file, then environment overrides.
pub fn load_settings_from(path: &Path, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        if let Ok(file_cfg) = toml::from_str::<FileSettings>(&raw) {
            if let Some(v) = file_cfg.api_url {
                settings.api_url = v;
            }
            if let Some(v) = file_cfg.token_path {
                settings.token_path = v;
            }
            if let Some(v) = file_cfg.log_level {
                settings.log_level = v;
            }
            if let Some(v) = file_cfg.page_limit.filter(|limit| *limit > 0) {
                settings.page_limit = v;
            }
            if let Some(v) = file_cfg.request_timeout_secs.filter(|secs| *secs > 0) {
                settings.request_timeout_secs = v;
            }
        }
    }

    if let Some(v) = env("ADMIN_API_URL") {
        settings.api_url = v;
    }
    if let Some(v) = env("APP__API_URL") {
        settings.api_url = v;
    }

    if let Some(v) = env("ADMIN_TOKEN_PATH") {
        settings.token_path = PathBuf::from(v);
    }
    if let Some(v) = env("APP__TOKEN_PATH") {
        settings.token_path = PathBuf::from(v);
    }

    if let Some(v) = env("APP__LOG_LEVEL") {
        settings.log_level = v;
    }

    if let Some(v) = env("APP__PAGE_LIMIT") {
        if let Ok(parsed) = v.parse::<u32>() {
            if parsed > 0 {
                settings.page_limit = parsed;
            }
        }
    }

    if let Some(v) = env("APP__REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            if parsed > 0 {
                settings.request_timeout_secs = parsed;
            }
        }
    }

    settings.api_url = normalize_api_url(&settings.api_url);
    settings
}

fn normalize_api_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return DEFAULT_API_URL.to_string();
    }
    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_apply_without_file_or_env() {
        let dir = tempfile::tempdir().expect("tempdir");
        let settings = load_settings_from(&dir.path().join("missing.toml"), env_from(&[]));
        assert_eq!(settings.api_url, DEFAULT_API_URL);
        assert_eq!(settings.page_limit, 10);
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn env_overrides_file_and_trailing_slash_is_trimmed() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("admin.toml");
        fs::write(
            &path,
            "api_url = \"http://file.local/\"\npage_limit = 25\nlog_level = \"debug\"\n",
        )
        .expect("write settings");

        let settings = load_settings_from(&path, env_from(&[]));
        assert_eq!(settings.api_url, "http://file.local");
        assert_eq!(settings.page_limit, 25);
        assert_eq!(settings.log_level, "debug");

        let settings = load_settings_from(
            &path,
            env_from(&[
                ("ADMIN_API_URL", "http://legacy.local"),
                ("APP__API_URL", "http://env.local//"),
                ("APP__PAGE_LIMIT", "0"),
                ("APP__TOKEN_PATH", "/tmp/admin-token"),
            ]),
        );
        assert_eq!(settings.api_url, "http://env.local");
        assert_eq!(settings.page_limit, 25);
        assert_eq!(settings.token_path, PathBuf::from("/tmp/admin-token"));
    }

    #[test]
    fn zero_timeout_is_ignored() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("admin.toml");
        fs::write(&path, "request_timeout_secs = 0\n").expect("write settings");

        let settings = load_settings_from(&path, env_from(&[]));
        assert_eq!(settings.request_timeout_secs, 30);

        let settings = load_settings_from(&path, env_from(&[("APP__REQUEST_TIMEOUT_SECS", "0")]));
        assert_eq!(settings.request_timeout_secs, 30);

        let settings = load_settings_from(&path, env_from(&[("APP__REQUEST_TIMEOUT_SECS", "5")]));
        assert_eq!(settings.request_timeout_secs, 5);
    }

    #[test]
    fn malformed_file_is_ignored() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("admin.toml");
        fs::write(&path, "page_limit = \"many\"").expect("write settings");

        let settings = load_settings_from(&path, env_from(&[]));
        assert_eq!(settings, Settings::default());
    }
}
