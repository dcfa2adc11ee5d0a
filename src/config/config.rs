// SPDX-License-Identifier: GPL-3.0-only
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use crate::remote::Credentials;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the photo API (e.g., "http://localhost:3000/api")
    pub api_base_url: String,

    /// SQLite database path for the local photo store
    pub store_db_path: PathBuf,

    /// Periodic sync interval in seconds; 0 syncs only at start-up
    pub sync_interval_secs: u64,

    /// Timeout applied to every HTTP request
    pub request_timeout_secs: u64,

    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Emit logs as JSON lines instead of human-readable text.
    /// `BOOSTER_LOG_JSON` accepts true/false, 1/0, yes/no and on/off
    pub log_json: bool,

    /// Account to sign in with before the first sync
    pub auth_email: Option<String>,

    /// Password for `auth_email`
    pub auth_password: Option<String>,
}

impl Config {
    /// Load configuration from TOML file with environment variable overrides
    pub fn load() -> anyhow::Result<Self> {
        let config_path = std::env::var("BOOSTER_CONFIG")
            .unwrap_or_else(|_| "config.toml".to_string());

        let mut config: Config = if std::path::Path::new(&config_path).exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            toml::from_str(&contents)?
        } else {
            Config::default()
        };

        if let Ok(val) = std::env::var("BOOSTER_API_BASE_URL") {
            config.api_base_url = val;
        }
        if let Ok(val) = std::env::var("BOOSTER_STORE_DB_PATH") {
            config.store_db_path = PathBuf::from(val);
        }
        if let Ok(val) = std::env::var("BOOSTER_SYNC_INTERVAL_SECS") {
            config.sync_interval_secs = val.parse()?;
        }
        if let Ok(val) = std::env::var("BOOSTER_REQUEST_TIMEOUT_SECS") {
            config.request_timeout_secs = val.parse()?;
        }
        if let Ok(val) = std::env::var("BOOSTER_LOG_LEVEL") {
            config.log_level = val;
        }
        if let Ok(val) = std::env::var("BOOSTER_LOG_JSON") {
            config.log_json = parse_flag("BOOSTER_LOG_JSON", &val)?;
        }
        if let Ok(val) = std::env::var("BOOSTER_AUTH_EMAIL") {
            config.auth_email = Some(val);
        }
        if let Ok(val) = std::env::var("BOOSTER_AUTH_PASSWORD") {
            config.auth_password = Some(val);
        }

        if config.request_timeout_secs == 0 {
            return Err(anyhow::anyhow!("request_timeout_secs must be greater than zero"));
        }

        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Sign-in credentials, when both email and password are configured
    pub fn credentials(&self) -> Option<Credentials> {
        match (&self.auth_email, &self.auth_password) {
            (Some(email), Some(password)) => Some(Credentials::new(email, password, password)),
            _ => None,
        }
    }

    /// `None` when periodic sync is disabled
    pub fn sync_interval(&self) -> Option<Duration> {
        (self.sync_interval_secs > 0).then(|| Duration::from_secs(self.sync_interval_secs))
    }
}

fn parse_flag(name: &str, value: &str) -> anyhow::Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(anyhow::anyhow!("{} must be a boolean, got {:?}", name, other)),
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: String::from("http://localhost:3000/api"),
            store_db_path: PathBuf::from("photos.db"),
            sync_interval_secs: 300, // 5 minutes
            request_timeout_secs: 30,
            log_level: String::from("info"),
            log_json: false,
            auth_email: None,
            auth_password: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    const ENV_VARS: [&str; 9] = [
        "BOOSTER_CONFIG",
        "BOOSTER_API_BASE_URL",
        "BOOSTER_STORE_DB_PATH",
        "BOOSTER_SYNC_INTERVAL_SECS",
        "BOOSTER_REQUEST_TIMEOUT_SECS",
        "BOOSTER_LOG_LEVEL",
        "BOOSTER_LOG_JSON",
        "BOOSTER_AUTH_EMAIL",
        "BOOSTER_AUTH_PASSWORD",
    ];

    // Tests touching the process environment must not interleave
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn set_env_var(key: &str, value: &str) {
        unsafe {
            std::env::set_var(key, value);
        }
    }

    fn clear_env() {
        for key in ENV_VARS {
            unsafe {
                std::env::remove_var(key);
            }
        }
    }

    fn with_env<T>(vars: &[(&str, &str)], f: impl FnOnce() -> T) -> T {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        for (key, value) in vars {
            set_env_var(key, value);
        }
        let result = f();
        clear_env();
        result
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api_base_url, "http://localhost:3000/api");
        assert_eq!(config.store_db_path, PathBuf::from("photos.db"));
        assert_eq!(config.sync_interval_secs, 300);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.log_level, "info");
        assert!(!config.log_json);
        assert!(config.credentials().is_none());
    }

    #[test]
    fn test_sync_interval_disabled_at_zero() {
        let mut config = Config::default();
        assert_eq!(config.sync_interval(), Some(Duration::from_secs(300)));

        config.sync_interval_secs = 0;
        assert_eq!(config.sync_interval(), None);
    }

    #[test]
    fn test_load_missing_config_file() {
        let config = with_env(&[("BOOSTER_CONFIG", "/nonexistent/booster.toml")], || {
            Config::load().unwrap()
        });
        assert_eq!(config.api_base_url, "http://localhost:3000/api");
        assert_eq!(config.store_db_path, PathBuf::from("photos.db"));
    }

    #[test]
    fn test_load_from_toml() {
        let temp_file = NamedTempFile::new().unwrap();
        let config_content = r#"
api_base_url = "http://photos.example.com/api"
store_db_path = "/custom/photos.db"
sync_interval_secs = 600
request_timeout_secs = 10
log_level = "debug"
log_json = true
"#;
        fs::write(temp_file.path(), config_content).unwrap();
        let path = temp_file.path().to_str().unwrap().to_string();

        let config = with_env(&[("BOOSTER_CONFIG", path.as_str())], || Config::load().unwrap());
        assert_eq!(config.api_base_url, "http://photos.example.com/api");
        assert_eq!(config.store_db_path, PathBuf::from("/custom/photos.db"));
        assert_eq!(config.sync_interval_secs, 600);
        assert_eq!(config.request_timeout_secs, 10);
        assert_eq!(config.log_level, "debug");
        assert!(config.log_json);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let temp_file = NamedTempFile::new().unwrap();
        fs::write(temp_file.path(), "log_level = \"warn\"\n").unwrap();
        let path = temp_file.path().to_str().unwrap().to_string();

        let config = with_env(&[("BOOSTER_CONFIG", path.as_str())], || Config::load().unwrap());
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.api_base_url, "http://localhost:3000/api");
        assert_eq!(config.sync_interval_secs, 300);
    }

    #[test]
    fn test_env_var_overrides() {
        let config = with_env(
            &[
                ("BOOSTER_CONFIG", "/nonexistent/booster.toml"),
                ("BOOSTER_API_BASE_URL", "http://env-api.example.com"),
                ("BOOSTER_STORE_DB_PATH", "/env/photos.db"),
                ("BOOSTER_SYNC_INTERVAL_SECS", "120"),
                ("BOOSTER_REQUEST_TIMEOUT_SECS", "15"),
                ("BOOSTER_LOG_LEVEL", "trace"),
                ("BOOSTER_LOG_JSON", "true"),
            ],
            || Config::load().unwrap(),
        );
        assert_eq!(config.api_base_url, "http://env-api.example.com");
        assert_eq!(config.store_db_path, PathBuf::from("/env/photos.db"));
        assert_eq!(config.sync_interval_secs, 120);
        assert_eq!(config.request_timeout(), Duration::from_secs(15));
        assert_eq!(config.log_level, "trace");
        assert!(config.log_json);
    }

    #[test]
    fn test_env_var_invalid_interval() {
        let result = with_env(
            &[
                ("BOOSTER_CONFIG", "/nonexistent/booster.toml"),
                ("BOOSTER_SYNC_INTERVAL_SECS", "soon"),
            ],
            Config::load,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_request_timeout_rejected() {
        let result = with_env(
            &[
                ("BOOSTER_CONFIG", "/nonexistent/booster.toml"),
                ("BOOSTER_REQUEST_TIMEOUT_SECS", "0"),
            ],
            Config::load,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_credentials_require_email_and_password() {
        let config = with_env(
            &[
                ("BOOSTER_CONFIG", "/nonexistent/booster.toml"),
                ("BOOSTER_AUTH_EMAIL", "a@b.com"),
            ],
            || Config::load().unwrap(),
        );
        assert!(config.credentials().is_none());

        let config = with_env(
            &[
                ("BOOSTER_CONFIG", "/nonexistent/booster.toml"),
                ("BOOSTER_AUTH_EMAIL", "a@b.com"),
                ("BOOSTER_AUTH_PASSWORD", "x"),
            ],
            || Config::load().unwrap(),
        );
        let credentials = config.credentials().unwrap();
        assert_eq!(credentials.email, "a@b.com");
        assert_eq!(credentials.password, "x");
        assert_eq!(credentials.password_confirmation, "x");
    }

    #[test]
    fn test_log_json_accepts_common_flags() {
        for (value, expected) in [("1", true), ("yes", true), ("ON", true), ("0", false), ("no", false), ("False", false)] {
            let config = with_env(
                &[
                    ("BOOSTER_CONFIG", "/nonexistent/booster.toml"),
                    ("BOOSTER_LOG_JSON", value),
                ],
                || Config::load().unwrap(),
            );
            assert_eq!(config.log_json, expected, "BOOSTER_LOG_JSON={}", value);
        }
    }

    #[test]
    fn test_log_json_rejects_garbage() {
        let result = with_env(
            &[
                ("BOOSTER_CONFIG", "/nonexistent/booster.toml"),
                ("BOOSTER_LOG_JSON", "sometimes"),
            ],
            Config::load,
        );
        assert!(result.unwrap_err().to_string().contains("BOOSTER_LOG_JSON"));
    }
}
