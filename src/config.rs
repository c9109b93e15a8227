use std::time::Duration;

const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub http_timeout: Duration,
    pub notification_poll_interval: Duration,
    pub storage_path: String,
    pub log_level: String,
    /// Directory for rolling log files; `None` logs to stdout only.
    pub log_dir: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            http_timeout: Duration::from_secs(30),
            notification_poll_interval: Duration::from_secs(30),
            storage_path: "./classroom-drills.db".to_string(),
            log_level: "info".to_string(),
            log_dir: None,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let api_base_url = std::env::var("API_BASE_URL")
            .ok()
            .map(|value| value.trim().trim_end_matches('/').to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or(defaults.api_base_url);

        let http_timeout = std::env::var("HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.http_timeout);

        let notification_poll_interval = std::env::var("NOTIFICATION_POLL_SECS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.notification_poll_interval);

        let storage_path = std::env::var("STORAGE_PATH").unwrap_or(defaults.storage_path);
        let log_level = std::env::var("RUST_LOG").unwrap_or(defaults.log_level);

        let file_logs = std::env::var("ENABLE_FILE_LOGS")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);
        let log_dir = file_logs
            .then(|| std::env::var("LOG_DIR").unwrap_or_else(|_| "./logs".to_string()));

        Self {
            api_base_url,
            http_timeout,
            notification_poll_interval,
            storage_path,
            log_level,
            log_dir,
        }
    }

    /// Joins an API path onto the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
