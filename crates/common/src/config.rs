use crate::error::RelayError;

const DEFAULT_PRACTICUM_ENDPOINT: &str =
    "https://practicum.yandex.ru/api/user_api/homework_statuses/";
const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Application configuration loaded once at startup from environment variables.
#[derive(Clone)]
pub struct AppConfig {
    /// Review API token, sent as `Authorization: OAuth <token>`
    pub practicum_token: String,

    /// Telegram bot token
    pub telegram_token: String,

    /// Chat that receives every notification
    pub telegram_chat_id: String,

    /// Review-status endpoint
    pub practicum_endpoint: String,

    /// Telegram Bot API base URL
    pub telegram_api_url: String,

    /// Fixed delay between polling iterations in seconds (default: 600)
    pub retry_interval_secs: u64,

    /// Per-request timeout for outbound HTTP calls in seconds (default: 30)
    pub http_timeout_secs: u64,

    /// Initial cursor override; the poller starts from "now" when unset
    pub from_date: Option<i64>,
}

impl AppConfig {
    /// Load configuration from `.env` and the process environment.
    pub fn from_env() -> Result<Self, RelayError> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// Every missing credential is reported in a single error so the operator can
    /// fix them all at once.
    pub fn from_vars<F>(lookup: F) -> Result<Self, RelayError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let practicum_token = required("PRACTICUM_TOKEN");
        let telegram_token = required("TELEGRAM_TOKEN");
        let telegram_chat_id = required("TELEGRAM_CHAT_ID");

        let missing: Vec<&str> = [
            ("PRACTICUM_TOKEN", practicum_token.is_none()),
            ("TELEGRAM_TOKEN", telegram_token.is_none()),
            ("TELEGRAM_CHAT_ID", telegram_chat_id.is_none()),
        ]
        .into_iter()
        .filter_map(|(key, absent)| absent.then_some(key))
        .collect();

        let (Some(practicum_token), Some(telegram_token), Some(telegram_chat_id)) =
            (practicum_token, telegram_token, telegram_chat_id)
        else {
            return Err(RelayError::Config(format!(
                "missing required environment variables: {}",
                missing.join(", ")
            )));
        };

        Ok(Self {
            practicum_token,
            telegram_token,
            telegram_chat_id,
            practicum_endpoint: lookup("PRACTICUM_ENDPOINT")
                .unwrap_or_else(|| DEFAULT_PRACTICUM_ENDPOINT.to_string()),
            telegram_api_url: lookup("TELEGRAM_API_URL")
                .unwrap_or_else(|| DEFAULT_TELEGRAM_API_URL.to_string()),
            retry_interval_secs: lookup("RETRY_INTERVAL_SECS")
                .unwrap_or_else(|| "600".to_string())
                .parse()
                .map_err(|_| {
                    RelayError::Config("RETRY_INTERVAL_SECS must be a valid u64".into())
                })?,
            http_timeout_secs: lookup("HTTP_TIMEOUT_SECS")
                .unwrap_or_else(|| "30".to_string())
                .parse()
                .map_err(|_| {
                    RelayError::Config("HTTP_TIMEOUT_SECS must be a valid u64".into())
                })?,
            from_date: lookup("FROM_DATE")
                .map(|raw| raw.parse::<i64>())
                .transpose()
                .map_err(|_| RelayError::Config("FROM_DATE must be a valid i64".into()))?,
        })
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("practicum_token", &"<redacted>")
            .field("telegram_token", &"<redacted>")
            .field("telegram_chat_id", &self.telegram_chat_id)
            .field("practicum_endpoint", &self.practicum_endpoint)
            .field("telegram_api_url", &self.telegram_api_url)
            .field("retry_interval_secs", &self.retry_interval_secs)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("from_date", &self.from_date)
            .finish()
    }
}
