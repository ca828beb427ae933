use std::env;

use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    pub log_level: String,
    pub carrier_base_url: String,
    pub carrier_api_key: String,
    pub carrier_timeout_secs: u64,
    pub mail_api_url: String,
    pub mail_api_key: String,
    pub mail_from: String,
    pub mail_timeout_secs: u64,
    /// Delay between orders in the bulk sweep, the carrier rate limit.
    pub sync_delay_ms: u64,
    /// Scheduled sweep interval; 0 disables the scheduler.
    pub sync_interval_secs: u64,
    pub allow_status_regression: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let _ = dotenvy::dotenv();

        Ok(Self {
            http_port: parse_or_default("HTTP_PORT", 3000)?,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            carrier_base_url: env::var("CARRIER_BASE_URL")
                .unwrap_or_else(|_| "https://api.bring.com/tracking/api/v2".to_string()),
            carrier_api_key: env::var("CARRIER_API_KEY").unwrap_or_default(),
            carrier_timeout_secs: parse_or_default("CARRIER_TIMEOUT_SECS", 10)?,
            mail_api_url: env::var("MAIL_API_URL")
                .unwrap_or_else(|_| "https://api.mail.example.com/v1".to_string()),
            mail_api_key: env::var("MAIL_API_KEY").unwrap_or_default(),
            mail_from: env::var("MAIL_FROM")
                .unwrap_or_else(|_| "ordre@butikken.example.no".to_string()),
            mail_timeout_secs: parse_or_default("MAIL_TIMEOUT_SECS", 10)?,
            sync_delay_ms: parse_or_default("SYNC_DELAY_MS", 1000)?,
            sync_interval_secs: parse_or_default("SYNC_INTERVAL_SECS", 0)?,
            allow_status_regression: parse_or_default("ALLOW_STATUS_REGRESSION", false)?,
        })
    }
}

fn parse_or_default<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|err| AppError::Internal(format!("invalid {key}: {err}"))),
        Err(_) => Ok(default),
    }
}
