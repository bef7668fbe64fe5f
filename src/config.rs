use std::env;

use crate::error::ApiError;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub log_level: String,
    pub stale_after_secs: u64,
    pub event_buffer_size: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ApiError> {
        let _ = dotenvy::dotenv();

        Ok(Self {
            api_base_url: env::var("API_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:5000/api/v1".to_string()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            stale_after_secs: parse_or_default("REQUEST_STALE_AFTER_SECS", 30)?,
            event_buffer_size: parse_or_default("EVENT_BUFFER_SIZE", 1024)?,
        })
    }
}

fn parse_or_default<T>(key: &str, default: T) -> Result<T, ApiError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|err| ApiError::Internal(format!("invalid {key}: {err}"))),
        Err(_) => Ok(default),
    }
}
