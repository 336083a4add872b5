use std::env;

use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    pub log_level: String,
    pub notify_queue_size: usize,
    pub cooldown_secs: i64,
    pub default_radius_km: f64,
    pub geocoder_url: String,
    pub push_gateway_url: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let _ = dotenvy::dotenv();

        Ok(Self {
            http_port: parse_or_default("HTTP_PORT", 3000)?,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            notify_queue_size: parse_or_default("NOTIFY_QUEUE_SIZE", 1024)?,
            cooldown_secs: parse_or_default("COOLDOWN_SECS", 300)?,
            default_radius_km: parse_or_default("DEFAULT_RADIUS_KM", 10.0)?,
            geocoder_url: env::var("GEOCODER_URL")
                .unwrap_or_else(|_| "https://nominatim.openstreetmap.org".to_string()),
            push_gateway_url: env::var("PUSH_GATEWAY_URL").ok(),
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
