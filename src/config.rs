use std::env;
use std::time::Duration;

use crate::models::Format;
use crate::services::transport::DEFAULT_BASE_PATH;

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub base_url: String,
    pub base_path: String,
    pub format: Format,
    pub timeout_secs: u64,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self {
            base_url: env::var("RESERVATIONS_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:5000".to_string()),
            base_path: env::var("RESERVATIONS_PATH")
                .unwrap_or_else(|_| DEFAULT_BASE_PATH.to_string()),
            format: env::var("RESERVATIONS_FORMAT")
                .map(|v| Format::parse(&v))
                .unwrap_or_default(),
            timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
