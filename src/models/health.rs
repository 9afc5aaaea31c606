use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct HealthReport {
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub data_count: u64,
    #[serde(default)]
    pub next_id: Option<i64>,
    #[serde(default)]
    pub supported_formats: Vec<String>,
    #[serde(default)]
    pub approved_resorts: Vec<String>,
    #[serde(default)]
    pub approved_payment_gateways: Vec<String>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy")
    }
}
