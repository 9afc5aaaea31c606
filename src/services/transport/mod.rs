pub mod http;

use async_trait::async_trait;
use reqwest::Method;

use crate::errors::ClientError;
use crate::models::{Format, RecordId};
use crate::services::encoding::EncodedBody;

pub const DEFAULT_BASE_PATH: &str = "/reservations";
const HEALTH_PATH: &str = "/health";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(&'static str, String)>,
    pub accept: Option<&'static str>,
    pub body: Option<EncodedBody>,
}

impl ApiRequest {
    fn new(method: Method, path: String) -> Self {
        Self {
            method,
            path,
            query: Vec::new(),
            accept: None,
            body: None,
        }
    }

    fn with_query(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.query.push((key, value.into()));
        self
    }

    fn accepting(mut self, format: Format) -> Self {
        self.accept = Some(format.content_type());
        self
    }

    fn with_body(mut self, body: EncodedBody) -> Self {
        self.body = Some(body);
        self
    }

    pub fn target(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        let query = self
            .query
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}?{query}", self.path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    // Non-2xx answers are still `Ok`.
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ClientError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base_path: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_PATH)
    }
}

impl Endpoints {
    pub fn new(base_path: &str) -> Self {
        let trimmed = base_path.trim().trim_end_matches('/');
        let base_path = if trimmed.starts_with('/') {
            trimmed.to_string()
        } else {
            format!("/{trimmed}")
        };
        Self { base_path }
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    fn item(&self, id: &RecordId) -> String {
        format!("{}/{}", self.base_path, id)
    }

    pub fn list(&self, query: Option<&str>, format: Format) -> ApiRequest {
        let request = ApiRequest::new(Method::GET, self.base_path.clone())
            .with_query("format", format.as_str())
            .accepting(format);
        match query.map(str::trim).filter(|q| !q.is_empty()) {
            Some(q) => request.with_query("q", q),
            None => request,
        }
    }

    pub fn get(&self, id: &RecordId, format: Format) -> ApiRequest {
        ApiRequest::new(Method::GET, self.item(id))
            .with_query("format", format.as_str())
            .accepting(format)
    }

    pub fn create(&self, body: EncodedBody, format: Format) -> ApiRequest {
        Self::write(ApiRequest::new(Method::POST, self.base_path.clone()), body, format)
    }

    pub fn update(&self, id: &RecordId, body: EncodedBody, format: Format) -> ApiRequest {
        Self::write(ApiRequest::new(Method::PUT, self.item(id)), body, format)
    }

    fn write(request: ApiRequest, body: EncodedBody, format: Format) -> ApiRequest {
        let request = request.accepting(format).with_body(body);
        match format {
            Format::Xml => request.with_query("format", format.as_str()),
            Format::Json => request,
        }
    }

    pub fn delete(&self, id: &RecordId) -> ApiRequest {
        ApiRequest::new(Method::DELETE, self.item(id)).accepting(Format::Json)
    }

    pub fn health(&self) -> ApiRequest {
        ApiRequest::new(Method::GET, HEALTH_PATH.to_string()).accepting(Format::Json)
    }
}
