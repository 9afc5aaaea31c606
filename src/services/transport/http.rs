use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};

use super::{ApiRequest, ApiResponse, Transport};
use crate::errors::ClientError;

pub struct HttpTransport {
    base_url: String,
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ClientError> {
        let url = format!("{}{}", self.base_url, request.path);
        tracing::debug!(method = %request.method, target = %request.target(), "sending request");

        let mut builder = self.client.request(request.method, &url).query(&request.query);
        if let Some(accept) = request.accept {
            builder = builder.header(ACCEPT, accept);
        }
        if let Some(body) = request.body {
            builder = builder.header(CONTENT_TYPE, body.content_type).body(body.body);
        }

        let resp = builder.send().await?;

        let status = resp.status().as_u16();
        let body = resp.text().await?;

        tracing::debug!(status, bytes = body.len(), "received response");
        Ok(ApiResponse { status, body })
    }
}
