//! reqwest-backed [`HttpClient`] for `apiCall` and `webhook` nodes

use crate::actions::{HttpClient, HttpRequest, HttpResponse};
use async_trait::async_trait;
use reqwest::Method;
use std::time::Duration;
use weave_core::{WeaveError, WeaveResult};

/// Pooled HTTP client shared by every flow a session runs
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    pub fn new() -> WeaveResult<Self> {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("weave/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| WeaveError::internal(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Wrap an already configured client
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn parse_method(url: &str, method: &str) -> WeaveResult<Method> {
    Method::from_bytes(method.to_ascii_uppercase().as_bytes()).map_err(|_| WeaveError::Http {
        url: url.to_string(),
        message: format!("invalid method '{method}'"),
    })
}

#[async_trait(?Send)]
impl HttpClient for ReqwestClient {
    async fn send(&self, request: HttpRequest) -> WeaveResult<HttpResponse> {
        let method = parse_method(&request.url, &request.method)?;
        let http_error = |e: reqwest::Error| WeaveError::Http {
            url: request.url.clone(),
            message: e.to_string(),
        };

        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        tracing::debug!(method = %request.method, url = %request.url, "sending request");
        let response = builder.send().await.map_err(http_error)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(http_error)?;
        Ok(HttpResponse { status, body })
    }
}
