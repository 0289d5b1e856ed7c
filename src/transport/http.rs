use super::{Transport, TransportRequest, TransportResponse};
use anyhow::Context;
use async_trait::async_trait;
use std::time::Duration;

/// [`Transport`] backed by a shared `reqwest::Client`
#[derive(Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Builds a transport whose requests fail once `timeout` elapses
    pub fn with_timeout(timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build http client")?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: TransportRequest) -> anyhow::Result<TransportResponse> {
        let mut builder = self.client.request(request.method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .with_context(|| format!("failed to send request to {}", request.url))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .context("failed to read response body")?
            .to_vec();

        Ok(TransportResponse { status, body })
    }
}
