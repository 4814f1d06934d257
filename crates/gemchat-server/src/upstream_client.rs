use reqwest::Response;

/// Forwards chat requests to the fixed upstream chat service.
#[derive(Clone)]
pub struct UpstreamClient {
    http_client: reqwest::Client,
    upstream_url: String,
}

impl UpstreamClient {
    pub fn new(upstream_url: &str) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            upstream_url: upstream_url.to_string(),
        }
    }

    pub fn url(&self) -> &str {
        &self.upstream_url
    }

    /// POST `body` as JSON. The response body is left unread so it can be
    /// relayed as a stream.
    pub async fn forward(&self, body: &serde_json::Value) -> anyhow::Result<Response> {
        let response = self
            .http_client
            .post(&self.upstream_url)
            .json(body)
            .send()
            .await?;
        Ok(response)
    }
}
