//! GitHub Gist transport.
//!
//! `GET {api}/gists/{id}` returns the gist with its files; `PATCH` with
//! `{"files": {name: {"content": ...}}}` replaces one file. Both authenticate
//! with `Authorization: token <token>`.

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

use crate::config::GITHUB_API_URL;
use crate::remote::{RemoteDocument, RemoteTransport, Result, TransportError};

const ACCEPT: &str = "application/vnd.github+json";

/// [`RemoteTransport`] over the GitHub Gists REST API.
pub struct GistTransport {
    client: reqwest::Client,
    api_base_url: String,
}

impl Default for GistTransport {
    fn default() -> Self {
        Self::new(GITHUB_API_URL)
    }
}

impl GistTransport {
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn gist_url(&self, gist_id: &str) -> String {
        format!("{}/gists/{}", self.api_base_url, gist_id.trim())
    }

    fn request(&self, method: reqwest::Method, gist_id: &str, token: &str) -> reqwest::RequestBuilder {
        let builder = self
            .client
            .request(method, self.gist_url(gist_id))
            .header(reqwest::header::AUTHORIZATION, format!("token {}", token.trim()))
            .header(reqwest::header::ACCEPT, ACCEPT);
        // Browsers set their own user agent; the API rejects requests without one
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.header(
            reqwest::header::USER_AGENT,
            concat!("planner-core/", env!("CARGO_PKG_VERSION")),
        );
        builder
    }
}

/// Body of a PATCH that replaces a single file.
pub fn replace_file_body(filename: &str, content: &str) -> Value {
    json!({ "files": { filename: { "content": content } } })
}

fn network_error(err: reqwest::Error) -> TransportError {
    match err.status() {
        Some(status) => TransportError::Status(status.as_u16()),
        None => TransportError::Network(err.to_string()),
    }
}

fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(TransportError::Status(status.as_u16()))
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl RemoteTransport for GistTransport {
    async fn fetch(&self, remote_id: &str, token: &str) -> Result<RemoteDocument> {
        let response = self
            .request(reqwest::Method::GET, remote_id, token)
            .send()
            .await
            .map_err(network_error)?;
        let response = check_status(response)?;
        let body = response.text().await.map_err(network_error)?;
        debug!(bytes = body.len(), "fetched gist");
        serde_json::from_str(&body).map_err(|e| TransportError::InvalidResponse(e.to_string()))
    }

    async fn replace_file(
        &self,
        remote_id: &str,
        token: &str,
        filename: &str,
        content: &str,
    ) -> Result<()> {
        let response = self
            .request(reqwest::Method::PATCH, remote_id, token)
            .json(&replace_file_body(filename, content))
            .send()
            .await
            .map_err(network_error)?;
        check_status(response)?;
        debug!(filename, bytes = content.len(), "updated gist file");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_file_body_shape() {
        let body = replace_file_body("planner-data.json", "{\n  \"a\": 1\n}");
        assert_eq!(body["files"]["planner-data.json"]["content"], "{\n  \"a\": 1\n}");
        assert_eq!(body.as_object().unwrap().len(), 1);
    }

    #[test]
    fn test_gist_url_strips_trailing_slash() {
        let transport = GistTransport::new("https://example.test/");
        assert_eq!(transport.gist_url(" abc "), "https://example.test/gists/abc");
        assert_eq!(
            GistTransport::default().gist_url("abc"),
            "https://api.github.com/gists/abc"
        );
    }
}
