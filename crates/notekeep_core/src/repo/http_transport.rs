//! `reqwest`-backed transport.

use crate::repo::error::{ApiError, ApiResult};
use crate::repo::transport::{ApiRequest, ApiResponse, Method, Transport};
use async_trait::async_trait;
use log::debug;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Url};
use std::time::Duration;

/// HTTP transport rooted at a base URL (e.g. `http://localhost:3000/api`).
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: Url,
}

impl HttpTransport {
    /// Builds a transport for `base_url` with a per-request `timeout`.
    ///
    /// # Errors
    /// - `Validation` when the URL does not parse or is not http(s).
    /// - `Transport` when the HTTP client cannot be constructed.
    pub fn new(base_url: &str, timeout: Duration) -> ApiResult<Self> {
        let base_url = parse_base_url(base_url)?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ApiError::Transport(format!("failed to build http client: {err}")))?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[String]) -> ApiResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                ApiError::Transport(format!("base url `{}` cannot hold a path", self.base_url))
            })?;
            path.pop_if_empty();
            path.extend(segments);
        }
        Ok(url)
    }
}

/// Parses and checks a backend base URL.
pub fn parse_base_url(value: &str) -> ApiResult<Url> {
    let url = Url::parse(value.trim())
        .map_err(|err| ApiError::Validation(vec![format!("invalid base url `{value}`: {err}")]))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ApiError::Validation(vec![format!(
            "unsupported base url scheme `{other}`; expected http|https"
        )])),
    }
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> ApiResult<ApiResponse> {
        let url = self.endpoint(&request.segments)?;
        debug!(
            "event=http_send module=repo status=start method={} url={}",
            request.method, url
        );

        let mut builder = self
            .client
            .request(to_reqwest_method(request.method), url)
            .header(ACCEPT, "application/json");
        if let Some(body) = request.body {
            builder = builder
                .header(CONTENT_TYPE, "application/json")
                .body(body.to_string());
        }

        let response = builder
            .send()
            .await
            .map_err(|err| ApiError::Transport(format!("request failed: {err}")))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|err| ApiError::Transport(format!("failed to read response body: {err}")))?;

        Ok(ApiResponse { status, body })
    }
}
