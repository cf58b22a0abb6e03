//! REST client for the poster API.
//!
//! Thin wrapper over [`reqwest`] that adds the bearer token, unwraps the
//! `{ "data": ... }` envelope and turns `{ "error", "code" }` bodies into
//! [`ClientError::Api`].

use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// Default per-request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: String,
    #[serde(default)]
    code: String,
}

/// HTTP client for one poster API service.
#[derive(Debug, Clone)]
pub struct PosterApi {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl PosterApi {
    /// Create a client for the service at `base_url` (e.g. `http://host:3000`).
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder().timeout(DEFAULT_TIMEOUT).build()?;
        Ok(Self::with_client(client, base_url, token))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(
        client: reqwest::Client,
        base_url: impl Into<String>,
        token: Option<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `ws://` / `wss://` URL of the change push endpoint.
    pub fn ws_url(&self) -> Result<String, ClientError> {
        let rest = if let Some(rest) = self.base_url.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = self.base_url.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            return Err(ClientError::InvalidUrl(format!(
                "Expected an http(s) base URL, got '{}'",
                self.base_url
            )));
        };
        Ok(format!("{rest}/api/v1/ws"))
    }

    /// `GET` the path under `/api/v1` made of `segments` and unwrap the
    /// data envelope. Each segment is percent-encoded.
    pub async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ClientError> {
        let response = self.request(Method::GET, segments)?.send().await?;
        Self::parse_data(response).await
    }

    /// Send a JSON body and unwrap the data envelope of the reply.
    pub async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        segments: &[&str],
        body: &B,
    ) -> Result<T, ClientError> {
        let response = self.request(method, segments)?.json(body).send().await?;
        Self::parse_data(response).await
    }

    /// `DELETE` a path, discarding any body.
    pub async fn delete(&self, segments: &[&str]) -> Result<(), ClientError> {
        let response = self.request(Method::DELETE, segments)?.send().await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    /// `<base>/api/v1/<segments...>`, each segment percent-encoded.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ClientError::InvalidUrl(format!("'{}': {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|()| {
                ClientError::InvalidUrl(format!("'{}' cannot be a base URL", self.base_url))
            })?
            .pop_if_empty()
            .extend(["api", "v1"])
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, ClientError> {
        let builder = self.client.request(method, self.endpoint(segments)?);
        Ok(match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    // ---- private helpers ----

    /// Return the response unchanged on success, or a [`ClientError::Api`]
    /// built from the error body.
    async fn ensure_success(response: Response) -> Result<Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response.text().await.unwrap_or_default();
        let body: ErrorBody = serde_json::from_str(&text).unwrap_or_else(|_| ErrorBody {
            error: text,
            code: String::new(),
        });
        Err(ClientError::Api {
            status: status.as_u16(),
            code: body.code,
            message: if body.error.is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("Request failed")
                    .to_string()
            } else {
                body.error
            },
        })
    }

    async fn parse_data<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
        let response = Self::ensure_success(response).await?;
        let envelope: Envelope<T> = response.json().await?;
        Ok(envelope.data)
    }
}

/// Whether an error is the API's 404.
pub fn is_not_found(err: &ClientError) -> bool {
    err.status() == Some(StatusCode::NOT_FOUND.as_u16())
}
