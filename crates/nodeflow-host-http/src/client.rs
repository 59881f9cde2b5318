use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::error::HttpError;

/// An outbound request built from an external-call node's configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpRequest {
  pub method: String,
  pub url: String,
  #[serde(default)]
  pub headers: HashMap<String, String>,
  #[serde(default)]
  pub body: Option<serde_json::Value>,
}

impl HttpRequest {
  pub fn get(url: impl Into<String>) -> Self {
    Self {
      method: "GET".to_string(),
      url: url.into(),
      headers: HashMap::new(),
      body: None,
    }
  }
}

/// The response handed back to the engine.
///
/// Non-2xx statuses are not errors at this layer; the status is reported
/// alongside the body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpResponse {
  pub status: u16,
  pub headers: HashMap<String, String>,
  /// Parsed JSON body, or the raw text when the body is not JSON.
  pub body: serde_json::Value,
}

/// Trait for performing HTTP requests on behalf of a node.
#[async_trait]
pub trait HttpClient: Send + Sync {
  async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError>;
}

/// [`HttpClient`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
  client: Client,
}

impl ReqwestClient {
  /// Create a client with an optional overall request timeout.
  pub fn new(timeout: Option<Duration>) -> Result<Self, HttpError> {
    let mut builder = Client::builder();
    if let Some(timeout) = timeout {
      builder = builder.timeout(timeout);
    }
    Ok(Self {
      client: builder.build()?,
    })
  }
}

#[async_trait]
impl HttpClient for ReqwestClient {
  async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
    let url = parse_url(&request.url)?;
    let method = parse_method(&request.method)?;

    debug!(method = %method, url = %url, "sending request");

    let mut builder = self.client.request(method, url);
    for (key, value) in &request.headers {
      builder = builder.header(key, value);
    }
    if let Some(body) = &request.body {
      builder = builder.json(body);
    }

    let response = builder.send().await?;

    let status = response.status().as_u16();
    let headers: HashMap<String, String> = response
      .headers()
      .iter()
      .filter_map(|(k, v)| {
        v.to_str()
          .ok()
          .map(|val| (k.as_str().to_string(), val.to_string()))
      })
      .collect();

    let text = response.text().await?;

    // Try to parse body as JSON, fall back to string
    let body = serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text));

    Ok(HttpResponse {
      status,
      headers,
      body,
    })
  }
}

/// Parse and check a request URL. Only `http` and `https` are allowed.
pub(crate) fn parse_url(raw: &str) -> Result<Url, HttpError> {
  let url = Url::parse(raw).map_err(|e| HttpError::InvalidUrl {
    url: raw.to_string(),
    message: e.to_string(),
  })?;

  match url.scheme() {
    "http" | "https" => Ok(url),
    other => Err(HttpError::InvalidUrl {
      url: raw.to_string(),
      message: format!("unsupported scheme '{}'", other),
    }),
  }
}

pub(crate) fn parse_method(method: &str) -> Result<Method, HttpError> {
  match method.to_uppercase().as_str() {
    "GET" => Ok(Method::GET),
    "POST" => Ok(Method::POST),
    "PUT" => Ok(Method::PUT),
    "DELETE" => Ok(Method::DELETE),
    "PATCH" => Ok(Method::PATCH),
    "HEAD" => Ok(Method::HEAD),
    "OPTIONS" => Ok(Method::OPTIONS),
    _ => Err(HttpError::UnsupportedMethod(method.to_string())),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_method_case_insensitive() {
    assert_eq!(parse_method("get").unwrap(), Method::GET);
    assert_eq!(parse_method("Patch").unwrap(), Method::PATCH);
    assert!(matches!(
      parse_method("FETCH"),
      Err(HttpError::UnsupportedMethod(m)) if m == "FETCH"
    ));
  }

  #[test]
  fn test_parse_url() {
    assert!(parse_url("https://example.com/posts/1").is_ok());
    assert!(matches!(
      parse_url("not a url"),
      Err(HttpError::InvalidUrl { .. })
    ));
    assert!(matches!(
      parse_url("file:///etc/passwd"),
      Err(HttpError::InvalidUrl { message, .. }) if message.contains("file")
    ));
  }

  #[tokio::test]
  async fn test_invalid_url_fails_before_sending() {
    let client = ReqwestClient::new(Some(Duration::from_secs(1))).unwrap();
    let result = client.send(HttpRequest::get("ftp://example.com")).await;
    assert!(matches!(result, Err(HttpError::InvalidUrl { .. })));
  }
}
