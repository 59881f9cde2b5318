#[derive(Debug, thiserror::Error)]
pub enum HttpError {
  #[error("invalid url '{url}': {message}")]
  InvalidUrl { url: String, message: String },

  #[error("unsupported HTTP method: {0}")]
  UnsupportedMethod(String),

  #[error("request failed: {0}")]
  Request(#[from] reqwest::Error),
}
