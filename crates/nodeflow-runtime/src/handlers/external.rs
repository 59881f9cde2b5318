use nodeflow_config::ExternalCallConfig;
use nodeflow_host_http::HttpRequest;
use serde_json::{Value, json};
use tracing::debug;

use super::HandlerContext;
use crate::error::HandlerError;

/// Perform the configured request.
///
/// Any response, including non-2xx, is a result. Only transport and URL
/// errors fail the node.
pub(crate) async fn execute(
  config: &ExternalCallConfig,
  ctx: &HandlerContext<'_>,
) -> Result<Value, HandlerError> {
  let request = HttpRequest {
    method: config.method.clone(),
    url: config.url.clone(),
    headers: config.headers.clone(),
    body: config.body.clone(),
  };

  debug!(node_id = ctx.node_id, method = %request.method, url = %request.url, "external call");
  let response = ctx.services.http.send(request).await?;

  Ok(json!({
    "output": response.body,
    "status": response.status,
  }))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::handlers::NodeInputs;
  use crate::handlers::test_support::Fixture;

  #[tokio::test]
  async fn test_wraps_response() {
    let fixture = Fixture::new(NodeInputs::new());
    let config = ExternalCallConfig {
      url: "https://example.com/api".to_string(),
      method: "GET".to_string(),
      headers: Default::default(),
      body: None,
    };

    let result = execute(&config, &fixture.ctx()).await.unwrap();
    assert_eq!(result, json!({"output": {"ok": true}, "status": 200}));
  }
}
