//! Node type handlers.
//!
//! Each handler turns a node's typed configuration and its gathered inputs
//! into a result value. Handlers never touch the execution state directly;
//! the runtime stores whatever they return.

mod datastore;
mod external;
mod filter;
mod input;
mod llm;
mod output;
mod text;
mod transform;

use std::collections::HashMap;

use nodeflow_config::NodeKind;
use serde_json::Value;

use crate::error::HandlerError;
use crate::resolver::VariableResolver;
use crate::services::Services;
use crate::state::ExecutionState;

/// Gathered inputs of a node, keyed by target handle.
pub type NodeInputs = HashMap<String, Value>;

/// Everything a handler may read while running one node.
pub(crate) struct HandlerContext<'a> {
  pub node_id: &'a str,
  pub inputs: &'a NodeInputs,
  pub state: &'a ExecutionState,
  pub resolver: &'a VariableResolver,
  pub services: &'a Services,
}

impl HandlerContext<'_> {
  /// The value on the default `input` handle, or null.
  pub fn primary_input(&self) -> Value {
    self.inputs.get("input").cloned().unwrap_or(Value::Null)
  }
}

/// A handler's result plus any non-fatal warnings it produced.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NodeOutput {
  pub value: Value,
  pub warnings: Vec<String>,
}

impl From<Value> for NodeOutput {
  fn from(value: Value) -> Self {
    Self {
      value,
      warnings: Vec::new(),
    }
  }
}

/// Run the handler for `kind`.
pub(crate) async fn execute(
  kind: &NodeKind,
  ctx: &HandlerContext<'_>,
) -> Result<NodeOutput, HandlerError> {
  let output = match kind {
    NodeKind::Input(config) => input::execute(config).into(),
    NodeKind::Text(config) => text::execute(config, ctx),
    NodeKind::LlmCall(config) => llm::execute(config, ctx).await?.into(),
    NodeKind::Transform(config) => transform::execute(config, ctx)?.into(),
    NodeKind::ExternalCall(config) => external::execute(config, ctx).await?.into(),
    NodeKind::Datastore(config) => datastore::execute(config, ctx).await?.into(),
    NodeKind::Filter(config) => filter::execute(config, ctx).into(),
    NodeKind::Output(config) => output::execute(config, ctx).into(),
  };
  Ok(output)
}

/// Text carried by an upstream value.
///
/// Strings are used as-is, objects contribute their `output` (or llm-call
/// `response`) field, null is empty and anything else is rendered as JSON.
pub(crate) fn text_of(value: Option<&Value>) -> String {
  match value {
    None | Some(Value::Null) => String::new(),
    Some(Value::String(s)) => s.clone(),
    Some(Value::Object(map)) => match map.get("output").or_else(|| map.get("response")) {
      Some(inner) => text_of(Some(inner)),
      None => Value::Object(map.clone()).to_string(),
    },
    Some(other) => other.to_string(),
  }
}

#[cfg(test)]
pub(crate) mod test_support {
  use std::sync::Arc;

  use async_trait::async_trait;
  use nodeflow_host_http::{HttpClient, HttpError, HttpRequest, HttpResponse};
  use nodeflow_host_kv::InMemoryKvStore;
  use nodeflow_host_llm::EchoModel;

  use super::*;

  /// HTTP client that answers every request with a fixed response.
  pub struct StaticHttp(pub HttpResponse);

  #[async_trait]
  impl HttpClient for StaticHttp {
    async fn send(&self, _request: HttpRequest) -> Result<HttpResponse, HttpError> {
      Ok(self.0.clone())
    }
  }

  pub fn services() -> Services {
    let response = HttpResponse {
      status: 200,
      headers: HashMap::new(),
      body: serde_json::json!({"ok": true}),
    };
    Services::new(
      Arc::new(StaticHttp(response)),
      Arc::new(EchoModel::default()),
      Arc::new(InMemoryKvStore::new()),
    )
  }

  pub struct Fixture {
    pub inputs: NodeInputs,
    pub state: ExecutionState,
    pub resolver: VariableResolver,
    pub services: Services,
  }

  impl Fixture {
    pub fn new(inputs: NodeInputs) -> Self {
      Self {
        inputs,
        state: ExecutionState::new(),
        resolver: VariableResolver::default(),
        services: services(),
      }
    }

    pub fn ctx(&self) -> HandlerContext<'_> {
      HandlerContext {
        node_id: "node-1",
        inputs: &self.inputs,
        state: &self.state,
        resolver: &self.resolver,
        services: &self.services,
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn test_text_of() {
    assert_eq!(text_of(None), "");
    assert_eq!(text_of(Some(&json!("hi"))), "hi");
    assert_eq!(text_of(Some(&json!({"output": "nested"}))), "nested");
    assert_eq!(text_of(Some(&json!({"response": "llm"}))), "llm");
    assert_eq!(text_of(Some(&json!(3))), "3");
    assert_eq!(text_of(Some(&json!({"a": 1}))), r#"{"a":1}"#);
  }
}
