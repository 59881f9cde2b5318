use nodeflow_config::TextConfig;
use serde_json::{Value, json};

use super::{HandlerContext, NodeOutput};

/// Resolve `{{name}}` markers in the node's text.
///
/// A node with empty or null text passes its upstream input through instead: the
/// `value` field when the input is an object carrying one, else the input
/// itself. Upstream strings are resolved like the node's own text.
pub(crate) fn execute(config: &TextConfig, ctx: &HandlerContext<'_>) -> NodeOutput {
  let content = match config.template() {
    Some(text) => Value::String(text.to_string()),
    None => match ctx.inputs.get("input") {
      Some(Value::Object(map)) if map.contains_key("value") => map["value"].clone(),
      Some(other) => other.clone(),
      None => Value::String(String::new()),
    },
  };

  match content {
    Value::String(template) => {
      let resolution = ctx.resolver.resolve(&template, ctx.state);
      NodeOutput {
        value: json!({ "output": resolution.text }),
        warnings: resolution.warnings,
      }
    }
    other => json!({ "output": other }).into(),
  }
}
