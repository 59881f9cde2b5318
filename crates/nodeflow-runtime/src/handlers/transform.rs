use minijinja::{Environment, context};
use nodeflow_config::{TransformConfig, TransformOperation};
use serde_json::{Value, json};

use super::HandlerContext;
use crate::error::HandlerError;

/// Apply a string operation to the input.
///
/// Case and trim operations leave non-string inputs untouched. `template`
/// renders the configured expression with the input bound to `input`.
pub(crate) fn execute(
  config: &TransformConfig,
  ctx: &HandlerContext<'_>,
) -> Result<Value, HandlerError> {
  let input = ctx.primary_input();

  let output = match config.operation {
    TransformOperation::Uppercase => map_string(input, str::to_uppercase),
    TransformOperation::Lowercase => map_string(input, str::to_lowercase),
    TransformOperation::Trim => map_string(input, |s| s.trim().to_string()),
    TransformOperation::Template => {
      let expression = config
        .expression
        .as_deref()
        .ok_or(HandlerError::MissingConfig("expression"))?;
      let env = Environment::new();
      Value::String(env.render_str(expression, context! { input => input })?)
    }
  };

  Ok(json!({ "output": output }))
}

fn map_string(value: Value, f: impl FnOnce(&str) -> String) -> Value {
  match value {
    Value::String(s) => Value::String(f(&s)),
    other => other,
  }
}
