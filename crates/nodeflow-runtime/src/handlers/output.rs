use nodeflow_config::OutputConfig;
use serde_json::{Map, Value, json};

use super::HandlerContext;

/// Surface the final value of a pipeline branch.
///
/// The `input` handle is used when connected. Otherwise every gathered
/// input is reported together, keyed by handle.
pub(crate) fn execute(config: &OutputConfig, ctx: &HandlerContext<'_>) -> Value {
  let result = match ctx.inputs.get("input") {
    Some(value) => value.clone(),
    None => Value::Object(
      ctx
        .inputs
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect::<Map<_, _>>(),
    ),
  };

  json!({
    "result": result,
    "outputName": config.output_name(),
  })
}
