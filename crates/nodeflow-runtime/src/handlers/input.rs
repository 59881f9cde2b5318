use nodeflow_config::InputConfig;
use serde_json::{Value, json};

/// Emit the configured value and its declared type.
pub(crate) fn execute(config: &InputConfig) -> Value {
  json!({
    "value": config.value(),
    "type": config.value_type(),
  })
}
