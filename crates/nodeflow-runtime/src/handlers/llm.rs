use nodeflow_config::LlmCallConfig;
use nodeflow_host_llm::Prompt;
use serde_json::{Value, json};

use super::{HandlerContext, text_of};
use crate::error::HandlerError;

/// Ask the language model using the `system` and `prompt` inputs.
pub(crate) async fn execute(
  config: &LlmCallConfig,
  ctx: &HandlerContext<'_>,
) -> Result<Value, HandlerError> {
  let prompt = Prompt {
    system: text_of(ctx.inputs.get("system")),
    prompt: text_of(ctx.inputs.get("prompt")),
    model: config.model.clone(),
  };

  let response = ctx.services.llm.generate(&prompt).await?;
  Ok(json!({ "response": response }))
}
