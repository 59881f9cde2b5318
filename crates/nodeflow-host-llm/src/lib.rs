//! Text-generation capability for llm-call nodes.
//!
//! The engine calls out through [`LanguageModel`] and treats the call as an
//! opaque async operation. [`EchoModel`] is a local stand-in that answers
//! after a configurable delay without contacting any service.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
  #[error("generation failed: {message}")]
  Generation { message: String },
}

/// A single generation request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Prompt {
  pub system: String,
  pub prompt: String,
  /// Optional model label from the node configuration.
  pub model: Option<String>,
}

/// Trait for text-generation backends.
#[async_trait]
pub trait LanguageModel: Send + Sync {
  async fn generate(&self, prompt: &Prompt) -> Result<String, LlmError>;
}

/// Model that echoes the prompt back.
#[derive(Debug, Clone, Default)]
pub struct EchoModel {
  delay: Duration,
}

impl EchoModel {
  pub fn new(delay: Duration) -> Self {
    Self { delay }
  }
}

#[async_trait]
impl LanguageModel for EchoModel {
  async fn generate(&self, prompt: &Prompt) -> Result<String, LlmError> {
    debug!(
      model = prompt.model.as_deref().unwrap_or("echo"),
      delay_ms = self.delay.as_millis() as u64,
      "generating response"
    );

    if !self.delay.is_zero() {
      tokio::time::sleep(self.delay).await;
    }

    Ok(format!(
      "LLM Response to: \"{}\" (System: \"{}\")",
      prompt.prompt, prompt.system
    ))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_echo_response() {
    let model = EchoModel::default();
    let prompt = Prompt {
      system: "be brief".to_string(),
      prompt: "hi".to_string(),
      model: None,
    };

    let response = model.generate(&prompt).await.unwrap();
    assert_eq!(response, "LLM Response to: \"hi\" (System: \"be brief\")");
  }

  #[tokio::test(start_paused = true)]
  async fn test_echo_waits_for_delay() {
    let model = EchoModel::new(Duration::from_secs(1));
    let start = tokio::time::Instant::now();

    model.generate(&Prompt::default()).await.unwrap();

    assert!(start.elapsed() >= Duration::from_secs(1));
  }
}
