//! `{{name}}` marker substitution for text nodes.
//!
//! Markers name input nodes by their display name. The value substituted is
//! the `value` field of that input node's stored result.

use std::collections::HashMap;
use std::sync::LazyLock;

use nodeflow_config::{InputConfig, NodeDef, NodeKind};
use regex::{Captures, Regex};
use tracing::warn;

use crate::state::ExecutionState;

/// Matches `{{identifier}}`. The identifier is the shortest run up to the
/// first closing `}}` and may span lines.
static MARKER_PATTERN: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?s)\{\{(.+?)\}\}").expect("marker pattern compiles"));

/// The outcome of resolving one template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
  pub text: String,
  pub warnings: Vec<String>,
}

/// Maps input-node display names to node ids.
///
/// Built once per run from the submitted nodes. When two input nodes share
/// a display name the first one in submission order wins.
#[derive(Debug, Clone, Default)]
pub struct VariableResolver {
  inputs: HashMap<String, String>,
  ambiguous: HashMap<String, usize>,
}

impl VariableResolver {
  pub fn new(nodes: &[NodeDef]) -> Self {
    let mut inputs = HashMap::new();
    let mut ambiguous: HashMap<String, usize> = HashMap::new();

    for node in nodes.iter().filter(|n| NodeKind::is_input_type(&n.node_type)) {
      let name = match NodeKind::from_def(node) {
        Ok(NodeKind::Input(config)) => config.display_name(&node.id),
        _ => InputConfig::default().display_name(&node.id),
      };

      if inputs.contains_key(&name) {
        *ambiguous.entry(name).or_insert(1) += 1;
      } else {
        inputs.insert(name, node.id.clone());
      }
    }

    Self { inputs, ambiguous }
  }

  /// Node id an identifier refers to, if any.
  pub fn lookup(&self, identifier: &str) -> Option<&str> {
    self.inputs.get(identifier).map(String::as_str)
  }

  /// Replace every marker in `template` using results from `state`.
  ///
  /// - a known name with a stored result becomes that result's `value`
  /// - a known name without a result becomes `[identifier]`
  /// - an unknown name becomes `[UNKNOWN: identifier]`
  ///
  /// The last two cases, and ambiguous names, add a warning. Text without
  /// markers is returned unchanged.
  pub fn resolve(&self, template: &str, state: &ExecutionState) -> Resolution {
    let mut warnings = Vec::new();

    let text = MARKER_PATTERN.replace_all(template, |caps: &Captures| {
      let identifier = caps[1].trim();

      let Some(node_id) = self.lookup(identifier) else {
        warnings.push(format!(
          "variable '{}' not found in available inputs",
          identifier
        ));
        return format!("[UNKNOWN: {}]", identifier);
      };

      if let Some(count) = self.ambiguous.get(identifier) {
        warnings.push(format!(
          "variable '{}' matches {} input nodes, using '{}'",
          identifier, count, node_id
        ));
      }

      match state.result(node_id).and_then(|r| r.get("value")) {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(value) => value.to_string(),
        None => {
          warnings.push(format!(
            "variable '{}' not resolved, no data from node '{}'",
            identifier, node_id
          ));
          format!("[{}]", identifier)
        }
      }
    });

    for message in &warnings {
      warn!(warning = %message, "variable_unresolved");
    }

    Resolution {
      text: text.into_owned(),
      warnings,
    }
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;
  use crate::state::NodeStatus;

  fn completed(state: &mut ExecutionState, node_id: &str, result: serde_json::Value) {
    state.set_status(node_id, NodeStatus::Executing).unwrap();
    state.complete(node_id, result).unwrap();
  }

  #[test]
  fn test_resolves_named_input() {
    let nodes = vec![
      NodeDef::new("customInput-1", "customInput").with("inputName", "userName"),
      NodeDef::new("text-1", "text"),
    ];
    let resolver = VariableResolver::new(&nodes);

    let mut state = ExecutionState::new();
    state.reset(["customInput-1", "text-1"]);
    completed(&mut state, "customInput-1", json!({"value": "Ada", "type": "Text"}));

    let resolution = resolver.resolve("Hello {{ userName }}", &state);
    assert_eq!(resolution.text, "Hello Ada");
    assert!(resolution.warnings.is_empty());
  }

  #[test]
  fn test_unknown_marker() {
    let resolver = VariableResolver::new(&[]);
    let state = ExecutionState::new();

    let resolution = resolver.resolve("Hello {{missing}}", &state);
    assert_eq!(resolution.text, "Hello [UNKNOWN: missing]");
    assert_eq!(resolution.warnings.len(), 1);
  }

  #[test]
  fn test_known_marker_without_result() {
    let nodes = vec![NodeDef::new("customInput-2", "input")];
    let resolver = VariableResolver::new(&nodes);
    assert_eq!(resolver.lookup("input_2"), Some("customInput-2"));

    let mut state = ExecutionState::new();
    state.reset(["customInput-2"]);

    let resolution = resolver.resolve("{{input_2}}!", &state);
    assert_eq!(resolution.text, "[input_2]!");
    assert_eq!(resolution.warnings.len(), 1);
  }

  #[test]
  fn test_ambiguous_name_uses_first() {
    let nodes = vec![
      NodeDef::new("in-1", "input").with("inputName", "x"),
      NodeDef::new("in-2", "input").with("inputName", "x"),
    ];
    let resolver = VariableResolver::new(&nodes);

    let mut state = ExecutionState::new();
    state.reset(["in-1", "in-2"]);
    completed(&mut state, "in-1", json!({"value": "first"}));
    completed(&mut state, "in-2", json!({"value": "second"}));

    let resolution = resolver.resolve("{{x}}", &state);
    assert_eq!(resolution.text, "first");
    assert_eq!(resolution.warnings.len(), 1);
  }

  #[test]
  fn test_non_string_value() {
    let nodes = vec![NodeDef::new("in-1", "input").with("inputName", "n")];
    let resolver = VariableResolver::new(&nodes);

    let mut state = ExecutionState::new();
    state.reset(["in-1"]);
    completed(&mut state, "in-1", json!({"value": 42}));

    assert_eq!(resolver.resolve("n={{n}}", &state).text, "n=42");
  }

  #[test]
  fn test_text_without_markers() {
    let resolver = VariableResolver::new(&[]);
    let state = ExecutionState::new();

    let resolution = resolver.resolve("plain {text} and {{}}", &state);
    assert_eq!(resolution.text, "plain {text} and {{}}");
    assert!(resolution.warnings.is_empty());
  }
}
