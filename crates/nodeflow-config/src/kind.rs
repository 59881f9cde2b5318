//! Typed node kinds.
//!
//! A [`NodeDef`] carries its configuration as a loose JSON map. `NodeKind`
//! is the closed set of node types the engine knows how to run, each with
//! its own configuration struct parsed from that map.
//!
//! Type tags accept the legacy authoring-surface names as aliases:
//!
//! | Canonical       | Alias          |
//! |-----------------|----------------|
//! | `input`         | `customInput`  |
//! | `output`        | `customOutput` |
//! | `llm-call`      | `llm`          |
//! | `external-call` | `api`          |
//! | `datastore`     | `database`     |

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::NodeKindError;
use crate::node::NodeDef;

/// Fallback value emitted by an input node with neither a value nor a name.
const DEFAULT_INPUT_VALUE: &str = "default_input";

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
  Input(InputConfig),
  Output(OutputConfig),
  Text(TextConfig),
  LlmCall(LlmCallConfig),
  Transform(TransformConfig),
  ExternalCall(ExternalCallConfig),
  Datastore(DatastoreConfig),
  Filter(FilterConfig),
}

impl NodeKind {
  /// Parse a node definition into its typed kind.
  pub fn from_def(def: &NodeDef) -> Result<Self, NodeKindError> {
    let node_type = canonical_type(&def.node_type)
      .ok_or_else(|| NodeKindError::UnknownType(def.node_type.clone()))?;

    let kind = match node_type {
      "input" => NodeKind::Input(parse_config(node_type, &def.data)?),
      "output" => NodeKind::Output(parse_config(node_type, &def.data)?),
      "text" => NodeKind::Text(parse_config(node_type, &def.data)?),
      "llm-call" => NodeKind::LlmCall(parse_config(node_type, &def.data)?),
      "transform" => NodeKind::Transform(parse_config(node_type, &def.data)?),
      "external-call" => NodeKind::ExternalCall(parse_config(node_type, &def.data)?),
      "datastore" => NodeKind::Datastore(parse_config(node_type, &def.data)?),
      "filter" => NodeKind::Filter(parse_config(node_type, &def.data)?),
      other => return Err(NodeKindError::UnknownType(other.to_string())),
    };

    Ok(kind)
  }

  /// Whether a raw type tag names an input node.
  pub fn is_input_type(raw: &str) -> bool {
    canonical_type(raw) == Some("input")
  }
}

/// Map a raw type tag (canonical or legacy alias) to its canonical name.
pub(crate) fn canonical_type(raw: &str) -> Option<&'static str> {
  match raw {
    "input" | "customInput" => Some("input"),
    "output" | "customOutput" => Some("output"),
    "text" => Some("text"),
    "llm-call" | "llm" => Some("llm-call"),
    "transform" => Some("transform"),
    "external-call" | "api" => Some("external-call"),
    "datastore" | "database" => Some("datastore"),
    "filter" => Some("filter"),
    _ => None,
  }
}

fn parse_config<T: DeserializeOwned>(
  node_type: &str,
  data: &serde_json::Map<String, serde_json::Value>,
) -> Result<T, NodeKindError> {
  serde_json::from_value(serde_json::Value::Object(data.clone())).map_err(|e| {
    NodeKindError::InvalidConfig {
      node_type: node_type.to_string(),
      message: e.to_string(),
    }
  })
}

fn non_empty(value: &Option<String>) -> Option<&str> {
  value.as_deref().filter(|s| !s.is_empty())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputConfig {
  #[serde(default, alias = "name")]
  pub input_name: Option<String>,
  #[serde(default)]
  pub value: Option<serde_json::Value>,
  #[serde(default, alias = "type")]
  pub input_type: Option<String>,
}

impl InputConfig {
  /// The name variable markers refer to this node by.
  ///
  /// Falls back to `input_<suffix>` where suffix is the id segment after the
  /// first `-` (`customInput-3` → `input_3`), or the whole id without a `-`.
  pub fn display_name(&self, node_id: &str) -> String {
    match non_empty(&self.input_name) {
      Some(name) => name.to_string(),
      None => {
        let suffix = node_id.split('-').nth(1).unwrap_or(node_id);
        format!("input_{}", suffix)
      }
    }
  }

  /// The value this node emits.
  pub fn value(&self) -> serde_json::Value {
    match (&self.value, non_empty(&self.input_name)) {
      (Some(value), _) if !value.is_null() => value.clone(),
      (_, Some(name)) => serde_json::Value::String(name.to_string()),
      _ => serde_json::Value::String(DEFAULT_INPUT_VALUE.to_string()),
    }
  }

  /// The declared value type.
  pub fn value_type(&self) -> &str {
    non_empty(&self.input_type).unwrap_or("Text")
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputConfig {
  #[serde(default)]
  pub output_name: Option<String>,
}

impl OutputConfig {
  pub fn output_name(&self) -> &str {
    non_empty(&self.output_name).unwrap_or("final_output")
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextConfig {
  #[serde(default)]
  pub text: Option<String>,
}

impl TextConfig {
  /// The template, if one was given. `null` and `""` both mean none.
  pub fn template(&self) -> Option<&str> {
    non_empty(&self.text)
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LlmCallConfig {
  #[serde(default)]
  pub model: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransformOperation {
  #[default]
  Uppercase,
  Lowercase,
  Trim,
  Template,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformConfig {
  #[serde(default)]
  pub operation: TransformOperation,
  /// minijinja template for [`TransformOperation::Template`].
  #[serde(default)]
  pub expression: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalCallConfig {
  #[serde(alias = "endpoint")]
  pub url: String,
  #[serde(default = "default_method")]
  pub method: String,
  #[serde(default)]
  pub headers: HashMap<String, String>,
  #[serde(default)]
  pub body: Option<serde_json::Value>,
}

fn default_method() -> String {
  "GET".to_string()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatastoreOperation {
  #[default]
  Save,
  Load,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatastoreConfig {
  #[serde(default)]
  pub operation: DatastoreOperation,
  /// Storage key, defaults to the node id.
  #[serde(default)]
  pub key: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterOperator {
  Equals,
  Contains,
  StartsWith,
  EndsWith,
  GreaterThan,
  LessThan,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
  #[serde(default)]
  pub operator: Option<FilterOperator>,
  /// Dot path into the input value, e.g. `user.name`.
  #[serde(default)]
  pub field: Option<String>,
  #[serde(default)]
  pub value: Option<serde_json::Value>,
}
