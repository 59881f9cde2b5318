use nodeflow_config::{FilterConfig, FilterOperator};
use serde_json::{Value, json};

use super::{HandlerContext, text_of};

/// Pass the input through when the predicate holds, null otherwise.
///
/// Without an operator the predicate is "the subject is non-empty". A
/// predicate that cannot be evaluated (missing field, non-numeric operand
/// for a comparison) does not hold.
pub(crate) fn execute(config: &FilterConfig, ctx: &HandlerContext<'_>) -> Value {
  let input = ctx.primary_input();
  let passed = evaluate(config, &input);

  json!({
    "output": if passed { input } else { Value::Null },
    "filtered": !passed,
  })
}

fn evaluate(config: &FilterConfig, input: &Value) -> bool {
  let subject = match config.field.as_deref().filter(|f| !f.is_empty()) {
    Some(path) => match lookup(input, path) {
      Some(value) => value,
      None => return false,
    },
    None => input,
  };

  let Some(operator) = config.operator else {
    return is_present(subject);
  };
  let expected = config.value.as_ref().unwrap_or(&Value::Null);

  match operator {
    FilterOperator::Equals => {
      subject == expected || text_of(Some(subject)) == text_of(Some(expected))
    }
    FilterOperator::Contains => match subject {
      Value::Array(items) => items.contains(expected),
      other => text_of(Some(other)).contains(&text_of(Some(expected))),
    },
    FilterOperator::StartsWith => text_of(Some(subject)).starts_with(&text_of(Some(expected))),
    FilterOperator::EndsWith => text_of(Some(subject)).ends_with(&text_of(Some(expected))),
    FilterOperator::GreaterThan => compare(subject, expected).is_some_and(|(a, b)| a > b),
    FilterOperator::LessThan => compare(subject, expected).is_some_and(|(a, b)| a < b),
  }
}

/// Walk a dot path through objects (by key) and arrays (by index).
fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
  path.split('.').try_fold(value, |current, segment| match current {
    Value::Object(map) => map.get(segment),
    Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
    _ => None,
  })
}

fn is_present(value: &Value) -> bool {
  match value {
    Value::Null => false,
    Value::Bool(b) => *b,
    Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
    Value::String(s) => !s.is_empty(),
    Value::Array(items) => !items.is_empty(),
    Value::Object(_) => true,
  }
}

fn as_number(value: &Value) -> Option<f64> {
  match value {
    Value::Number(n) => n.as_f64(),
    Value::String(s) => s.trim().parse().ok(),
    _ => None,
  }
}

fn compare(subject: &Value, expected: &Value) -> Option<(f64, f64)> {
  Some((as_number(subject)?, as_number(expected)?))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::handlers::NodeInputs;
  use crate::handlers::test_support::Fixture;

  fn run(config: FilterConfig, input: Value) -> Value {
    let fixture = Fixture::new(NodeInputs::from([("input".to_string(), input)]));
    execute(&config, &fixture.ctx())
  }

  fn with(operator: FilterOperator, field: Option<&str>, value: Value) -> FilterConfig {
    FilterConfig {
      operator: Some(operator),
      field: field.map(str::to_string),
      value: Some(value),
    }
  }

  #[test]
  fn test_default_predicate() {
    assert_eq!(
      run(FilterConfig::default(), json!("kept")),
      json!({"output": "kept", "filtered": false})
    );
    assert_eq!(
      run(FilterConfig::default(), json!("")),
      json!({"output": null, "filtered": true})
    );

    let fixture = Fixture::new(NodeInputs::new());
    assert_eq!(
      execute(&FilterConfig::default(), &fixture.ctx()),
      json!({"output": null, "filtered": true})
    );
  }

  #[test]
  fn test_field_comparisons() {
    let user = json!({"user": {"name": "Ada Lovelace", "age": 36}});

    let config = with(FilterOperator::StartsWith, Some("user.name"), json!("Ada"));
    assert_eq!(run(config, user.clone())["output"], user);

    let config = with(FilterOperator::GreaterThan, Some("user.age"), json!(40));
    assert_eq!(run(config, user.clone())["filtered"], json!(true));

    let config = with(FilterOperator::LessThan, Some("user.age"), json!("40"));
    assert_eq!(run(config, user.clone())["filtered"], json!(false));
  }

  #[test]
  fn test_equals_and_contains() {
    let config = with(FilterOperator::Equals, None, json!(5));
    assert_eq!(run(config, json!("5"))["filtered"], json!(false));

    let config = with(FilterOperator::Contains, None, json!("b"));
    assert_eq!(run(config, json!(["a", "b"]))["filtered"], json!(false));

    let config = with(FilterOperator::EndsWith, None, json!("!"));
    assert_eq!(run(config, json!("hey"))["filtered"], json!(true));
  }

  #[test]
  fn test_unevaluable_does_not_pass() {
    let config = with(FilterOperator::Equals, Some("missing.path"), json!(1));
    assert_eq!(run(config, json!({"a": 1})), json!({"output": null, "filtered": true}));

    let config = with(FilterOperator::GreaterThan, None, json!(1));
    assert_eq!(run(config, json!("abc"))["filtered"], json!(true));
  }

  #[test]
  fn test_array_index_path() {
    let config = with(FilterOperator::Equals, Some("items.1"), json!("y"));
    assert_eq!(run(config, json!({"items": ["x", "y"]}))["filtered"], json!(false));
  }
}
