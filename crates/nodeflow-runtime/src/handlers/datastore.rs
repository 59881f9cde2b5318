use nodeflow_config::{DatastoreConfig, DatastoreOperation};
use serde_json::{Value, json};

use super::HandlerContext;
use crate::error::HandlerError;

/// Save the input under a key, or load what was saved there.
///
/// The key defaults to the node id. Loading a missing key yields null data.
pub(crate) async fn execute(
  config: &DatastoreConfig,
  ctx: &HandlerContext<'_>,
) -> Result<Value, HandlerError> {
  let key = config.key.as_deref().unwrap_or(ctx.node_id);
  let store = &ctx.services.store;

  match config.operation {
    DatastoreOperation::Save => {
      let data = ctx.primary_input();
      store.set(key, serde_json::to_string(&data)?).await?;
      Ok(json!({ "saved": true, "data": data }))
    }
    DatastoreOperation::Load => {
      let data = match store.get(key).await? {
        Some(raw) => serde_json::from_str(&raw)?,
        None => Value::Null,
      };
      Ok(json!({ "saved": false, "data": data }))
    }
  }
}
