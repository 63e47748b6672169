//! Merging of list-valued post meta.
//!
//! A key may be stored as several rows. Each row holds either one record or an array of records;
//! readers see the concatenation in insertion order.

use serde_json::Value;
use tracing::warn;

pub(crate) fn merge_fragments<I>(fragments: I) -> Vec<Value>
where
    I: IntoIterator<Item = String>,
{
    let mut merged = Vec::new();
    for raw in fragments {
        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Array(items)) => merged.extend(items),
            Ok(Value::Null) => {}
            Ok(item) => merged.push(item),
            Err(e) => {
                warn!(error = %e, "Skipping undecodable post meta fragment");
            }
        }
    }
    merged
}
