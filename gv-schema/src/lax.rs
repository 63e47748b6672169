//! Lenient field deserializers for webhook payloads.
//!
//! Webhook bodies arrive either as JSON (typed values) or form-encoded (everything is a string),
//! so scalar fields accept both spellings.

use serde::{Deserialize, Deserializer, de};
use serde_json::Value;

/// String or number; blank strings become `None`.
pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
        }
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(_) => Err(de::Error::custom("expected a string or a number")),
    }
}

/// Required string-or-number (Zoho record ids are strings, test doubles often send numbers).
pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    opt_string(deserializer)?.ok_or_else(|| de::Error::custom("expected a non-empty string"))
}

/// Integer or numeric string; blank strings become `None`.
pub fn opt_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .map(Some)
            .ok_or_else(|| de::Error::custom("expected an integer")),
        Some(Value::String(s)) => parse_i64(&s),
        Some(_) => Err(de::Error::custom("expected an integer or a numeric string")),
    }
}

/// Boolean flag: `true`, `1`, `"1"`, `"true"`, `"yes"`, `"on"` are truthy.
pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(b)) => Ok(b),
        Some(Value::Number(n)) => Ok(n.as_i64().is_some_and(|v| v != 0)),
        Some(Value::String(s)) => Ok(matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        )),
        Some(_) => Err(de::Error::custom("expected a boolean flag")),
    }
}

/// Integer list given as a JSON array or a comma-separated string (`"5,9"`).
pub fn id_list<'de, D>(deserializer: D) -> Result<Vec<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::Number(n) => Some(
                    n.as_i64()
                        .ok_or_else(|| de::Error::custom("expected integer ids")),
                ),
                Value::String(s) => parse_i64(&s).transpose(),
                _ => Some(Err(de::Error::custom("expected integer ids"))),
            })
            .collect(),
        Some(Value::Number(n)) => n
            .as_i64()
            .map(|v| vec![v])
            .ok_or_else(|| de::Error::custom("expected integer ids")),
        Some(Value::String(s)) => s
            .split(',')
            .filter_map(|part| parse_i64(part).transpose())
            .collect(),
        Some(_) => Err(de::Error::custom("expected an id list")),
    }
}

fn parse_i64<E: de::Error>(raw: &str) -> Result<Option<i64>, E> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<i64>()
        .map(Some)
        .map_err(|_| E::custom(format!("invalid integer: {trimmed}")))
}
