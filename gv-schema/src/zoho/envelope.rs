use crate::lax;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Zoho CRM v2 `{"data": [...]}` envelope, used for both requests and responses.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ZohoData<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,

    /// Pagination block returned by search endpoints.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<Value>,
}

impl<T> ZohoData<T> {
    pub fn single(record: T) -> Self {
        Self {
            data: vec![record],
            info: None,
        }
    }

    pub fn first(&self) -> Option<&T> {
        self.data.first()
    }
}

/// Per-record outcome of an insert/update call.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ZohoActionResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<ZohoActionDetails>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ZohoActionDetails {
    #[serde(
        default,
        deserialize_with = "lax::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,

    #[serde(flatten)]
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Value>,
}

impl ZohoActionResult {
    pub fn is_success(&self) -> bool {
        self.code.as_deref() == Some("SUCCESS")
    }

    /// Id of the affected record, if Zoho reported one.
    pub fn record_id(&self) -> Option<&str> {
        self.details.as_ref().and_then(|d| d.id.as_deref())
    }

    /// Short human-readable reason for a rejected action.
    pub fn describe(&self) -> String {
        match (self.code.as_deref(), self.message.as_deref()) {
            (Some(code), Some(message)) => format!("{code}: {message}"),
            (Some(code), None) => code.to_string(),
            (None, Some(message)) => message.to_string(),
            (None, None) => "no action result".to_string(),
        }
    }
}
