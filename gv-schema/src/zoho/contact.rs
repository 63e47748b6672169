use crate::lax;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Writable Contact fields (`Contacts` module).
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ContactFields {
    #[serde(rename = "First_Name", default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,

    #[serde(rename = "Last_Name", default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,

    #[serde(rename = "Email", default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(rename = "Phone", default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(rename = "Title", default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(rename = "Account_Name", default, skip_serializing_if = "Option::is_none")]
    pub account_name: Option<ZohoLookup>,
}

impl ContactFields {
    /// Splits a full name into Zoho's first/last name pair.
    ///
    /// Zoho requires `Last_Name`; a single-word name goes there.
    pub fn with_full_name(mut self, full_name: &str) -> Self {
        (self.first_name, self.last_name) = split_full_name(full_name);
        self
    }
}

/// Writable Lead fields (`Leads` module).
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct LeadFields {
    #[serde(rename = "First_Name", default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,

    #[serde(rename = "Last_Name", default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,

    #[serde(rename = "Email", default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(rename = "Phone", default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(rename = "Designation", default, skip_serializing_if = "Option::is_none")]
    pub designation: Option<String>,

    #[serde(rename = "Company", default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,

    #[serde(rename = "Lead_Source", default, skip_serializing_if = "Option::is_none")]
    pub lead_source: Option<String>,
}

impl LeadFields {
    /// Same split as [`ContactFields::with_full_name`].
    pub fn with_full_name(mut self, full_name: &str) -> Self {
        (self.first_name, self.last_name) = split_full_name(full_name);
        self
    }
}

fn split_full_name(full_name: &str) -> (Option<String>, Option<String>) {
    let mut parts = full_name.split_whitespace();
    let Some(first) = parts.next() else {
        return (None, None);
    };
    let rest: Vec<&str> = parts.collect();
    if rest.is_empty() {
        (None, Some(first.to_string()))
    } else {
        (Some(first.to_string()), Some(rest.join(" ")))
    }
}

/// Lookup reference (`{"id": ..., "name": ...}`) used by Zoho for related records.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ZohoLookup {
    #[serde(
        default,
        deserialize_with = "lax::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Contact as returned by `Contacts/search`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ContactRecord {
    #[serde(deserialize_with = "lax::string")]
    pub id: String,

    #[serde(rename = "First_Name", default)]
    pub first_name: Option<String>,

    #[serde(rename = "Last_Name", default)]
    pub last_name: Option<String>,

    #[serde(rename = "Email", default)]
    pub email: Option<String>,

    #[serde(rename = "Account_Name", default)]
    pub account_name: Option<ZohoLookup>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}
