use serde::{Deserialize, Serialize};

/// One entry of an event's `_asistentes` list.
///
/// Legacy fragments were written with Spanish keys, so those are accepted as aliases.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AttendeeRecord {
    #[serde(alias = "nombre")]
    pub name: String,

    #[serde(default, alias = "empresa")]
    pub company: String,

    #[serde(default, alias = "cargo")]
    pub title: String,

    #[serde(default, alias = "fecha")]
    pub timestamp: String,
}

impl AttendeeRecord {
    pub fn new(
        name: impl Into<String>,
        company: impl Into<String>,
        title: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            company: company.into(),
            title: title.into(),
            timestamp: timestamp.into(),
        }
    }
}
