use crate::lax;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Event as returned by `Events/search`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EventRecord {
    #[serde(deserialize_with = "lax::string")]
    pub id: String,

    #[serde(rename = "Event_Title", default)]
    pub title: Option<String>,

    #[serde(rename = "Start_DateTime", default)]
    pub start: Option<String>,

    #[serde(rename = "Venue", default)]
    pub venue: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Participant entry carrying the `Asiste` attendance flag.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ParticipantEntry {
    #[serde(rename = "type")]
    pub kind: String,

    pub participant: String,

    #[serde(rename = "Asiste")]
    pub asiste: bool,
}

/// Update body for marking a contact as present at an event.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EventAttendanceUpdate {
    pub id: String,

    #[serde(rename = "Participants")]
    pub participants: Vec<ParticipantEntry>,
}

impl EventAttendanceUpdate {
    pub fn attended(event_id: &str, contact_id: &str) -> Self {
        Self {
            id: event_id.to_string(),
            participants: vec![ParticipantEntry {
                kind: "contact".to_string(),
                participant: contact_id.to_string(),
                asiste: true,
            }],
        }
    }
}
