use crate::db::{DbActorHandle, MetaKey, MetaWrite};
use crate::error::GvError;
use gv_schema::AttendeeRecord;
use tracing::{debug, warn};

/// Post meta key holding an event's attendee list.
pub const ATTENDEES_META_KEY: &str = "_asistentes";

/// Attendee list of an event post.
#[derive(Clone)]
pub struct AttendeeLog {
    db: DbActorHandle,
}

impl AttendeeLog {
    pub fn new(db: DbActorHandle) -> Self {
        Self { db }
    }

    /// Appends one record; returns the new list length.
    pub async fn append(&self, event_post_id: i64, record: &AttendeeRecord) -> Result<usize, GvError> {
        let len = self
            .db
            .append_meta(MetaWrite {
                post_id: event_post_id,
                key: ATTENDEES_META_KEY.to_string(),
                value: serde_json::to_value(record)?,
            })
            .await?;
        debug!(event_post_id, attendees = len, name = %record.name, "Attendee recorded");
        Ok(len)
    }

    /// All records in insertion order. Malformed entries are skipped.
    pub async fn list(&self, event_post_id: i64) -> Result<Vec<AttendeeRecord>, GvError> {
        let values = self
            .db
            .get_meta_list(MetaKey {
                post_id: event_post_id,
                key: ATTENDEES_META_KEY.to_string(),
            })
            .await?;

        Ok(values
            .into_iter()
            .filter_map(|value| match serde_json::from_value::<AttendeeRecord>(value) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(event_post_id, error = %e, "Skipping malformed attendee entry");
                    None
                }
            })
            .collect())
    }
}
