use super::client::ZohoApiClient;
use super::equals_criteria;
use crate::error::GvError;
use crate::utils::logging::with_pretty_json_debug;
use gv_schema::{EventAttendanceUpdate, EventRecord, ZohoData};
use tracing::{debug, info};

/// `Events` module operations.
#[derive(Clone)]
pub struct EventService {
    api: ZohoApiClient,
}

impl EventService {
    pub fn new(api: ZohoApiClient) -> Self {
        Self { api }
    }

    /// Runs a raw criteria search. No hits yields an empty list.
    pub async fn search(&self, criteria: &str) -> Result<Vec<EventRecord>, GvError> {
        let resp = self
            .api
            .get("Events/search", &[("criteria", criteria)])
            .await?;

        with_pretty_json_debug(&resp.body, |pretty| {
            debug!(
                criteria,
                status = resp.status.as_u16(),
                body = %pretty,
                "[Zoho] Events search response"
            );
        });

        if !resp.is_success() {
            return Err(resp.rejection("event search"));
        }
        if resp.is_empty() {
            return Ok(Vec::new());
        }

        let found: ZohoData<EventRecord> = resp.decode()?;
        debug!(
            criteria,
            count = found.data.len(),
            ids = ?found.data.iter().map(|e| e.id.as_str()).collect::<Vec<_>>(),
            "[Zoho] Events search decoded"
        );
        Ok(found.data)
    }

    pub async fn search_by_title(&self, title: &str) -> Result<Option<EventRecord>, GvError> {
        let title = title.trim();
        if title.is_empty() {
            return Ok(None);
        }
        let events = self.search(&equals_criteria("Event_Title", title)).await?;
        Ok(events.into_iter().next())
    }

    /// Sets the `Asiste` flag for `contact_id` on the event's participant list.
    pub async fn mark_attendance(&self, contact_id: &str, event_id: &str) -> Result<(), GvError> {
        let update = EventAttendanceUpdate::attended(event_id, contact_id);
        let resp = self
            .api
            .put(&format!("Events/{event_id}"), &ZohoData::single(&update))
            .await?;
        let result = resp.first_action("event attendance update")?;
        if !result.is_success() {
            return Err(GvError::upstream_rejected(
                "event attendance update",
                result.describe(),
            ));
        }
        info!(event_id, contact_id, "[Zoho] Attendance recorded");
        Ok(())
    }
}
