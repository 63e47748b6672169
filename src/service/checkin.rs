use super::attendees::AttendeeLog;
use super::posts::PostDirectory;
use crate::db::{DbPost, PostType};
use crate::error::GvError;
use crate::utils::sanitize::sanitize_opt;
use crate::zoho::{ContactService, EventService};
use chrono::Local;
use gv_schema::{AttendeeRecord, CheckinQuery};
use tracing::{info, warn};

/// Check-in fields after plain-text sanitization.
#[derive(Debug, Clone, Default)]
pub struct CheckinFields {
    pub nombre: Option<String>,
    pub empresa: Option<String>,
    pub cargo: Option<String>,
    pub evento: Option<String>,
    pub ubicacion: Option<String>,
    pub fecha: Option<String>,
    pub email: Option<String>,
}

impl From<&CheckinQuery> for CheckinFields {
    fn from(q: &CheckinQuery) -> Self {
        Self {
            nombre: sanitize_opt(q.nombre.as_deref()),
            empresa: sanitize_opt(q.empresa.as_deref()),
            cargo: sanitize_opt(q.cargo.as_deref()),
            evento: sanitize_opt(q.evento.as_deref()),
            ubicacion: sanitize_opt(q.ubicacion.as_deref()),
            fecha: sanitize_opt(q.fecha.as_deref()),
            email: sanitize_opt(q.email.as_deref()),
        }
    }
}

/// What happened on the CRM side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrmSync {
    Synced,
    Skipped(&'static str),
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct CheckinOutcome {
    pub fields: CheckinFields,
    pub event: Option<DbPost>,
    /// Attendee list length after the append, when one happened.
    pub recorded: Option<usize>,
    pub crm: CrmSync,
}

/// Records QR scans locally and marks attendance in the CRM.
#[derive(Clone)]
pub struct CheckinHandler {
    posts: PostDirectory,
    attendees: AttendeeLog,
    contacts: ContactService,
    events: EventService,
}

impl CheckinHandler {
    pub fn new(
        posts: PostDirectory,
        attendees: AttendeeLog,
        contacts: ContactService,
        events: EventService,
    ) -> Self {
        Self {
            posts,
            attendees,
            contacts,
            events,
        }
    }

    /// Never fails: each step that cannot complete is logged and reported in the outcome.
    pub async fn handle(&self, query: &CheckinQuery) -> CheckinOutcome {
        let fields = CheckinFields::from(query);

        let (event, recorded) = match self.record_locally(&fields).await {
            Ok(result) => result,
            Err(e) => {
                warn!(error = %e, evento = ?fields.evento, "Check-in not recorded locally");
                (None, None)
            }
        };

        let crm = match self.sync_crm(&fields).await {
            Ok(sync) => sync,
            Err(e) => {
                warn!(error = %e, email = ?fields.email, "Check-in CRM sync failed");
                CrmSync::Failed(e.to_string())
            }
        };

        info!(
            nombre = ?fields.nombre,
            evento = ?fields.evento,
            ubicacion = ?fields.ubicacion,
            recorded = ?recorded,
            crm = ?crm,
            "Check-in processed"
        );
        CheckinOutcome {
            fields,
            event,
            recorded,
            crm,
        }
    }

    async fn record_locally(
        &self,
        fields: &CheckinFields,
    ) -> Result<(Option<DbPost>, Option<usize>), GvError> {
        let Some(evento) = fields.evento.as_deref() else {
            return Ok((None, None));
        };
        let Some(event) = self.posts.fuzzy_find(PostType::Evento, evento).await? else {
            warn!(evento, "Check-in for unknown event");
            return Ok((None, None));
        };

        let record = AttendeeRecord::new(
            fields.nombre.clone().unwrap_or_default(),
            fields.empresa.clone().unwrap_or_default(),
            fields.cargo.clone().unwrap_or_default(),
            Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        );
        let len = self.attendees.append(event.id, &record).await?;
        Ok((Some(event), Some(len)))
    }

    async fn sync_crm(&self, fields: &CheckinFields) -> Result<CrmSync, GvError> {
        let Some(email) = fields.email.as_deref() else {
            return Ok(CrmSync::Skipped("no email"));
        };
        let Some(evento) = fields.evento.as_deref() else {
            return Ok(CrmSync::Skipped("no event"));
        };
        let Some(contact) = self.contacts.search_by_email(email).await? else {
            return Ok(CrmSync::Skipped("contact not found"));
        };
        let Some(event) = self.events.search_by_title(evento).await? else {
            return Ok(CrmSync::Skipped("event not found in CRM"));
        };

        self.events.mark_attendance(&contact.id, &event.id).await?;
        Ok(CrmSync::Synced)
    }
}
