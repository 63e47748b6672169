use super::client::{ZohoApiClient, ZohoResponse};
use super::equals_criteria;
use crate::error::GvError;
use gv_schema::{ContactFields, ContactRecord, LeadFields, ZohoData};
use tracing::{debug, info};

/// `Contacts` and `Leads` module operations.
#[derive(Clone)]
pub struct ContactService {
    api: ZohoApiClient,
}

impl ContactService {
    pub fn new(api: ZohoApiClient) -> Self {
        Self { api }
    }

    /// Contact whose `Email` equals `email` (case-insensitive), if any.
    pub async fn search_by_email(&self, email: &str) -> Result<Option<ContactRecord>, GvError> {
        let email = required_email(Some(email))?;
        let criteria = equals_criteria("Email", email);
        let resp = self
            .api
            .get("Contacts/search", &[("criteria", criteria.as_str())])
            .await?;

        if !resp.is_success() {
            return Err(resp.rejection("contact search"));
        }
        if resp.is_empty() {
            debug!(email, "[Zoho] No contact found");
            return Ok(None);
        }

        let found: ZohoData<ContactRecord> = resp.decode()?;
        Ok(found.data.into_iter().find(|c| {
            c.email
                .as_deref()
                .is_some_and(|e| e.trim().eq_ignore_ascii_case(email))
        }))
    }

    /// Creates a contact and returns its CRM id. `Email` is mandatory.
    pub async fn create(&self, fields: &ContactFields) -> Result<String, GvError> {
        required_email(fields.email.as_deref())?;
        let resp = self.api.post("Contacts", &ZohoData::single(fields)).await?;
        let id = created_id("contact create", &resp)?;
        info!(contact_id = %id, "[Zoho] Contact created");
        Ok(id)
    }

    pub async fn update_by_id(&self, id: &str, fields: &ContactFields) -> Result<(), GvError> {
        let resp = self
            .api
            .put(&format!("Contacts/{id}"), &ZohoData::single(fields))
            .await?;
        let result = resp.first_action("contact update")?;
        if !result.is_success() {
            return Err(GvError::upstream_rejected("contact update", result.describe()));
        }
        debug!(contact_id = id, "[Zoho] Contact updated");
        Ok(())
    }

    /// Updates the contact matching `fields.email`, or creates it. Returns the CRM id.
    pub async fn upsert_by_email(&self, fields: &ContactFields) -> Result<String, GvError> {
        let email = required_email(fields.email.as_deref())?;
        match self.search_by_email(email).await? {
            Some(existing) => {
                self.update_by_id(&existing.id, fields).await?;
                Ok(existing.id)
            }
            None => self.create(fields).await,
        }
    }

    /// Creates a lead and returns its CRM id. `Email` is mandatory.
    pub async fn create_lead(&self, fields: &LeadFields) -> Result<String, GvError> {
        required_email(fields.email.as_deref())?;
        let resp = self.api.post("Leads", &ZohoData::single(fields)).await?;
        let id = created_id("lead create", &resp)?;
        info!(lead_id = %id, "[Zoho] Lead created");
        Ok(id)
    }
}

fn required_email(email: Option<&str>) -> Result<&str, GvError> {
    email
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .ok_or_else(|| GvError::Validation("email is required".to_string()))
}

fn created_id(operation: &str, resp: &ZohoResponse) -> Result<String, GvError> {
    let result = resp.first_action(operation)?;
    match result.record_id() {
        Some(id) if result.is_success() || result.code.is_none() => Ok(id.to_string()),
        _ => Err(GvError::upstream_rejected(operation, result.describe())),
    }
}
