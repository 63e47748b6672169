mod pdf;
mod qr;

use super::attendees::AttendeeLog;
use super::posts::PostDirectory;
use crate::config::{QrContent, TicketsConfig};
use crate::db::{DbPost, PostType};
use crate::error::GvError;
use crate::utils::sanitize::{file_slug, sanitize_opt};
use crate::zoho::ContactService;
use chrono::Local;
use gv_schema::{AttendeeRecord, LeadFields, RegistrationRequest};
use image::RgbImage;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};
use url::Url;

const LEAD_SOURCE: &str = "Registro evento";

/// Result of a successful registration.
#[derive(Debug, Clone, Serialize)]
pub struct TicketReceipt {
    /// PDF file name under the tickets directory.
    pub ticket: String,
    /// Public path of the PDF.
    pub url: String,
    /// QR PNG file name under the tickets directory.
    pub qr: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lead_id: Option<String>,
}

/// Builds QR + PDF tickets for registrations and records the attendee on the event.
#[derive(Clone)]
pub struct TicketGenerator {
    cfg: TicketsConfig,
    public_base_url: Url,
    posts: PostDirectory,
    attendees: AttendeeLog,
    contacts: ContactService,
}

/// Everything the blocking render step needs, owned.
struct RenderJob {
    qr_payload: String,
    event_title: Option<String>,
    name: String,
    company: String,
    title: String,
    email: Option<String>,
    issued_at: String,
    banner_path: Option<PathBuf>,
    banner_color: [f32; 3],
}

impl RenderJob {
    /// Returns `(png, pdf)` bytes.
    fn render(self) -> Result<(Vec<u8>, Vec<u8>), GvError> {
        let qr = qr::render_qr(&self.qr_payload)?;
        let png = qr::encode_png(&qr)?;
        let banner = self.banner_path.as_deref().and_then(load_banner);

        let pdf = pdf::render_ticket(&pdf::TicketLayout {
            event_title: self.event_title.as_deref(),
            name: &self.name,
            company: &self.company,
            title: &self.title,
            email: self.email.as_deref(),
            issued_at: &self.issued_at,
            qr: &qr,
            banner: banner.as_ref(),
            banner_color: self.banner_color,
        })?;
        Ok((png, pdf))
    }
}

fn load_banner(path: &std::path::Path) -> Option<RgbImage> {
    match image::open(path) {
        Ok(img) => Some(img.to_rgb8()),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Banner image unreadable; using solid fill");
            None
        }
    }
}

impl TicketGenerator {
    pub fn new(
        cfg: TicketsConfig,
        public_base_url: Url,
        posts: PostDirectory,
        attendees: AttendeeLog,
        contacts: ContactService,
    ) -> Self {
        Self {
            cfg,
            public_base_url,
            posts,
            attendees,
            contacts,
        }
    }

    pub async fn generate(&self, req: &RegistrationRequest) -> Result<TicketReceipt, GvError> {
        let name = sanitize_opt(req.nombre.as_deref())
            .ok_or_else(|| GvError::Validation("nombre is required".to_string()))?;
        let company = sanitize_opt(req.empresa.as_deref()).unwrap_or_default();
        let title = sanitize_opt(req.cargo.as_deref()).unwrap_or_default();
        let email = sanitize_opt(req.email.as_deref());
        let phone = sanitize_opt(req.telefono.as_deref());

        let event = self.resolve_event(req).await?;
        let now = Local::now();
        let issued_at = now.format("%Y-%m-%d %H:%M:%S").to_string();
        let stem = format!("{}-{}", file_slug(&name), now.format("%Y%m%d-%H%M%S"));

        let event_title = event.as_ref().map(|e| e.title.clone());
        let qr_payload = match self.cfg.qr_content {
            QrContent::Summary => summary_text(&name, &company, &title, event_title.as_deref()),
            QrContent::CheckinUrl => checkin_url(
                &self.public_base_url,
                &name,
                &company,
                &title,
                event_title.as_deref(),
                email.as_deref(),
                &issued_at,
            )?
            .to_string(),
        };

        let job = RenderJob {
            qr_payload,
            event_title: event_title.clone(),
            name: name.clone(),
            company: company.clone(),
            title: title.clone(),
            email: email.clone(),
            issued_at: issued_at.clone(),
            banner_path: event
                .as_ref()
                .and_then(|e| e.featured_image.as_deref())
                .map(PathBuf::from),
            banner_color: pdf::parse_hex_color(&self.cfg.banner_color)
                .unwrap_or([0.11, 0.21, 0.34]),
        };
        let (png, pdf_bytes) = tokio::task::spawn_blocking(move || job.render())
            .await
            .map_err(|e| GvError::UnexpectedError(format!("ticket render task failed: {e}")))??;

        let pdf_name = format!("{stem}.pdf");
        let png_name = format!("{stem}.png");
        tokio::fs::create_dir_all(&self.cfg.output_dir).await?;
        tokio::fs::write(self.cfg.output_dir.join(&png_name), png).await?;
        tokio::fs::write(self.cfg.output_dir.join(&pdf_name), pdf_bytes).await?;
        info!(ticket = %pdf_name, attendee = %name, "Ticket generated");

        if let Some(event) = event.as_ref() {
            let record = AttendeeRecord::new(name.as_str(), company.as_str(), title.as_str(), issued_at);
            self.attendees.append(event.id, &record).await?;
        }

        let lead_id = match email.as_deref() {
            Some(email) if self.cfg.create_leads => {
                let fields = LeadFields {
                    email: Some(email.to_string()),
                    phone,
                    designation: (!title.is_empty()).then(|| title.clone()),
                    company: (!company.is_empty()).then(|| company.clone()),
                    lead_source: Some(LEAD_SOURCE.to_string()),
                    ..Default::default()
                }
                .with_full_name(&name);
                match self.contacts.create_lead(&fields).await {
                    Ok(id) => Some(id),
                    Err(e) => {
                        warn!(email, error = %e, "Lead creation failed; ticket kept");
                        None
                    }
                }
            }
            _ => None,
        };

        Ok(TicketReceipt {
            url: format!("/tickets/{pdf_name}"),
            ticket: pdf_name,
            qr: png_name,
            event_id: event.map(|e| e.id),
            lead_id,
        })
    }

    /// Event by post id, falling back to a fuzzy name match.
    async fn resolve_event(&self, req: &RegistrationRequest) -> Result<Option<DbPost>, GvError> {
        if let Some(id) = req.evento_id {
            match self.posts.get(id).await? {
                Some(post) if post.post_type == PostType::Evento.as_str() => return Ok(Some(post)),
                _ => warn!(evento_id = id, "Registration names an unknown event post"),
            }
        }
        match sanitize_opt(req.evento.as_deref()) {
            Some(name) => self.posts.fuzzy_find(PostType::Evento, &name).await,
            None => Ok(None),
        }
    }
}

fn summary_text(name: &str, company: &str, title: &str, event: Option<&str>) -> String {
    let mut lines = vec![format!("Nombre: {name}")];
    if !company.is_empty() {
        lines.push(format!("Empresa: {company}"));
    }
    if !title.is_empty() {
        lines.push(format!("Cargo: {title}"));
    }
    if let Some(event) = event {
        lines.push(format!("Evento: {event}"));
    }
    lines.join("\n")
}

fn checkin_url(
    base: &Url,
    name: &str,
    company: &str,
    title: &str,
    event: Option<&str>,
    email: Option<&str>,
    issued_at: &str,
) -> Result<Url, GvError> {
    let mut url = base.join("/checkin/")?;
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("nombre", name);
        query.append_pair("empresa", company);
        query.append_pair("cargo", title);
        if let Some(event) = event {
            query.append_pair("evento", event);
        }
        if let Some(email) = email {
            query.append_pair("email", email);
        }
        query.append_pair("fecha", issued_at);
    }
    Ok(url)
}
