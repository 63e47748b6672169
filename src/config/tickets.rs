use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What the ticket QR code encodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum QrContent {
    /// Human-readable attendee summary.
    #[default]
    Summary,
    /// Check-in URL carrying the attendee's fields as query parameters.
    CheckinUrl,
}

/// Ticket generation configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TicketsConfig {
    /// Directory receiving generated PDFs and QR images; served under `/tickets/`.
    /// TOML: `tickets.output_dir`. Default: `tickets`.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// QR payload mode.
    /// TOML: `tickets.qr_content`. Values: `summary` | `checkin_url`. Default: `summary`.
    #[serde(default)]
    pub qr_content: QrContent,

    /// Banner fill used when the event has no featured image (`#rrggbb`).
    /// TOML: `tickets.banner_color`. Default: `#1d3557`.
    #[serde(default = "default_banner_color")]
    pub banner_color: String,

    /// Create a Zoho Lead for registrations that carry an email.
    /// TOML: `tickets.create_leads`. Default: `true`.
    #[serde(default = "default_create_leads")]
    pub create_leads: bool,
}

impl Default for TicketsConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            qr_content: QrContent::default(),
            banner_color: default_banner_color(),
            create_leads: default_create_leads(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("tickets")
}

fn default_banner_color() -> String {
    "#1d3557".to_string()
}

fn default_create_leads() -> bool {
    true
}
