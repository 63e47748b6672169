use serde::{Deserialize, Serialize};

/// Query string carried by a scanned check-in URL (`/checkin/?nombre=...&evento=...`).
///
/// Values are untrusted; callers sanitize them before use.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CheckinQuery {
    #[serde(default)]
    pub nombre: Option<String>,
    #[serde(default)]
    pub empresa: Option<String>,
    #[serde(default)]
    pub cargo: Option<String>,
    #[serde(default)]
    pub evento: Option<String>,
    #[serde(default)]
    pub ubicacion: Option<String>,
    #[serde(default)]
    pub fecha: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}
