use crate::lax;
use serde::{Deserialize, Serialize};

/// Registration form submission that triggers ticket generation.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RegistrationRequest {
    #[serde(
        default,
        alias = "name",
        alias = "full_name",
        deserialize_with = "lax::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub nombre: Option<String>,

    #[serde(
        default,
        alias = "company",
        deserialize_with = "lax::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub empresa: Option<String>,

    #[serde(
        default,
        alias = "title",
        deserialize_with = "lax::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub cargo: Option<String>,

    #[serde(
        default,
        deserialize_with = "lax::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub email: Option<String>,

    #[serde(
        default,
        alias = "phone",
        deserialize_with = "lax::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub telefono: Option<String>,

    /// Local event post id.
    #[serde(
        default,
        alias = "event_id",
        deserialize_with = "lax::opt_i64",
        skip_serializing_if = "Option::is_none"
    )]
    pub evento_id: Option<i64>,

    /// Event name, matched fuzzily when `evento_id` is absent.
    #[serde(
        default,
        alias = "event",
        deserialize_with = "lax::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub evento: Option<String>,
}
