use crate::lax;
use serde::{Deserialize, Serialize};

/// Webhook payload describing a parent (event or company) and a speaker (`ponente`).
///
/// `*_id` fields carry Zoho record ids; `*_nombre` fields carry display names. Either one is enough
/// to identify a side, but a name is needed when the local post has to be created.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RelationLinkPayload {
    /// Symbolic relation name (`evento_ponente` / `empresa_ponente`). Inferred when absent.
    #[serde(
        default,
        alias = "tipo",
        alias = "relation_type",
        deserialize_with = "lax::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub relation: Option<String>,

    #[serde(
        default,
        alias = "evento_zoho_id",
        deserialize_with = "lax::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub evento_id: Option<String>,

    #[serde(
        default,
        alias = "evento",
        deserialize_with = "lax::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub evento_nombre: Option<String>,

    /// Local path of the event's featured image, used as the ticket banner.
    #[serde(
        default,
        alias = "evento_banner",
        alias = "featured_image",
        deserialize_with = "lax::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub evento_imagen: Option<String>,

    #[serde(
        default,
        alias = "empresa_zoho_id",
        deserialize_with = "lax::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub empresa_id: Option<String>,

    #[serde(
        default,
        alias = "empresa",
        deserialize_with = "lax::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub empresa_nombre: Option<String>,

    #[serde(
        default,
        alias = "ponente_zoho_id",
        deserialize_with = "lax::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub ponente_id: Option<String>,

    #[serde(
        default,
        alias = "ponente",
        deserialize_with = "lax::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub ponente_nombre: Option<String>,

    #[serde(
        default,
        deserialize_with = "lax::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub ponente_email: Option<String>,

    #[serde(
        default,
        deserialize_with = "lax::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub ponente_cargo: Option<String>,

    #[serde(
        default,
        deserialize_with = "lax::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub ponente_telefono: Option<String>,
}

impl RelationLinkPayload {
    pub fn has_event(&self) -> bool {
        self.evento_id.is_some() || self.evento_nombre.is_some()
    }

    pub fn has_company(&self) -> bool {
        self.empresa_id.is_some() || self.empresa_nombre.is_some()
    }

    pub fn has_speaker(&self) -> bool {
        self.ponente_id.is_some() || self.ponente_nombre.is_some()
    }
}

/// Direct relation-table removal request.
///
/// `relation` is either a numeric relation id or a symbolic name.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SqlUnlinkPayload {
    #[serde(
        default,
        alias = "rel_id",
        alias = "relation_id",
        deserialize_with = "lax::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub relation: Option<String>,

    #[serde(
        default,
        alias = "parent_object_id",
        deserialize_with = "lax::opt_i64",
        skip_serializing_if = "Option::is_none"
    )]
    pub parent_id: Option<i64>,

    #[serde(
        default,
        alias = "child_object_ids",
        deserialize_with = "lax::id_list",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub child_ids: Vec<i64>,

    #[serde(default, deserialize_with = "lax::flag")]
    pub all_children: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn link_payload_accepts_short_aliases() {
        let payload: RelationLinkPayload = serde_json::from_value(json!({
            "evento": "Foro Fintech",
            "ponente": "Ana Ruiz",
            "ponente_email": "ana@example.com"
        }))
        .expect("alias payload");

        assert!(payload.has_event());
        assert!(!payload.has_company());
        assert!(payload.has_speaker());
        assert_eq!(payload.evento_nombre.as_deref(), Some("Foro Fintech"));
    }

    #[test]
    fn sql_unlink_accepts_numeric_relation_and_string_ids() {
        let payload: SqlUnlinkPayload = serde_json::from_value(json!({
            "rel_id": 1,
            "parent_id": "10",
            "child_ids": "5,9"
        }))
        .expect("sql unlink payload");

        assert_eq!(payload.relation.as_deref(), Some("1"));
        assert_eq!(payload.parent_id, Some(10));
        assert_eq!(payload.child_ids, vec![5, 9]);
        assert!(!payload.all_children);
    }
}
