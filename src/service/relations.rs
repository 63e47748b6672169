use super::posts::{PostDirectory, PostRef};
use crate::db::{ChildSelector, DbActorHandle, PostType, RelationLink, RelationUnlink};
use crate::error::GvError;
use crate::zoho::ContactService;
use gv_schema::{ContactFields, RelationLinkPayload, SqlUnlinkPayload, ZohoLookup};
use serde::Serialize;
use tracing::{info, warn};

/// The two relation types known to the relation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    EventoPonente,
    EmpresaPonente,
}

impl RelationKind {
    pub const ALL: [RelationKind; 2] = [RelationKind::EventoPonente, RelationKind::EmpresaPonente];

    pub fn rel_id(self) -> i64 {
        match self {
            RelationKind::EventoPonente => 1,
            RelationKind::EmpresaPonente => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            RelationKind::EventoPonente => "evento_ponente",
            RelationKind::EmpresaPonente => "empresa_ponente",
        }
    }

    pub fn parent_type(self) -> PostType {
        match self {
            RelationKind::EventoPonente => PostType::Evento,
            RelationKind::EmpresaPonente => PostType::Empresa,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(name))
    }

    pub fn from_rel_id(rel_id: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.rel_id() == rel_id)
    }

    /// Explicit `relation` (name or numeric id) first, otherwise whichever parent the payload names.
    fn for_link(payload: &RelationLinkPayload) -> Result<Self, GvError> {
        if let Some(raw) = payload.relation.as_deref() {
            return Self::from_name(raw)
                .or_else(|| raw.trim().parse().ok().and_then(Self::from_rel_id))
                .ok_or_else(|| GvError::Validation(format!("unknown relation: {raw}")));
        }
        if payload.has_event() {
            Ok(RelationKind::EventoPonente)
        } else if payload.has_company() {
            Ok(RelationKind::EmpresaPonente)
        } else {
            Err(GvError::Validation(
                "payload names neither an evento nor an empresa".to_string(),
            ))
        }
    }

    fn parent_ref(self, payload: &RelationLinkPayload) -> PostRef<'_> {
        let (zoho_id, title, image) = match self {
            RelationKind::EventoPonente => (
                &payload.evento_id,
                &payload.evento_nombre,
                payload.evento_imagen.as_deref(),
            ),
            RelationKind::EmpresaPonente => (&payload.empresa_id, &payload.empresa_nombre, None),
        };
        PostRef::new(self.parent_type(), zoho_id.as_deref(), title.as_deref()).with_image(image)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LinkOutcome {
    pub relation: &'static str,
    pub rel_id: i64,
    pub parent_id: i64,
    pub child_id: i64,
    /// `false` when the link already existed.
    pub created: bool,
    pub contact_synced: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UnlinkOutcome {
    pub rel_id: i64,
    pub parent_id: i64,
    pub removed: u64,
}

/// Links events/companies to speakers from webhook payloads.
#[derive(Clone)]
pub struct RelationOrchestrator {
    posts: PostDirectory,
    contacts: ContactService,
    db: DbActorHandle,
}

impl RelationOrchestrator {
    pub fn new(posts: PostDirectory, contacts: ContactService, db: DbActorHandle) -> Self {
        Self {
            posts,
            contacts,
            db,
        }
    }

    pub async fn link(&self, payload: &RelationLinkPayload) -> Result<LinkOutcome, GvError> {
        let kind = RelationKind::for_link(payload)?;
        let parent_ref = kind.parent_ref(payload);
        if parent_ref.is_empty() {
            return Err(GvError::Validation(format!(
                "{} id or name is required",
                kind.parent_type()
            )));
        }
        if !payload.has_speaker() {
            return Err(GvError::Validation(
                "ponente id or name is required".to_string(),
            ));
        }

        let contact_id = self.sync_speaker_contact(kind, payload).await;
        let speaker_zoho_id = payload.ponente_id.clone().or_else(|| contact_id.clone());

        let (parent, _) = self.posts.find_or_create(parent_ref).await?;
        let (child, _) = self
            .posts
            .find_or_create(PostRef::new(
                PostType::Ponente,
                speaker_zoho_id.as_deref(),
                payload.ponente_nombre.as_deref(),
            ))
            .await?;

        let created = self
            .db
            .link(RelationLink {
                rel_id: kind.rel_id(),
                parent_id: parent.id,
                child_id: child.id,
            })
            .await?;

        info!(
            relation = kind.name(),
            parent_id = parent.id,
            child_id = child.id,
            created,
            "Relation linked"
        );
        Ok(LinkOutcome {
            relation: kind.name(),
            rel_id: kind.rel_id(),
            parent_id: parent.id,
            child_id: child.id,
            created,
            contact_synced: contact_id.is_some(),
            contact_id,
        })
    }

    /// Removes the single link named by a link-shaped payload. Nothing is created.
    pub async fn unlink(&self, payload: &RelationLinkPayload) -> Result<UnlinkOutcome, GvError> {
        let kind = RelationKind::for_link(payload)?;
        let parent = self
            .posts
            .find(kind.parent_ref(payload))
            .await?
            .ok_or_else(|| GvError::NotFound(format!("{} not found", kind.parent_type())))?;
        let child = self
            .posts
            .find(PostRef::new(
                PostType::Ponente,
                payload.ponente_id.as_deref(),
                payload.ponente_nombre.as_deref(),
            ))
            .await?
            .ok_or_else(|| GvError::NotFound("ponente not found".to_string()))?;

        self.remove(kind.rel_id(), parent.id, ChildSelector::Ids(vec![child.id]))
            .await
    }

    /// Direct relation-table removal by ids.
    pub async fn sql_unlink(&self, payload: &SqlUnlinkPayload) -> Result<UnlinkOutcome, GvError> {
        let raw = payload
            .relation
            .as_deref()
            .ok_or_else(|| GvError::Validation("rel_id or relation is required".to_string()))?;
        let rel_id = match raw.trim().parse::<i64>() {
            Ok(id) if id > 0 => id,
            Ok(_) => return Err(GvError::Validation(format!("invalid rel_id: {raw}"))),
            Err(_) => RelationKind::from_name(raw)
                .map(RelationKind::rel_id)
                .ok_or_else(|| GvError::Validation(format!("unknown relation: {raw}")))?,
        };
        let parent_id = payload
            .parent_id
            .ok_or_else(|| GvError::Validation("parent_id is required".to_string()))?;

        let children = if payload.all_children {
            ChildSelector::All
        } else if !payload.child_ids.is_empty() {
            ChildSelector::Ids(payload.child_ids.clone())
        } else {
            return Err(GvError::Validation(
                "child_ids or all_children is required".to_string(),
            ));
        };

        self.remove(rel_id, parent_id, children).await
    }

    async fn remove(
        &self,
        rel_id: i64,
        parent_id: i64,
        children: ChildSelector,
    ) -> Result<UnlinkOutcome, GvError> {
        let removed = self
            .db
            .unlink(RelationUnlink {
                rel_id,
                parent_id,
                children,
            })
            .await?;
        info!(rel_id, parent_id, removed, "Relation rows removed");
        Ok(UnlinkOutcome {
            rel_id,
            parent_id,
            removed,
        })
    }

    /// Upserts the speaker as a CRM contact when an email is given. Failures are logged only.
    async fn sync_speaker_contact(
        &self,
        kind: RelationKind,
        payload: &RelationLinkPayload,
    ) -> Option<String> {
        let email = payload.ponente_email.as_deref()?;

        let mut fields = ContactFields {
            email: Some(email.to_string()),
            phone: payload.ponente_telefono.clone(),
            title: payload.ponente_cargo.clone(),
            ..Default::default()
        };
        if let Some(name) = payload.ponente_nombre.as_deref() {
            fields = fields.with_full_name(name);
        }
        if kind == RelationKind::EmpresaPonente && payload.empresa_id.is_some() {
            fields.account_name = Some(ZohoLookup {
                id: payload.empresa_id.clone(),
                name: payload.empresa_nombre.clone(),
            });
        }

        match self.contacts.upsert_by_email(&fields).await {
            Ok(id) => Some(id),
            Err(e) => {
                warn!(email, error = %e, "Speaker contact sync failed; linking anyway");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_relation_map() {
        assert_eq!(RelationKind::from_name("evento_ponente").map(|k| k.rel_id()), Some(1));
        assert_eq!(RelationKind::from_name("EMPRESA_PONENTE").map(|k| k.rel_id()), Some(2));
        assert_eq!(RelationKind::from_name("ponente_ponente"), None);
        assert_eq!(RelationKind::from_rel_id(2), Some(RelationKind::EmpresaPonente));
    }

    #[test]
    fn kind_is_inferred_from_payload() {
        let company = RelationLinkPayload {
            empresa_nombre: Some("Acme".to_string()),
            ponente_nombre: Some("Ana".to_string()),
            ..Default::default()
        };
        assert_eq!(
            RelationKind::for_link(&company).ok(),
            Some(RelationKind::EmpresaPonente)
        );

        let numeric = RelationLinkPayload {
            relation: Some("1".to_string()),
            ..Default::default()
        };
        assert_eq!(
            RelationKind::for_link(&numeric).ok(),
            Some(RelationKind::EventoPonente)
        );

        assert!(RelationKind::for_link(&RelationLinkPayload::default()).is_err());
    }
}
