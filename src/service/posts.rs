use crate::db::{DbActorHandle, DbPost, PostCreate, PostQuery, PostType};
use crate::error::GvError;
use tracing::{debug, info};

/// How a caller identifies a local post: a Zoho id, a title, or both.
#[derive(Debug, Clone, Copy)]
pub struct PostRef<'a> {
    pub post_type: PostType,
    pub zoho_id: Option<&'a str>,
    pub title: Option<&'a str>,
    /// Featured image to store on the post, on creation or when it changed.
    pub featured_image: Option<&'a str>,
}

impl<'a> PostRef<'a> {
    pub fn new(post_type: PostType, zoho_id: Option<&'a str>, title: Option<&'a str>) -> Self {
        Self {
            post_type,
            zoho_id: zoho_id.map(str::trim).filter(|s| !s.is_empty()),
            title: title.map(str::trim).filter(|s| !s.is_empty()),
            featured_image: None,
        }
    }

    pub fn with_image(mut self, path: Option<&'a str>) -> Self {
        self.featured_image = path.map(str::trim).filter(|s| !s.is_empty());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.zoho_id.is_none() && self.title.is_none()
    }
}

/// Local stand-in for the CMS post store (events, companies, speakers).
#[derive(Clone)]
pub struct PostDirectory {
    db: DbActorHandle,
}

impl PostDirectory {
    pub fn new(db: DbActorHandle) -> Self {
        Self { db }
    }

    pub async fn get(&self, id: i64) -> Result<Option<DbPost>, GvError> {
        self.db.get_post(id).await
    }

    pub async fn list(&self, post_type: PostType) -> Result<Vec<DbPost>, GvError> {
        self.db.list_posts(post_type).await
    }

    /// Looks a post up by Zoho id, then by exact title. A title hit without a Zoho id adopts the
    /// given one.
    pub async fn find(&self, post: PostRef<'_>) -> Result<Option<DbPost>, GvError> {
        if let Some(zoho_id) = post.zoho_id
            && let Some(found) = self.db.find_post_by_zoho_id(post.post_type, zoho_id).await?
        {
            return Ok(Some(found));
        }

        let Some(title) = post.title else {
            return Ok(None);
        };
        let mut hits = self
            .db
            .search_posts(PostQuery {
                post_type: post.post_type,
                title: title.to_string(),
                fuzzy: false,
            })
            .await?;
        if hits.is_empty() {
            return Ok(None);
        }
        let mut found = hits.remove(0);

        if let Some(zoho_id) = post.zoho_id
            && found.zoho_id.is_none()
        {
            self.db.set_post_zoho_id(found.id, zoho_id).await?;
            debug!(post_id = found.id, zoho_id, "Attached Zoho id to post");
            found.zoho_id = Some(zoho_id.to_string());
        }
        Ok(Some(found))
    }

    /// Like [`find`](Self::find), creating the post when absent. Returns `(post, created)`.
    pub async fn find_or_create(&self, post: PostRef<'_>) -> Result<(DbPost, bool), GvError> {
        if let Some(mut found) = self.find(post).await? {
            if let Some(image) = post.featured_image
                && found.featured_image.as_deref() != Some(image)
            {
                self.db.set_post_featured_image(found.id, image).await?;
                debug!(post_id = found.id, image, "Updated post featured image");
                found.featured_image = Some(image.to_string());
            }
            return Ok((found, false));
        }

        let title = post.title.ok_or_else(|| {
            GvError::Validation(format!(
                "{} not found and no name given to create it",
                post.post_type
            ))
        })?;
        let created = self
            .db
            .create_post(PostCreate {
                post_type: post.post_type,
                title: title.to_string(),
                zoho_id: post.zoho_id.map(str::to_string),
                featured_image: post.featured_image.map(str::to_string),
            })
            .await?;
        info!(
            post_id = created.id,
            post_type = %post.post_type,
            title = %created.title,
            "Created local post"
        );
        Ok((created, true))
    }

    /// Best title match: exact (ASCII case-insensitive) first, then the shortest containing title.
    pub async fn fuzzy_find(
        &self,
        post_type: PostType,
        name: &str,
    ) -> Result<Option<DbPost>, GvError> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(None);
        }
        let hits = self
            .db
            .search_posts(PostQuery {
                post_type,
                title: name.to_string(),
                fuzzy: true,
            })
            .await?;
        Ok(hits.into_iter().next())
    }
}
