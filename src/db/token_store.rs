use super::actor::DbActorHandle;
use super::create::TokenCreate;
use super::models::DbOAuthToken;
use crate::error::GvError;
use crate::zoho::TokenStore;
use async_trait::async_trait;

#[async_trait]
impl TokenStore for DbActorHandle {
    async fn latest(&self) -> Result<Option<DbOAuthToken>, GvError> {
        self.latest_token().await
    }

    async fn insert(&self, token: TokenCreate) -> Result<i64, GvError> {
        self.insert_token(token).await
    }
}
