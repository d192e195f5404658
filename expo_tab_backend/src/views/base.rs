use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::DatabaseConnection;

use expo_tab_entities::prelude::*;

#[async_trait]
pub trait LoadedView : Sync + Send {
    // We can't use a connection trait here, since otherwise the trait is not object safe
    async fn update_and_get_changes(&mut self, db: &DatabaseConnection, changes: &EntityChangeSummary) -> Result<Option<HashMap<String, serde_json::Value>>, anyhow::Error>;
    async fn view_string(&self) -> Result<String, anyhow::Error>;
}
