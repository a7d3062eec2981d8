//! In-Memory Content Catalog
//!
//! Read-only catalog snapshot for development and tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::content::Content;
use crate::domain::foundation::{ContentId, DomainError};
use crate::ports::ContentReader;

#[derive(Debug, Clone, Default)]
pub struct InMemoryContentCatalog {
    items: Arc<RwLock<HashMap<ContentId, Content>>>,
}

impl InMemoryContentCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a content item.
    pub async fn insert(&self, content: Content) {
        self.items.write().await.insert(content.id, content);
    }

    pub async fn remove(&self, id: &ContentId) -> Option<Content> {
        self.items.write().await.remove(id)
    }
}

#[async_trait]
impl ContentReader for InMemoryContentCatalog {
    async fn find_by_id(&self, id: &ContentId) -> Result<Option<Content>, DomainError> {
        Ok(self.items.read().await.get(id).cloned())
    }
}
