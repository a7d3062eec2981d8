//! Content reader port.
//!
//! The content catalog is owned elsewhere; the purchase pipeline only reads
//! the fields it needs to decide purchasability and organization scope.

use async_trait::async_trait;

use crate::domain::content::Content;
use crate::domain::foundation::{ContentId, DomainError};

/// Reader port for catalog lookups.
#[async_trait]
pub trait ContentReader: Send + Sync {
    /// Find a content item by id, including soft-deleted rows.
    ///
    /// Returns `None` if no row exists.
    async fn find_by_id(&self, id: &ContentId) -> Result<Option<Content>, DomainError>;
}
