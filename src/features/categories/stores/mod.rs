//! Persistence seam for categories.

#[cfg(test)]
mod memory_store;
mod mongo_store;

#[cfg(test)]
pub use memory_store::InMemoryCategoryStore;
pub use mongo_store::MongoCategoryStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;

use crate::core::error::Result;
use crate::features::categories::models::Category;

/// Document-store operations the ordered category list is built on.
///
/// Each call is one independent round trip; nothing here spans several
/// writes atomically.
#[async_trait]
pub trait CategoryStore: Send + Sync {
    /// All categories sorted ascending by `order`
    async fn list_by_order(&self) -> Result<Vec<Category>>;

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Category>>;

    /// Whether any category already uses `value`
    async fn value_exists(&self, value: &str) -> Result<bool>;

    /// Highest `order` in the collection, `None` when it is empty
    async fn last_order(&self) -> Result<Option<i32>>;

    async fn insert(&self, category: &Category) -> Result<()>;

    /// Overwrite `order` and `updatedAt` of one category; `false` when no document matched
    async fn set_order(&self, id: &ObjectId, order: i32, updated_at: DateTime<Utc>) -> Result<bool>;

    /// `false` when no document matched
    async fn delete(&self, id: &ObjectId) -> Result<bool>;
}
