use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::options::{CountOptions, FindOneOptions, FindOptions};
use mongodb::Collection;

use super::CategoryStore;
use crate::core::database::MongoHandle;
use crate::core::error::Result;
use crate::features::categories::models::Category;

/// Categories collection (`CATS_COL`) behind the shared MongoDB handle
pub struct MongoCategoryStore {
    db: Arc<MongoHandle>,
    collection: String,
}

impl MongoCategoryStore {
    pub fn new(db: Arc<MongoHandle>, collection: impl Into<String>) -> Self {
        Self {
            db,
            collection: collection.into(),
        }
    }

    async fn categories(&self) -> Result<Collection<Category>> {
        self.db.collection::<Category>(&self.collection).await
    }
}

#[async_trait]
impl CategoryStore for MongoCategoryStore {
    async fn list_by_order(&self) -> Result<Vec<Category>> {
        let options = FindOptions::builder().sort(doc! { "order": 1 }).build();
        let cursor = self.categories().await?.find(doc! {}, options).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Category>> {
        Ok(self
            .categories()
            .await?
            .find_one(doc! { "_id": id }, None)
            .await?)
    }

    async fn value_exists(&self, value: &str) -> Result<bool> {
        let options = CountOptions::builder().limit(1).build();
        let count = self
            .categories()
            .await?
            .count_documents(doc! { "value": value }, options)
            .await?;
        Ok(count > 0)
    }

    async fn last_order(&self) -> Result<Option<i32>> {
        let options = FindOneOptions::builder().sort(doc! { "order": -1 }).build();
        let last = self.categories().await?.find_one(doc! {}, options).await?;
        Ok(last.map(|c| c.order))
    }

    async fn insert(&self, category: &Category) -> Result<()> {
        self.categories().await?.insert_one(category, None).await?;
        Ok(())
    }

    async fn set_order(&self, id: &ObjectId, order: i32, updated_at: DateTime<Utc>) -> Result<bool> {
        let result = self
            .categories()
            .await?
            .update_one(
                doc! { "_id": id },
                doc! { "$set": {
                    "order": order,
                    "updatedAt": mongodb::bson::DateTime::from_chrono(updated_at),
                } },
                None,
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn delete(&self, id: &ObjectId) -> Result<bool> {
        let result = self
            .categories()
            .await?
            .delete_one(doc! { "_id": id }, None)
            .await?;
        Ok(result.deleted_count > 0)
    }
}
