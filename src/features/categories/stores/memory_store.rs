use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;

use super::CategoryStore;
use crate::core::error::Result;
use crate::features::categories::models::Category;

/// Vector-backed store with the same ordering semantics as the collection
#[derive(Default)]
pub struct InMemoryCategoryStore {
    categories: Mutex<Vec<Category>>,
    writes: Mutex<usize>,
}

impl InMemoryCategoryStore {
    pub fn with_categories(categories: Vec<Category>) -> Self {
        Self {
            categories: Mutex::new(categories),
            writes: Mutex::new(0),
        }
    }

    pub fn snapshot(&self) -> Vec<Category> {
        let mut categories = self.categories.lock().unwrap().clone();
        categories.sort_by_key(|c| c.order);
        categories
    }

    /// Number of insert/update/delete calls that touched a document
    pub fn write_count(&self) -> usize {
        *self.writes.lock().unwrap()
    }

    fn record_write(&self) {
        *self.writes.lock().unwrap() += 1;
    }
}

#[async_trait]
impl CategoryStore for InMemoryCategoryStore {
    async fn list_by_order(&self) -> Result<Vec<Category>> {
        Ok(self.snapshot())
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Category>> {
        Ok(self
            .categories
            .lock()
            .unwrap()
            .iter()
            .find(|c| &c.id == id)
            .cloned())
    }

    async fn value_exists(&self, value: &str) -> Result<bool> {
        Ok(self
            .categories
            .lock()
            .unwrap()
            .iter()
            .any(|c| c.value == value))
    }

    async fn last_order(&self) -> Result<Option<i32>> {
        Ok(self.categories.lock().unwrap().iter().map(|c| c.order).max())
    }

    async fn insert(&self, category: &Category) -> Result<()> {
        self.categories.lock().unwrap().push(category.clone());
        self.record_write();
        Ok(())
    }

    async fn set_order(&self, id: &ObjectId, order: i32, updated_at: DateTime<Utc>) -> Result<bool> {
        let mut categories = self.categories.lock().unwrap();
        let Some(category) = categories.iter_mut().find(|c| &c.id == id) else {
            return Ok(false);
        };
        category.order = order;
        category.updated_at = Some(updated_at);
        drop(categories);
        self.record_write();
        Ok(true)
    }

    async fn delete(&self, id: &ObjectId) -> Result<bool> {
        let mut categories = self.categories.lock().unwrap();
        let before = categories.len();
        categories.retain(|c| &c.id != id);
        let removed = categories.len() < before;
        drop(categories);
        if removed {
            self.record_write();
        }
        Ok(removed)
    }
}
