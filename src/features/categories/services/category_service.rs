use std::sync::Arc;

use chrono::Utc;
use mongodb::bson::oid::ObjectId;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::categories::dtos::{CategoryResponseDto, CreateCategoryDto};
use crate::features::categories::models::{Category, MoveDirection};
use crate::features::categories::stores::CategoryStore;
use crate::shared::validation::{slugify, SLUG_REGEX};

const MAX_NAME_CHARS: usize = 100;

/// Maintains the ordered category list.
///
/// Writes are single-document and not wrapped in a transaction. A crash
/// between the two halves of a swap, or a concurrent request, can leave a gap
/// or duplicate in `order`; the renumbering pass that follows every move and
/// delete repairs it.
pub struct CategoryService {
    store: Arc<dyn CategoryStore>,
}

impl CategoryService {
    pub fn new(store: Arc<dyn CategoryStore>) -> Self {
        Self { store }
    }

    /// All categories sorted by `order`
    pub async fn list(&self) -> Result<Vec<CategoryResponseDto>> {
        let categories = self.store.list_by_order().await?;
        Ok(categories.into_iter().map(Into::into).collect())
    }

    /// Create a category from a display name, appended after the current last one
    pub async fn create(&self, dto: CreateCategoryDto) -> Result<CategoryResponseDto> {
        let name = dto.name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Category name is required".to_string()));
        }
        if name.chars().count() > MAX_NAME_CHARS {
            return Err(AppError::Validation(format!(
                "Category name must be at most {} characters",
                MAX_NAME_CHARS
            )));
        }

        let slug = slugify(name);
        if slug.is_empty() {
            return Err(AppError::Validation(
                "Category name must contain at least one letter or digit".to_string(),
            ));
        }
        debug_assert!(SLUG_REGEX.is_match(&slug), "{slug}");

        let value = self.unique_value(&slug).await?;
        let order = self.store.last_order().await?.map_or(1, |last| last + 1);
        let now = Utc::now();

        let category = Category {
            id: ObjectId::new(),
            guid: Uuid::new_v4().simple().to_string(),
            name: name.to_string(),
            slug,
            label: value.clone(),
            description: format!("com_agents_category_{}_description", value),
            value,
            order,
            is_active: true,
            custom: true,
            created_at: Some(now),
            updated_at: Some(now),
            version: 0,
        };

        self.store.insert(&category).await?;
        tracing::info!(
            "Created category '{}' (value: {}, order: {})",
            category.name,
            category.value,
            category.order
        );

        Ok(category.into())
    }

    /// Swap a category with its neighbour, then renumber. Returns the new list.
    pub async fn move_category(
        &self,
        id: &str,
        direction: MoveDirection,
    ) -> Result<Vec<CategoryResponseDto>> {
        let id = parse_object_id(id)?;
        let categories = self.store.list_by_order().await?;

        let index = categories
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Category {} not found", id)))?;

        let neighbour = match direction {
            MoveDirection::Up if index > 0 => index - 1,
            MoveDirection::Down if index + 1 < categories.len() => index + 1,
            MoveDirection::Up => {
                return Err(AppError::Validation(
                    "Category is already first".to_string(),
                ))
            }
            MoveDirection::Down => {
                return Err(AppError::Validation("Category is already last".to_string()))
            }
        };

        let current = &categories[index];
        let other = &categories[neighbour];
        let now = Utc::now();

        self.store.set_order(&current.id, other.order, now).await?;
        self.store.set_order(&other.id, current.order, now).await?;
        tracing::info!(
            "Moved category '{}' {} (order {} -> {})",
            current.value,
            direction,
            current.order,
            other.order
        );

        let renumbered = self.renumber().await?;
        Ok(renumbered.into_iter().map(Into::into).collect())
    }

    /// Delete a custom category and close the gap it leaves
    pub async fn delete(&self, id: &str) -> Result<()> {
        let id = parse_object_id(id)?;

        let category = self
            .store
            .find_by_id(&id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Category {} not found", id)))?;

        if !category.custom {
            return Err(AppError::Forbidden(format!(
                "Category '{}' is built in and cannot be deleted",
                category.value
            )));
        }

        if !self.store.delete(&id).await? {
            return Err(AppError::NotFound(format!("Category {} not found", id)));
        }
        tracing::info!("Deleted category '{}'", category.value);

        self.renumber().await?;
        Ok(())
    }

    /// Rewrite `order` so the list occupies exactly `1..=N`.
    ///
    /// Only records whose position changed are written.
    async fn renumber(&self) -> Result<Vec<Category>> {
        let mut categories = self.store.list_by_order().await?;
        let now = Utc::now();
        let mut changed = 0;

        for (position, category) in categories.iter_mut().enumerate() {
            let expected = position as i32 + 1;
            if category.order != expected {
                self.store.set_order(&category.id, expected, now).await?;
                category.order = expected;
                category.updated_at = Some(now);
                changed += 1;
            }
        }

        if changed > 0 {
            tracing::debug!("Renumbered {} categories", changed);
        }
        Ok(categories)
    }

    /// First free value among `slug`, `slug-1`, `slug-2`, ...
    async fn unique_value(&self, slug: &str) -> Result<String> {
        if !self.store.value_exists(slug).await? {
            return Ok(slug.to_string());
        }

        let mut suffix = 1u32;
        loop {
            let candidate = format!("{}-{}", slug, suffix);
            if !self.store.value_exists(&candidate).await? {
                return Ok(candidate);
            }
            suffix += 1;
        }
    }
}

fn parse_object_id(id: &str) -> Result<ObjectId> {
    ObjectId::parse_str(id).map_err(|_| AppError::BadRequest(format!("Invalid category id '{}'", id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::categories::stores::InMemoryCategoryStore;
    use fake::faker::lorem::en::Word;
    use fake::Fake;
    use std::collections::HashSet;

    fn category(value: &str, order: i32, custom: bool) -> Category {
        Category {
            id: ObjectId::new(),
            guid: Uuid::new_v4().simple().to_string(),
            name: value.to_string(),
            slug: value.to_string(),
            value: value.to_string(),
            label: value.to_string(),
            description: format!("com_agents_category_{}_description", value),
            order,
            is_active: true,
            custom,
            created_at: None,
            updated_at: None,
            version: 0,
        }
    }

    fn service_with(categories: Vec<Category>) -> (CategoryService, Arc<InMemoryCategoryStore>) {
        let store = Arc::new(InMemoryCategoryStore::with_categories(categories));
        (CategoryService::new(store.clone()), store)
    }

    fn create_dto(name: &str) -> CreateCategoryDto {
        CreateCategoryDto {
            name: name.to_string(),
        }
    }

    fn orders(store: &InMemoryCategoryStore) -> Vec<i32> {
        store.snapshot().iter().map(|c| c.order).collect()
    }

    fn values(store: &InMemoryCategoryStore) -> Vec<String> {
        store.snapshot().into_iter().map(|c| c.value).collect()
    }

    fn assert_contiguous(store: &InMemoryCategoryStore) {
        let expected: Vec<i32> = (1..=store.snapshot().len() as i32).collect();
        assert_eq!(orders(store), expected);
    }

    #[tokio::test]
    async fn test_create_first_category_gets_order_one() {
        let (service, store) = service_with(vec![]);

        let created = service.create(create_dto("  Test Category!! ")).await.unwrap();

        assert_eq!(created.name, "Test Category!!");
        assert_eq!(created.slug, "test-category");
        assert_eq!(created.value, "test-category");
        assert_eq!(created.label, "test-category");
        assert_eq!(
            created.description,
            "com_agents_category_test-category_description"
        );
        assert_eq!(created.order, 1);
        assert!(created.is_active);
        assert!(created.custom);

        let stored = store.snapshot();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].guid.len(), 32);
        assert_eq!(stored[0].version, 0);
    }

    #[tokio::test]
    async fn test_create_disambiguates_existing_value() {
        let (service, store) = service_with(vec![
            category("test-category", 1, true),
            category("test-category-1", 2, true),
        ]);

        let created = service.create(create_dto("Test Category!!")).await.unwrap();

        assert_eq!(created.slug, "test-category");
        assert_eq!(created.value, "test-category-2");
        assert_eq!(created.label, "test-category-2");
        assert_eq!(created.order, 3);
        assert_eq!(store.snapshot().len(), 3);
    }

    #[tokio::test]
    async fn test_create_appends_after_highest_order() {
        let (service, store) = service_with(vec![category("a", 1, true), category("b", 7, true)]);

        let created = service.create(create_dto("C")).await.unwrap();

        assert_eq!(created.order, 8);
        // Only the new record is written
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn test_create_rejects_blank_name() {
        let (service, store) = service_with(vec![]);

        let result = service.create(create_dto("   ")).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(store.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_create_measures_name_length_after_trimming() {
        let (service, store) = service_with(vec![]);
        let name = "a".repeat(MAX_NAME_CHARS);

        let created = service
            .create(create_dto(&format!("  {name}  ")))
            .await
            .unwrap();

        assert_eq!(created.name, name);
        assert_eq!(store.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn test_create_rejects_name_over_limit() {
        let (service, store) = service_with(vec![]);

        let result = service.create(create_dto(&"a".repeat(MAX_NAME_CHARS + 1))).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_create_rejects_name_without_slug_characters() {
        let (service, store) = service_with(vec![]);

        let result = service.create(create_dto("!!!")).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_values_stay_unique_across_repeated_creates() {
        let (service, store) = service_with(vec![]);

        for _ in 0..5 {
            service.create(create_dto("Research")).await.unwrap();
        }

        assert_eq!(
            values(&store),
            vec!["research", "research-1", "research-2", "research-3", "research-4"]
        );
        assert_contiguous(&store);
    }

    #[tokio::test]
    async fn test_move_up_swaps_with_predecessor_only() {
        let a = category("a", 1, true);
        let b = category("b", 2, true);
        let c = category("c", 3, true);
        let b_id = b.id.to_hex();
        let (service, store) = service_with(vec![a, b, c]);

        let list = service.move_category(&b_id, MoveDirection::Up).await.unwrap();

        assert_eq!(values(&store), vec!["b", "a", "c"]);
        assert_eq!(orders(&store), vec![1, 2, 3]);
        let returned: Vec<_> = list.iter().map(|c| c.value.as_str()).collect();
        assert_eq!(returned, vec!["b", "a", "c"]);
        let c = store.snapshot().into_iter().find(|x| x.value == "c").unwrap();
        assert!(c.updated_at.is_none());
    }

    #[tokio::test]
    async fn test_move_down_swaps_with_successor() {
        let a = category("a", 1, true);
        let a_id = a.id.to_hex();
        let (service, store) =
            service_with(vec![a, category("b", 2, true), category("c", 3, true)]);

        service.move_category(&a_id, MoveDirection::Down).await.unwrap();

        assert_eq!(values(&store), vec!["b", "a", "c"]);
        assert_contiguous(&store);
    }

    #[tokio::test]
    async fn test_move_first_up_is_rejected_without_writes() {
        let a = category("a", 1, true);
        let a_id = a.id.to_hex();
        let (service, store) = service_with(vec![a, category("b", 2, true)]);

        let result = service.move_category(&a_id, MoveDirection::Up).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(store.write_count(), 0);
        assert_eq!(values(&store), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_move_last_down_is_rejected_without_writes() {
        let b = category("b", 2, true);
        let b_id = b.id.to_hex();
        let (service, store) = service_with(vec![category("a", 1, true), b]);

        let result = service.move_category(&b_id, MoveDirection::Down).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_move_unknown_id_is_not_found() {
        let (service, store) = service_with(vec![category("a", 1, true)]);

        let result = service
            .move_category(&ObjectId::new().to_hex(), MoveDirection::Up)
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_move_with_malformed_id_is_bad_request() {
        let (service, _store) = service_with(vec![category("a", 1, true)]);

        let result = service.move_category("not-an-id", MoveDirection::Down).await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_move_heals_gaps_in_existing_orders() {
        let b = category("b", 5, true);
        let b_id = b.id.to_hex();
        let (service, store) =
            service_with(vec![category("a", 2, true), b, category("c", 9, true)]);

        service.move_category(&b_id, MoveDirection::Up).await.unwrap();

        assert_eq!(values(&store), vec!["b", "a", "c"]);
        assert_contiguous(&store);
    }

    #[tokio::test]
    async fn test_delete_middle_keeps_relative_order() {
        let b = category("b", 2, true);
        let b_id = b.id.to_hex();
        let (service, store) =
            service_with(vec![category("a", 1, true), b, category("c", 3, true)]);

        service.delete(&b_id).await.unwrap();

        assert_eq!(values(&store), vec!["a", "c"]);
        assert_eq!(orders(&store), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_delete_last_writes_nothing_else() {
        let c = category("c", 3, true);
        let c_id = c.id.to_hex();
        let (service, store) =
            service_with(vec![category("a", 1, true), category("b", 2, true), c]);

        service.delete(&c_id).await.unwrap();

        assert_eq!(orders(&store), vec![1, 2]);
        // The delete itself, no renumbering writes
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn test_delete_unknown_id_is_not_found() {
        let (service, store) = service_with(vec![category("a", 1, true)]);

        let result = service.delete(&ObjectId::new().to_hex()).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert_eq!(store.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_refuses_built_in_category() {
        let general = category("general", 1, false);
        let id = general.id.to_hex();
        let (service, store) = service_with(vec![general, category("x", 2, true)]);

        let result = service.delete(&id).await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
        assert_eq!(store.write_count(), 0);
        assert_eq!(store.snapshot().len(), 2);
    }

    #[tokio::test]
    async fn test_list_is_sorted_by_order() {
        let (service, _store) = service_with(vec![
            category("c", 3, true),
            category("a", 1, true),
            category("b", 2, true),
        ]);

        let list = service.list().await.unwrap();

        let values: Vec<_> = list.iter().map(|c| c.value.as_str()).collect();
        assert_eq!(values, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_renumber_is_idempotent() {
        let (service, store) = service_with(vec![category("a", 4, true), category("b", 10, true)]);

        service.renumber().await.unwrap();
        let writes = store.write_count();
        service.renumber().await.unwrap();

        assert_contiguous(&store);
        assert_eq!(store.write_count(), writes);
    }

    #[tokio::test]
    async fn test_orders_stay_contiguous_through_mixed_operations() {
        let (service, store) = service_with(vec![]);

        for step in 0..40usize {
            let snapshot = store.snapshot();
            match step % 4 {
                0 | 1 => {
                    let name: String = Word().fake();
                    service.create(create_dto(&name)).await.unwrap();
                }
                2 if !snapshot.is_empty() => {
                    let target = &snapshot[(step * 7) % snapshot.len()];
                    let direction = if step % 8 == 2 {
                        MoveDirection::Up
                    } else {
                        MoveDirection::Down
                    };
                    // Boundary moves fail; the list must be intact either way
                    let _ = service.move_category(&target.id.to_hex(), direction).await;
                }
                3 if snapshot.len() > 1 => {
                    let target = &snapshot[(step * 3) % snapshot.len()];
                    service.delete(&target.id.to_hex()).await.unwrap();
                }
                _ => {}
            }

            assert_contiguous(&store);
            let values = values(&store);
            let unique: HashSet<_> = values.iter().collect();
            assert_eq!(unique.len(), values.len());
        }
    }
}
