use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, Document};
use mongodb::options::FindOptions;
use mongodb::Collection;

use crate::core::database::MongoHandle;
use crate::core::error::{AppError, Result};
use crate::features::users::dtos::{ListUsersQuery, UpdateRoleDto, UserResponseDto};
use crate::features::users::models::User;

/// Reads and updates LibreChat user documents
pub struct UserService {
    db: Arc<MongoHandle>,
    collection: String,
}

impl UserService {
    pub fn new(db: Arc<MongoHandle>, collection: impl Into<String>) -> Self {
        Self {
            db,
            collection: collection.into(),
        }
    }

    async fn users(&self) -> Result<Collection<User>> {
        self.db.collection::<User>(&self.collection).await
    }

    /// Search, sort and paginate users. Returns the page and the total match count.
    pub async fn list(&self, query: &ListUsersQuery) -> Result<(Vec<UserResponseDto>, i64)> {
        let filter = search_filter(query.search());
        let users = self.users().await?;

        let total = users.count_documents(filter.clone(), None).await?;

        let mut sort = Document::new();
        sort.insert(query.sort_field().as_str(), query.direction().as_mongo());
        let options = FindOptions::builder()
            .sort(sort)
            .skip(query.offset() as u64)
            .limit(query.limit())
            .build();
        let page: Vec<User> = users.find(filter, options).await?.try_collect().await?;

        Ok((page.into_iter().map(Into::into).collect(), total as i64))
    }

    pub async fn update_role(&self, id: &str, dto: UpdateRoleDto) -> Result<UserResponseDto> {
        let id = ObjectId::parse_str(id)
            .map_err(|_| AppError::BadRequest(format!("Invalid user id '{}'", id)))?;
        let role = dto.role.trim();
        if role.is_empty() {
            return Err(AppError::Validation("Role is required".to_string()));
        }

        let users = self.users().await?;
        let result = users
            .update_one(
                doc! { "_id": id },
                doc! { "$set": {
                    "role": role,
                    "updatedAt": mongodb::bson::DateTime::from_chrono(Utc::now()),
                } },
                None,
            )
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!("User {} not found", id)));
        }
        tracing::info!("Changed role of user {} to '{}'", id, role);

        users
            .find_one(doc! { "_id": id }, None)
            .await?
            .map(Into::into)
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))
    }

    /// Batch lookup used by the reports to label rows with user names and emails
    pub async fn find_by_ids(&self, ids: &[ObjectId]) -> Result<HashMap<ObjectId, User>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let cursor = self
            .users()
            .await?
            .find(doc! { "_id": { "$in": ids.to_vec() } }, None)
            .await?;
        let users: Vec<User> = cursor.try_collect().await?;

        Ok(users.into_iter().map(|u| (u.id, u)).collect())
    }
}

/// Case-insensitive email substring match; the term is matched literally
fn search_filter(search: Option<&str>) -> Document {
    match search {
        Some(q) => doc! { "email": { "$regex": regex::escape(q), "$options": "i" } },
        None => doc! {},
    }
}
