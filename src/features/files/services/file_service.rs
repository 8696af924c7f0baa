use std::collections::HashMap;
use std::sync::Arc;

use futures::TryStreamExt;
use mongodb::bson::{self, oid::ObjectId, Bson, Document};
use mongodb::options::FindOptions;
use mongodb::Collection;

use crate::core::database::MongoHandle;
use crate::core::error::Result;
use crate::features::files::dtos::{FileRowDto, FileSortKey, FileUserOptionDto, ListFilesQuery};
use crate::features::files::models::FileRecord;
use crate::features::users::models::User;
use crate::features::users::UserService;
use crate::shared::constants::FILES_COLLECTION;
use crate::shared::format::{end_of_day, human_bytes, start_of_day};
use crate::shared::spreadsheet::{CellValue, Sheet};
use crate::shared::types::SortDirection;

const EXPORT_HEADERS: [&str; 7] = [
    "createdAt",
    "filename",
    "type",
    "size(bytes)",
    "user",
    "_id",
    "file_id",
];

pub struct FileService {
    db: Arc<MongoHandle>,
    users: Arc<UserService>,
}

impl FileService {
    pub fn new(db: Arc<MongoHandle>, users: Arc<UserService>) -> Self {
        Self { db, users }
    }

    async fn files(&self) -> Result<Collection<FileRecord>> {
        self.db.collection::<FileRecord>(FILES_COLLECTION).await
    }

    /// One page of files plus the total number matching the filters
    pub async fn list(&self, query: &ListFilesQuery) -> Result<(Vec<FileRowDto>, i64)> {
        let filter = build_filter(query);
        let files = self.files().await?;
        let total = files.count_documents(filter.clone(), None).await? as i64;

        let rows = match query.sort_key().mongo_field() {
            Some(field) => {
                let options = FindOptions::builder()
                    .sort(sort_spec(field, query.direction()))
                    .skip(query.offset() as u64)
                    .limit(query.per_page())
                    .build();
                let records: Vec<FileRecord> = files.find(filter, options).await?.try_collect().await?;
                self.to_rows(records).await?
            }
            None => {
                // Names only exist after the join, so sort the whole set first
                let records: Vec<FileRecord> = files.find(filter, None).await?.try_collect().await?;
                let mut rows = self.to_rows(records).await?;
                sort_by_user(&mut rows, query.direction());
                rows.into_iter()
                    .skip(query.offset() as usize)
                    .take(query.per_page() as usize)
                    .collect()
            }
        };

        Ok((rows, total))
    }

    /// Distinct uploaders, labelled with their names and sorted by name
    pub async fn uploaders(&self) -> Result<Vec<FileUserOptionDto>> {
        let distinct = self.files().await?.distinct("user", None, None).await?;
        let ids: Vec<ObjectId> = distinct
            .into_iter()
            .filter_map(|value| match value {
                Bson::ObjectId(id) => Some(id),
                _ => None,
            })
            .collect();

        let users = self.users.find_by_ids(&ids).await?;
        let mut options: Vec<FileUserOptionDto> = ids
            .into_iter()
            .map(|id| FileUserOptionDto {
                id: id.to_hex(),
                name: users
                    .get(&id)
                    .map(User::display_name)
                    .unwrap_or_else(|| id.to_hex()),
            })
            .collect();
        options.sort_by_key(|o| o.name.to_lowercase());

        Ok(options)
    }

    /// Every file matching the filters, in the requested order, as a workbook
    pub async fn export(&self, query: &ListFilesQuery) -> Result<Vec<u8>> {
        let filter = build_filter(query);
        let options = query
            .sort_key()
            .mongo_field()
            .map(|field| FindOptions::builder().sort(sort_spec(field, query.direction())).build());

        let records: Vec<FileRecord> = self
            .files()
            .await?
            .find(filter, options)
            .await?
            .try_collect()
            .await?;
        let mut rows = self.to_rows(records).await?;
        if query.sort_key() == FileSortKey::User {
            sort_by_user(&mut rows, query.direction());
        }

        tracing::info!("Exporting {} file rows", rows.len());
        Ok(export_sheet(&rows).to_xlsx()?)
    }

    async fn to_rows(&self, records: Vec<FileRecord>) -> Result<Vec<FileRowDto>> {
        let mut ids: Vec<ObjectId> = records.iter().filter_map(|r| r.user).collect();
        ids.sort();
        ids.dedup();
        let users = self.users.find_by_ids(&ids).await?;

        Ok(records.into_iter().map(|r| to_row(r, &users)).collect())
    }
}

/// Mongo filter for the date range and uploader
fn build_filter(query: &ListFilesQuery) -> Document {
    let mut filter = Document::new();

    let mut created_at = Document::new();
    if let Some(start) = query.start_date() {
        created_at.insert("$gte", bson::DateTime::from_chrono(start_of_day(start)));
    }
    if let Some(end) = query.end_date() {
        created_at.insert("$lte", bson::DateTime::from_chrono(end_of_day(end)));
    }
    if !created_at.is_empty() {
        filter.insert("createdAt", created_at);
    }

    if let Some(user) = query.user_id() {
        filter.insert("user", user);
    }

    filter
}

fn sort_spec(field: &str, direction: SortDirection) -> Document {
    let mut sort = Document::new();
    sort.insert(field, direction.as_mongo());
    sort
}

fn to_row(record: FileRecord, users: &HashMap<ObjectId, User>) -> FileRowDto {
    let user = record.user.map(|id| {
        users
            .get(&id)
            .and_then(|u| u.name.clone())
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| id.to_hex())
    });

    FileRowDto {
        id: record.id.to_hex(),
        file_id: record.file_id,
        filename: record.filename,
        mime_type: record.mime_type,
        size: human_bytes(record.bytes),
        bytes: record.bytes,
        user,
        user_id: record.user.map(|id| id.to_hex()),
        created_at: record.created_at,
    }
}

/// Case-insensitive sort on the joined user name; rows without a user sort as empty
fn sort_by_user(rows: &mut [FileRowDto], direction: SortDirection) {
    rows.sort_by_key(|r| r.user.as_deref().unwrap_or_default().to_lowercase());
    if direction == SortDirection::Desc {
        rows.reverse();
    }
}

fn export_sheet(rows: &[FileRowDto]) -> Sheet {
    let mut sheet = Sheet::new("files", EXPORT_HEADERS.to_vec());
    for row in rows {
        sheet.push_row(vec![
            row.created_at.map(|d| d.to_rfc3339()).unwrap_or_default().into(),
            row.filename.clone().unwrap_or_default().into(),
            row.mime_type.clone().unwrap_or_default().into(),
            row.bytes.unwrap_or(0).into(),
            row.user.clone().unwrap_or_default().into(),
            row.id.as_str().into(),
            CellValue::from(row.file_id.clone().unwrap_or_default()),
        ]);
    }
    sheet
}
