use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::bson::{self, doc, oid::ObjectId, Bson, Document};
use mongodb::options::FindOptions;
use mongodb::Collection;

use crate::core::database::MongoHandle;
use crate::core::error::Result;
use crate::features::tokens::dtos::{AgentOptionDto, TokenUsageQuery, TokenUsageRowDto};
use crate::features::tokens::models::{conversation_started, AssistantMessage, ParentMessage};
use crate::features::users::UserService;
use crate::shared::constants::{AGENTS_COLLECTION, CONVERSATIONS_COLLECTION, MESSAGES_COLLECTION};
use crate::shared::format::start_of_day;
use crate::shared::spreadsheet::Sheet;

const UNKNOWN_MODEL: &str = "Unknown Model";

const EXPORT_HEADERS: [&str; 7] = [
    "date",
    "email",
    "model",
    "total_tokens",
    "input_tokens",
    "output_tokens",
    "total_messages",
];

/// Everything the aggregation needs besides the assistant messages
#[derive(Debug, Default)]
struct UsageLookups {
    /// agent id -> model
    agent_models: HashMap<String, String>,
    /// user id -> email
    emails: HashMap<String, String>,
    /// conversationId -> createdAt
    conversations: HashMap<String, DateTime<Utc>>,
    /// messageId -> parent
    parents: HashMap<String, ParentMessage>,
}

pub struct TokenService {
    db: Arc<MongoHandle>,
    users: Arc<UserService>,
}

impl TokenService {
    pub fn new(db: Arc<MongoHandle>, users: Arc<UserService>) -> Self {
        Self { db, users }
    }

    async fn collection(&self, name: &str) -> Result<Collection<Document>> {
        self.db.collection::<Document>(name).await
    }

    /// Full usage report for the filters, newest day first
    pub async fn usage(&self, query: &TokenUsageQuery) -> Result<Vec<TokenUsageRowDto>> {
        let messages = self.collection(MESSAGES_COLLECTION).await?;

        let projection = doc! {
            "user": 1, "model": 1, "createdAt": 1, "conversationId": 1,
            "tokenCount": 1, "parentMessageId": 1,
        };
        let options = FindOptions::builder().projection(projection).build();
        let docs: Vec<Document> = messages
            .find(assistant_filter(query), options)
            .await?
            .try_collect()
            .await?;
        let assistants: Vec<AssistantMessage> =
            docs.iter().map(AssistantMessage::from_document).collect();

        let lookups = UsageLookups {
            agent_models: self.agent_models().await?,
            emails: self.emails(&assistants).await?,
            conversations: self.conversation_starts(&assistants).await?,
            parents: self.parents(&messages, &assistants).await?,
        };

        let rows = aggregate_usage(&assistants, &lookups);
        tracing::debug!(
            "Aggregated {} assistant messages into {} usage rows",
            assistants.len(),
            rows.len()
        );
        Ok(rows)
    }

    /// One page of the report plus the total row count
    pub async fn usage_page(&self, query: &TokenUsageQuery) -> Result<(Vec<TokenUsageRowDto>, i64)> {
        let rows = self.usage(query).await?;
        let total = rows.len() as i64;
        let page = rows
            .into_iter()
            .skip(usize::try_from(query.offset()).unwrap_or(usize::MAX))
            .take(query.per_page() as usize)
            .collect();
        Ok((page, total))
    }

    pub async fn export(&self, query: &TokenUsageQuery) -> Result<Vec<u8>> {
        let rows = self.usage(query).await?;
        Ok(export_sheet(&rows).to_xlsx()?)
    }

    /// Agents for the filter dropdown, sorted by name
    pub async fn agents(&self) -> Result<Vec<AgentOptionDto>> {
        let options = FindOptions::builder()
            .projection(doc! { "id": 1, "name": 1 })
            .sort(doc! { "name": 1 })
            .build();
        let docs: Vec<Document> = self
            .collection(AGENTS_COLLECTION)
            .await?
            .find(doc! {}, options)
            .await?
            .try_collect()
            .await?;

        Ok(docs
            .iter()
            .filter_map(|d| {
                let id = d.get_str("id").ok()?.to_string();
                let name = d.get_str("name").map(str::to_string).unwrap_or_else(|_| id.clone());
                Some(AgentOptionDto { id, name })
            })
            .collect())
    }

    async fn agent_models(&self) -> Result<HashMap<String, String>> {
        let options = FindOptions::builder()
            .projection(doc! { "id": 1, "model": 1 })
            .build();
        let docs: Vec<Document> = self
            .collection(AGENTS_COLLECTION)
            .await?
            .find(doc! {}, options)
            .await?
            .try_collect()
            .await?;

        Ok(docs
            .iter()
            .filter_map(|d| Some((d.get_str("id").ok()?.to_string(), d.get_str("model").ok()?.to_string())))
            .collect())
    }

    async fn emails(&self, assistants: &[AssistantMessage]) -> Result<HashMap<String, String>> {
        let ids: Vec<ObjectId> = assistants
            .iter()
            .filter_map(|m| m.user.as_deref())
            .collect::<HashSet<_>>()
            .into_iter()
            .filter_map(|id| ObjectId::parse_str(id).ok())
            .collect();

        let users = self.users.find_by_ids(&ids).await?;
        Ok(users
            .into_iter()
            .filter_map(|(id, user)| Some((id.to_hex(), user.email?)))
            .collect())
    }

    async fn conversation_starts(
        &self,
        assistants: &[AssistantMessage],
    ) -> Result<HashMap<String, DateTime<Utc>>> {
        // Only needed for messages without their own timestamp
        let ids: Vec<String> = assistants
            .iter()
            .filter(|m| m.created_at.is_none())
            .filter_map(|m| m.conversation_id.clone())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let options = FindOptions::builder()
            .projection(doc! { "conversationId": 1, "createdAt": 1 })
            .build();
        let docs: Vec<Document> = self
            .collection(CONVERSATIONS_COLLECTION)
            .await?
            .find(doc! { "conversationId": { "$in": ids } }, options)
            .await?
            .try_collect()
            .await?;

        Ok(docs.iter().filter_map(conversation_started).collect())
    }

    async fn parents(
        &self,
        messages: &Collection<Document>,
        assistants: &[AssistantMessage],
    ) -> Result<HashMap<String, ParentMessage>> {
        let ids: Vec<String> = assistants
            .iter()
            .filter_map(|m| m.parent_message_id.clone())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let options = FindOptions::builder()
            .projection(doc! { "messageId": 1, "isCreatedByUser": 1, "tokenCount": 1 })
            .build();
        let docs: Vec<Document> = messages
            .find(doc! { "messageId": { "$in": ids } }, options)
            .await?
            .try_collect()
            .await?;

        Ok(docs
            .iter()
            .filter_map(ParentMessage::from_document)
            .map(|p| (p.message_id.clone(), p))
            .collect())
    }
}

/// Assistant replies, optionally narrowed to one model and a date range
fn assistant_filter(query: &TokenUsageQuery) -> Document {
    let not_user: Vec<Bson> = vec![
        Bson::Boolean(false),
        Bson::String("false".to_string()),
        Bson::String("False".to_string()),
        Bson::Int32(0),
    ];
    let mut filter = doc! { "isCreatedByUser": { "$in": not_user } };

    if let Some(model) = query.model_filter() {
        filter.insert("model", model);
    }

    let mut created_at = Document::new();
    if let Some(from) = query.from_date() {
        created_at.insert("$gte", bson::DateTime::from_chrono(start_of_day(from)));
    }
    if let Some(to) = query.to_date().and_then(|d| d.succ_opt()) {
        created_at.insert("$lt", bson::DateTime::from_chrono(start_of_day(to)));
    }
    if !created_at.is_empty() {
        filter.insert("createdAt", created_at);
    }

    filter
}

/// Turn assistant replies into rows summed per `(date, email, model)`,
/// ordered by that key descending
fn aggregate_usage(assistants: &[AssistantMessage], lookups: &UsageLookups) -> Vec<TokenUsageRowDto> {
    let mut groups: BTreeMap<(String, String, String), TokenUsageRowDto> = BTreeMap::new();

    for message in assistants {
        let Some(timestamp) = message.created_at.or_else(|| {
            message
                .conversation_id
                .as_ref()
                .and_then(|id| lookups.conversations.get(id).copied())
        }) else {
            continue;
        };

        let model = match message.model.as_deref() {
            Some(model) => lookups
                .agent_models
                .get(model)
                .cloned()
                .unwrap_or_else(|| model.to_string()),
            None => UNKNOWN_MODEL.to_string(),
        };
        let email = message
            .user
            .as_ref()
            .and_then(|id| lookups.emails.get(id).cloned());

        let parent = message
            .parent_message_id
            .as_ref()
            .and_then(|id| lookups.parents.get(id));
        let input_tokens = parent
            .filter(|p| p.is_created_by_user)
            .map_or(0, |p| p.token_count);
        let output_tokens = message.token_count;

        let date = timestamp.date_naive().format("%Y-%m-%d").to_string();
        let key = (date.clone(), email.clone().unwrap_or_default(), model.clone());
        let row = groups.entry(key).or_insert_with(|| TokenUsageRowDto {
            date,
            email,
            model,
            total_tokens: 0,
            input_tokens: 0,
            output_tokens: 0,
            total_messages: 0,
        });

        row.input_tokens += input_tokens;
        row.output_tokens += output_tokens;
        row.total_tokens += input_tokens + output_tokens;
        row.total_messages += if parent.is_some() { 2 } else { 1 };
    }

    groups.into_values().rev().collect()
}

fn export_sheet(rows: &[TokenUsageRowDto]) -> Sheet {
    let mut sheet = Sheet::new("Token Usage", EXPORT_HEADERS.to_vec());
    for row in rows {
        sheet.push_row(vec![
            row.date.as_str().into(),
            row.email.clone().unwrap_or_default().into(),
            row.model.as_str().into(),
            row.total_tokens.into(),
            row.input_tokens.into(),
            row.output_tokens.into(),
            row.total_messages.into(),
        ]);
    }
    sheet
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::spreadsheet::CellValue;
    use chrono::TimeZone;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, day, hour, 0, 0).unwrap()
    }

    fn reply(user: &str, model: &str, created_at: Option<DateTime<Utc>>, parent: Option<&str>, tokens: i64) -> AssistantMessage {
        AssistantMessage {
            user: Some(user.to_string()),
            model: Some(model.to_string()),
            created_at,
            conversation_id: Some("conv-1".to_string()),
            parent_message_id: parent.map(str::to_string),
            token_count: tokens,
        }
    }

    fn parent(id: &str, from_user: bool, tokens: i64) -> (String, ParentMessage) {
        (
            id.to_string(),
            ParentMessage {
                message_id: id.to_string(),
                is_created_by_user: from_user,
                token_count: tokens,
            },
        )
    }

    fn lookups() -> UsageLookups {
        UsageLookups {
            agent_models: HashMap::from([("agent_1".to_string(), "gpt-4o".to_string())]),
            emails: HashMap::from([
                ("u1".to_string(), "alice@example.com".to_string()),
                ("u2".to_string(), "bob@example.com".to_string()),
            ]),
            conversations: HashMap::from([("conv-1".to_string(), at(2, 8))]),
            parents: HashMap::from([
                parent("p1", true, 30),
                parent("p2", true, 5),
                parent("p3", false, 99),
            ]),
        }
    }

    #[test]
    fn test_turns_are_summed_per_day_user_and_model() {
        let messages = vec![
            reply("u1", "agent_1", Some(at(3, 9)), Some("p1"), 100),
            reply("u1", "agent_1", Some(at(3, 17)), Some("p2"), 10),
        ];

        let rows = aggregate_usage(&messages, &lookups());

        assert_eq!(
            rows,
            vec![TokenUsageRowDto {
                date: "2025-06-03".to_string(),
                email: Some("alice@example.com".to_string()),
                model: "gpt-4o".to_string(),
                total_tokens: 145,
                input_tokens: 35,
                output_tokens: 110,
                total_messages: 4,
            }]
        );
    }

    #[test]
    fn test_parent_from_assistant_adds_no_input_tokens() {
        let messages = vec![reply("u1", "gpt-4o-mini", Some(at(3, 9)), Some("p3"), 20)];

        let rows = aggregate_usage(&messages, &lookups());

        assert_eq!(rows[0].input_tokens, 0);
        assert_eq!(rows[0].total_tokens, 20);
        // The parent still counts as a message of the turn
        assert_eq!(rows[0].total_messages, 2);
        assert_eq!(rows[0].model, "gpt-4o-mini");
    }

    #[test]
    fn test_missing_parent_counts_one_message() {
        let messages = vec![reply("u1", "agent_1", Some(at(3, 9)), Some("gone"), 20)];

        let rows = aggregate_usage(&messages, &lookups());

        assert_eq!(rows[0].total_messages, 1);
        assert_eq!(rows[0].input_tokens, 0);
    }

    #[test]
    fn test_timestamp_falls_back_to_conversation() {
        let mut orphan = reply("u2", "agent_1", None, None, 1);
        orphan.conversation_id = Some("unknown".to_string());
        let messages = vec![reply("u2", "agent_1", None, None, 7), orphan];

        let rows = aggregate_usage(&messages, &lookups());

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].date, "2025-06-02");
        assert_eq!(rows[0].output_tokens, 7);
    }

    #[test]
    fn test_unknown_model_and_user() {
        let mut message = reply("nobody", "x", Some(at(1, 0)), None, 3);
        message.model = None;

        let rows = aggregate_usage(&[message], &lookups());

        assert_eq!(rows[0].model, UNKNOWN_MODEL);
        assert_eq!(rows[0].email, None);
    }

    #[test]
    fn test_rows_sorted_descending() {
        let messages = vec![
            reply("u1", "agent_1", Some(at(1, 9)), None, 1),
            reply("u2", "agent_1", Some(at(3, 9)), None, 1),
            reply("u1", "agent_1", Some(at(3, 9)), None, 1),
            reply("u1", "claude", Some(at(3, 9)), None, 1),
        ];

        let rows = aggregate_usage(&messages, &lookups());
        let keys: Vec<_> = rows
            .iter()
            .map(|r| (r.date.as_str(), r.email.as_deref().unwrap_or(""), r.model.as_str()))
            .collect();

        assert_eq!(
            keys,
            vec![
                ("2025-06-03", "bob@example.com", "gpt-4o"),
                ("2025-06-03", "alice@example.com", "gpt-4o"),
                ("2025-06-03", "alice@example.com", "claude"),
                ("2025-06-01", "alice@example.com", "gpt-4o"),
            ]
        );
    }

    #[test]
    fn test_filter_uses_exclusive_day_after_end() {
        let query = TokenUsageQuery {
            agent: Some("gpt-4o".to_string()),
            date_from: Some("2025-06-01".to_string()),
            date_to: Some("2025-06-30".to_string()),
            ..Default::default()
        };

        let filter = assistant_filter(&query);

        assert_eq!(filter.get_str("model").unwrap(), "gpt-4o");
        let created_at = filter.get_document("createdAt").unwrap();
        assert_eq!(
            created_at.get_datetime("$gte").unwrap().to_chrono(),
            Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(
            created_at.get_datetime("$lt").unwrap().to_chrono(),
            Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap()
        );
        let flags = filter
            .get_document("isCreatedByUser")
            .unwrap()
            .get_array("$in")
            .unwrap();
        assert_eq!(flags.len(), 4);
    }

    #[test]
    fn test_general_filter_has_no_model_or_range() {
        let filter = assistant_filter(&TokenUsageQuery::default());

        assert!(!filter.contains_key("model"));
        assert!(!filter.contains_key("createdAt"));
    }

    #[test]
    fn test_export_sheet() {
        let rows = aggregate_usage(
            &[reply("u1", "agent_1", Some(at(3, 9)), Some("p1"), 100)],
            &lookups(),
        );

        let sheet = export_sheet(&rows);

        assert_eq!(sheet.name, "Token Usage");
        assert_eq!(sheet.headers, EXPORT_HEADERS.to_vec());
        assert_eq!(sheet.rows[0][0], CellValue::Text("2025-06-03".to_string()));
        assert_eq!(sheet.rows[0][3], CellValue::Number(130.0));
    }
}
