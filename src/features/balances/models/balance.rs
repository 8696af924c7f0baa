use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Interval units LibreChat understands for auto-refill
pub const REFILL_UNITS: [&str; 6] = ["seconds", "minutes", "hours", "days", "weeks", "months"];

pub const DEFAULT_REFILL_UNIT: &str = "days";

/// LibreChat balance document. Numbers are read as `f64` since the
/// collection mixes int32, int64 and double values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Balance {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    #[serde(default)]
    pub user: Option<ObjectId>,
    #[serde(default)]
    pub token_credits: f64,
    #[serde(default)]
    pub auto_refill_enabled: bool,
    #[serde(default)]
    pub refill_amount: f64,
    #[serde(default)]
    pub refill_interval_value: f64,
    #[serde(default)]
    pub refill_interval_unit: Option<String>,
    #[serde(default, with = "crate::shared::bson_datetime::option")]
    pub last_refill: Option<DateTime<Utc>>,
}

/// Fields written by an edit
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceUpdate {
    pub token_credits: f64,
    pub auto_refill_enabled: bool,
    pub refill_amount: i64,
    pub refill_interval_value: i64,
    pub refill_interval_unit: String,
}
