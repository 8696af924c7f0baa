use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Balance edit; omitted fields keep their stored value
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBalanceDto {
    /// Credits as typed by the admin; thousands separators and spaces are ignored
    #[schema(example = "1,000,000")]
    pub token_credits: Option<String>,
    pub auto_refill_enabled: Option<bool>,
    #[validate(range(min = 0, message = "Refill amount must not be negative"))]
    pub refill_amount: Option<i64>,
    #[validate(range(min = 0, message = "Refill interval must not be negative"))]
    pub refill_interval_value: Option<i64>,
    /// One of `seconds, minutes, hours, days, weeks, months`
    pub refill_interval_unit: Option<String>,
}

/// Balance row with the owner's email and name
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BalanceRowDto {
    pub id: String,
    pub user_id: Option<String>,
    /// `-` when the user is unknown
    pub email: String,
    /// `-` when the user is unknown
    pub name: String,
    pub token_credits: f64,
    pub auto_refill_enabled: bool,
    pub refill_amount: i64,
    pub refill_interval_value: i64,
    pub refill_interval_unit: String,
    /// `YYYY-MM-DD` or `-`
    pub last_refill: String,
}
