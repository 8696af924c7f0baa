use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::shared::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::shared::format::parse_date;
use crate::shared::types::page_offset;

/// Agent filter value that disables model filtering
pub const ALL_AGENTS: &str = "general";

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct TokenUsageQuery {
    /// `general` (default) for every model, or a model/agent id
    pub agent: Option<String>,
    /// Inclusive start date, `YYYY-MM-DD`
    pub date_from: Option<String>,
    /// Inclusive end date, `YYYY-MM-DD`
    pub date_to: Option<String>,
    pub page: Option<i64>,
    /// Rows per page (default 10, max 100)
    pub per_page: Option<i64>,
}

impl TokenUsageQuery {
    /// Model to filter on, `None` for all agents
    pub fn model_filter(&self) -> Option<&str> {
        self.agent
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty() && *a != ALL_AGENTS)
    }

    pub fn from_date(&self) -> Option<NaiveDate> {
        parse_date(self.date_from.as_deref())
    }

    pub fn to_date(&self) -> Option<NaiveDate> {
        parse_date(self.date_to.as_deref())
    }

    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn per_page(&self) -> i64 {
        self.per_page
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> i64 {
        page_offset(self.page(), self.per_page())
    }

    /// `token-usage_{from}_{to}.xlsx`, with `all` for unset bounds
    pub fn export_filename(&self) -> String {
        let bound = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .unwrap_or("all")
                .to_string()
        };
        format!(
            "token-usage_{}_{}.xlsx",
            bound(&self.date_from),
            bound(&self.date_to)
        )
    }
}

/// Usage summed per day, user and model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TokenUsageRowDto {
    /// `YYYY-MM-DD`
    pub date: String,
    pub email: Option<String>,
    pub model: String,
    pub total_tokens: i64,
    pub input_tokens: i64,
    pub output_tokens: i64,
    pub total_messages: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AgentOptionDto {
    pub id: String,
    pub name: String,
}
