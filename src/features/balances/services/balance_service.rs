use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use futures::TryStreamExt;
use mongodb::bson::{self, doc, oid::ObjectId};
use mongodb::options::FindOptions;
use mongodb::Collection;

use crate::core::database::MongoHandle;
use crate::core::error::{AppError, Result};
use crate::features::balances::dtos::{BalanceRowDto, UpdateBalanceDto};
use crate::features::balances::models::{
    Balance, BalanceUpdate, DEFAULT_REFILL_UNIT, REFILL_UNITS,
};
use crate::features::users::models::User;
use crate::features::users::UserService;
use crate::shared::constants::BALANCES_COLLECTION;

const UNKNOWN: &str = "-";

pub struct BalanceService {
    db: Arc<MongoHandle>,
    users: Arc<UserService>,
}

impl BalanceService {
    pub fn new(db: Arc<MongoHandle>, users: Arc<UserService>) -> Self {
        Self { db, users }
    }

    async fn balances(&self) -> Result<Collection<Balance>> {
        self.db.collection::<Balance>(BALANCES_COLLECTION).await
    }

    /// All balances, largest credit first
    pub async fn list(&self) -> Result<Vec<BalanceRowDto>> {
        let options = FindOptions::builder()
            .sort(doc! { "tokenCredits": -1 })
            .build();
        let balances: Vec<Balance> = self
            .balances()
            .await?
            .find(doc! {}, options)
            .await?
            .try_collect()
            .await?;

        let mut ids: Vec<ObjectId> = balances.iter().filter_map(|b| b.user).collect();
        ids.sort();
        ids.dedup();
        let users = self.users.find_by_ids(&ids).await?;

        Ok(balances.into_iter().map(|b| to_row(b, &users)).collect())
    }

    pub async fn update(&self, id: &str, dto: UpdateBalanceDto) -> Result<BalanceRowDto> {
        let id = ObjectId::parse_str(id)
            .map_err(|_| AppError::BadRequest(format!("Invalid balance id '{}'", id)))?;
        let balances = self.balances().await?;

        let current = balances
            .find_one(doc! { "_id": id }, None)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Balance {} not found", id)))?;

        let update = resolve_balance_update(&current, &dto)?;
        let now = Utc::now();

        let result = balances
            .update_one(
                doc! { "_id": id },
                doc! { "$set": {
                    "tokenCredits": update.token_credits,
                    "autoRefillEnabled": update.auto_refill_enabled,
                    "refillAmount": update.refill_amount,
                    "refillIntervalUnit": update.refill_interval_unit.as_str(),
                    "refillIntervalValue": update.refill_interval_value,
                    "lastRefill": bson::DateTime::from_chrono(now),
                } },
                None,
            )
            .await?;
        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!("Balance {} not found", id)));
        }
        tracing::info!(
            "Updated balance {}: credits={}, auto_refill={}",
            id,
            update.token_credits,
            update.auto_refill_enabled
        );

        let updated = Balance {
            token_credits: update.token_credits,
            auto_refill_enabled: update.auto_refill_enabled,
            refill_amount: update.refill_amount as f64,
            refill_interval_value: update.refill_interval_value as f64,
            refill_interval_unit: Some(update.refill_interval_unit),
            last_refill: Some(now),
            ..current
        };
        let users = self
            .users
            .find_by_ids(&updated.user.into_iter().collect::<Vec<_>>())
            .await?;
        Ok(to_row(updated, &users))
    }
}

/// Merge an edit into the stored balance.
///
/// Blank credits (`""`, `"."`, `"-"`) and omitted fields keep the stored
/// value. Turning auto-refill off zeroes the refill amount and interval.
pub fn resolve_balance_update(current: &Balance, dto: &UpdateBalanceDto) -> Result<BalanceUpdate> {
    let token_credits = match dto.token_credits.as_deref().map(normalize_number) {
        None => current.token_credits,
        Some(raw) if matches!(raw.as_str(), "" | "." | "-") => current.token_credits,
        Some(raw) => raw
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .ok_or_else(|| AppError::Validation(format!("Invalid token credits '{}'", raw)))?,
    };

    let refill_interval_unit = match dto.refill_interval_unit.as_deref().map(str::trim) {
        Some(unit) if !unit.is_empty() => {
            if !REFILL_UNITS.contains(&unit) {
                return Err(AppError::Validation(format!(
                    "Invalid refill interval unit '{}', expected one of: {}",
                    unit,
                    REFILL_UNITS.join(", ")
                )));
            }
            unit.to_string()
        }
        _ => current
            .refill_interval_unit
            .clone()
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_REFILL_UNIT.to_string()),
    };

    let auto_refill_enabled = dto
        .auto_refill_enabled
        .unwrap_or(current.auto_refill_enabled);

    let (refill_amount, refill_interval_value) = if auto_refill_enabled {
        (
            dto.refill_amount.unwrap_or(current.refill_amount as i64),
            dto.refill_interval_value
                .unwrap_or(current.refill_interval_value as i64),
        )
    } else {
        (0, 0)
    };

    Ok(BalanceUpdate {
        token_credits,
        auto_refill_enabled,
        refill_amount,
        refill_interval_value,
        refill_interval_unit,
    })
}

fn normalize_number(raw: &str) -> String {
    raw.chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect()
}

fn to_row(balance: Balance, users: &HashMap<ObjectId, User>) -> BalanceRowDto {
    let user = balance.user.and_then(|id| users.get(&id));
    let field = |value: Option<&String>| {
        value
            .filter(|v| !v.is_empty())
            .cloned()
            .unwrap_or_else(|| UNKNOWN.to_string())
    };

    BalanceRowDto {
        id: balance.id.to_hex(),
        user_id: balance.user.map(|id| id.to_hex()),
        email: field(user.and_then(|u| u.email.as_ref())),
        name: field(user.and_then(|u| u.name.as_ref())),
        token_credits: balance.token_credits,
        auto_refill_enabled: balance.auto_refill_enabled,
        refill_amount: balance.refill_amount as i64,
        refill_interval_value: balance.refill_interval_value as i64,
        refill_interval_unit: balance
            .refill_interval_unit
            .unwrap_or_else(|| UNKNOWN.to_string()),
        last_refill: balance
            .last_refill
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| UNKNOWN.to_string()),
    }
}
