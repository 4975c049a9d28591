use std::collections::BTreeMap;

use chrono::{Datelike, Utc};
use sea_orm::*;

use crate::entities::sea_orm_active_enums::{ExpenseStatus, ExpenseType};
use crate::entities::*;

pub mod api;

/// Restricts which expenses a summary run aggregates. Every field is optional.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SummaryFilter {
    /// Calendar month, 1 to 12.
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub category_id: Option<i32>,
    pub payment_mode_id: Option<i32>,
}

/// Grouping key, in the order groups are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct GroupKey {
    year: i32,
    month: u32,
    category_id: i32,
    payment_mode_id: i32,
    expense_type: ExpenseType,
    status: ExpenseStatus,
}

/// The summed amount of one group of expenses.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryGroup {
    pub category_id: i32,
    pub payment_mode_id: i32,
    pub expense_type: ExpenseType,
    pub status: ExpenseStatus,
    pub month: u32,
    pub year: i32,
    pub total_amount: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum SummaryServiceError {
    #[error("Month must be between 1 and 12, got {0}")]
    InvalidMonth(u32),
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

/// Groups expenses by month, year, category, payment mode, type and status
/// of their UTC creation time, summing the amounts.
///
/// Groups come back ordered by year, month, category, payment mode, type and status.
pub fn group_expenses<'a>(
    expenses: impl IntoIterator<Item = &'a expense::Model>,
) -> Vec<SummaryGroup> {
    let mut totals: BTreeMap<GroupKey, f64> = BTreeMap::new();
    for expense in expenses {
        let key = GroupKey {
            year: expense.created_at.year(),
            month: expense.created_at.month(),
            category_id: expense.category_id,
            payment_mode_id: expense.payment_mode_id,
            expense_type: expense.r#type,
            status: expense.status,
        };
        *totals.entry(key).or_insert(0.0) += expense.amount;
    }

    totals
        .into_iter()
        .map(|(key, total_amount)| SummaryGroup {
            category_id: key.category_id,
            payment_mode_id: key.payment_mode_id,
            expense_type: key.expense_type,
            status: key.status,
            month: key.month,
            year: key.year,
            total_amount,
        })
        .collect()
}

pub struct SummaryService<'a> {
    db: &'a DatabaseConnection,
    user_id: i32,
}

impl SummaryService<'_> {
    pub fn new(db: &DatabaseConnection, user_id: i32) -> SummaryService<'_> {
        SummaryService { db, user_id }
    }

    /// Aggregates the user's expenses and records every group as an
    /// expense summary row. Each run appends a fresh set of rows.
    #[tracing::instrument(skip(self), fields(user_id = self.user_id))]
    pub async fn summarize(
        &self,
        filter: SummaryFilter,
    ) -> Result<Vec<SummaryGroup>, SummaryServiceError> {
        if let Some(month) = filter.month {
            if !(1..=12).contains(&month) {
                return Err(SummaryServiceError::InvalidMonth(month));
            }
        }

        let mut query = expense::Entity::find().filter(expense::Column::UserId.eq(self.user_id));
        if let Some(category_id) = filter.category_id {
            query = query.filter(expense::Column::CategoryId.eq(category_id));
        }
        if let Some(payment_mode_id) = filter.payment_mode_id {
            query = query.filter(expense::Column::PaymentModeId.eq(payment_mode_id));
        }
        let expenses = query.all(self.db).await?;

        let groups = group_expenses(expenses.iter().filter(|expense| {
            filter
                .month
                .is_none_or(|month| expense.created_at.month() == month)
                && filter
                    .year
                    .is_none_or(|year| expense.created_at.year() == year)
        }));

        if groups.is_empty() {
            return Ok(groups);
        }

        let now = Utc::now();
        let rows = groups.iter().map(|group| expense_summary::ActiveModel {
            user_id: ActiveValue::Set(self.user_id),
            category_id: ActiveValue::Set(group.category_id),
            payment_mode_id: ActiveValue::Set(group.payment_mode_id),
            r#type: ActiveValue::Set(group.expense_type),
            status: ActiveValue::Set(group.status),
            month: ActiveValue::Set(group.month as i32),
            year: ActiveValue::Set(group.year),
            total_amount: ActiveValue::Set(group.total_amount),
            created_at: ActiveValue::Set(now),
            ..Default::default()
        });
        let inserted = expense_summary::Entity::insert_many(rows)
            .exec_without_returning(self.db)
            .await?;
        tracing::info!(groups = groups.len(), inserted, "Recorded expense summary");

        Ok(groups)
    }
}
