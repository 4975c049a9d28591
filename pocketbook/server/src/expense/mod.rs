use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::*;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::entities::sea_orm_active_enums::{ExpenseStatus, ExpenseType};
use crate::entities::*;
use crate::query::SortOrder;

pub mod api;

#[derive(Debug, PartialEq, Clone)]
pub struct Expense {
    id: i32,
    user_id: i32,
    amount: f64,
    description: String,
    category_id: i32,
    payment_mode_id: i32,
    expense_type: ExpenseType,
    status: ExpenseStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Expense {
    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn user_id(&self) -> i32 {
        self.user_id
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn category_id(&self) -> i32 {
        self.category_id
    }

    pub fn payment_mode_id(&self) -> i32 {
        self.payment_mode_id
    }

    pub fn expense_type(&self) -> ExpenseType {
        self.expense_type
    }

    pub fn status(&self) -> ExpenseStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl From<expense::Model> for Expense {
    fn from(model: expense::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            amount: model.amount,
            description: model.description,
            category_id: model.category_id,
            payment_mode_id: model.payment_mode_id,
            expense_type: model.r#type,
            status: model.status,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// An expense together with the names of the category and payment mode it
/// points at. A name is `None` when the referenced row has been deleted.
#[derive(Debug, PartialEq, Clone)]
pub struct ExpenseDetails {
    pub expense: Expense,
    pub category_name: Option<String>,
    pub payment_mode_name: Option<String>,
}

/// The fields a client submits when creating or replacing an expense.
#[derive(Debug, Clone, Default)]
pub struct ExpenseInput {
    pub amount: Option<f64>,
    pub description: Option<String>,
    pub category_id: Option<i32>,
    pub payment_mode_id: Option<i32>,
    pub expense_type: Option<ExpenseType>,
    /// Defaults to [`ExpenseStatus::Paid`].
    pub status: Option<ExpenseStatus>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum ExpenseSortKey {
    #[default]
    CreatedAt,
    Amount,
    Description,
}

/// Equality filters and ordering for [`ExpenseService::list_expenses`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpenseListFilter {
    pub category_id: Option<i32>,
    pub payment_mode_id: Option<i32>,
    pub expense_type: Option<ExpenseType>,
    pub status: Option<ExpenseStatus>,
    pub sort: ExpenseSortKey,
    pub order: SortOrder,
}

#[derive(Debug, thiserror::Error)]
pub enum ExpenseServiceError {
    #[error("Expense with ID {0} not found")]
    ExpenseNotFound(i32),
    #[error("{0}")]
    Validation(String),
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

fn invalid(message: &str) -> ExpenseServiceError {
    ExpenseServiceError::Validation(message.to_string())
}

/// A checked [`ExpenseInput`], ready to be written.
#[derive(Debug)]
struct ValidExpense {
    amount: f64,
    description: String,
    category_id: i32,
    payment_mode_id: i32,
    expense_type: ExpenseType,
    status: ExpenseStatus,
}

/// Checks everything that can be checked without the database.
fn validate_fields(input: ExpenseInput) -> Result<ValidExpense, ExpenseServiceError> {
    let amount = input.amount.ok_or_else(|| invalid("Please enter an amount"))?;
    if !amount.is_finite() || amount <= 0.0 {
        return Err(invalid("Amount must be a positive number"));
    }
    let description = input
        .description
        .as_deref()
        .map(str::trim)
        .filter(|description| !description.is_empty())
        .ok_or_else(|| invalid("Please enter a description"))?
        .to_string();
    let category_id = input
        .category_id
        .ok_or_else(|| invalid("Please select a category"))?;
    let payment_mode_id = input
        .payment_mode_id
        .ok_or_else(|| invalid("Please select a payment mode"))?;
    let expense_type = input
        .expense_type
        .ok_or_else(|| invalid("Please select an expense type"))?;

    Ok(ValidExpense {
        amount,
        description,
        category_id,
        payment_mode_id,
        expense_type,
        status: input.status.unwrap_or_default(),
    })
}

/// Expense operations, always scoped to one owning user.
pub struct ExpenseService<'a> {
    db: &'a DatabaseConnection,
    user_id: i32,
}

impl ExpenseService<'_> {
    pub fn new(db: &DatabaseConnection, user_id: i32) -> ExpenseService<'_> {
        ExpenseService { db, user_id }
    }

    /// Records a new expense.
    ///
    /// The category and payment mode must both belong to the user.
    #[tracing::instrument(skip(self), fields(user_id = self.user_id))]
    pub async fn create_expense(
        &self,
        input: ExpenseInput,
    ) -> Result<ExpenseDetails, ExpenseServiceError> {
        let valid = validate_fields(input)?;
        let (category_name, payment_mode_name) = self.resolve_references(&valid).await?;

        let now = Utc::now();
        let active_model = expense::ActiveModel {
            user_id: ActiveValue::Set(self.user_id),
            amount: ActiveValue::Set(valid.amount),
            description: ActiveValue::Set(valid.description),
            category_id: ActiveValue::Set(valid.category_id),
            payment_mode_id: ActiveValue::Set(valid.payment_mode_id),
            r#type: ActiveValue::Set(valid.expense_type),
            status: ActiveValue::Set(valid.status),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
            ..Default::default()
        };
        let created_model = active_model.insert(self.db).await?;
        tracing::debug!(expense_id = created_model.id, "Expense recorded");

        Ok(ExpenseDetails {
            expense: Expense::from(created_model),
            category_name: Some(category_name),
            payment_mode_name: Some(payment_mode_name),
        })
    }

    /// Lists the user's expenses matching the filter.
    #[tracing::instrument(skip(self), fields(user_id = self.user_id))]
    pub async fn list_expenses(
        &self,
        filter: ExpenseListFilter,
    ) -> Result<Vec<ExpenseDetails>, ExpenseServiceError> {
        let mut query = expense::Entity::find().filter(expense::Column::UserId.eq(self.user_id));
        if let Some(category_id) = filter.category_id {
            query = query.filter(expense::Column::CategoryId.eq(category_id));
        }
        if let Some(payment_mode_id) = filter.payment_mode_id {
            query = query.filter(expense::Column::PaymentModeId.eq(payment_mode_id));
        }
        if let Some(expense_type) = filter.expense_type {
            query = query.filter(expense::Column::Type.eq(expense_type));
        }
        if let Some(status) = filter.status {
            query = query.filter(expense::Column::Status.eq(status));
        }

        let sort_column = match filter.sort {
            ExpenseSortKey::CreatedAt => expense::Column::CreatedAt,
            ExpenseSortKey::Amount => expense::Column::Amount,
            ExpenseSortKey::Description => expense::Column::Description,
        };
        let models = query
            .order_by(sort_column, filter.order.into())
            .order_by(expense::Column::Id, filter.order.into())
            .all(self.db)
            .await?;

        let category_names = self.category_names().await?;
        let payment_mode_names = self.payment_mode_names().await?;
        Ok(models
            .into_iter()
            .map(|model| ExpenseDetails {
                category_name: category_names.get(&model.category_id).cloned(),
                payment_mode_name: payment_mode_names.get(&model.payment_mode_id).cloned(),
                expense: Expense::from(model),
            })
            .collect())
    }

    /// Retrieves one of the user's expenses with its names resolved.
    #[tracing::instrument(skip(self), fields(user_id = self.user_id))]
    pub async fn get_expense_by_id(&self, id: i32) -> Result<ExpenseDetails, ExpenseServiceError> {
        let model = self.find_owned(id).await?;
        self.with_names(model).await
    }

    /// Replaces every field of one of the user's expenses.
    #[tracing::instrument(skip(self), fields(user_id = self.user_id))]
    pub async fn update_expense(
        &self,
        id: i32,
        input: ExpenseInput,
    ) -> Result<ExpenseDetails, ExpenseServiceError> {
        let valid = validate_fields(input)?;
        let existing = self.find_owned(id).await?;
        let (category_name, payment_mode_name) = self.resolve_references(&valid).await?;

        let mut active_model: expense::ActiveModel = existing.into();
        active_model.amount = ActiveValue::Set(valid.amount);
        active_model.description = ActiveValue::Set(valid.description);
        active_model.category_id = ActiveValue::Set(valid.category_id);
        active_model.payment_mode_id = ActiveValue::Set(valid.payment_mode_id);
        active_model.r#type = ActiveValue::Set(valid.expense_type);
        active_model.status = ActiveValue::Set(valid.status);
        active_model.updated_at = ActiveValue::Set(Utc::now());
        let updated_model = active_model.update(self.db).await?;

        Ok(ExpenseDetails {
            expense: Expense::from(updated_model),
            category_name: Some(category_name),
            payment_mode_name: Some(payment_mode_name),
        })
    }

    /// Deletes one of the user's expenses and returns it.
    #[tracing::instrument(skip(self), fields(user_id = self.user_id))]
    pub async fn delete_expense_by_id(
        &self,
        id: i32,
    ) -> Result<ExpenseDetails, ExpenseServiceError> {
        let expense_to_delete = self.find_owned(id).await?;
        let deleted = self.with_names(expense_to_delete.clone()).await?;
        expense_to_delete.delete(self.db).await?;
        Ok(deleted)
    }

    async fn find_owned(&self, id: i32) -> Result<expense::Model, ExpenseServiceError> {
        expense::Entity::find_by_id(id)
            .filter(expense::Column::UserId.eq(self.user_id))
            .one(self.db)
            .await?
            .ok_or(ExpenseServiceError::ExpenseNotFound(id))
    }

    /// Looks up the category and payment mode names, failing validation
    /// unless both rows exist and belong to the user.
    async fn resolve_references(
        &self,
        valid: &ValidExpense,
    ) -> Result<(String, String), ExpenseServiceError> {
        let category_name = self
            .category_name(valid.category_id)
            .await?
            .ok_or_else(|| invalid("Please select one of your categories"))?;
        let payment_mode_name = self
            .payment_mode_name(valid.payment_mode_id)
            .await?
            .ok_or_else(|| invalid("Please select one of your payment modes"))?;
        Ok((category_name, payment_mode_name))
    }

    async fn with_names(&self, model: expense::Model) -> Result<ExpenseDetails, ExpenseServiceError> {
        let category_name = self.category_name(model.category_id).await?;
        let payment_mode_name = self.payment_mode_name(model.payment_mode_id).await?;
        Ok(ExpenseDetails {
            expense: Expense::from(model),
            category_name,
            payment_mode_name,
        })
    }

    async fn category_name(&self, id: i32) -> Result<Option<String>, DbErr> {
        Ok(category::Entity::find_by_id(id)
            .filter(category::Column::UserId.eq(self.user_id))
            .one(self.db)
            .await?
            .map(|model| model.name))
    }

    async fn payment_mode_name(&self, id: i32) -> Result<Option<String>, DbErr> {
        Ok(payment_mode::Entity::find_by_id(id)
            .filter(payment_mode::Column::UserId.eq(self.user_id))
            .one(self.db)
            .await?
            .map(|model| model.name))
    }

    async fn category_names(&self) -> Result<HashMap<i32, String>, DbErr> {
        Ok(category::Entity::find()
            .filter(category::Column::UserId.eq(self.user_id))
            .all(self.db)
            .await?
            .into_iter()
            .map(|model| (model.id, model.name))
            .collect())
    }

    async fn payment_mode_names(&self) -> Result<HashMap<i32, String>, DbErr> {
        Ok(payment_mode::Entity::find()
            .filter(payment_mode::Column::UserId.eq(self.user_id))
            .all(self.db)
            .await?
            .into_iter()
            .map(|model| (model.id, model.name))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_input() -> ExpenseInput {
        ExpenseInput {
            amount: Some(12.5),
            description: Some("  Groceries ".to_string()),
            category_id: Some(1),
            payment_mode_id: Some(2),
            expense_type: Some(ExpenseType::Debit),
            status: None,
        }
    }

    fn validation_message(input: ExpenseInput) -> String {
        match validate_fields(input) {
            Err(ExpenseServiceError::Validation(message)) => message,
            other => panic!("expected a validation error, got {:?}", other),
        }
    }

    #[test]
    fn complete_input_is_trimmed_and_defaults_to_paid() {
        let valid = validate_fields(complete_input()).unwrap();

        assert_eq!(valid.description, "Groceries");
        assert_eq!(valid.status, ExpenseStatus::Paid);
        assert_eq!(valid.expense_type, ExpenseType::Debit);
    }

    #[test]
    fn amount_must_be_positive_and_finite() {
        for amount in [0.0, -3.0, f64::NAN, f64::INFINITY] {
            let input = ExpenseInput {
                amount: Some(amount),
                ..complete_input()
            };
            assert_eq!(validation_message(input), "Amount must be a positive number");
        }

        let input = ExpenseInput {
            amount: None,
            ..complete_input()
        };
        assert_eq!(validation_message(input), "Please enter an amount");
    }

    #[test]
    fn every_reference_is_required() {
        let input = ExpenseInput {
            description: Some("   ".to_string()),
            ..complete_input()
        };
        assert_eq!(validation_message(input), "Please enter a description");

        let input = ExpenseInput {
            category_id: None,
            ..complete_input()
        };
        assert_eq!(validation_message(input), "Please select a category");

        let input = ExpenseInput {
            payment_mode_id: None,
            ..complete_input()
        };
        assert_eq!(validation_message(input), "Please select a payment mode");

        let input = ExpenseInput {
            expense_type: None,
            ..complete_input()
        };
        assert_eq!(validation_message(input), "Please select an expense type");
    }
}
