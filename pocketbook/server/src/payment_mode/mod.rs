use chrono::{DateTime, Utc};
use sea_orm::*;

use crate::entities::*;

pub mod api;

/// A user-defined way of paying, e.g. "Credit Card".
#[derive(Debug, PartialEq, Clone, Eq)]
pub struct PaymentMode {
    id: i32,
    user_id: i32,
    name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PaymentMode {
    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn user_id(&self) -> i32 {
        self.user_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl From<payment_mode::Model> for PaymentMode {
    fn from(model: payment_mode::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            name: model.name,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PaymentModeServiceError {
    #[error("Payment mode with ID {0} not found")]
    PaymentModeNotFound(i32),
    #[error("Please enter a payment mode name")]
    MissingName,
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

/// Upper-cases the first character of every word.
///
/// A word is a run of alphanumerics and underscores, so `"e-wallet"` becomes
/// `"E-Wallet"`. Everything else is kept as it is.
pub fn title_case(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut at_word_start = true;
    for c in name.chars() {
        let in_word = c.is_alphanumeric() || c == '_';
        if in_word && at_word_start {
            result.extend(c.to_uppercase());
        } else {
            result.push(c);
        }
        at_word_start = !in_word;
    }
    result
}

fn normalize_name(name: &str) -> Result<String, PaymentModeServiceError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(PaymentModeServiceError::MissingName);
    }
    Ok(title_case(name))
}

pub struct PaymentModeService<'a> {
    db: &'a DatabaseConnection,
    user_id: i32,
}

impl PaymentModeService<'_> {
    pub fn new(db: &DatabaseConnection, user_id: i32) -> PaymentModeService<'_> {
        PaymentModeService { db, user_id }
    }

    /// Creates a new payment mode for the user. The name is stored title-cased.
    #[tracing::instrument(skip(self), fields(user_id = self.user_id))]
    pub async fn create_payment_mode(
        &self,
        name: &str,
    ) -> Result<PaymentMode, PaymentModeServiceError> {
        let name = normalize_name(name)?;

        let now = Utc::now();
        let active_model = payment_mode::ActiveModel {
            user_id: ActiveValue::Set(self.user_id),
            name: ActiveValue::Set(name),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
            ..Default::default()
        };
        let created_model = active_model.insert(self.db).await?;
        Ok(PaymentMode::from(created_model))
    }

    #[tracing::instrument(skip(self), fields(user_id = self.user_id))]
    pub async fn get_all_payment_modes(&self) -> Result<Vec<PaymentMode>, PaymentModeServiceError> {
        let payment_modes = payment_mode::Entity::find()
            .filter(payment_mode::Column::UserId.eq(self.user_id))
            .order_by_asc(payment_mode::Column::Id)
            .all(self.db)
            .await?
            .into_iter()
            .map(PaymentMode::from)
            .collect();
        Ok(payment_modes)
    }

    #[tracing::instrument(skip(self), fields(user_id = self.user_id))]
    pub async fn get_payment_mode_by_id(
        &self,
        id: i32,
    ) -> Result<PaymentMode, PaymentModeServiceError> {
        Ok(PaymentMode::from(self.find_owned(id).await?))
    }

    #[tracing::instrument(skip(self), fields(user_id = self.user_id))]
    pub async fn rename_payment_mode(
        &self,
        id: i32,
        new_name: &str,
    ) -> Result<PaymentMode, PaymentModeServiceError> {
        let new_name = normalize_name(new_name)?;

        let mut active_model: payment_mode::ActiveModel = self.find_owned(id).await?.into();
        active_model.name = ActiveValue::Set(new_name);
        active_model.updated_at = ActiveValue::Set(Utc::now());
        let updated_model = active_model.update(self.db).await?;
        Ok(PaymentMode::from(updated_model))
    }

    #[tracing::instrument(skip(self), fields(user_id = self.user_id))]
    pub async fn delete_payment_mode_by_id(
        &self,
        id: i32,
    ) -> Result<PaymentMode, PaymentModeServiceError> {
        let payment_mode_to_delete = self.find_owned(id).await?;
        let deleted = PaymentMode::from(payment_mode_to_delete.clone());
        payment_mode_to_delete.delete(self.db).await?;
        Ok(deleted)
    }

    async fn find_owned(&self, id: i32) -> Result<payment_mode::Model, PaymentModeServiceError> {
        payment_mode::Entity::find_by_id(id)
            .filter(payment_mode::Column::UserId.eq(self.user_id))
            .one(self.db)
            .await?
            .ok_or(PaymentModeServiceError::PaymentModeNotFound(id))
    }
}
