use chrono::{DateTime, Utc};
use sea_orm::*;

use crate::entities::*;

pub mod api;

/// A user-defined expense category.
#[derive(Debug, PartialEq, Clone, Eq)]
pub struct Category {
    id: i32,
    user_id: i32,
    name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Category {
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

impl From<category::Model> for Category {
    fn from(model: category::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            name: model.name,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Error type for CategoryService operations.
#[derive(Debug, thiserror::Error)]
pub enum CategoryServiceError {
    #[error("Category with ID {0} not found")]
    CategoryNotFound(i32),
    #[error("Please enter a category name")]
    MissingName,
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

pub struct CategoryService<'a> {
    db: &'a DatabaseConnection,
    user_id: i32,
}

impl CategoryService<'_> {
    pub fn new(db: &DatabaseConnection, user_id: i32) -> CategoryService<'_> {
        CategoryService { db, user_id }
    }

    /// Creates a new category for the user.
    #[tracing::instrument(skip(self), fields(user_id = self.user_id))]
    pub async fn create_category(&self, name: &str) -> Result<Category, CategoryServiceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CategoryServiceError::MissingName);
        }

        let now = Utc::now();
        let active_model = category::ActiveModel {
            user_id: ActiveValue::Set(self.user_id),
            name: ActiveValue::Set(name.to_string()),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
            ..Default::default()
        };
        let created_model = active_model.insert(self.db).await?;
        Ok(Category::from(created_model))
    }

    /// Retrieves all of the user's categories, oldest first.
    #[tracing::instrument(skip(self), fields(user_id = self.user_id))]
    pub async fn get_all_categories(&self) -> Result<Vec<Category>, CategoryServiceError> {
        let categories = category::Entity::find()
            .filter(category::Column::UserId.eq(self.user_id))
            .order_by_asc(category::Column::Id)
            .all(self.db)
            .await?
            .into_iter()
            .map(Category::from)
            .collect();
        Ok(categories)
    }

    #[tracing::instrument(skip(self), fields(user_id = self.user_id))]
    pub async fn get_category_by_id(&self, id: i32) -> Result<Category, CategoryServiceError> {
        Ok(Category::from(self.find_owned(id).await?))
    }

    /// Renames one of the user's categories.
    #[tracing::instrument(skip(self), fields(user_id = self.user_id))]
    pub async fn rename_category(
        &self,
        id: i32,
        new_name: &str,
    ) -> Result<Category, CategoryServiceError> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(CategoryServiceError::MissingName);
        }

        let mut active_model: category::ActiveModel = self.find_owned(id).await?.into();
        active_model.name = ActiveValue::Set(new_name.to_string());
        active_model.updated_at = ActiveValue::Set(Utc::now());
        let updated_model = active_model.update(self.db).await?;
        Ok(Category::from(updated_model))
    }

    /// Deletes one of the user's categories. Expenses referencing it are left as they are.
    #[tracing::instrument(skip(self), fields(user_id = self.user_id))]
    pub async fn delete_category_by_id(&self, id: i32) -> Result<Category, CategoryServiceError> {
        let category_to_delete = self.find_owned(id).await?;
        let deleted = Category::from(category_to_delete.clone());
        category_to_delete.delete(self.db).await?;
        Ok(deleted)
    }

    async fn find_owned(&self, id: i32) -> Result<category::Model, CategoryServiceError> {
        category::Entity::find_by_id(id)
            .filter(category::Column::UserId.eq(self.user_id))
            .one(self.db)
            .await?
            .ok_or(CategoryServiceError::CategoryNotFound(id))
    }
}
