use chrono::{DateTime, Utc};
use sea_orm::*;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::entities::*;
use crate::query::SortOrder;

pub mod api;

#[derive(Debug, PartialEq, Clone, Eq)]
pub struct Todo {
    id: i32,
    user_id: i32,
    title: String,
    description: String,
    completed: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Todo {
    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn user_id(&self) -> i32 {
        self.user_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn completed(&self) -> bool {
        self.completed
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl From<todo::Model> for Todo {
    fn from(model: todo::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            title: model.title,
            description: model.description,
            completed: model.completed,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Which todos to list, by completion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TodoStatusFilter {
    #[default]
    All,
    Completed,
    Pending,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TodoSortKey {
    #[default]
    Created,
    Updated,
    Title,
}

/// Listing options for [`TodoService::list_todos`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TodoListFilter {
    pub status: TodoStatusFilter,
    pub sort: TodoSortKey,
    pub order: SortOrder,
}

/// Fields to change on an existing todo. `None` leaves a field as it is.
#[derive(Debug, Clone, Default)]
pub struct TodoChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
}

/// Error type for TodoService operations.
#[derive(Debug, thiserror::Error)]
pub enum TodoServiceError {
    #[error("Todo with ID {0} not found")]
    TodoNotFound(i32),
    #[error("{0}")]
    Validation(String),
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

fn required_text(value: &str, field: &str) -> Result<String, TodoServiceError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(TodoServiceError::Validation(format!(
            "Please enter a {}",
            field
        )));
    }
    Ok(value.to_string())
}

/// Todo operations, always scoped to one owning user.
pub struct TodoService<'a> {
    db: &'a DatabaseConnection,
    user_id: i32,
}

impl TodoService<'_> {
    pub fn new(db: &DatabaseConnection, user_id: i32) -> TodoService<'_> {
        TodoService { db, user_id }
    }

    /// Creates a new todo for the user.
    ///
    /// # Arguments
    ///
    /// * `title` - Required, trimmed.
    /// * `description` - Required, trimmed.
    /// * `completed` - Initial completion flag.
    #[tracing::instrument(skip(self), fields(user_id = self.user_id))]
    pub async fn create_todo(
        &self,
        title: &str,
        description: &str,
        completed: bool,
    ) -> Result<Todo, TodoServiceError> {
        let title = required_text(title, "title")?;
        let description = required_text(description, "description")?;

        let now = Utc::now();
        let active_model = todo::ActiveModel {
            user_id: ActiveValue::Set(self.user_id),
            title: ActiveValue::Set(title),
            description: ActiveValue::Set(description),
            completed: ActiveValue::Set(completed),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
            ..Default::default()
        };
        let created_model = active_model.insert(self.db).await?;
        Ok(Todo::from(created_model))
    }

    /// Lists the user's todos, filtered by completion and sorted as requested.
    #[tracing::instrument(skip(self), fields(user_id = self.user_id))]
    pub async fn list_todos(&self, filter: TodoListFilter) -> Result<Vec<Todo>, TodoServiceError> {
        let mut query = todo::Entity::find().filter(todo::Column::UserId.eq(self.user_id));

        query = match filter.status {
            TodoStatusFilter::All => query,
            TodoStatusFilter::Completed => query.filter(todo::Column::Completed.eq(true)),
            TodoStatusFilter::Pending => query.filter(todo::Column::Completed.eq(false)),
        };

        let sort_column = match filter.sort {
            TodoSortKey::Created => todo::Column::CreatedAt,
            TodoSortKey::Updated => todo::Column::UpdatedAt,
            TodoSortKey::Title => todo::Column::Title,
        };

        let todos = query
            .order_by(sort_column, filter.order.into())
            .order_by(todo::Column::Id, filter.order.into())
            .all(self.db)
            .await?
            .into_iter()
            .map(Todo::from)
            .collect();
        Ok(todos)
    }

    /// Retrieves one of the user's todos by ID.
    #[tracing::instrument(skip(self), fields(user_id = self.user_id))]
    pub async fn get_todo_by_id(&self, id: i32) -> Result<Todo, TodoServiceError> {
        Ok(Todo::from(self.find_owned(id).await?))
    }

    /// Applies the given changes to one of the user's todos.
    #[tracing::instrument(skip(self), fields(user_id = self.user_id))]
    pub async fn update_todo(&self, id: i32, changes: TodoChanges) -> Result<Todo, TodoServiceError> {
        let title = changes
            .title
            .as_deref()
            .map(|title| required_text(title, "title"))
            .transpose()?;
        let description = changes
            .description
            .as_deref()
            .map(|description| required_text(description, "description"))
            .transpose()?;

        let mut active_model: todo::ActiveModel = self.find_owned(id).await?.into();
        if let Some(title) = title {
            active_model.title = ActiveValue::Set(title);
        }
        if let Some(description) = description {
            active_model.description = ActiveValue::Set(description);
        }
        if let Some(completed) = changes.completed {
            active_model.completed = ActiveValue::Set(completed);
        }
        active_model.updated_at = ActiveValue::Set(Utc::now());

        let updated_model = active_model.update(self.db).await?;
        Ok(Todo::from(updated_model))
    }

    /// Sets the completion flag of one of the user's todos.
    #[tracing::instrument(skip(self), fields(user_id = self.user_id))]
    pub async fn set_completed(&self, id: i32, completed: bool) -> Result<Todo, TodoServiceError> {
        self.update_todo(
            id,
            TodoChanges {
                completed: Some(completed),
                ..Default::default()
            },
        )
        .await
    }

    /// Deletes one of the user's todos and returns it.
    #[tracing::instrument(skip(self), fields(user_id = self.user_id))]
    pub async fn delete_todo_by_id(&self, id: i32) -> Result<Todo, TodoServiceError> {
        let todo_to_delete = self.find_owned(id).await?;
        let deleted = Todo::from(todo_to_delete.clone());
        todo_to_delete.delete(self.db).await?;
        Ok(deleted)
    }

    async fn find_owned(&self, id: i32) -> Result<todo::Model, TodoServiceError> {
        todo::Entity::find_by_id(id)
            .filter(todo::Column::UserId.eq(self.user_id))
            .one(self.db)
            .await?
            .ok_or(TodoServiceError::TodoNotFound(id))
    }
}
