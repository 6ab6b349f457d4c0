//! # Task Repository
//!
//! To-do items grouped by category name. Tasks reference their category by
//! name, so removing a category removes its tasks in the same transaction.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use stockbook_core::validation::{validate_name, validate_text};
use stockbook_core::{OwnerId, Task, TaskCategory};

use crate::error::{DbError, DbResult};
use crate::repository::generate_id;

#[derive(Debug, Clone)]
pub struct TaskRepository {
    pool: SqlitePool,
    owner: OwnerId,
}

impl TaskRepository {
    pub fn new(pool: SqlitePool, owner: OwnerId) -> Self {
        TaskRepository { pool, owner }
    }

    // -------------------------------------------------------------------------
    // Categories
    // -------------------------------------------------------------------------

    /// Adds a category. Names are unique per owner.
    pub async fn add_category(&self, name: &str) -> DbResult<TaskCategory> {
        validate_name(name)?;

        let category = TaskCategory {
            id: generate_id(),
            owner_id: self.owner.as_str().to_string(),
            name: name.trim().to_string(),
        };

        debug!(owner = %self.owner, name = %category.name, "Adding task category");

        sqlx::query(
            "INSERT INTO task_categories (id, owner_id, name, created_at) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(&category.id)
        .bind(&category.owner_id)
        .bind(&category.name)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("name", &category.name),
            other => other,
        })?;

        Ok(category)
    }

    pub async fn list_categories(&self) -> DbResult<Vec<TaskCategory>> {
        let categories: Vec<TaskCategory> = sqlx::query_as::<_, (String, String, String)>(
            r#"
            SELECT id, owner_id, name FROM task_categories
            WHERE owner_id = ?1
            ORDER BY created_at, id
            "#,
        )
        .bind(self.owner.as_str())
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|(id, owner_id, name)| TaskCategory { id, owner_id, name })
        .collect();

        Ok(categories)
    }

    /// Deletes a category and every task filed under it.
    pub async fn delete_category(&self, id: &str) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        let name: Option<String> = sqlx::query_scalar(
            "SELECT name FROM task_categories WHERE id = ?1 AND owner_id = ?2",
        )
        .bind(id)
        .bind(self.owner.as_str())
        .fetch_optional(&mut *tx)
        .await?;

        let name = name.ok_or_else(|| DbError::not_found("TaskCategory", id))?;

        let removed = sqlx::query("DELETE FROM tasks WHERE owner_id = ?1 AND category = ?2")
            .bind(self.owner.as_str())
            .bind(&name)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        sqlx::query("DELETE FROM task_categories WHERE id = ?1 AND owner_id = ?2")
            .bind(id)
            .bind(self.owner.as_str())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(owner = %self.owner, category = %name, tasks = removed, "Deleted task category");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Tasks
    // -------------------------------------------------------------------------

    pub async fn add_task(&self, category: &str, text: &str) -> DbResult<Task> {
        validate_name(category)?;
        validate_text("text", text)?;

        let task = Task {
            id: generate_id(),
            owner_id: self.owner.as_str().to_string(),
            category: category.trim().to_string(),
            text: text.trim().to_string(),
        };

        debug!(owner = %self.owner, category = %task.category, "Adding task");

        sqlx::query(
            r#"
            INSERT INTO tasks (id, owner_id, category, text, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&task.id)
        .bind(&task.owner_id)
        .bind(&task.category)
        .bind(&task.text)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(task)
    }

    /// Tasks in one category, oldest first.
    pub async fn list_tasks(&self, category: &str) -> DbResult<Vec<Task>> {
        let tasks: Vec<Task> = sqlx::query_as::<_, (String, String, String, String)>(
            r#"
            SELECT id, owner_id, category, text FROM tasks
            WHERE owner_id = ?1 AND category = ?2
            ORDER BY created_at, id
            "#,
        )
        .bind(self.owner.as_str())
        .bind(category.trim())
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|(id, owner_id, category, text)| Task {
            id,
            owner_id,
            category,
            text,
        })
        .collect();

        Ok(tasks)
    }

    pub async fn delete_task(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?1 AND owner_id = ?2")
            .bind(id)
            .bind(self.owner.as_str())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Task", id));
        }

        Ok(())
    }

    /// Clears a category. Returns how many tasks were removed.
    pub async fn delete_all_tasks(&self, category: &str) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM tasks WHERE owner_id = ?1 AND category = ?2")
            .bind(self.owner.as_str())
            .bind(category.trim())
            .execute(&self.pool)
            .await?;

        debug!(owner = %self.owner, category = %category, removed = result.rows_affected(), "Cleared tasks");
        Ok(result.rows_affected())
    }
}
