use anyhow::Context;
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::tasks::{
    dto::{NewTask, TaskPatch},
    repo_types::{Task, TaskStatus},
};

/// Task Store. Ownership is not checked here; callers go through the guard
/// in `tasks::services` before any single-task read or write.
#[async_trait]
pub trait TaskRepo: Send + Sync {
    /// Inserts a task owned by `user_id` with status `pending`.
    async fn create(&self, task: NewTask, user_id: i32) -> anyhow::Result<Task>;
    async fn get(&self, id: i32) -> anyhow::Result<Option<Task>>;
    /// All tasks of one owner, newest first.
    async fn list_by_owner(&self, user_id: i32) -> anyhow::Result<Vec<Task>>;
    async fn update(&self, id: i32, patch: &TaskPatch) -> anyhow::Result<Option<Task>>;
    /// True iff a row was removed.
    async fn delete(&self, id: i32) -> anyhow::Result<bool>;
}

const TASK_COLUMNS: &str = "id, title, description, status, user_id, created_at, updated_at";

#[derive(Clone)]
pub struct PgTaskRepo {
    db: PgPool,
}

impl PgTaskRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TaskRepo for PgTaskRepo {
    async fn create(&self, task: NewTask, user_id: i32) -> anyhow::Result<Task> {
        let row = sqlx::query_as::<_, Task>(&format!(
            r#"
            INSERT INTO tasks (title, description, status, user_id)
            VALUES ($1, $2, $3, $4)
            RETURNING {TASK_COLUMNS}
            "#
        ))
        .bind(task.title)
        .bind(task.description)
        .bind(TaskStatus::Pending)
        .bind(user_id)
        .fetch_one(&self.db)
        .await
        .context("insert task")?;
        Ok(row)
    }

    async fn get(&self, id: i32) -> anyhow::Result<Option<Task>> {
        let row = sqlx::query_as::<_, Task>(&format!(
            r#"
            SELECT {TASK_COLUMNS}
            FROM tasks
            WHERE id = $1
            "#
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("get task")?;
        Ok(row)
    }

    async fn list_by_owner(&self, user_id: i32) -> anyhow::Result<Vec<Task>> {
        let rows = sqlx::query_as::<_, Task>(&format!(
            r#"
            SELECT {TASK_COLUMNS}
            FROM tasks
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await
        .context("list tasks by owner")?;
        Ok(rows)
    }

    async fn update(&self, id: i32, patch: &TaskPatch) -> anyhow::Result<Option<Task>> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE tasks SET ");
        {
            let mut set = qb.separated(", ");
            if let Some(title) = patch.title() {
                set.push("title = ").push_bind_unseparated(title.to_string());
            }
            if let Some(description) = patch.description() {
                set.push("description = ")
                    .push_bind_unseparated(description.map(str::to_string));
            }
            if let Some(status) = patch.status() {
                set.push("status = ").push_bind_unseparated(status);
            }
            set.push("updated_at = NOW()");
        }
        qb.push(" WHERE id = ").push_bind(id);
        qb.push(" RETURNING ").push(TASK_COLUMNS);

        let row = qb
            .build_query_as::<Task>()
            .fetch_optional(&self.db)
            .await
            .context("update task")?;
        Ok(row)
    }

    async fn delete(&self, id: i32) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .context("delete task")?;
        Ok(result.rows_affected() > 0)
    }
}
