//! In-memory stores with the same contracts as the Postgres repositories.
//!
//! Backs `AppState::in_memory` and the router tests, which run without a
//! database. Locks are never held across an await.

use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        PoisonError, RwLock,
    },
};

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::{
    auth::{repo::UserRepo, repo_types::User},
    tasks::{
        dto::{NewTask, TaskPatch},
        repo::TaskRepo,
        repo_types::{Task, TaskStatus},
    },
};

#[derive(Debug)]
struct Table<T> {
    next_id: i32,
    rows: BTreeMap<i32, T>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            rows: BTreeMap::new(),
        }
    }
}

impl<T> Table<T> {
    fn allocate_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Debug, Default)]
pub struct MemoryUserRepo {
    table: RwLock<Table<User>>,
    lookups: AtomicUsize,
}

impl MemoryUserRepo {
    /// Number of find calls served so far.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.table.read().unwrap_or_else(PoisonError::into_inner).rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops a user, as an operator deleting the account would.
    pub fn remove(&self, id: i32) -> Option<User> {
        self.table
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .rows
            .remove(&id)
    }
}

#[async_trait]
impl UserRepo for MemoryUserRepo {
    async fn find_by_id(&self, id: i32) -> anyhow::Result<Option<User>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let table = self.table.read().unwrap_or_else(PoisonError::into_inner);
        Ok(table.rows.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let table = self.table.read().unwrap_or_else(PoisonError::into_inner);
        Ok(table.rows.values().find(|u| u.username == username).cloned())
    }

    async fn create(&self, username: &str) -> anyhow::Result<User> {
        let mut table = self.table.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = table.rows.values().find(|u| u.username == username) {
            return Ok(existing.clone());
        }
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: table.allocate_id(),
            username: username.to_string(),
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(user.id, user.clone());
        Ok(user)
    }
}

#[derive(Debug, Default)]
pub struct MemoryTaskRepo {
    table: RwLock<Table<Task>>,
}

#[async_trait]
impl TaskRepo for MemoryTaskRepo {
    async fn create(&self, task: NewTask, user_id: i32) -> anyhow::Result<Task> {
        let mut table = self.table.write().unwrap_or_else(PoisonError::into_inner);
        let now = OffsetDateTime::now_utc();
        let task = Task {
            id: table.allocate_id(),
            title: task.title,
            description: task.description,
            status: TaskStatus::Pending,
            user_id,
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(task.id, task.clone());
        Ok(task)
    }

    async fn get(&self, id: i32) -> anyhow::Result<Option<Task>> {
        let table = self.table.read().unwrap_or_else(PoisonError::into_inner);
        Ok(table.rows.get(&id).cloned())
    }

    async fn list_by_owner(&self, user_id: i32) -> anyhow::Result<Vec<Task>> {
        let table = self.table.read().unwrap_or_else(PoisonError::into_inner);
        let mut tasks: Vec<Task> = table
            .rows
            .values()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(tasks)
    }

    async fn update(&self, id: i32, patch: &TaskPatch) -> anyhow::Result<Option<Task>> {
        let mut table = self.table.write().unwrap_or_else(PoisonError::into_inner);
        let Some(task) = table.rows.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(title) = patch.title() {
            task.title = title.to_string();
        }
        if let Some(description) = patch.description() {
            task.description = description.map(str::to_string);
        }
        if let Some(status) = patch.status() {
            task.status = status;
        }
        task.updated_at = OffsetDateTime::now_utc();
        Ok(Some(task.clone()))
    }

    async fn delete(&self, id: i32) -> anyhow::Result<bool> {
        let mut table = self.table.write().unwrap_or_else(PoisonError::into_inner);
        Ok(table.rows.remove(&id).is_some())
    }
}
