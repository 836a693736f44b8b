//! Task operations for an authenticated caller.
//!
//! Every single-task read or write goes through [`authorize`] first, freshly
//! each time: the guard loads the task, answers 404 if it is gone and 403 if
//! the caller is not its owner. Nothing here writes before the guard and the
//! input validation have both passed.

use tracing::{info, warn};

use crate::{
    auth::dto::PublicUser,
    error::{ApiError, ApiResult},
    tasks::{
        dto::{CreateTaskRequest, NewTask, TaskPatch, UpdateTaskRequest},
        repo::TaskRepo,
        repo_types::Task,
    },
};

fn not_found() -> ApiError {
    ApiError::NotFound("Task not found".into())
}

/// Authorization Guard: the task exists and belongs to `caller`.
pub async fn authorize(tasks: &dyn TaskRepo, caller: &PublicUser, task_id: i32) -> ApiResult<Task> {
    let task = tasks.get(task_id).await?.ok_or_else(not_found)?;
    if task.user_id != caller.id {
        warn!(task_id, user_id = caller.id, owner_id = task.user_id, "task access denied");
        return Err(ApiError::Forbidden("Access to this task is not allowed".into()));
    }
    Ok(task)
}

pub async fn create(tasks: &dyn TaskRepo, caller: &PublicUser, req: CreateTaskRequest) -> ApiResult<Task> {
    let new_task = NewTask::try_from(req)?;
    let task = tasks.create(new_task, caller.id).await?;
    info!(task_id = task.id, user_id = caller.id, "task created");
    Ok(task)
}

pub async fn list(tasks: &dyn TaskRepo, caller: &PublicUser) -> ApiResult<Vec<Task>> {
    Ok(tasks.list_by_owner(caller.id).await?)
}

pub async fn get(tasks: &dyn TaskRepo, caller: &PublicUser, task_id: i32) -> ApiResult<Task> {
    authorize(tasks, caller, task_id).await
}

pub async fn update(
    tasks: &dyn TaskRepo,
    caller: &PublicUser,
    task_id: i32,
    req: UpdateTaskRequest,
) -> ApiResult<Task> {
    authorize(tasks, caller, task_id).await?;
    let patch = TaskPatch::try_from(req)?;
    let task = tasks.update(task_id, &patch).await?.ok_or_else(not_found)?;
    info!(task_id, user_id = caller.id, status = %task.status, "task updated");
    Ok(task)
}

/// A row that vanished between the guard and the delete reads as 404.
pub async fn delete(tasks: &dyn TaskRepo, caller: &PublicUser, task_id: i32) -> ApiResult<()> {
    authorize(tasks, caller, task_id).await?;
    if !tasks.delete(task_id).await? {
        return Err(not_found());
    }
    info!(task_id, user_id = caller.id, "task deleted");
    Ok(())
}
