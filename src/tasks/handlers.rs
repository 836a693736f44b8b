use axum::{
    extract::State,
    routing::get,
    Router,
};
use tracing::instrument;

use crate::{
    auth::extractors::AuthUser,
    error::ApiResult,
    extract::{Json, Path},
    response::ApiResponse,
    state::AppState,
    tasks::{
        dto::{CreateTaskRequest, UpdateTaskRequest},
        repo_types::Task,
        services,
    },
};

pub fn task_routes() -> Router<AppState> {
    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/:id", get(get_task).put(update_task).delete(delete_task))
}

#[instrument(skip(state, user), fields(user_id = user.0.id))]
pub async fn list_tasks(State(state): State<AppState>, user: AuthUser) -> ApiResult<ApiResponse<Vec<Task>>> {
    let tasks = services::list(state.tasks.as_ref(), &user.0).await?;
    Ok(ApiResponse::ok(tasks))
}

#[instrument(skip(state, user), fields(user_id = user.0.id))]
pub async fn get_task(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
) -> ApiResult<ApiResponse<Task>> {
    let task = services::get(state.tasks.as_ref(), &user.0, id).await?;
    Ok(ApiResponse::ok(task))
}

#[instrument(skip(state, user, payload), fields(user_id = user.0.id))]
pub async fn create_task(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateTaskRequest>,
) -> ApiResult<ApiResponse<Task>> {
    let task = services::create(state.tasks.as_ref(), &user.0, payload).await?;
    Ok(ApiResponse::created(task).message("Task created"))
}

#[instrument(skip(state, user, payload), fields(user_id = user.0.id))]
pub async fn update_task(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateTaskRequest>,
) -> ApiResult<ApiResponse<Task>> {
    let task = services::update(state.tasks.as_ref(), &user.0, id, payload).await?;
    Ok(ApiResponse::ok(task).message("Task updated"))
}

#[instrument(skip(state, user), fields(user_id = user.0.id))]
pub async fn delete_task(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
) -> ApiResult<ApiResponse<()>> {
    services::delete(state.tasks.as_ref(), &user.0, id).await?;
    Ok(ApiResponse::ack("Task deleted"))
}
