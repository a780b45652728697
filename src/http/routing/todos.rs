use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{routing::get, Json, Router};

use crate::application::todo_service::TodoService;
use crate::domain::todo::{TodoId, TodoInput};
use crate::http::types::{ApiError, ListParams, TodoRequest, TodoResponse};
use crate::http::validation::{parse_completed_flag, validate_request};

#[derive(Clone)]
pub struct AppState<S: TodoService> { pub service: S }

pub fn router<S: TodoService + Clone>(state: AppState<S>) -> Router {
    Router::new()
        .route("/api/todos", get(list_todos::<S>).post(create_todo::<S>))
        .route("/api/todos/:id", get(get_todo::<S>).put(update_todo::<S>).delete(delete_todo::<S>))
        .with_state(state)
}

async fn list_todos<S: TodoService>(
    State(state): State<AppState<S>>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<TodoResponse>>, ApiError> {
    let Query(params) = params.map_err(|rejection| ApiError::Validation(vec![rejection.body_text()]))?;
    let todos = match parse_completed_flag(params.completed.as_deref()).map_err(ApiError::Validation)? {
        Some(completed) => state.service.list_by_completion(completed).await?,
        None => state.service.list_all().await?,
    };
    Ok(Json(todos.into_iter().map(TodoResponse::from).collect()))
}

async fn get_todo<S: TodoService>(
    State(state): State<AppState<S>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<TodoResponse>, ApiError> {
    let todo = state.service.get_by_id(todo_id(id)?).await?;
    Ok(Json(todo.into()))
}

async fn create_todo<S: TodoService>(
    State(state): State<AppState<S>>,
    payload: Result<Json<TodoRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TodoResponse>), ApiError> {
    let todo = state.service.create(todo_input(payload)?).await?;
    Ok((StatusCode::CREATED, Json(todo.into())))
}

async fn update_todo<S: TodoService>(
    State(state): State<AppState<S>>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<TodoRequest>, JsonRejection>,
) -> Result<Json<TodoResponse>, ApiError> {
    let id = todo_id(id)?;
    let todo = state.service.update(id, todo_input(payload)?).await?;
    Ok(Json(todo.into()))
}

async fn delete_todo<S: TodoService>(
    State(state): State<AppState<S>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    state.service.delete(todo_id(id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn todo_id(path: Result<Path<i64>, PathRejection>) -> Result<TodoId, ApiError> {
    path.map(|Path(id)| TodoId(id))
        .map_err(|_| ApiError::Validation(vec!["id: must be an integer".into()]))
}

fn todo_input(payload: Result<Json<TodoRequest>, JsonRejection>) -> Result<TodoInput, ApiError> {
    let Json(request) = payload.map_err(|rejection| ApiError::Validation(vec![rejection.body_text()]))?;
    validate_request(request).map_err(ApiError::Validation)
}
