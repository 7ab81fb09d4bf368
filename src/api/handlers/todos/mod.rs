//! Todo endpoints: owner-scoped CRUD with soft deletion.
//!
//! Every route authenticates first, then queries strictly within the
//! authenticated owner's visible rows. Ownership misses and nonexistent ids
//! produce the same 404.

pub(crate) mod storage;
pub(crate) mod tags;
pub(crate) mod types;

use axum::{
    Json,
    extract::{Extension, Path, Query},
    http::{HeaderMap, StatusCode},
};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::{
    error::ApiError,
    response::{ApiResponse, Page, total_pages},
};

use super::auth::{AuthState, principal::require_auth};

use self::storage::NewTodo;
use self::tags::extract_tags;
use self::types::{
    ListFilter, Priority, TodoCreateRequest, TodoListQuery, TodoResponse, TodoStatus,
    TodoUpdateRequest,
};

const TITLE_MAX_CHARS: usize = 255;

fn valid_title(title: &str) -> bool {
    let length = title.chars().count();
    (1..=TITLE_MAX_CHARS).contains(&length)
}

#[utoipa::path(
    get,
    path = "/v1/todos",
    params(TodoListQuery),
    responses(
        (status = 200, description = "Page of the caller's todos", body = ApiResponse<Page<TodoResponse>>),
        (status = 401, description = "Missing or invalid access token"),
        (status = 422, description = "Invalid pagination, filter, or sort parameter"),
    ),
    tag = "todos"
)]
pub async fn list_todos(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    Query(query): Query<TodoListQuery>,
) -> Result<Json<ApiResponse<Page<TodoResponse>>>, ApiError> {
    let principal = require_auth(&headers, &pool, &auth_state).await?;

    let filter = ListFilter::try_from_query(&query).map_err(ApiError::Validation)?;

    let (todos, total) = storage::list_todos(&pool, principal.user.id, &filter).await?;

    let page = Page {
        items: todos.into_iter().map(TodoResponse::from).collect(),
        page: filter.page,
        per_page: filter.per_page,
        total,
        total_pages: total_pages(total, filter.per_page),
    };

    Ok(Json(ApiResponse::ok(page)))
}

#[utoipa::path(
    post,
    path = "/v1/todos",
    request_body = TodoCreateRequest,
    responses(
        (status = 201, description = "Todo created; owner stamped from the authenticated identity", body = ApiResponse<TodoResponse>),
        (status = 401, description = "Missing or invalid access token"),
        (status = 422, description = "Invalid title or enum value"),
    ),
    tag = "todos"
)]
pub async fn create_todo(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<TodoCreateRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<TodoResponse>>), ApiError> {
    let principal = require_auth(&headers, &pool, &auth_state).await?;

    let Some(Json(payload)) = payload else {
        return Err(ApiError::Validation(
            "Missing or malformed JSON payload".to_string(),
        ));
    };

    if !valid_title(&payload.title) {
        return Err(ApiError::Validation(
            "Title must be between 1 and 255 characters".to_string(),
        ));
    }

    let status = payload.status.unwrap_or(TodoStatus::Pending);
    let priority = payload.priority.unwrap_or(Priority::Medium);
    let tags = extract_tags(&payload.title, payload.description.as_deref());

    let todo = storage::insert_todo(
        &pool,
        principal.user.id,
        NewTodo {
            title: &payload.title,
            description: payload.description.as_deref(),
            status,
            priority,
            due_date: payload.due_date,
            tags,
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(TodoResponse::from(todo))),
    ))
}

#[utoipa::path(
    get,
    path = "/v1/todos/{todo_id}",
    params(("todo_id" = Uuid, Path, description = "Todo id")),
    responses(
        (status = 200, description = "The todo", body = ApiResponse<TodoResponse>),
        (status = 401, description = "Missing or invalid access token"),
        (status = 404, description = "Missing, deleted, or owned by someone else"),
    ),
    tag = "todos"
)]
pub async fn get_todo(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    Path(todo_id): Path<Uuid>,
) -> Result<Json<ApiResponse<TodoResponse>>, ApiError> {
    let principal = require_auth(&headers, &pool, &auth_state).await?;

    let Some(todo) = storage::fetch_todo(&pool, todo_id, principal.user.id).await? else {
        return Err(ApiError::NotFound("Todo not found"));
    };

    Ok(Json(ApiResponse::ok(TodoResponse::from(todo))))
}

#[utoipa::path(
    patch,
    path = "/v1/todos/{todo_id}",
    params(("todo_id" = Uuid, Path, description = "Todo id")),
    request_body = TodoUpdateRequest,
    responses(
        (status = 200, description = "Updated todo; only supplied fields changed", body = ApiResponse<TodoResponse>),
        (status = 401, description = "Missing or invalid access token"),
        (status = 404, description = "Missing, deleted, or owned by someone else"),
        (status = 422, description = "Invalid title or enum value"),
    ),
    tag = "todos"
)]
pub async fn update_todo(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    Path(todo_id): Path<Uuid>,
    payload: Option<Json<TodoUpdateRequest>>,
) -> Result<Json<ApiResponse<TodoResponse>>, ApiError> {
    let principal = require_auth(&headers, &pool, &auth_state).await?;

    let Some(Json(update)) = payload else {
        return Err(ApiError::Validation(
            "Missing or malformed JSON payload".to_string(),
        ));
    };

    if let Some(title) = &update.title {
        if !valid_title(title) {
            return Err(ApiError::Validation(
                "Title must be between 1 and 255 characters".to_string(),
            ));
        }
    }

    let Some(existing) = storage::fetch_todo(&pool, todo_id, principal.user.id).await? else {
        return Err(ApiError::NotFound("Todo not found"));
    };

    // Merge supplied fields over the stored row. Tags are derived, so they
    // are recomputed whenever the text they derive from changes.
    let text_changed = update.title.is_some() || update.description.is_some();
    let title = update.title.unwrap_or(existing.title);
    let description = match update.description {
        Some(value) => value,
        None => existing.description,
    };
    let status = update.status.unwrap_or(existing.status);
    let priority = update.priority.unwrap_or(existing.priority);
    let due_date = match update.due_date {
        Some(value) => value,
        None => existing.due_date,
    };
    let tags = if text_changed {
        extract_tags(&title, description.as_deref())
    } else {
        existing.tags
    };

    let updated = storage::update_todo(
        &pool,
        todo_id,
        principal.user.id,
        NewTodo {
            title: &title,
            description: description.as_deref(),
            status,
            priority,
            due_date,
            tags,
        },
    )
    .await?;

    // The row can vanish between fetch and update; both read as absent.
    let Some(todo) = updated else {
        return Err(ApiError::NotFound("Todo not found"));
    };

    Ok(Json(ApiResponse::ok(TodoResponse::from(todo))))
}

#[utoipa::path(
    delete,
    path = "/v1/todos/{todo_id}",
    params(("todo_id" = Uuid, Path, description = "Todo id")),
    responses(
        (status = 200, description = "Todo soft-deleted; the row is retained but invisible"),
        (status = 401, description = "Missing or invalid access token"),
        (status = 404, description = "Missing, already deleted, or owned by someone else"),
    ),
    tag = "todos"
)]
pub async fn delete_todo(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    Path(todo_id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let principal = require_auth(&headers, &pool, &auth_state).await?;

    if !storage::soft_delete_todo(&pool, todo_id, principal.user.id).await? {
        return Err(ApiError::NotFound("Todo not found"));
    }

    Ok(Json(ApiResponse::empty()))
}

#[cfg(test)]
mod tests {
    use super::valid_title;

    #[test]
    fn title_bounds() {
        assert!(!valid_title(""));
        assert!(valid_title("x"));
        assert!(valid_title(&"x".repeat(255)));
        assert!(!valid_title(&"x".repeat(256)));
    }

    #[test]
    fn title_length_counts_chars_not_bytes() {
        assert!(valid_title(&"ü".repeat(255)));
    }
}
