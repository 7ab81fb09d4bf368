//! Owner-scoped SQL storage for todos.
//!
//! Every accessor composes the same visibility predicate:
//! `user_id = <owner> AND deleted_at IS NULL`, plus `id = <id>` for single
//! rows. A miss on any clause is a plain "absent" result; callers cannot
//! distinguish a foreign row from a missing one.

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Duration, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder, Row, postgres::PgRow};
use tracing::Instrument;
use uuid::Uuid;

use super::types::{DueWindow, ListFilter, Priority, TodoStatus};

#[derive(Debug, Clone)]
pub(crate) struct TodoRecord {
    pub(crate) id: Uuid,
    pub(crate) user_id: Uuid,
    pub(crate) title: String,
    pub(crate) description: Option<String>,
    pub(crate) status: TodoStatus,
    pub(crate) priority: Priority,
    pub(crate) due_date: Option<DateTime<Utc>>,
    pub(crate) tags: Vec<String>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

/// Fields for a new row; the owner always comes from the authenticated
/// identity, never from client input.
pub(super) struct NewTodo<'a> {
    pub(super) title: &'a str,
    pub(super) description: Option<&'a str>,
    pub(super) status: TodoStatus,
    pub(super) priority: Priority,
    pub(super) due_date: Option<DateTime<Utc>>,
    pub(super) tags: Vec<String>,
}

const TODO_COLUMNS: &str =
    "id, user_id, title, description, status, priority, due_date, tags, created_at, updated_at";

fn todo_from_row(row: &PgRow) -> Result<TodoRecord> {
    let status: String = row.get("status");
    let priority: String = row.get("priority");
    Ok(TodoRecord {
        id: row.get("id"),
        user_id: row.get("user_id"),
        title: row.get("title"),
        description: row.get("description"),
        status: TodoStatus::parse(&status).map_err(|err| anyhow!("corrupt status column: {err}"))?,
        priority: Priority::parse(&priority)
            .map_err(|err| anyhow!("corrupt priority column: {err}"))?,
        due_date: row.get("due_date"),
        tags: row.get("tags"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

pub(super) async fn insert_todo(
    pool: &PgPool,
    user_id: Uuid,
    todo: NewTodo<'_>,
) -> Result<TodoRecord> {
    let query = format!(
        r"
        INSERT INTO todos (user_id, title, description, status, priority, due_date, tags)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING {TODO_COLUMNS}
        "
    );
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query.as_str()
    );
    let row = sqlx::query(&query)
        .bind(user_id)
        .bind(todo.title)
        .bind(todo.description)
        .bind(todo.status.as_str())
        .bind(todo.priority.as_str())
        .bind(todo.due_date)
        .bind(&todo.tags)
        .fetch_one(pool)
        .instrument(span)
        .await
        .context("failed to insert todo")?;
    todo_from_row(&row)
}

/// Fetch one todo visible to `user_id`. `Ok(None)` covers missing, foreign,
/// and soft-deleted rows alike.
pub(super) async fn fetch_todo(
    pool: &PgPool,
    todo_id: Uuid,
    user_id: Uuid,
) -> Result<Option<TodoRecord>> {
    let query = format!(
        r"
        SELECT {TODO_COLUMNS}
        FROM todos
        WHERE id = $1 AND user_id = $2 AND deleted_at IS NULL
        "
    );
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query.as_str()
    );
    let row = sqlx::query(&query)
        .bind(todo_id)
        .bind(user_id)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to fetch todo")?;
    row.as_ref().map(todo_from_row).transpose()
}

/// Half-open due-date bounds for the window filters, anchored to the current
/// UTC day.
fn due_range(window: DueWindow) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
    let day_start = Utc::now()
        .date_naive()
        .and_time(chrono::NaiveTime::MIN)
        .and_utc();
    let next_day_start = day_start + Duration::days(1);
    match window {
        DueWindow::Today => (Some(day_start), Some(next_day_start)),
        DueWindow::Upcoming => (Some(next_day_start), None),
    }
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, user_id: Uuid, filter: &ListFilter) {
    builder.push(" WHERE user_id = ");
    builder.push_bind(user_id);
    builder.push(" AND deleted_at IS NULL");

    if let Some(status) = filter.status {
        builder.push(" AND status = ");
        builder.push_bind(status.as_str());
    }
    if let Some(priority) = filter.priority {
        builder.push(" AND priority = ");
        builder.push_bind(priority.as_str());
    }
    if let Some(window) = filter.due {
        let (from, until) = due_range(window);
        builder.push(" AND due_date IS NOT NULL");
        if let Some(from) = from {
            builder.push(" AND due_date >= ");
            builder.push_bind(from);
        }
        if let Some(until) = until {
            builder.push(" AND due_date < ");
            builder.push_bind(until);
        }
    }
}

/// List todos visible to `user_id` with filters, sorting, and pagination.
/// Returns the page of rows plus the total match count.
pub(super) async fn list_todos(
    pool: &PgPool,
    user_id: Uuid,
    filter: &ListFilter,
) -> Result<(Vec<TodoRecord>, u64)> {
    let mut count_builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) AS total FROM todos");
    push_filters(&mut count_builder, user_id, filter);
    let count_span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = "count todos"
    );
    let total: i64 = count_builder
        .build()
        .fetch_one(pool)
        .instrument(count_span)
        .await
        .context("failed to count todos")?
        .get("total");

    let mut builder =
        QueryBuilder::<Postgres>::new(format!("SELECT {TODO_COLUMNS} FROM todos"));
    push_filters(&mut builder, user_id, filter);
    // Sort column and direction come from fixed enum identifiers, never from
    // raw client input.
    builder.push(format!(
        " ORDER BY {} {}",
        filter.sort_by.column(),
        filter.sort_order.keyword()
    ));
    builder.push(" LIMIT ");
    builder.push_bind(i64::from(filter.per_page));
    builder.push(" OFFSET ");
    builder.push_bind(i64::from(filter.page - 1) * i64::from(filter.per_page));

    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = "list todos"
    );
    let rows = builder
        .build()
        .fetch_all(pool)
        .instrument(span)
        .await
        .context("failed to list todos")?;

    let todos = rows
        .iter()
        .map(todo_from_row)
        .collect::<Result<Vec<_>>>()?;

    Ok((todos, u64::try_from(total).unwrap_or(0)))
}

/// Persist a fully merged todo (partial updates are merged by the caller)
/// and refresh `updated_at`. `Ok(None)` when the row is not visible to
/// `user_id` anymore.
pub(super) async fn update_todo(
    pool: &PgPool,
    todo_id: Uuid,
    user_id: Uuid,
    todo: NewTodo<'_>,
) -> Result<Option<TodoRecord>> {
    let query = format!(
        r"
        UPDATE todos
        SET title = $3,
            description = $4,
            status = $5,
            priority = $6,
            due_date = $7,
            tags = $8,
            updated_at = NOW()
        WHERE id = $1 AND user_id = $2 AND deleted_at IS NULL
        RETURNING {TODO_COLUMNS}
        "
    );
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query.as_str()
    );
    let row = sqlx::query(&query)
        .bind(todo_id)
        .bind(user_id)
        .bind(todo.title)
        .bind(todo.description)
        .bind(todo.status.as_str())
        .bind(todo.priority.as_str())
        .bind(todo.due_date)
        .bind(&todo.tags)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to update todo")?;
    row.as_ref().map(todo_from_row).transpose()
}

/// Stamp `deleted_at` instead of removing the row. Returns whether a visible
/// row was stamped; a second delete finds nothing and reports `false`.
pub(super) async fn soft_delete_todo(pool: &PgPool, todo_id: Uuid, user_id: Uuid) -> Result<bool> {
    let query = r"
        UPDATE todos
        SET deleted_at = NOW(), updated_at = NOW()
        WHERE id = $1 AND user_id = $2 AND deleted_at IS NULL
        RETURNING id
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(todo_id)
        .bind(user_id)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to soft delete todo")?;
    Ok(row.is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::handlers::todos::types::{SortField, SortOrder};

    fn filter() -> ListFilter {
        ListFilter {
            page: 1,
            per_page: 20,
            status: None,
            priority: None,
            due: None,
            sort_by: SortField::CreatedAt,
            sort_order: SortOrder::Desc,
        }
    }

    #[test]
    fn filters_always_scope_owner_and_visibility() {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT 1 FROM todos");
        push_filters(&mut builder, Uuid::nil(), &filter());
        let sql = builder.sql();
        assert!(sql.contains("user_id = $1"));
        assert!(sql.contains("deleted_at IS NULL"));
    }

    #[test]
    fn status_and_priority_filters_add_bound_clauses() {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT 1 FROM todos");
        let filter = ListFilter {
            status: Some(TodoStatus::Pending),
            priority: Some(Priority::High),
            ..filter()
        };
        push_filters(&mut builder, Uuid::nil(), &filter);
        let sql = builder.sql();
        assert!(sql.contains("status = $2"));
        assert!(sql.contains("priority = $3"));
    }

    #[test]
    fn due_today_is_a_bounded_window() {
        let (from, until) = due_range(DueWindow::Today);
        let from = from.expect("from");
        let until = until.expect("until");
        assert_eq!(until - from, Duration::days(1));
    }

    #[test]
    fn due_upcoming_is_open_ended() {
        let (from, until) = due_range(DueWindow::Upcoming);
        assert!(from.is_some());
        assert_eq!(until, None);
    }
}
