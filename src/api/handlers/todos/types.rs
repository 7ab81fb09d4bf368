//! Request/response types and enums for todo endpoints.
//!
//! Enum inputs parse flexibly: surrounding whitespace is trimmed, case is
//! folded, and hyphens/spaces become underscores before matching, so
//! `"In-Progress"` and `"in progress"` both land on `in_progress`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::storage::TodoRecord;

fn normalize_variant(value: &str) -> String {
    value.trim().to_lowercase().replace(['-', ' '], "_")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum TodoStatus {
    Pending,
    InProgress,
    Completed,
}

impl TodoStatus {
    /// Parse user input after normalization; the error is the 422 message.
    pub fn parse(value: &str) -> Result<Self, String> {
        match normalize_variant(value).as_str() {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            other => Err(format!("Invalid status: {other}")),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }
}

impl TryFrom<String> for TodoStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    /// Parse user input after normalization; the error is the 422 message.
    pub fn parse(value: &str) -> Result<Self, String> {
        match normalize_variant(value).as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(format!("Invalid priority: {other}")),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl TryFrom<String> for Priority {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

/// Due-date window filter for the list endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueWindow {
    Today,
    Upcoming,
}

impl DueWindow {
    pub fn parse(value: &str) -> Result<Self, String> {
        match normalize_variant(value).as_str() {
            "today" => Ok(Self::Today),
            "upcoming" => Ok(Self::Upcoming),
            other => Err(format!("Invalid due filter: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    CreatedAt,
    DueDate,
    Priority,
}

impl SortField {
    pub fn parse(value: &str) -> Result<Self, String> {
        match normalize_variant(value).as_str() {
            "created_at" => Ok(Self::CreatedAt),
            "due_date" => Ok(Self::DueDate),
            "priority" => Ok(Self::Priority),
            other => Err(format!("Invalid sort field: {other}")),
        }
    }

    /// Column name interpolated into ORDER BY; variants map to fixed
    /// identifiers, never client input.
    #[must_use]
    pub fn column(self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::DueDate => "due_date",
            Self::Priority => "priority",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn parse(value: &str) -> Result<Self, String> {
        match normalize_variant(value).as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(format!("Invalid sort order: {other}")),
        }
    }

    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct TodoCreateRequest {
    pub title: String,
    pub description: Option<String>,
    pub status: Option<TodoStatus>,
    pub priority: Option<Priority>,
    pub due_date: Option<DateTime<Utc>>,
}

/// Partial update: a missing field is left unchanged, an explicit `null`
/// clears nullable fields.
#[derive(ToSchema, Deserialize, Debug, Default)]
pub struct TodoUpdateRequest {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub status: Option<TodoStatus>,
    pub priority: Option<Priority>,
    #[serde(default, deserialize_with = "double_option")]
    pub due_date: Option<Option<DateTime<Utc>>>,
}

impl TodoUpdateRequest {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.due_date.is_none()
    }
}

/// Distinguishes "field absent" from "field set to null".
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Raw query parameters for the list endpoint; values are validated and
/// parsed into a [`ListFilter`] by the handler.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TodoListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub due: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

pub const DEFAULT_PER_PAGE: u32 = 20;
pub const MAX_PER_PAGE: u32 = 100;

/// Validated listing parameters.
#[derive(Debug, Clone, Copy)]
pub struct ListFilter {
    pub page: u32,
    pub per_page: u32,
    pub status: Option<TodoStatus>,
    pub priority: Option<Priority>,
    pub due: Option<DueWindow>,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
}

impl ListFilter {
    /// Validate raw query parameters.
    ///
    /// # Errors
    /// Returns the 422 message for out-of-range pagination or unknown enum
    /// values.
    pub fn try_from_query(query: &TodoListQuery) -> Result<Self, String> {
        let page = query.page.unwrap_or(1);
        if page < 1 {
            return Err("page must be >= 1".to_string());
        }
        let per_page = query.per_page.unwrap_or(DEFAULT_PER_PAGE);
        if !(1..=MAX_PER_PAGE).contains(&per_page) {
            return Err(format!("per_page must be between 1 and {MAX_PER_PAGE}"));
        }

        let status = query
            .status
            .as_deref()
            .map(TodoStatus::parse)
            .transpose()?;
        let priority = query
            .priority
            .as_deref()
            .map(Priority::parse)
            .transpose()?;
        let due = query.due.as_deref().map(DueWindow::parse).transpose()?;
        let sort_by = query
            .sort_by
            .as_deref()
            .map(SortField::parse)
            .transpose()?
            .unwrap_or_default();
        let sort_order = query
            .sort_order
            .as_deref()
            .map(SortOrder::parse)
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            page,
            per_page,
            status,
            priority,
            due,
            sort_by,
            sort_order,
        })
    }
}

#[derive(ToSchema, Serialize, Debug)]
pub struct TodoResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: TodoStatus,
    pub priority: Priority,
    pub due_date: Option<DateTime<Utc>>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TodoRecord> for TodoResponse {
    fn from(record: TodoRecord) -> Self {
        Self {
            id: record.id,
            user_id: record.user_id,
            title: record.title,
            description: record.description,
            status: record.status,
            priority: record.priority,
            due_date: record.due_date,
            tags: record.tags,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_flexible_spellings() {
        assert_eq!(TodoStatus::parse("pending"), Ok(TodoStatus::Pending));
        assert_eq!(TodoStatus::parse("In-Progress"), Ok(TodoStatus::InProgress));
        assert_eq!(TodoStatus::parse("in progress"), Ok(TodoStatus::InProgress));
        assert_eq!(TodoStatus::parse("  COMPLETED  "), Ok(TodoStatus::Completed));
        assert!(TodoStatus::parse("done").is_err());
    }

    #[test]
    fn priority_parses_flexible_spellings() {
        assert_eq!(Priority::parse(" HIGH "), Ok(Priority::High));
        assert_eq!(Priority::parse("medium"), Ok(Priority::Medium));
        assert!(Priority::parse("urgent").is_err());
    }

    #[test]
    fn status_serializes_snake_case() {
        let value = serde_json::to_value(TodoStatus::InProgress).expect("json");
        assert_eq!(value, "in_progress");
        let decoded: TodoStatus = serde_json::from_value(serde_json::json!("In Progress"))
            .expect("flexible decode");
        assert_eq!(decoded, TodoStatus::InProgress);
    }

    #[test]
    fn update_request_distinguishes_null_from_absent() {
        let absent: TodoUpdateRequest = serde_json::from_str(r#"{"title":"x"}"#).expect("decode");
        assert_eq!(absent.description, None);

        let cleared: TodoUpdateRequest =
            serde_json::from_str(r#"{"description":null}"#).expect("decode");
        assert_eq!(cleared.description, Some(None));

        let set: TodoUpdateRequest =
            serde_json::from_str(r#"{"description":"notes"}"#).expect("decode");
        assert_eq!(set.description, Some(Some("notes".to_string())));
    }

    #[test]
    fn empty_update_detected() {
        let update: TodoUpdateRequest = serde_json::from_str("{}").expect("decode");
        assert!(update.is_empty());
        let update: TodoUpdateRequest =
            serde_json::from_str(r#"{"status":"completed"}"#).expect("decode");
        assert!(!update.is_empty());
    }

    #[test]
    fn list_filter_defaults() {
        let filter = ListFilter::try_from_query(&TodoListQuery::default()).expect("filter");
        assert_eq!(filter.page, 1);
        assert_eq!(filter.per_page, DEFAULT_PER_PAGE);
        assert_eq!(filter.sort_by, SortField::CreatedAt);
        assert_eq!(filter.sort_order, SortOrder::Desc);
        assert_eq!(filter.status, None);
    }

    #[test]
    fn list_filter_rejects_out_of_range_pagination() {
        let query = TodoListQuery {
            page: Some(0),
            ..TodoListQuery::default()
        };
        assert!(ListFilter::try_from_query(&query).is_err());

        let query = TodoListQuery {
            per_page: Some(0),
            ..TodoListQuery::default()
        };
        assert!(ListFilter::try_from_query(&query).is_err());

        let query = TodoListQuery {
            per_page: Some(MAX_PER_PAGE + 1),
            ..TodoListQuery::default()
        };
        assert!(ListFilter::try_from_query(&query).is_err());
    }

    #[test]
    fn list_filter_parses_filters_and_sort() {
        let query = TodoListQuery {
            status: Some("In-Progress".to_string()),
            priority: Some("high".to_string()),
            due: Some("upcoming".to_string()),
            sort_by: Some("due_date".to_string()),
            sort_order: Some("asc".to_string()),
            ..TodoListQuery::default()
        };
        let filter = ListFilter::try_from_query(&query).expect("filter");
        assert_eq!(filter.status, Some(TodoStatus::InProgress));
        assert_eq!(filter.priority, Some(Priority::High));
        assert_eq!(filter.due, Some(DueWindow::Upcoming));
        assert_eq!(filter.sort_by, SortField::DueDate);
        assert_eq!(filter.sort_order, SortOrder::Asc);
    }

    #[test]
    fn sort_field_columns_are_fixed_identifiers() {
        assert_eq!(SortField::CreatedAt.column(), "created_at");
        assert_eq!(SortField::DueDate.column(), "due_date");
        assert_eq!(SortField::Priority.column(), "priority");
        assert_eq!(SortOrder::Asc.keyword(), "ASC");
        assert_eq!(SortOrder::Desc.keyword(), "DESC");
    }
}
