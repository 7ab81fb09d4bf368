//! Response envelope shared by every endpoint.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// Standard envelope: exactly one of `data`/`error` carries a value, except
/// for operations with no payload where both are null on success.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl<T: Serialize> ApiResponse<T> {
    #[must_use]
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: Utc::now(),
        }
    }
}

impl ApiResponse<()> {
    /// Success without a payload (logout, delete).
    #[must_use]
    pub fn empty() -> Self {
        Self {
            success: true,
            data: None,
            error: None,
            timestamp: Utc::now(),
        }
    }

    #[must_use]
    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            timestamp: Utc::now(),
        }
    }
}

/// Paginated collection wrapper for list endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
    pub total_pages: u64,
}

/// Ceiling division matching the listing contract; zero rows yield zero pages.
#[must_use]
pub fn total_pages(total: u64, per_page: u32) -> u64 {
    if total == 0 {
        return 0;
    }
    total.div_ceil(u64::from(per_page))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_sets_data_and_clears_error() {
        let response = ApiResponse::ok("payload");
        assert!(response.success);
        assert_eq!(response.data, Some("payload"));
        assert_eq!(response.error, None);
    }

    #[test]
    fn err_sets_error_and_clears_data() {
        let response = ApiResponse::err("boom");
        assert!(!response.success);
        assert_eq!(response.data, None);
        assert_eq!(response.error.as_deref(), Some("boom"));
    }

    #[test]
    fn envelope_serializes_all_keys() {
        let value = serde_json::to_value(ApiResponse::ok(1)).expect("json");
        let object = value.as_object().expect("object");
        assert!(object.contains_key("success"));
        assert!(object.contains_key("data"));
        assert!(object.contains_key("error"));
        assert!(object.contains_key("timestamp"));
        assert_eq!(object["error"], serde_json::Value::Null);
    }

    #[test]
    fn empty_success_has_null_data() {
        let value = serde_json::to_value(ApiResponse::empty()).expect("json");
        assert_eq!(value["success"], serde_json::Value::Bool(true));
        assert_eq!(value["data"], serde_json::Value::Null);
        assert_eq!(value["error"], serde_json::Value::Null);
    }

    #[test]
    fn total_pages_uses_ceiling_division() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(50, 10), 5);
    }
}
