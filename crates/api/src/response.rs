//! Success envelope shared by every JSON endpoint.
//!
//! ```json
//! { "success": true, "data": ..., "message": "...", "pagination": { "page": 1, "limit": 12, "total": 40, "pages": 4 } }
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::db::Page;

/// Paging metadata for list responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: i64,
    pub total: i64,
    pub pages: i64,
}

impl Pagination {
    #[must_use]
    pub fn new(page: Page, total: i64) -> Self {
        Self {
            page: page.number(),
            limit: page.limit(),
            total,
            pages: page.page_count(total),
        }
    }
}

/// A successful API response.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pagination: Option<Pagination>,
    #[serde(skip)]
    status: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 with `data`.
    pub const fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            message: None,
            pagination: None,
            status: StatusCode::OK,
        }
    }

    /// 201 with `data`.
    pub const fn created(data: T) -> Self {
        Self {
            success: true,
            data,
            message: None,
            pagination: None,
            status: StatusCode::CREATED,
        }
    }

    /// 200 with one page of `data`.
    pub fn paginated(data: T, page: Page, total: i64) -> Self {
        Self {
            pagination: Some(Pagination::new(page, total)),
            ..Self::ok(data)
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status;
        (status, Json(self)).into_response()
    }
}

/// Body-less success, e.g. after a delete.
#[must_use]
pub fn message_only(message: impl Into<String>) -> ApiResponse<serde_json::Value> {
    ApiResponse::ok(serde_json::Value::Null).with_message(message)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    async fn parts(response: Response) -> (StatusCode, serde_json::Value) {
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_ok_envelope() {
        let (status, json) = parts(ApiResponse::ok(vec![1, 2]).into_response()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], true);
        assert_eq!(json["data"], serde_json::json!([1, 2]));
        assert!(json.get("message").is_none());
        assert!(json.get("pagination").is_none());
        assert!(json.get("status").is_none());
    }

    #[tokio::test]
    async fn test_created_with_message() {
        let response = ApiResponse::created("x").with_message("Created").into_response();
        let (status, json) = parts(response).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json["message"], "Created");
    }

    #[tokio::test]
    async fn test_pagination_block() {
        let page = Page::new(Some(2), Some(10));
        let (_, json) = parts(ApiResponse::paginated(Vec::<u8>::new(), page, 25).into_response()).await;
        assert_eq!(
            json["pagination"],
            serde_json::json!({"page": 2, "limit": 10, "total": 25, "pages": 3})
        );
    }
}
