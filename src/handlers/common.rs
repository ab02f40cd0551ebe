use crate::errors::{ApiError, ServiceError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use validator::Validate;

/// Success payloads go over the wire wrapped as `{ "data": ... }`.
#[derive(Debug, Serialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

pub fn success_response<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(DataEnvelope { data })).into_response()
}

pub fn created_response<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(DataEnvelope { data })).into_response()
}

pub fn no_content_response() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

/// Validate request input
pub fn validate_input<T: Validate>(input: &T) -> Result<(), ApiError> {
    input
        .validate()
        .map_err(|e| ApiError::ValidationError(format!("Validation failed: {}", e)))
}

/// Map service errors to API errors
pub fn map_service_error(err: ServiceError) -> ApiError {
    ApiError::ServiceError(err)
}

/// List payload with pagination metadata, still under the `data` key.
/// `limit` is the resolved page size, not the raw query value.
#[derive(Debug, Serialize)]
pub struct PagedResult<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub limit: u64,
    pub total: u64,
}

impl<T> PagedResult<T> {
    pub fn new(items: Vec<T>, page: u64, limit: u64, total: u64) -> Self {
        Self {
            items,
            page,
            limit,
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paged_result_carries_resolved_limit() {
        let value = serde_json::to_value(PagedResult::new(vec![1, 2], 2, 10, 42)).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "items": [1, 2], "page": 2, "limit": 10, "total": 42 })
        );
    }

    #[test]
    fn envelope_wraps_under_data_key() {
        let value =
            serde_json::to_value(DataEnvelope { data: vec![1, 2, 3] }).unwrap();
        assert_eq!(value, serde_json::json!({ "data": [1, 2, 3] }));
    }
}
