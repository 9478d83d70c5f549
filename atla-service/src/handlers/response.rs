//! Response envelopes for REST handlers
//!
//! Every body is a JSON object keyed by the resource name, so a list of
//! characters is `{"characters": [...], "metadata": {...}}` and a single one
//! is `{"character": {...}}`.
//!
//! ```rust
//! use atla_service::handlers::ItemResponse;
//! use axum::http::StatusCode;
//!
//! let response = ItemResponse::created("quote", 7);
//! assert_eq!(response.status, StatusCode::CREATED);
//! ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{ser::SerializeMap, Serialize, Serializer};

use crate::listing::Metadata;

/// A page of entities under `key`, followed by its metadata
#[derive(Debug, Clone)]
pub struct ListResponse<T> {
    pub key: &'static str,
    pub items: Vec<T>,
    pub metadata: Metadata,
}

impl<T> ListResponse<T> {
    pub fn new(key: &'static str, items: Vec<T>, metadata: Metadata) -> Self {
        Self { key, items, metadata }
    }
}

impl<T: Serialize> Serialize for ListResponse<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry(self.key, &self.items)?;
        map.serialize_entry("metadata", &self.metadata)?;
        map.end()
    }
}

impl<T: Serialize> IntoResponse for ListResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// A single value under `key`
///
/// Used both for one entity and for the unpaginated relation lists.
#[derive(Debug, Clone)]
pub struct ItemResponse<T> {
    pub key: &'static str,
    pub item: T,
    pub status: StatusCode,
}

impl<T> ItemResponse<T> {
    /// 200 OK
    pub fn ok(key: &'static str, item: T) -> Self {
        Self {
            key,
            item,
            status: StatusCode::OK,
        }
    }

    /// 201 Created
    pub fn created(key: &'static str, item: T) -> Self {
        Self {
            key,
            item,
            status: StatusCode::CREATED,
        }
    }
}

impl<T: Serialize> Serialize for ItemResponse<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.key, &self.item)?;
        map.end()
    }
}

impl<T: Serialize> IntoResponse for ItemResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(&self)).into_response()
    }
}

/// `{"message": "..."}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    /// The acknowledgement sent after a delete
    pub fn success() -> Self {
        Self {
            message: "success".to_string(),
        }
    }
}

impl IntoResponse for MessageResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_list_envelope() {
        let response = ListResponse::new("episodes", vec![json!({"id": 1})], Metadata::build(1, 1, 20));
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "episodes": [{"id": 1}],
                "metadata": {
                    "current_page": 1,
                    "page_size": 20,
                    "first_page": 1,
                    "last_page": 1,
                    "total_records": 1
                }
            })
        );
    }

    #[test]
    fn test_empty_list_envelope() {
        let response: ListResponse<i64> = ListResponse::new("quotes", Vec::new(), Metadata::default());
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"quotes": [], "metadata": {}})
        );
    }

    #[test]
    fn test_item_envelope() {
        let response = ItemResponse::ok("character", json!({"name": "Toph"}));
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"character": {"name": "Toph"}})
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(ItemResponse::created("quote", 1).into_response().status(), StatusCode::CREATED);
        assert_eq!(ItemResponse::ok("quote", 1).into_response().status(), StatusCode::OK);
        assert_eq!(MessageResponse::success().into_response().status(), StatusCode::OK);
    }
}
