//! Responses returned by Elasticsearch.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

/// Response to administrative calls (create, delete or open index).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Acknowledged {
    #[serde(default)]
    pub acknowledged: bool,
}

/// Response to a document lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct GetResponse {
    #[serde(default)]
    pub found: bool,
}

/// What happened to a document that was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteResult {
    Created,
    Updated,
    Deleted,
    NotFound,
    Noop,
    #[serde(other)]
    Unknown,
}

/// Response to a single document write.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WriteResponse {
    #[serde(rename = "_index")]
    pub index: String,

    #[serde(rename = "_id")]
    pub id: String,

    pub result: WriteResult,
}

/// Result of one action within a bulk request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BulkItem {
    #[serde(rename = "_index", default)]
    pub index: String,

    #[serde(rename = "_id", default)]
    pub id: String,

    pub status: u16,

    #[serde(default)]
    pub result: Option<WriteResult>,

    #[serde(default)]
    pub error: Option<Value>,
}

/// Response to a bulk request.
///
/// A bulk request can partially fail: [`errors`](Self::errors) is set if at least one
/// item failed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BulkResponse {
    #[serde(default)]
    pub took: u64,

    #[serde(default)]
    pub errors: bool,

    /// One entry per action, keyed by the action name (`index`, `create`, etc.).
    #[serde(default)]
    pub items: Vec<HashMap<String, BulkItem>>,
}

impl BulkResponse {
    pub fn items(&self) -> impl Iterator<Item = &BulkItem> {
        self.items.iter().flat_map(|item| item.values())
    }

    pub fn failed_items(&self) -> impl Iterator<Item = &BulkItem> {
        self.items().filter(|item| item.error.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_response() {
        let json = r#"{
            "_index": "enwiki",
            "_type": "wikipage",
            "_id": "12",
            "_version": 2,
            "result": "updated",
            "_shards": {"total": 2, "successful": 1, "failed": 0}
        }"#;

        let response: WriteResponse = serde_json::from_str(json).unwrap();
        assert_eq!("enwiki", response.index);
        assert_eq!("12", response.id);
        assert_eq!(WriteResult::Updated, response.result);
    }

    #[test]
    fn test_unknown_write_result() {
        let response: WriteResponse =
            serde_json::from_str(r#"{"_index": "i", "_id": "1", "result": "exploded"}"#).unwrap();

        assert_eq!(WriteResult::Unknown, response.result);
    }

    #[test]
    fn test_bulk_response_with_failures() {
        let json = r#"{
            "took": 30,
            "errors": true,
            "items": [
                {"index": {"_index": "enwiki", "_id": "1", "status": 201, "result": "created"}},
                {"index": {"_index": "enwiki", "_id": "2", "status": 400,
                    "error": {"type": "mapper_parsing_exception", "reason": "failed to parse"}}}
            ]
        }"#;

        let response: BulkResponse = serde_json::from_str(json).unwrap();
        assert!(response.errors);
        assert_eq!(2, response.items().count());

        let failed: Vec<_> = response.failed_items().map(|item| item.id.as_str()).collect();
        assert_eq!(vec!["2"], failed);
    }
}
