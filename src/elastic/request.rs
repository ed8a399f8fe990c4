//! Requests sent to Elasticsearch, and the validation applied before building them.

use serde_json::{json, Map, Value};

use crate::elastic::config::IndexConfig;
use crate::elastic::document::Document;

/// Determines if `document` can be written to the given index.
///
/// The document needs a positive id and a non-empty title; index name and type must not be empty.
pub fn is_valid_request<D>(index: &str, doc_type: &str, document: &D) -> bool
where
    D: Document + ?Sized,
{
    document.id() > 0 && !document.title().is_empty() && !index.is_empty() && !doc_type.is_empty()
}

/// Request to create or replace one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteRequest {
    pub index: String,
    pub doc_type: String,
    pub id: String,

    /// Serialized document.
    pub source: String,
}

impl WriteRequest {
    pub fn new<D>(index: &str, doc_type: &str, document: &D) -> serde_json::Result<Self>
    where
        D: Document + ?Sized,
    {
        Ok(Self {
            index: index.into(),
            doc_type: doc_type.into(),
            id: document.id().to_string(),
            source: serde_json::to_string(document)?,
        })
    }
}

/// Multiple [`WriteRequest`]s sent in one call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkRequest {
    requests: Vec<WriteRequest>,
}

impl BulkRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, request: WriteRequest) {
        self.requests.push(request);
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn requests(&self) -> &[WriteRequest] {
        &self.requests
    }

    /// Renders the request body in the newline-delimited format expected by `_bulk`.
    pub fn to_ndjson(&self) -> String {
        let mut body = String::new();
        for request in &self.requests {
            let action = json!({
                "index": {
                    "_index": request.index,
                    "_type": request.doc_type,
                    "_id": request.id,
                }
            });
            body.push_str(&action.to_string());
            body.push('\n');
            body.push_str(&request.source);
            body.push('\n');
        }
        body
    }
}

/// Builds the body of a create-index request.
///
/// Shard and replica counts are always set. The raw settings payload, if any, is flattened
/// to dotted keys and merged on top of them, so it can override the counts. The raw mapping
/// payload is registered for the document type.
pub fn create_index_body(config: &IndexConfig) -> serde_json::Result<Value> {
    let mut settings = Map::new();
    settings.insert("index.number_of_shards".into(), config.shards.into());
    settings.insert("index.number_of_replicas".into(), config.replicas.into());

    if let Some(payload) = non_empty(config.settings.as_deref()) {
        match serde_json::from_str(payload)? {
            extra @ Value::Object(_) => flatten_settings(None, extra, &mut settings),
            _ => return Err(serde::de::Error::custom("index settings must be a JSON object")),
        }
    }

    let mut body = Map::new();
    body.insert("settings".into(), Value::Object(settings));
    if let Some(payload) = non_empty(config.mapping.as_deref()) {
        let mut mappings = Map::new();
        mappings.insert(config.doc_type.clone(), serde_json::from_str(payload)?);
        body.insert("mappings".into(), Value::Object(mappings));
    }

    Ok(Value::Object(body))
}

/// Inserts `value` in `settings`, nested objects becoming `parent.child` keys.
fn flatten_settings(prefix: Option<&str>, value: Value, settings: &mut Map<String, Value>) {
    match (prefix, value) {
        (Some(prefix), Value::Object(object)) if object.is_empty() => {
            settings.insert(prefix.into(), Value::Object(object));
        },
        (prefix, Value::Object(object)) => {
            for (key, value) in object {
                let key = match prefix {
                    Some(prefix) => format!("{prefix}.{key}"),
                    None => key,
                };
                flatten_settings(Some(&key), value, settings);
            }
        },
        (Some(prefix), value) => {
            settings.insert(prefix.into(), value);
        },
        (None, _) => (),
    }
}

fn non_empty(payload: Option<&str>) -> Option<&str> {
    payload.filter(|payload| !payload.trim().is_empty())
}
