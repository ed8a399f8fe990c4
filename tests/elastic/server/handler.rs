use std::sync::Arc;

use serde_json::{json, Value};
use wiremock::http::Method;
use wiremock::{Request, Respond, ResponseTemplate};

use crate::elastic::server::Indices;

fn segments(request: &Request) -> Vec<String> {
    request
        .url
        .path_segments()
        .map(|segments| segments.map(Into::into).collect())
        .unwrap_or_default()
}

fn error(status: u16, kind: &str, reason: String) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(json!({
        "error": {"type": kind, "reason": reason},
        "status": status,
    }))
}

fn acknowledged(index: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"acknowledged": true, "index": index}))
}

/// Handles create, delete and open index requests.
pub struct IndexHandler {
    indices: Arc<Indices>,
}

impl IndexHandler {
    pub fn new(indices: Arc<Indices>) -> Self {
        Self { indices }
    }
}

impl Respond for IndexHandler {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let name = segments(request).remove(0);

        self.indices.with(|indices| {
            let exists = indices.contains_key(&name);
            if request.method == Method::PUT {
                if exists {
                    return error(
                        400,
                        "resource_already_exists_exception",
                        format!("index [{name}] already exists"),
                    );
                }
                if serde_json::from_slice::<Value>(&request.body).is_err() {
                    return error(400, "parse_exception", "malformed body".into());
                }
                indices.insert(name.clone(), Default::default());
                return acknowledged(&name);
            }

            if !exists {
                return error(404, "index_not_found_exception", format!("no such index [{name}]"));
            }
            if request.method == Method::DELETE {
                indices.remove(&name);
            }
            acknowledged(&name)
        })
    }
}

/// Handles single document reads and writes.
pub struct DocumentHandler {
    indices: Arc<Indices>,
}

impl DocumentHandler {
    pub fn new(indices: Arc<Indices>) -> Self {
        Self { indices }
    }
}

impl Respond for DocumentHandler {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let [index, _doc_type, id]: [String; 3] = segments(request).try_into().unwrap();

        if request.method == Method::GET {
            let found = self
                .indices
                .with(|indices| indices.get(&index).map(|documents| documents.contains_key(&id)));
            return match found {
                None => error(404, "index_not_found_exception", format!("no such index [{index}]")),
                Some(found) => ResponseTemplate::new(if found { 200 } else { 404 })
                    .set_body_json(json!({"_index": index, "_id": id, "found": found})),
            };
        }

        let Ok(source) = serde_json::from_slice::<Value>(&request.body) else {
            return error(400, "mapper_parsing_exception", "failed to parse".into());
        };
        let replaced = self.indices.with(|indices| {
            indices
                .entry(index.clone())
                .or_default()
                .insert(id.clone(), source)
                .is_some()
        });
        let (status, result) = if replaced { (200, "updated") } else { (201, "created") };

        ResponseTemplate::new(status)
            .set_body_json(json!({"_index": index, "_id": id, "result": result}))
    }
}

/// Handles bulk requests containing `index` actions.
pub struct BulkHandler {
    indices: Arc<Indices>,
}

impl BulkHandler {
    pub fn new(indices: Arc<Indices>) -> Self {
        Self { indices }
    }
}

impl Respond for BulkHandler {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body = String::from_utf8_lossy(&request.body);
        let lines: Vec<Value> = match body.lines().map(serde_json::from_str).collect() {
            Ok(lines) => lines,
            Err(err) => return error(400, "parse_exception", err.to_string()),
        };

        let items: Vec<Value> = self.indices.with(|indices| {
            lines
                .chunks(2)
                .map(|pair| {
                    let action = &pair[0]["index"];
                    let index = action["_index"].as_str().unwrap_or_default().to_string();
                    let id = action["_id"].as_str().unwrap_or_default().to_string();
                    let replaced = indices
                        .entry(index.clone())
                        .or_default()
                        .insert(id.clone(), pair[1].clone())
                        .is_some();
                    let (status, result) = if replaced { (200, "updated") } else { (201, "created") };
                    json!({"index": {"_index": index, "_id": id, "status": status, "result": result}})
                })
                .collect()
        });

        ResponseTemplate::new(200).set_body_json(json!({"took": 1, "errors": false, "items": items}))
    }
}
