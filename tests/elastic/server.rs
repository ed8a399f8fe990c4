pub(super) mod handler;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::Value;
use wiremock::http::Method;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer};

use crate::elastic::server::handler::{BulkHandler, DocumentHandler, IndexHandler};

const INDEX_PATH: &str = r"^/[^/_][^/]*$";
const OPEN_INDEX_PATH: &str = r"^/[^/]+/_open$";
const DOCUMENT_PATH: &str = r"^/[^/]+/[^/]+/[^/]+$";

/// Documents stored by the mock, per index then per id.
#[derive(Debug, Default)]
pub struct Indices(Mutex<HashMap<String, HashMap<String, Value>>>);

impl Indices {
    pub fn with<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut HashMap<String, HashMap<String, Value>>) -> R,
    {
        f(&mut self.0.lock().unwrap())
    }
}

/// Minimal in-memory Elasticsearch.
pub struct ElasticServer {
    mock_server: MockServer,
    indices: Arc<Indices>,
}

impl ElasticServer {
    pub async fn new() -> Self {
        let server = Self { mock_server: MockServer::start().await, indices: Arc::default() };
        server.install_handlers().await;
        server
    }

    pub fn url(&self) -> String {
        self.mock_server.uri()
    }

    pub fn add_index(&self, name: &str) {
        self.indices.with(|indices| {
            indices.entry(name.into()).or_default();
        });
    }

    pub fn has_index(&self, name: &str) -> bool {
        self.indices.with(|indices| indices.contains_key(name))
    }

    pub fn document(&self, index: &str, id: &str) -> Option<Value> {
        self.indices
            .with(|indices| indices.get(index).and_then(|documents| documents.get(id).cloned()))
    }

    pub fn document_count(&self, index: &str) -> usize {
        self.indices
            .with(|indices| indices.get(index).map_or(0, HashMap::len))
    }

    pub async fn received_requests(&self) -> usize {
        self.mock_server
            .received_requests()
            .await
            .map_or(0, |requests| requests.len())
    }

    async fn install_handlers(&self) {
        for index_method in [Method::PUT, Method::DELETE] {
            Mock::given(method(index_method))
                .and(path_regex(INDEX_PATH))
                .respond_with(IndexHandler::new(Arc::clone(&self.indices)))
                .mount(&self.mock_server)
                .await;
        }

        Mock::given(method(Method::POST))
            .and(path_regex(OPEN_INDEX_PATH))
            .respond_with(IndexHandler::new(Arc::clone(&self.indices)))
            .mount(&self.mock_server)
            .await;

        for document_method in [Method::GET, Method::PUT] {
            Mock::given(method(document_method))
                .and(path_regex(DOCUMENT_PATH))
                .respond_with(DocumentHandler::new(Arc::clone(&self.indices)))
                .mount(&self.mock_server)
                .await;
        }

        Mock::given(method(Method::POST))
            .and(path("/_bulk"))
            .respond_with(BulkHandler::new(Arc::clone(&self.indices)))
            .mount(&self.mock_server)
            .await;
    }
}
