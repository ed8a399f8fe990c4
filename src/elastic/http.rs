//! [`Store`] implementation talking to Elasticsearch over its REST API.

use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{instrument, trace};

use crate::elastic::error::StoreError;
use crate::elastic::request::{BulkRequest, WriteRequest};
use crate::elastic::response::{Acknowledged, BulkResponse, GetResponse, WriteResponse};
use crate::elastic::store::Store;

pub const DEFAULT_URL: &str = "http://localhost:9200";

const NDJSON_CONTENT_TYPE: &str = "application/x-ndjson";
const JSON_CONTENT_TYPE: &str = "application/json";

/// Elasticsearch client.
///
/// Cloning is cheap: clones share the same connection pool.
#[derive(Debug, Clone)]
pub struct HttpStore {
    http_client: reqwest::Client,
    base_url: Url,
}

impl HttpStore {
    /// Creates a client for the Elasticsearch instance at `base_url`.
    pub fn new(base_url: &str) -> Result<Self, StoreError> {
        let http_client = reqwest::Client::builder()
            .build()
            .map_err(StoreError::Transport)?;

        Self::with_client(http_client, base_url)
    }

    /// Creates a client using an existing [`reqwest::Client`].
    pub fn with_client(http_client: reqwest::Client, base_url: &str) -> Result<Self, StoreError> {
        let base_url = Url::parse(base_url)
            .map_err(|err| StoreError::InvalidUrl(format!("{base_url} ({err})")))?;
        if base_url.cannot_be_a_base() {
            return Err(StoreError::InvalidUrl(base_url.into()));
        }

        Ok(Self { http_client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, StoreError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        trace!(%method, %url);

        Ok(self.http_client.request(method, url))
    }

    async fn send<T>(&self, request: RequestBuilder) -> Result<T, StoreError>
    where
        T: DeserializeOwned,
    {
        let response = request.send().await.map_err(StoreError::Transport)?;
        let status = response.status();
        if status.is_success() {
            return response.json().await.map_err(StoreError::Decode);
        }

        let reason = error_reason(&response.text().await.unwrap_or_default());
        trace!(%status, reason);
        match status {
            StatusCode::NOT_FOUND => Err(StoreError::NotFound { reason }),
            status => Err(StoreError::Status { status: status.as_u16(), reason }),
        }
    }
}

impl Store for HttpStore {
    #[instrument(level = "trace", skip(self, body))]
    async fn create_index(&self, name: &str, body: &Value) -> Result<Acknowledged, StoreError> {
        let request = self.request(Method::PUT, &[name])?.json(body);
        self.send(request).await
    }

    #[instrument(level = "trace", skip(self))]
    async fn delete_index(&self, name: &str) -> Result<Acknowledged, StoreError> {
        let request = self.request(Method::DELETE, &[name])?;
        self.send(request).await
    }

    #[instrument(level = "trace", skip(self))]
    async fn open_index(&self, name: &str) -> Result<Acknowledged, StoreError> {
        let request = self.request(Method::POST, &[name, "_open"])?;
        self.send(request).await
    }

    #[instrument(level = "trace", skip(self))]
    async fn get_document(
        &self,
        index: &str,
        doc_type: &str,
        id: &str,
    ) -> Result<GetResponse, StoreError> {
        let request = self.request(Method::GET, &[index, doc_type, id])?;
        match self.send(request).await {
            Err(StoreError::NotFound { .. }) => Ok(GetResponse { found: false }),
            result => result,
        }
    }

    #[instrument(level = "trace", skip_all, fields(%request.index, %request.id))]
    async fn index_document(&self, request: WriteRequest) -> Result<WriteResponse, StoreError> {
        let WriteRequest { index, doc_type, id, source } = request;
        let request = self
            .request(Method::PUT, &[&index, &doc_type, &id])?
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .body(source);
        self.send(request).await
    }

    #[instrument(level = "trace", skip_all, fields(len = request.len()))]
    async fn bulk(&self, request: BulkRequest) -> Result<BulkResponse, StoreError> {
        let request = self
            .request(Method::POST, &["_bulk"])?
            .header(CONTENT_TYPE, NDJSON_CONTENT_TYPE)
            .body(request.to_ndjson());
        self.send(request).await
    }
}

/// Extracts a readable reason from an Elasticsearch error body.
///
/// Errors look like `{"error": {"type": "...", "reason": "..."}, "status": 404}`; older
/// versions sometimes return `{"error": "..."}`. Anything else is returned verbatim.
fn error_reason(body: &str) -> String {
    let error = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|mut value| value.get_mut("error").map(Value::take));

    match error {
        Some(Value::String(reason)) => reason,
        Some(Value::Object(error)) => {
            let kind = error.get("type").and_then(Value::as_str);
            let reason = error.get("reason").and_then(Value::as_str);
            match (kind, reason) {
                (Some(kind), Some(reason)) => format!("{kind}: {reason}"),
                (Some(kind), None) => kind.into(),
                (None, Some(reason)) => reason.into(),
                (None, None) => body.into(),
            }
        },
        _ => body.into(),
    }
}
