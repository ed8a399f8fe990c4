//! Abstraction over the search engine the [`Dispatcher`](crate::elastic::dispatcher::Dispatcher) writes to.

use std::future::Future;

use serde_json::Value;

use crate::elastic::error::StoreError;
use crate::elastic::request::{BulkRequest, WriteRequest};
use crate::elastic::response::{Acknowledged, BulkResponse, GetResponse, WriteResponse};

/// Calls supported by the search engine.
///
/// [`HttpStore`](crate::elastic::http::HttpStore) talks to Elasticsearch over its REST API.
/// Implementations do not limit concurrency themselves; that is the dispatcher's job.
pub trait Store: Send + Sync + 'static {
    /// Creates an index; `body` holds its settings and mappings.
    fn create_index(
        &self,
        name: &str,
        body: &Value,
    ) -> impl Future<Output = Result<Acknowledged, StoreError>> + Send;

    /// Deletes an index. Fails with [`StoreError::NotFound`] if it does not exist.
    fn delete_index(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Acknowledged, StoreError>> + Send;

    /// Opens an index. Fails with [`StoreError::NotFound`] if it does not exist.
    fn open_index(&self, name: &str)
        -> impl Future<Output = Result<Acknowledged, StoreError>> + Send;

    fn get_document(
        &self,
        index: &str,
        doc_type: &str,
        id: &str,
    ) -> impl Future<Output = Result<GetResponse, StoreError>> + Send;

    fn index_document(
        &self,
        request: WriteRequest,
    ) -> impl Future<Output = Result<WriteResponse, StoreError>> + Send;

    fn bulk(
        &self,
        request: BulkRequest,
    ) -> impl Future<Output = Result<BulkResponse, StoreError>> + Send;
}
