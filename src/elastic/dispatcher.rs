//! Permit-gated dispatch of writes to a [`Store`].

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::spawn;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, error, info, instrument, trace, Instrument};

use crate::elastic::completion::{complete, CompletionHandler};
use crate::elastic::config::{DispatcherConfig, IndexConfig};
use crate::elastic::document::Document;
use crate::elastic::error::{DispatchError, StoreError};
use crate::elastic::request::{create_index_body, is_valid_request, BulkRequest, WriteRequest};
use crate::elastic::response::{Acknowledged, BulkResponse, WriteResponse};
use crate::elastic::store::Store;
use crate::limiter::{OwnedPermit, Permit, PermitPool};

/// Forwards document writes and administrative calls to a [`Store`], with at most
/// [`max_concurrency`](DispatcherConfig::max_concurrency) calls in flight at once.
///
/// Every call holds a permit from the dispatcher's [`PermitPool`] while it runs:
///
/// - Synchronous calls (everything except `*_async`) give their permit back as soon as
///   the store answers.
/// - Asynchronous writes only wait for a permit, then return a [`JoinHandle`] while the
///   write runs in the background. The permit is given back when the write finishes,
///   right before the [`CompletionHandler`] is called.
///
/// Documents that fail validation (see [`is_valid_request`]) are never sent and never
/// take a permit.
#[derive(Debug)]
pub struct Dispatcher<S> {
    store: Arc<S>,
    permits: PermitPool,
    completion_timeout: Option<Duration>,
}

impl<S> Dispatcher<S>
where
    S: Store,
{
    pub fn new(store: S, config: DispatcherConfig) -> Self {
        Self {
            store: Arc::new(store),
            permits: PermitPool::new(config.max_concurrency.get()),
            completion_timeout: config.completion_timeout,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn permits(&self) -> &PermitPool {
        &self.permits
    }

    /// Writes a document and waits for the result.
    #[instrument(level = "debug", skip(self, document), fields(id = document.id()))]
    pub async fn index_sync<D>(
        &self,
        index: &str,
        doc_type: &str,
        document: &D,
    ) -> Result<WriteResponse, DispatchError>
    where
        D: Document + ?Sized,
    {
        let request = Self::build_request(index, doc_type, document)?;

        let result = {
            let _permit = self.get_permit().await?;
            self.store.index_document(request).await
        };

        result.map_err(|error| {
            error!(%error, "failed inserting document with id {}", document.id());
            error.into()
        })
    }

    /// Starts writing a document in the background.
    ///
    /// Only waits for a permit. `handler` is called once the write completes.
    #[instrument(level = "debug", skip(self, document, handler), fields(id = document.id()))]
    pub async fn index_async<D, H>(
        &self,
        index: &str,
        doc_type: &str,
        document: &D,
        handler: H,
    ) -> Result<JoinHandle<()>, DispatchError>
    where
        D: Document + ?Sized,
        H: CompletionHandler<WriteResponse>,
    {
        let request = Self::build_request(index, doc_type, document)?;

        // Released by the completion of the write.
        let permit = self.get_owned_permit().await?;

        let store = Arc::clone(&self.store);
        let handle = self.submit(permit, handler, async move { store.index_document(request).await });
        trace!("Doc with id {} will be created asynchronously", document.id());

        Ok(handle)
    }

    /// Starts writing a batch of documents in the background, in a single bulk request.
    ///
    /// Invalid documents, and documents that cannot be serialized, are dropped from the
    /// batch. The whole batch uses one permit and `handler` is called once for the entire
    /// batch. If no document is left, nothing is sent and [`DispatchError::Invalid`] is
    /// returned.
    #[instrument(level = "debug", skip(self, documents, handler), fields(len = documents.len()))]
    pub async fn index_bulk_async<D, H>(
        &self,
        index: &str,
        doc_type: &str,
        documents: &[D],
        handler: H,
    ) -> Result<JoinHandle<()>, DispatchError>
    where
        D: Document,
        H: CompletionHandler<BulkResponse>,
    {
        let mut bulk = BulkRequest::new();
        let valid_documents = documents
            .iter()
            .filter(|document| is_valid_request(index, doc_type, *document));
        for document in valid_documents {
            match WriteRequest::new(index, doc_type, document) {
                Ok(request) => bulk.add(request),
                Err(error) => error!(%error, "failed to serialize document with id {}", document.id()),
            }
        }

        let dropped = documents.len() - bulk.len();
        if dropped > 0 {
            debug!("Dropped {dropped} invalid documents from bulk insert");
        }
        if bulk.is_empty() {
            debug!("No valid documents in bulk insert; skipping");
            return Err(DispatchError::Invalid);
        }

        // Released by the completion of the bulk request.
        let permit = self.get_owned_permit().await?;

        let len = bulk.len();
        let store = Arc::clone(&self.store);
        let handle = self.submit(permit, handler, async move { store.bulk(bulk).await });
        debug!("Bulk insert of {len} documents will be created asynchronously");

        Ok(handle)
    }

    /// Determines if a document exists. Any error is logged and reported as `false`.
    #[instrument(level = "debug", skip(self), ret(level = "trace"))]
    pub async fn exists(&self, index: &str, doc_type: &str, id: &str) -> bool {
        let Ok(_permit) = self.get_permit().await else {
            return false;
        };

        match self.store.get_document(index, doc_type, id).await {
            Ok(response) => response.found,
            Err(error) => {
                error!(%error, "failed to look up document with id {id} in index {index}");
                false
            },
        }
    }

    /// Determines if an index exists by opening it. Any error is reported as `false`.
    #[instrument(level = "debug", skip(self), ret(level = "trace"))]
    pub async fn index_exists(&self, name: &str) -> bool {
        let Ok(_permit) = self.get_permit().await else {
            return false;
        };

        match self.store.open_index(name).await {
            Ok(ack) => ack.acknowledged,
            Err(error) => {
                debug!(%error, "failed to open index {name}");
                false
            },
        }
    }

    /// Creates the index described by `config`.
    #[instrument(skip_all, fields(index = %config.index_name))]
    pub async fn create_index(&self, config: &IndexConfig) -> Result<Acknowledged, DispatchError> {
        if config.index_name.is_empty() {
            debug!("Cannot create index without a name");
            return Err(DispatchError::Invalid);
        }

        let body = create_index_body(config).map_err(|error| {
            error!(%error, "invalid settings or mapping for index {}", config.index_name);
            DispatchError::from(error)
        })?;
        trace!(%body);

        let result = {
            let _permit = self.get_permit().await?;
            self.store.create_index(&config.index_name, &body).await
        };

        match result {
            Ok(ack) => {
                info!("Index {} created successfully: {}", config.index_name, ack.acknowledged);
                Ok(ack)
            },
            Err(error) => {
                error!(%error, "failed to create index {}", config.index_name);
                Err(error.into())
            },
        }
    }

    /// Deletes an index.
    ///
    /// A missing index is not an error condition: it is logged as such and reported as
    /// [`DispatchError::NotFound`].
    #[instrument(skip(self))]
    pub async fn delete_index(&self, name: &str) -> Result<Acknowledged, DispatchError> {
        if name.is_empty() {
            return Err(DispatchError::Invalid);
        }

        let result = {
            let _permit = self.get_permit().await?;
            self.store.delete_index(name).await
        };

        match result {
            Ok(ack) => {
                info!("Index {name} deleted successfully: {}", ack.acknowledged);
                Ok(ack)
            },
            Err(StoreError::NotFound { .. }) => {
                info!("Index {name} not found");
                Err(DispatchError::NotFound(name.into()))
            },
            Err(error) => {
                debug!(%error, "failed to delete index {name}");
                Err(error.into())
            },
        }
    }

    fn build_request<D>(
        index: &str,
        doc_type: &str,
        document: &D,
    ) -> Result<WriteRequest, DispatchError>
    where
        D: Document + ?Sized,
    {
        if !is_valid_request(index, doc_type, document) {
            debug!("Invalid document or index target; skipping");
            return Err(DispatchError::Invalid);
        }

        Ok(WriteRequest::new(index, doc_type, document)?)
    }

    async fn get_permit(&self) -> Result<Permit<'_>, DispatchError> {
        self.permits.get_permit().await.map_err(|interrupted| {
            debug!(%interrupted);
            interrupted.into()
        })
    }

    async fn get_owned_permit(&self) -> Result<OwnedPermit, DispatchError> {
        self.permits.get_owned_permit().await.map_err(|interrupted| {
            debug!(%interrupted);
            interrupted.into()
        })
    }

    /// Runs `call` in the background; `permit` is released when it completes.
    fn submit<T, F, H>(&self, permit: OwnedPermit, handler: H, call: F) -> JoinHandle<()>
    where
        T: Send + 'static,
        F: Future<Output = Result<T, StoreError>> + Send + 'static,
        H: CompletionHandler<T>,
    {
        let completion_timeout = self.completion_timeout;

        spawn(
            async move {
                let result = match completion_timeout {
                    Some(limit) => timeout(limit, call)
                        .await
                        .unwrap_or(Err(StoreError::Timeout(limit))),
                    None => call.await,
                };
                complete(permit, result, &handler);
            }
            .in_current_span(),
        )
    }
}
