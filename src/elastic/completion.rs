//! Completion of asynchronous writes.
//!
//! An asynchronous write holds its permit until the write finishes. [`complete`] is the
//! only place where that permit is given back; it then hands the outcome to a
//! [`CompletionHandler`].

use std::sync::Arc;

use tracing::{debug, error, trace};

use crate::elastic::error::StoreError;
use crate::elastic::response::{BulkResponse, WriteResponse, WriteResult};
use crate::limiter::OwnedPermit;

/// Receives the outcome of an asynchronous write.
///
/// Exactly one of the two methods is called, once, per submitted write. The permit of the
/// write has already been returned to the pool when they are called.
pub trait CompletionHandler<T>: Send + 'static {
    fn on_response(&self, response: &T);

    fn on_failure(&self, error: &StoreError);
}

impl<T, H> CompletionHandler<T> for Arc<H>
where
    H: CompletionHandler<T> + Sync,
{
    fn on_response(&self, response: &T) {
        (**self).on_response(response);
    }

    fn on_failure(&self, error: &StoreError) {
        (**self).on_failure(error);
    }
}

/// Releases the permit held by a write, then reports its outcome to `handler`.
pub(crate) fn complete<T, H>(permit: OwnedPermit, result: Result<T, StoreError>, handler: &H)
where
    H: CompletionHandler<T>,
{
    drop(permit);

    match result {
        Ok(response) => handler.on_response(&response),
        Err(error) => handler.on_failure(&error),
    }
}

/// Handler for single-document writes that logs their outcome.
#[derive(Debug, Default, Clone, Copy)]
pub struct DocCreateListener;

impl CompletionHandler<WriteResponse> for DocCreateListener {
    fn on_response(&self, response: &WriteResponse) {
        let WriteResponse { index, id, result } = response;
        match result {
            WriteResult::Created => trace!("Document with id {id} created successfully at index {index}"),
            WriteResult::Updated => trace!("Document with id {id} updated successfully at index {index}"),
            result => trace!(?result, "Document with id {id} written at index {index}"),
        }
    }

    fn on_failure(&self, error: &StoreError) {
        error!(%error, "failed inserting document");
    }
}

/// Handler for bulk writes that logs their outcome.
#[derive(Debug, Default, Clone, Copy)]
pub struct BulkListener;

impl CompletionHandler<BulkResponse> for BulkListener {
    fn on_response(&self, response: &BulkResponse) {
        let total = response.items().count();
        let failed = response.failed_items().count();
        if failed == 0 {
            debug!("Bulk insert of {total} documents completed in {}ms", response.took);
        } else {
            error!("{failed} of {total} documents failed in bulk insert");
            for item in response.failed_items() {
                debug!(%item.id, item.status, error = ?item.error, "document failed in bulk insert");
            }
        }
    }

    fn on_failure(&self, error: &StoreError) {
        error!(%error, "failed inserting bulk request");
    }
}
