//! Definition of the [`Index`](crate::command::Command::Index) command.

pub mod args;
mod pages;

use std::panic::resume_unwind;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use futures::future::join_all;
use tokio::task::JoinHandle;
use tracing::{info, instrument, trace, warn};

use crate::command::admin::prepare_index;
use crate::command::connection::ConnectionArgs;
use crate::command::index::args::IndexArgs;
use crate::command::index::pages::PageReader;
use crate::elastic::response::{BulkResponse, WriteResponse};
use crate::elastic::{
    BulkListener, CompletionHandler, DispatchError, Dispatcher, DocCreateListener, HttpStore,
    IndexConfig, StoreError,
};
use crate::error::MultiError;
use crate::{Error, Result};

/// Command wrapper used for the [`Index`](crate::command::Command::Index) command.
#[derive(Debug)]
pub struct IndexCommand {
    args: IndexArgs,
    dispatcher: Dispatcher<HttpStore>,
}

impl IndexCommand {
    pub fn new(args: IndexArgs, connection: &ConnectionArgs) -> Result<Self> {
        let dispatcher = connection.dispatcher()?;

        Ok(Self { args, dispatcher })
    }

    /// Indexes all pages, then waits for every write to complete.
    #[instrument(skip_all)]
    pub async fn execute(self) -> Result<()> {
        let config = IndexConfig::load(&self.args.config).await?;
        info!("Starting indexing of {} into index {}", self.args.pages.display(), config.index_name);
        trace!(?self.args);

        if self.args.recreate {
            prepare_index(&self.dispatcher, &config, true).await?;
        } else if !self.dispatcher.index_exists(&config.index_name).await {
            warn!("Index {} does not exist; it will be created with default settings", config.index_name);
        }

        let bulk_size = self.args.bulk_size(config.insert_bulk_size);
        let progress = Arc::new(Progress::default());
        let mut handles = Vec::new();

        let read_result = self
            .submit_pages(&config, bulk_size, &progress, &mut handles)
            .await;

        let mut errors = wait_for_writes(handles).await;
        errors.extend(progress.take_errors());
        if let Err(read_error) = read_result {
            errors.push(read_error);
        }

        info!(
            "Indexing complete: {} of {} pages indexed",
            progress.indexed.load(Ordering::SeqCst),
            progress.read.load(Ordering::SeqCst),
        );
        MultiError::check(errors, || "errors detected while indexing pages")
    }

    #[instrument(level = "debug", skip(self, config, progress, handles))]
    async fn submit_pages(
        &self,
        config: &IndexConfig,
        bulk_size: usize,
        progress: &Arc<Progress>,
        handles: &mut Vec<JoinHandle<()>>,
    ) -> Result<()> {
        let mut reader = PageReader::open(&self.args.pages).await?;

        loop {
            let pages = reader.next_batch(bulk_size).await?;
            if pages.is_empty() {
                return Ok(());
            }
            progress.read.fetch_add(pages.len(), Ordering::SeqCst);

            if bulk_size == 1 {
                for page in &pages {
                    let submission = self
                        .dispatcher
                        .index_async(&config.index_name, &config.doc_type, page, Arc::clone(progress))
                        .await;
                    progress.track(submission, handles);
                }
            } else {
                let submission = self
                    .dispatcher
                    .index_bulk_async(&config.index_name, &config.doc_type, &pages, Arc::clone(progress))
                    .await;
                progress.track(submission, handles);
            }
        }
    }
}

/// Waits for background writes, collecting join errors. Panics are propagated.
async fn wait_for_writes(handles: Vec<JoinHandle<()>>) -> Vec<Error> {
    join_all(handles)
        .await
        .into_iter()
        .filter_map(|join_result| match join_result {
            Ok(()) => None,
            Err(join_error) if join_error.is_panic() => resume_unwind(join_error.into_panic()),
            Err(join_error) => Some(Error::new(join_error).context("indexing task failed")),
        })
        .collect()
}

/// Keeps track of indexing results across concurrent writes.
#[derive(Debug, Default)]
struct Progress {
    read: AtomicUsize,
    indexed: AtomicUsize,
    errors: Mutex<Vec<Error>>,
}

impl Progress {
    fn track(
        &self,
        submission: std::result::Result<JoinHandle<()>, DispatchError>,
        handles: &mut Vec<JoinHandle<()>>,
    ) {
        match submission {
            Ok(handle) => handles.push(handle),
            Err(DispatchError::Invalid) => trace!("Skipped invalid pages"),
            Err(err) => self.push_error(Error::new(err).context("failed to submit pages")),
        }
    }

    fn push_error(&self, error: Error) {
        if let Ok(mut errors) = self.errors.lock() {
            errors.push(error);
        }
    }

    fn take_errors(&self) -> Vec<Error> {
        self.errors
            .lock()
            .map(|mut errors| std::mem::take(&mut *errors))
            .unwrap_or_default()
    }
}

impl CompletionHandler<WriteResponse> for Progress {
    fn on_response(&self, response: &WriteResponse) {
        DocCreateListener.on_response(response);
        self.indexed.fetch_add(1, Ordering::SeqCst);
    }

    fn on_failure(&self, error: &StoreError) {
        CompletionHandler::<WriteResponse>::on_failure(&DocCreateListener, error);
        self.push_error(anyhow!("failed to index page: {error}"));
    }
}

impl CompletionHandler<BulkResponse> for Progress {
    fn on_response(&self, response: &BulkResponse) {
        BulkListener.on_response(response);

        let mut indexed = 0;
        for item in response.items() {
            match &item.error {
                None => indexed += 1,
                Some(error) => self.push_error(anyhow!(
                    "failed to index page {} (status {}): {error}",
                    item.id,
                    item.status
                )),
            }
        }
        self.indexed.fetch_add(indexed, Ordering::SeqCst);
    }

    fn on_failure(&self, error: &StoreError) {
        CompletionHandler::<BulkResponse>::on_failure(&BulkListener, error);
        self.push_error(anyhow!("failed to index bulk of pages: {error}"));
    }
}
