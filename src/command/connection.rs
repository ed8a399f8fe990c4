//! Arguments used to reach Elasticsearch, shared by all commands.

use std::num::NonZeroUsize;
use std::time::Duration;

use anyhow::Context;
use clap::Args;

use crate::elastic::http::DEFAULT_URL;
use crate::elastic::{Dispatcher, DispatcherConfig, HttpStore};
use crate::Result;

/// Connection settings for Elasticsearch.
#[derive(Debug, Clone, Args)]
pub struct ConnectionArgs {
    /// URL of the Elasticsearch instance
    #[arg(long, global = true, env = "ELASTIC_URL", default_value = DEFAULT_URL)]
    pub url: String,

    /// Maximum number of concurrent requests sent to Elasticsearch
    #[arg(long, global = true, env = "WIKI_ELASTIC_MAX_CONCURRENCY", default_value = "10")]
    pub max_concurrency: NonZeroUsize,

    /// Number of seconds after which a background write is considered failed
    #[arg(long, global = true)]
    pub completion_timeout: Option<u64>,
}

impl ConnectionArgs {
    pub fn dispatcher_config(&self) -> DispatcherConfig {
        DispatcherConfig {
            max_concurrency: self.max_concurrency,
            completion_timeout: self.completion_timeout.map(Duration::from_secs),
        }
    }

    /// Creates a [`Dispatcher`] writing to the Elasticsearch instance at [`url`](Self::url).
    pub fn dispatcher(&self) -> Result<Dispatcher<HttpStore>> {
        let store = HttpStore::new(&self.url)
            .with_context(|| format!("failed to create Elasticsearch client for {}", self.url))?;

        Ok(Dispatcher::new(store, self.dispatcher_config()))
    }
}
