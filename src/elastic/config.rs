//! Configuration consumed by the [`Dispatcher`](crate::elastic::dispatcher::Dispatcher).

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{instrument, trace};

use crate::limiter::DEFAULT_CAPACITY;
use crate::Result;

pub const DEFAULT_DOC_TYPE: &str = "wikipage";
pub const DEFAULT_SHARDS: u32 = 1;
pub const DEFAULT_REPLICAS: u32 = 0;
pub const DEFAULT_INSERT_BULK_SIZE: usize = 100;

/// Description of the index to create and write to.
///
/// Usually loaded from a JSON file via [`load`](IndexConfig::load):
///
/// ```json
/// {
///     "indexName": "enwiki_v3",
///     "docType": "wikipage",
///     "shards": 1,
///     "replicas": 0,
///     "settingFile": "en_settings.json",
///     "mappingFile": "en_map.json",
///     "insertBulkSize": 100
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexConfig {
    pub index_name: String,

    #[serde(default = "default_doc_type")]
    pub doc_type: String,

    #[serde(default = "default_shards")]
    pub shards: u32,

    #[serde(default = "default_replicas")]
    pub replicas: u32,

    /// Path to a JSON file holding extra index settings.
    #[serde(default)]
    pub setting_file: Option<PathBuf>,

    /// Path to a JSON file holding the mapping of [`doc_type`](Self::doc_type).
    #[serde(default)]
    pub mapping_file: Option<PathBuf>,

    #[serde(default = "default_insert_bulk_size")]
    pub insert_bulk_size: usize,

    /// Raw settings payload, passed through to Elasticsearch.
    #[serde(skip)]
    pub settings: Option<String>,

    /// Raw mapping payload, passed through to Elasticsearch.
    #[serde(skip)]
    pub mapping: Option<String>,
}

impl IndexConfig {
    pub fn new<N>(index_name: N) -> Self
    where
        N: Into<String>,
    {
        Self {
            index_name: index_name.into(),
            doc_type: default_doc_type(),
            shards: DEFAULT_SHARDS,
            replicas: DEFAULT_REPLICAS,
            setting_file: None,
            mapping_file: None,
            insert_bulk_size: DEFAULT_INSERT_BULK_SIZE,
            settings: None,
            mapping: None,
        }
    }

    /// Loads configuration from a JSON file.
    ///
    /// Setting and mapping files are resolved relative to the configuration file's
    /// directory and their content is loaded in [`settings`](Self::settings) and
    /// [`mapping`](Self::mapping).
    #[instrument(level = "debug")]
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read index configuration {}", path.display()))?;
        let mut config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse index configuration {}", path.display()))?;
        trace!(?config);

        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        if let Some(setting_file) = &config.setting_file {
            config.settings = Some(read_payload(&base_dir.join(setting_file)).await?);
        }
        if let Some(mapping_file) = &config.mapping_file {
            config.mapping = Some(read_payload(&base_dir.join(mapping_file)).await?);
        }

        Ok(config)
    }
}

async fn read_payload(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to load file {}", path.display()))
}

fn default_doc_type() -> String {
    DEFAULT_DOC_TYPE.into()
}

fn default_shards() -> u32 {
    DEFAULT_SHARDS
}

fn default_replicas() -> u32 {
    DEFAULT_REPLICAS
}

fn default_insert_bulk_size() -> usize {
    DEFAULT_INSERT_BULK_SIZE
}

/// Settings of a [`Dispatcher`](crate::elastic::dispatcher::Dispatcher).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// Maximum number of requests in flight at once.
    pub max_concurrency: NonZeroUsize,

    /// If set, asynchronous writes that have not completed after this delay are
    /// reported as failed and their permit is returned to the pool.
    pub completion_timeout: Option<Duration>,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            max_concurrency: NonZeroUsize::new(DEFAULT_CAPACITY).unwrap_or(NonZeroUsize::MIN),
            completion_timeout: None,
        }
    }
}
