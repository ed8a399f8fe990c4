//! Arguments that can be passed to the [`Index`](crate::command::Command::Index) command.

use std::path::PathBuf;

use clap::Args;

/// Command-line arguments accepted by the [`Index`](crate::command::Command::Index) command.
#[derive(Debug, Clone, Args)]
pub struct IndexArgs {
    /// Path to the index configuration file
    pub config: PathBuf,

    /// Path to the parsed pages (one JSON object per line)
    pub pages: PathBuf,

    /// Number of pages sent in each bulk request; overrides the index configuration
    ///
    /// With a bulk size of 1, pages are sent one by one instead.
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
    pub bulk_size: Option<u64>,

    /// Delete and create the index before indexing pages
    #[arg(long, default_value_t = false)]
    pub recreate: bool,
}

impl IndexArgs {
    /// Number of pages to send per request, given the configured default.
    pub fn bulk_size(&self, configured: usize) -> usize {
        self.bulk_size
            .and_then(|bulk_size| usize::try_from(bulk_size).ok())
            .unwrap_or(configured)
            .max(1)
    }
}
