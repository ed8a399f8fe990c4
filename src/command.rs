//! Definition of supported CLI commands.

pub mod admin;
pub mod connection;
pub mod index;

use clap::Subcommand;

use crate::command::admin::{CreateIndexArgs, DeleteIndexArgs, ExistsArgs};
use crate::command::connection::ConnectionArgs;
use crate::command::index::args::IndexArgs;
use crate::command::index::IndexCommand;
use crate::Result;

/// Possible commands supported by our CLI application.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create an Elasticsearch index
    ///
    /// The index is described by a JSON configuration file giving its name, document type,
    /// number of shards and replicas, and optionally files holding extra settings and the
    /// mapping of the document type. Those files are resolved relative to the configuration file.
    CreateIndex(CreateIndexArgs),

    /// Delete an Elasticsearch index
    DeleteIndex(DeleteIndexArgs),

    /// Index parsed Wikipedia pages
    ///
    /// Pages are read from a file containing one JSON object per line; each page needs
    /// at least a positive `id` and a non-empty `title`. Other pages are skipped. Every
    /// field of a page is indexed as-is.
    ///
    /// Pages are sent in bulk requests of the size given in the index configuration (see
    /// --bulk-size to override it). At most --max-concurrency requests are in flight at once.
    Index(IndexArgs),

    /// Check whether a page exists in an index
    ///
    /// Prints `true` or `false`.
    Exists(ExistsArgs),
}

impl Command {
    /// Execute this [`Command`].
    ///
    /// This method is provided explicitly in order to make it `async`.
    pub async fn execute(self, connection: &ConnectionArgs) -> Result<()> {
        match self {
            Command::CreateIndex(args) => admin::create_index(args, connection).await,
            Command::DeleteIndex(args) => admin::delete_index(args, connection).await,
            Command::Index(args) => {
                let index_command = IndexCommand::new(args, connection)?;
                index_command.execute().await
            },
            Command::Exists(args) => admin::exists(args, connection).await,
        }
    }
}
