//! Push parsed Wikipedia pages into an Elasticsearch index.
//!
//! Writes go through a [`Dispatcher`](elastic::Dispatcher), which bounds the number of
//! requests in flight with a [`PermitPool`](limiter::PermitPool). The [`Cli`] wraps it
//! in a small command-line program.

pub mod command;
pub mod elastic;
pub mod error;
pub mod limiter;

use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use tracing_subscriber::EnvFilter;

use crate::command::connection::ConnectionArgs;
use crate::command::Command;
pub use crate::error::{Error, Result};

/// Push parsed Wikipedia pages into an Elasticsearch index
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(flatten)]
    pub verbose: Verbosity<InfoLevel>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parses command-line arguments and executes the requested [`Command`].
    pub async fn execute() -> Result<()> {
        let cli = Self::parse();
        cli.init_tracing();

        cli.command.execute(&cli.connection).await
    }

    /// Installs a global `tracing` subscriber.
    ///
    /// The level comes from the verbosity flags, unless `RUST_LOG` is set. Output goes to
    /// stderr so that command results can be piped.
    fn init_tracing(&self) {
        let level = self
            .verbose
            .log_level()
            .map(|level| level.as_str().to_ascii_lowercase())
            .unwrap_or_else(|| "off".into());
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}
