//! Main [`wiki_elastic`] program entry point.
//!
//! Simply delegates to the wiki-elastic [`Cli`] wrapper.

use wiki_elastic::Cli;

/// Main program entry point.
#[tokio::main]
async fn main() -> wiki_elastic::Result<()> {
    Cli::execute().await
}
