//! Administrative commands: [`CreateIndex`](crate::command::Command::CreateIndex),
//! [`DeleteIndex`](crate::command::Command::DeleteIndex) and
//! [`Exists`](crate::command::Command::Exists).

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use tracing::{info, instrument, warn};

use crate::command::connection::ConnectionArgs;
use crate::elastic::{DispatchError, Dispatcher, IndexConfig, Store};
use crate::Result;

/// Command-line arguments accepted by the [`CreateIndex`](crate::command::Command::CreateIndex) command.
#[derive(Debug, Clone, Args)]
pub struct CreateIndexArgs {
    /// Path to the index configuration file
    pub config: PathBuf,

    /// Delete the index first if it already exists
    #[arg(long, default_value_t = false)]
    pub recreate: bool,
}

/// Command-line arguments accepted by the [`DeleteIndex`](crate::command::Command::DeleteIndex) command.
#[derive(Debug, Clone, Args)]
pub struct DeleteIndexArgs {
    /// Name of the index to delete
    pub name: String,
}

/// Command-line arguments accepted by the [`Exists`](crate::command::Command::Exists) command.
#[derive(Debug, Clone, Args)]
pub struct ExistsArgs {
    /// Name of the index
    pub index: String,

    /// Id of the page
    pub id: String,

    /// Document type of the page
    #[arg(short = 't', long, default_value = crate::elastic::config::DEFAULT_DOC_TYPE)]
    pub doc_type: String,
}

#[instrument(skip_all)]
pub async fn create_index(args: CreateIndexArgs, connection: &ConnectionArgs) -> Result<()> {
    let config = IndexConfig::load(&args.config).await?;
    let dispatcher = connection.dispatcher()?;

    prepare_index(&dispatcher, &config, args.recreate).await
}

#[instrument(skip_all, fields(%args.name))]
pub async fn delete_index(args: DeleteIndexArgs, connection: &ConnectionArgs) -> Result<()> {
    let dispatcher = connection.dispatcher()?;

    match dispatcher.delete_index(&args.name).await {
        Ok(_) | Err(DispatchError::NotFound(_)) => Ok(()),
        Err(err) => Err(err).with_context(|| format!("failed to delete index {}", args.name)),
    }
}

#[instrument(skip_all, fields(%args.index, %args.id))]
pub async fn exists(args: ExistsArgs, connection: &ConnectionArgs) -> Result<()> {
    let dispatcher = connection.dispatcher()?;

    let found = dispatcher.exists(&args.index, &args.doc_type, &args.id).await;
    println!("{found}");

    Ok(())
}

/// Creates the index described by `config`, deleting it first if `recreate` is set.
#[instrument(level = "debug", skip(dispatcher, config), fields(index = %config.index_name))]
pub(crate) async fn prepare_index<S>(
    dispatcher: &Dispatcher<S>,
    config: &IndexConfig,
    recreate: bool,
) -> Result<()>
where
    S: Store,
{
    if recreate {
        match dispatcher.delete_index(&config.index_name).await {
            Ok(_) | Err(DispatchError::NotFound(_)) => (),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("failed to delete index {}", config.index_name))
            },
        }
    }

    let ack = dispatcher
        .create_index(config)
        .await
        .with_context(|| format!("failed to create index {}", config.index_name))?;
    if !ack.acknowledged {
        warn!("Creation of index {} was not acknowledged in time", config.index_name);
    } else {
        info!("Index {} ready", config.index_name);
    }

    Ok(())
}
