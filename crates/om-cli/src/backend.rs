//! Store selection for the configured backend.

use anyhow::{Context, Result, anyhow};
use om_core::{DressingEntry, EntryStore, NewDressingEntry, NewOutputEntry, OutputEntry};
use om_db::{Database, DbError};
use om_remote::RemoteError;
use thiserror::Error;
use tokio::runtime::Runtime;

use crate::config::{Config, StoreKind};

/// Errors from whichever store is active.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

/// The store named by the configuration.
///
/// The hosted client is async; it is driven on a runtime owned by the backend,
/// one request at a time.
#[derive(Debug)]
pub enum Backend {
    Sqlite(Database),
    Remote {
        client: om_remote::Client,
        runtime: Runtime,
    },
}

impl Backend {
    /// Opens the configured store, creating the database directory if needed.
    pub fn open(config: &Config) -> Result<Self> {
        match config.store {
            StoreKind::Sqlite => {
                if let Some(parent) = config.database_path.parent() {
                    std::fs::create_dir_all(parent)
                        .context("failed to create database directory")?;
                }
                let db = Database::open(&config.database_path).with_context(|| {
                    format!("failed to open {}", config.database_path.display())
                })?;
                Ok(Self::Sqlite(db))
            }
            StoreKind::Remote => {
                let url = non_blank(config.remote_url.as_deref()).ok_or_else(|| {
                    anyhow!("missing remote store URL (set OM_REMOTE_URL or config.toml)")
                })?;
                let api_key = non_blank(config.remote_api_key.as_deref()).ok_or_else(|| {
                    anyhow!("missing remote store API key (set OM_REMOTE_API_KEY or config.toml)")
                })?;
                let client =
                    om_remote::Client::new(url, api_key).context("failed to create store client")?;
                let runtime = Runtime::new().context("failed to initialize tokio runtime")?;
                Ok(Self::Remote { client, runtime })
            }
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

impl EntryStore for Backend {
    type Error = StoreError;

    fn insert_output(&mut self, entry: &NewOutputEntry) -> Result<OutputEntry, StoreError> {
        match self {
            Self::Sqlite(db) => Ok(db.insert_output(entry)?),
            Self::Remote { client, runtime } => Ok(runtime.block_on(client.insert_output(entry))?),
        }
    }

    fn insert_dressing(&mut self, entry: &NewDressingEntry) -> Result<DressingEntry, StoreError> {
        match self {
            Self::Sqlite(db) => Ok(db.insert_dressing(entry)?),
            Self::Remote { client, runtime } => {
                Ok(runtime.block_on(client.insert_dressing(entry))?)
            }
        }
    }

    fn list_outputs(&self) -> Result<Vec<OutputEntry>, StoreError> {
        match self {
            Self::Sqlite(db) => Ok(db.list_outputs()?),
            Self::Remote { client, runtime } => Ok(runtime.block_on(client.list_outputs())?),
        }
    }

    fn list_dressings(&self) -> Result<Vec<DressingEntry>, StoreError> {
        match self {
            Self::Sqlite(db) => Ok(db.list_dressings()?),
            Self::Remote { client, runtime } => Ok(runtime.block_on(client.list_dressings())?),
        }
    }
}
