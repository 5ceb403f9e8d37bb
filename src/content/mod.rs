//! Content repository: items, bundles, bitstreams and the format registry.

mod asset;
mod database;
mod format;
mod memory;
mod traits;

pub use asset::AssetStore;
pub use database::DatabaseContentStore;
pub use format::FormatIdentifier;
pub use memory::MemoryContentStore;
pub use traits::{ContentStore, NewContent};

use crate::config::{Settings, StorageBackend};
use crate::db::{AsyncDbPool, establish_async_connection_pool};
use crate::error::AppResult;

/// Source of per-request [`ContentStore`] values.
///
/// Cloning is cheap for both variants.
#[derive(Clone)]
pub enum ContentBackend {
    Database { pool: AsyncDbPool, assets: AssetStore },
    Memory(MemoryContentStore),
}

impl ContentBackend {
    /// Builds the backend selected by `storage.backend`.
    pub async fn from_settings(settings: &Settings) -> AppResult<Self> {
        match settings.storage.backend {
            StorageBackend::Database => {
                let pool = establish_async_connection_pool(&settings.database).await?;
                let assets = AssetStore::new(&settings.storage.assetstore_dir);
                tracing::info!(assetstore = %assets.root().display(), "Using database content store");
                Ok(Self::Database { pool, assets })
            }
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory content store; content is lost on shutdown");
                Ok(Self::Memory(MemoryContentStore::new()))
            }
        }
    }

    /// Opens a unit of work for one request.
    pub async fn open(&self) -> AppResult<Box<dyn ContentStore>> {
        match self {
            Self::Database { pool, assets } => Ok(Box::new(
                DatabaseContentStore::connect(pool, assets.clone()).await?,
            )),
            Self::Memory(store) => Ok(Box::new(store.clone())),
        }
    }

    /// Checks that the backend can serve requests.
    pub async fn ping(&self) -> AppResult<()> {
        match self {
            Self::Database { pool, .. } => {
                let _conn = pool.get().await?;
                Ok(())
            }
            Self::Memory(_) => Ok(()),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Database { .. } => "database",
            Self::Memory(_) => "memory",
        }
    }
}
