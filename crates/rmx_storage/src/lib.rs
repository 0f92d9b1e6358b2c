use std::sync::Arc;

use rmx_core::{Error, MediaStore, Result};

pub mod backends;

pub use backends::*;

/// Build a store from its configuration name. `sqlite` is only available
/// when the feature of the same name is enabled.
#[cfg_attr(not(feature = "sqlite"), allow(unused_variables))]
pub async fn create_store(kind: &str, database_path: Option<&str>) -> Result<Arc<dyn MediaStore>> {
    match kind {
        "" | "memory" => Ok(Arc::new(backends::memory::MemoryStore::new())),
        #[cfg(feature = "sqlite")]
        "sqlite" => {
            let path = database_path.unwrap_or("remix.db");
            Ok(Arc::new(backends::sqlite::SqliteStore::connect(path).await?))
        }
        other => Err(Error::Storage(format!("Unknown storage backend: {}", other))),
    }
}

pub mod prelude {
    pub use super::create_store;
    pub use rmx_core::{MediaStore, Result};
}
