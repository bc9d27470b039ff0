//! Record sources for SAML client configuration: in-memory, SQLite, and PostgreSQL backends.

pub mod cache;
pub mod inmemory;
pub mod traits;

// Feature-gated storage implementations
#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "postgres")]
pub mod postgres;

// Re-export commonly used types and traits
pub use cache::ConfigurationCache;
pub use inmemory::MemoryRecordSource;
pub use traits::*;

#[cfg(feature = "postgres")]
pub use postgres::PostgresSamlClientSource;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteSamlClientSource;

use crate::config::{Environment, TableName};
use crate::errors::{SettingsError, SourceError};
use std::sync::Arc;

/// Storage backend configuration and factory
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StorageBackend {
    #[cfg(feature = "sqlite")]
    Sqlite(String), // Connection string/path
    #[cfg(feature = "postgres")]
    Postgres(String), // Connection string
}

/// Create the record source for a backend
#[cfg_attr(
    not(any(feature = "sqlite", feature = "postgres")),
    allow(unused_variables)
)]
pub async fn create_record_source(
    backend: StorageBackend,
    table: &TableName,
    environment: Environment,
) -> std::result::Result<Arc<dyn RecordSource>, SourceError> {
    match backend {
        #[cfg(feature = "sqlite")]
        StorageBackend::Sqlite(database_url) => {
            let pool = sqlx::SqlitePool::connect(&database_url)
                .await
                .map_err(|e| {
                    SourceError::ConnectionFailed(format!("SQLite connection failed: {}", e))
                })?;

            Ok(Arc::new(SqliteSamlClientSource::new(pool, table, environment)))
        }
        #[cfg(feature = "postgres")]
        StorageBackend::Postgres(database_url) => {
            let pool = sqlx::postgres::PgPool::connect(&database_url)
                .await
                .map_err(|e| {
                    SourceError::ConnectionFailed(format!("PostgreSQL connection failed: {}", e))
                })?;

            Ok(Arc::new(PostgresSamlClientSource::new(pool, table, environment)))
        }
    }
}

/// Parse storage backend from configuration string
#[cfg_attr(
    not(any(feature = "sqlite", feature = "postgres")),
    allow(unused_variables)
)]
pub fn parse_storage_backend(
    backend_name: &str,
    database_url: Option<&str>,
) -> std::result::Result<StorageBackend, SettingsError> {
    match backend_name {
        #[cfg(feature = "sqlite")]
        "sqlite" => {
            let url = database_url.unwrap_or("sqlite:samldb.db");
            Ok(StorageBackend::Sqlite(url.to_string()))
        }
        #[cfg(feature = "postgres")]
        "postgres" => {
            let url = database_url
                .ok_or_else(|| SettingsError::DatabaseUrlRequired(backend_name.to_string()))?;
            Ok(StorageBackend::Postgres(url.to_string()))
        }
        _ => Err(SettingsError::UnknownStorageBackend(
            backend_name.to_string(),
        )),
    }
}
