//! PostgreSQL implementation of the SAML client record source
//!
//! Expected table layout (the table name is configurable):
//!
//! ```sql
//! CREATE TABLE saml_client_config (
//!     id BIGSERIAL PRIMARY KEY,
//!     client_name VARCHAR(200) NOT NULL,
//!     environment VARCHAR(20) NOT NULL,
//!     keystore_data BYTEA NOT NULL,
//!     keystore_password VARCHAR(50),
//!     keystore_alias VARCHAR(20) NOT NULL,
//!     private_key_password VARCHAR(50),
//!     idp_metadata TEXT NOT NULL,
//!     idp_entity_id VARCHAR(200) NOT NULL,
//!     sp_entity_id VARCHAR(200) NOT NULL,
//!     max_auth_lifetime BIGINT NOT NULL DEFAULT 3600 CHECK (max_auth_lifetime > 0),
//!     dest_binding_type VARCHAR(200),
//!     UNIQUE (client_name, environment)
//! );
//! ```

use crate::config::{Environment, TableName};
use crate::errors::SourceError;
use crate::storage::traits::{RawClientRecord, RecordSource, Result};
use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::{PgPool, PgRow, Postgres};

const RECORD_COLUMNS: &str = "client_name, environment, keystore_data, keystore_password, keystore_alias, private_key_password, idp_metadata, idp_entity_id, sp_entity_id, max_auth_lifetime, dest_binding_type";

/// PostgreSQL implementation of [`RecordSource`], scoped to one environment
pub struct PostgresSamlClientSource {
    pool: PgPool,
    environment: Environment,
    select_names_sql: String,
    select_all_sql: String,
    select_one_sql: String,
}

impl PostgresSamlClientSource {
    /// Create a new PostgreSQL record source reading `table` rows tagged with `environment`
    pub fn new(pool: PgPool, table: &TableName, environment: Environment) -> Self {
        let table = table.as_ref();
        Self {
            pool,
            environment,
            select_names_sql: format!("SELECT client_name FROM {table} WHERE environment = $1"),
            select_all_sql: format!("SELECT {RECORD_COLUMNS} FROM {table} WHERE environment = $1"),
            select_one_sql: format!(
                "SELECT {RECORD_COLUMNS} FROM {table} WHERE environment = $1 AND client_name = $2"
            ),
        }
    }

    fn column<T>(row: &PgRow, column: &'static str) -> Result<T>
    where
        T: for<'r> sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
    {
        row.try_get(column)
            .map_err(|e| SourceError::RowDecodingFailed {
                column,
                message: e.to_string(),
            })
    }

    /// Convert PostgreSQL row to RawClientRecord
    fn row_to_record(row: &PgRow) -> Result<RawClientRecord> {
        Ok(RawClientRecord {
            client_name: Self::column(row, "client_name")?,
            environment: Self::column(row, "environment")?,
            keystore_data: Self::column(row, "keystore_data")?,
            keystore_password: Self::column(row, "keystore_password")?,
            keystore_alias: Self::column(row, "keystore_alias")?,
            private_key_password: Self::column(row, "private_key_password")?,
            identity_provider_metadata: Self::column(row, "idp_metadata")?,
            identity_provider_entity_id: Self::column(row, "idp_entity_id")?,
            service_provider_entity_id: Self::column(row, "sp_entity_id")?,
            maximum_authentication_lifetime: Self::column(row, "max_auth_lifetime")?,
            destination_binding_type: Self::column(row, "dest_binding_type")?,
        })
    }
}

#[async_trait]
impl RecordSource for PostgresSamlClientSource {
    async fn load_names(&self) -> Result<Vec<String>> {
        let rows = sqlx::query(&self.select_names_sql)
            .bind(self.environment.as_ref())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| SourceError::QueryFailed(e.to_string()))?;

        rows.iter()
            .map(|row| Self::column(row, "client_name"))
            .collect()
    }

    async fn load_all(&self) -> Result<Vec<RawClientRecord>> {
        let rows = sqlx::query(&self.select_all_sql)
            .bind(self.environment.as_ref())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| SourceError::QueryFailed(e.to_string()))?;

        rows.iter().map(Self::row_to_record).collect()
    }

    async fn load_one(&self, client_name: &str) -> Result<Option<RawClientRecord>> {
        if client_name.trim().is_empty() {
            return Err(SourceError::InvalidData(
                "Client name must not be blank".to_string(),
            ));
        }

        let rows = sqlx::query(&self.select_one_sql)
            .bind(self.environment.as_ref())
            .bind(client_name)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| SourceError::QueryFailed(e.to_string()))?;

        rows.first().map(Self::row_to_record).transpose()
    }
}
