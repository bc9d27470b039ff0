//! In-memory record source implementation
//!
//! Serves a fixed list of records. Used by tests and by callers that
//! embed the crate with records of their own.

use crate::errors::SourceError;
use crate::storage::traits::{RawClientRecord, RecordSource, Result};
use async_trait::async_trait;

/// Record source backed by a fixed list of records
#[derive(Clone, Default)]
pub struct MemoryRecordSource {
    records: Vec<RawClientRecord>,
}

impl MemoryRecordSource {
    pub fn new(records: Vec<RawClientRecord>) -> Self {
        Self { records }
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl RecordSource for MemoryRecordSource {
    async fn load_names(&self) -> Result<Vec<String>> {
        Ok(self
            .records
            .iter()
            .map(|record| record.client_name.clone())
            .collect())
    }

    async fn load_all(&self) -> Result<Vec<RawClientRecord>> {
        Ok(self.records.clone())
    }

    async fn load_one(&self, client_name: &str) -> Result<Option<RawClientRecord>> {
        if client_name.trim().is_empty() {
            return Err(SourceError::InvalidData(
                "Client name must not be blank".to_string(),
            ));
        }
        Ok(self
            .records
            .iter()
            .find(|record| record.client_name == client_name)
            .cloned())
    }
}
