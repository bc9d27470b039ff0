//! Load-once cache in front of a record source.
//!
//! The first read of any kind bulk-loads every record from the wrapped source
//! and keeps them in memory for the lifetime of the cache. The source is never
//! consulted again, even if its data changes. A failed bulk load leaves the
//! cache unloaded so the next read retries.

use crate::storage::traits::{RawClientRecord, RecordSource, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;

type Records = Arc<BTreeMap<String, RawClientRecord>>;

enum CacheState {
    Unloaded,
    Loaded(Records),
}

/// Caching [`RecordSource`] that bulk-loads its delegate exactly once
pub struct ConfigurationCache {
    source: Arc<dyn RecordSource>,
    // Held across the bulk fetch; readers queue behind an in-flight load.
    state: Mutex<CacheState>,
}

impl ConfigurationCache {
    /// Create an unloaded cache over `source`
    pub fn new(source: Arc<dyn RecordSource>) -> Self {
        Self {
            source,
            state: Mutex::new(CacheState::Unloaded),
        }
    }

    /// Whether the one-time bulk load has completed
    pub async fn is_loaded(&self) -> bool {
        matches!(*self.state.lock().await, CacheState::Loaded(_))
    }

    /// All known client names, in lexical order
    pub async fn names(&self) -> Result<Vec<String>> {
        let records = self.records().await?;
        Ok(records.keys().cloned().collect())
    }

    /// Copies of every cached record
    pub async fn all(&self) -> Result<Vec<RawClientRecord>> {
        let records = self.records().await?;
        Ok(records.values().cloned().collect())
    }

    /// Copy of the record stored under exactly `client_name`
    pub async fn get(&self, client_name: &str) -> Result<Option<RawClientRecord>> {
        let records = self.records().await?;
        Ok(records.get(client_name).cloned())
    }

    async fn records(&self) -> Result<Records> {
        let mut state = self.state.lock().await;
        if let CacheState::Loaded(records) = &*state {
            return Ok(records.clone());
        }

        let loaded = match self.source.load_all().await {
            Ok(loaded) => loaded,
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    "Bulk load of client records failed; cache stays unloaded"
                );
                return Err(err);
            }
        };

        let mut records = BTreeMap::new();
        for record in loaded {
            let client_name = record.client_name.clone();
            if records.insert(client_name.clone(), record).is_some() {
                tracing::warn!(
                    %client_name,
                    "Source returned the client name twice; keeping the last record"
                );
            }
        }

        tracing::debug!(count = records.len(), "Loaded client records into cache");
        let records = Arc::new(records);
        *state = CacheState::Loaded(records.clone());
        Ok(records)
    }
}

#[async_trait]
impl RecordSource for ConfigurationCache {
    async fn load_names(&self) -> Result<Vec<String>> {
        self.names().await
    }

    async fn load_all(&self) -> Result<Vec<RawClientRecord>> {
        self.all().await
    }

    async fn load_one(&self, client_name: &str) -> Result<Option<RawClientRecord>> {
        self.get(client_name).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SourceError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        records: Vec<RawClientRecord>,
        bulk_loads: AtomicUsize,
        failures_left: AtomicUsize,
    }

    impl CountingSource {
        fn new(names: &[&str]) -> Self {
            Self {
                records: names.iter().map(|name| record(name, "first")).collect(),
                bulk_loads: AtomicUsize::new(0),
                failures_left: AtomicUsize::new(0),
            }
        }

        fn failing_first(names: &[&str], failures: usize) -> Self {
            let source = Self::new(names);
            source.failures_left.store(failures, Ordering::SeqCst);
            source
        }
    }

    #[async_trait]
    impl RecordSource for CountingSource {
        async fn load_names(&self) -> Result<Vec<String>> {
            panic!("cache must not call load_names on its source");
        }

        async fn load_all(&self) -> Result<Vec<RawClientRecord>> {
            self.bulk_loads.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            let failures_left = self.failures_left.load(Ordering::SeqCst);
            if failures_left > 0 {
                self.failures_left.store(failures_left - 1, Ordering::SeqCst);
                return Err(SourceError::ConnectionFailed("database down".to_string()));
            }
            Ok(self.records.clone())
        }

        async fn load_one(&self, _client_name: &str) -> Result<Option<RawClientRecord>> {
            panic!("cache must not call load_one on its source");
        }
    }

    fn record(name: &str, environment: &str) -> RawClientRecord {
        RawClientRecord {
            client_name: name.to_string(),
            environment: environment.to_string(),
            keystore_data: vec![0x30, 0x82],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_mixed_reads_load_once() {
        let source = Arc::new(CountingSource::new(&["SamlOne", "SamlTwo"]));
        let cache = ConfigurationCache::new(source.clone());
        assert!(!cache.is_loaded().await);

        assert_eq!(cache.names().await.unwrap(), vec!["SamlOne", "SamlTwo"]);
        assert_eq!(cache.all().await.unwrap().len(), 2);
        assert!(cache.get("SamlOne").await.unwrap().is_some());
        assert!(cache.get("SamlThree").await.unwrap().is_none());
        assert_eq!(cache.load_names().await.unwrap().len(), 2);

        assert!(cache.is_loaded().await);
        assert_eq!(source.bulk_loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_lookup_is_exact_match() {
        let cache = ConfigurationCache::new(Arc::new(CountingSource::new(&["SamlOne"])));
        assert!(cache.get("samlone").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_failed_load_is_retried() {
        let source = Arc::new(CountingSource::failing_first(&["SamlOne"], 1));
        let cache = ConfigurationCache::new(source.clone());

        let first = cache.names().await;
        assert!(matches!(first, Err(SourceError::ConnectionFailed(_))));
        assert!(!cache.is_loaded().await);

        assert_eq!(cache.names().await.unwrap(), vec!["SamlOne"]);
        assert_eq!(source.bulk_loads.load(Ordering::SeqCst), 2);

        cache.all().await.unwrap();
        assert_eq!(source.bulk_loads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_duplicate_source_names_keep_last_record() {
        struct DuplicatingSource;

        #[async_trait]
        impl RecordSource for DuplicatingSource {
            async fn load_names(&self) -> Result<Vec<String>> {
                Ok(vec!["SamlOne".to_string(), "SamlOne".to_string()])
            }

            async fn load_all(&self) -> Result<Vec<RawClientRecord>> {
                Ok(vec![record("SamlOne", "first"), record("SamlOne", "second")])
            }

            async fn load_one(&self, _client_name: &str) -> Result<Option<RawClientRecord>> {
                Ok(None)
            }
        }

        let cache = ConfigurationCache::new(Arc::new(DuplicatingSource));
        let stored = cache.get("SamlOne").await.unwrap().unwrap();
        assert_eq!(stored.environment, "second");
        assert_eq!(cache.names().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_returned_records_are_copies() {
        let cache = ConfigurationCache::new(Arc::new(CountingSource::new(&["SamlOne"])));

        let mut first = cache.get("SamlOne").await.unwrap().unwrap();
        first.keystore_data.clear();
        first.client_name.push_str("-changed");

        let second = cache.get("SamlOne").await.unwrap().unwrap();
        assert_eq!(second.keystore_data, vec![0x30, 0x82]);
        assert_eq!(second.client_name, "SamlOne");
    }
}
