use super::{DocumentSource, run_query, stage_batch};
use crate::core::store::{Collection, Document, DocumentStore, Query, StoreError, WriteBatch};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

type Collections = HashMap<Collection, BTreeMap<String, Document>>;

/// In-memory document store. Contents are lost when the process exits.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Collections>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

struct MapSource<'a>(&'a Collections);

impl DocumentSource for MapSource<'_> {
    fn fetch(&self, collection: Collection, id: &str) -> Result<Option<Document>, StoreError> {
        Ok(self.0.get(&collection).and_then(|docs| docs.get(id)).cloned())
    }

    fn scan(&self, collection: Collection) -> Result<Vec<Document>, StoreError> {
        Ok(self
            .0
            .get(&collection)
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn list(
        &self,
        collection: Collection,
        query: &Query,
    ) -> Result<Vec<Document>, StoreError> {
        let data = self.inner.lock().await;
        let docs = MapSource(&data).scan(collection)?;
        debug!("Memory LIST {} ({} documents)", collection, docs.len());
        Ok(run_query(docs, query))
    }

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>, StoreError> {
        let data = self.inner.lock().await;
        MapSource(&data).fetch(collection, id)
    }

    async fn apply(&self, batch: WriteBatch) -> Result<Vec<Document>, StoreError> {
        let mut data = self.inner.lock().await;
        let op_count = batch.len();
        let (writes, results) = stage_batch(&MapSource(&data), batch, Utc::now())?;
        for write in writes {
            let docs = data.entry(write.collection).or_default();
            match write.document {
                Some(doc) => {
                    docs.insert(write.id, doc);
                }
                None => {
                    docs.remove(&write.id);
                }
            }
        }
        debug!("Memory APPLY batch of {} ops", op_count);
        Ok(results)
    }
}
