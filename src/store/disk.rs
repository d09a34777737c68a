use super::{DocumentSource, run_query, stage_batch};
use crate::core::store::{Collection, Document, DocumentStore, Query, StoreError, WriteBatch};
use async_trait::async_trait;
use chrono::Utc;
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::path::Path;
use tokio::sync::Mutex;
use tracing::debug;

struct Partitions {
    stock: PartitionHandle,
    sales: PartitionHandle,
    daily_summaries: PartitionHandle,
    expenses: PartitionHandle,
}

impl Partitions {
    fn get(&self, collection: Collection) -> &PartitionHandle {
        match collection {
            Collection::Stock => &self.stock,
            Collection::Sales => &self.sales,
            Collection::DailySummaries => &self.daily_summaries,
            Collection::Expenses => &self.expenses,
        }
    }
}

/// Document store on a fjall keyspace, one partition per collection.
///
/// Documents are stored as JSON keyed by id. Batches are committed with a
/// single cross-partition write batch, and the write lock makes staging and
/// commit one critical section.
pub struct DiskStore {
    keyspace: Keyspace,
    partitions: Partitions,
    write_lock: Mutex<()>,
}

impl DiskStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let keyspace = fjall::Config::new(path).open()?;
        let open = |collection: Collection| {
            keyspace.open_partition(collection.name(), PartitionCreateOptions::default())
        };
        let partitions = Partitions {
            stock: open(Collection::Stock)?,
            sales: open(Collection::Sales)?,
            daily_summaries: open(Collection::DailySummaries)?,
            expenses: open(Collection::Expenses)?,
        };
        debug!("Opened fjall keyspace at {}", path.display());

        Ok(Self {
            keyspace,
            partitions,
            write_lock: Mutex::new(()),
        })
    }
}

impl DocumentSource for DiskStore {
    fn fetch(&self, collection: Collection, id: &str) -> Result<Option<Document>, StoreError> {
        match self.partitions.get(collection).get(id.as_bytes())? {
            Some(value) => Ok(Some(serde_json::from_slice(&value)?)),
            None => Ok(None),
        }
    }

    fn scan(&self, collection: Collection) -> Result<Vec<Document>, StoreError> {
        let mut docs = Vec::new();
        for item in self.partitions.get(collection).iter() {
            let (_, value) = item?;
            docs.push(serde_json::from_slice(&value)?);
        }
        Ok(docs)
    }
}

#[async_trait]
impl DocumentStore for DiskStore {
    async fn list(
        &self,
        collection: Collection,
        query: &Query,
    ) -> Result<Vec<Document>, StoreError> {
        let docs = self.scan(collection)?;
        debug!("Disk LIST {} ({} documents)", collection, docs.len());
        Ok(run_query(docs, query))
    }

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>, StoreError> {
        self.fetch(collection, id)
    }

    async fn apply(&self, batch: WriteBatch) -> Result<Vec<Document>, StoreError> {
        let _guard = self.write_lock.lock().await;
        let op_count = batch.len();
        let (writes, results) = stage_batch(self, batch, Utc::now())?;

        let mut commit = self.keyspace.batch();
        for write in writes {
            let partition = self.partitions.get(write.collection);
            match write.document {
                Some(doc) => {
                    commit.insert(partition, write.id.as_bytes(), serde_json::to_vec(&doc)?)
                }
                None => commit.remove(partition, write.id.as_bytes()),
            }
        }
        commit.commit()?;
        self.keyspace.persist(PersistMode::SyncAll)?;
        debug!("Disk APPLY batch of {} ops", op_count);
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use tempfile::tempdir;

    fn doc(value: Value) -> Document {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_disk_store_create_and_list() {
        let dir = tempdir().unwrap();
        let store = DiskStore::open(dir.path()).unwrap();

        store
            .create(Collection::Expenses, doc(json!({"date": "2026-05-01", "amount": 300})))
            .await
            .unwrap();
        store
            .create(Collection::Expenses, doc(json!({"date": "2026-05-02", "amount": 100})))
            .await
            .unwrap();

        let latest = store
            .list(Collection::Expenses, &Query::new().order_desc("date").limit(1))
            .await
            .unwrap();
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].get("amount"), Some(&json!(100)));

        // Other collections are untouched
        assert!(
            store
                .list(Collection::Sales, &Query::new())
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_disk_store_survives_reopen() {
        let dir = tempdir().unwrap();
        {
            let store = DiskStore::open(dir.path()).unwrap();
            store
                .create(Collection::Stock, doc(json!({"id": "s1", "name": "Bread"})))
                .await
                .unwrap();
        }

        let store = DiskStore::open(dir.path()).unwrap();
        let item = store.get(Collection::Stock, "s1").await.unwrap().unwrap();
        assert_eq!(item.get("name"), Some(&json!("Bread")));
    }

    #[tokio::test]
    async fn test_disk_store_conflict_writes_nothing() {
        let dir = tempdir().unwrap();
        let store = DiskStore::open(dir.path()).unwrap();
        store
            .create(Collection::Stock, doc(json!({"id": "s1", "quantity": 5})))
            .await
            .unwrap();

        let mut batch = WriteBatch::new();
        batch
            .adjust(Collection::Stock, "s1", "quantity", -1.0, Some(0.0))
            .create_unique(Collection::DailySummaries, doc(json!({"date": "x"})), "date")
            .create_unique(Collection::DailySummaries, doc(json!({"date": "x"})), "date");
        assert!(store.apply(batch).await.is_err());

        let item = store.get(Collection::Stock, "s1").await.unwrap().unwrap();
        assert_eq!(item.get("quantity"), Some(&json!(5)));
    }
}
