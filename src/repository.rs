//! Typed access to the shop collections on top of a [`DocumentStore`].
//!
//! Reads decode documents into records and skip the ones that do not fit,
//! so a single bad document never takes a view down.

use crate::core::records::{DailySummary, ExpenseRecord, SaleRecord, StockItem};
use crate::core::store::{
    Collection, Document, DocumentStore, ID_FIELD, Query, StoreError, WriteBatch,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

pub const QUANTITY_FIELD: &str = "quantity";
pub const DATE_FIELD: &str = "date";

#[derive(Clone)]
pub struct Repository {
    store: Arc<dyn DocumentStore>,
}

impl Repository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// Stock in creation order.
    pub async fn stock(&self) -> Result<Vec<StockItem>, StoreError> {
        self.list(Collection::Stock, &Query::new()).await
    }

    /// Sales, newest date first.
    pub async fn sales(&self) -> Result<Vec<SaleRecord>, StoreError> {
        self.list(Collection::Sales, &Query::new().order_desc(DATE_FIELD))
            .await
    }

    pub async fn summaries(&self) -> Result<Vec<DailySummary>, StoreError> {
        self.list(
            Collection::DailySummaries,
            &Query::new().order_desc(DATE_FIELD),
        )
        .await
    }

    pub async fn expenses(&self) -> Result<Vec<ExpenseRecord>, StoreError> {
        self.list(Collection::Expenses, &Query::new().order_desc(DATE_FIELD))
            .await
    }

    pub async fn list<T: DeserializeOwned>(
        &self,
        collection: Collection,
        query: &Query,
    ) -> Result<Vec<T>, StoreError> {
        let docs = self.store.list(collection, query).await?;
        Ok(decode_all(collection, docs))
    }

    pub async fn get_stock(&self, id: &str) -> Result<Option<StockItem>, StoreError> {
        match self.store.get(Collection::Stock, id).await? {
            Some(doc) => decode(doc).map(Some),
            None => Ok(None),
        }
    }

    pub async fn create_stock(&self, fields: Document) -> Result<StockItem, StoreError> {
        decode(self.store.create(Collection::Stock, fields).await?)
    }

    pub async fn create_expense(&self, fields: Document) -> Result<ExpenseRecord, StoreError> {
        decode(self.store.create(Collection::Expenses, fields).await?)
    }

    /// Adds `delta` to an item's quantity inside the store, never below `floor`.
    pub async fn adjust_stock(
        &self,
        id: &str,
        delta: f64,
        floor: Option<f64>,
    ) -> Result<StockItem, StoreError> {
        let mut batch = WriteBatch::new();
        batch.adjust(Collection::Stock, id, QUANTITY_FIELD, delta, floor);
        let mut docs = self.store.apply(batch).await?;
        let doc = docs.pop().ok_or_else(|| StoreError::NotFound {
            collection: Collection::Stock,
            id: id.to_string(),
        })?;
        decode(doc)
    }

    pub async fn delete_stock(&self, id: &str) -> Result<(), StoreError> {
        self.store.delete(Collection::Stock, id).await
    }

    pub async fn commit(&self, batch: WriteBatch) -> Result<Vec<Document>, StoreError> {
        debug!("Committing batch of {} writes", batch.len());
        self.store.apply(batch).await
    }
}

/// Turns a serializable value into the field map of a new document. The `id`
/// is left to the store unless set.
pub fn to_document<T: Serialize>(value: &T) -> Result<Document, StoreError> {
    match serde_json::to_value(value)? {
        Value::Object(mut map) => {
            if map.get(ID_FIELD).and_then(Value::as_str) == Some("") {
                map.remove(ID_FIELD);
            }
            Ok(map)
        }
        other => Err(StoreError::InvalidDocument(format!(
            "expected an object, got {other}"
        ))),
    }
}

pub fn decode<T: DeserializeOwned>(doc: Document) -> Result<T, StoreError> {
    Ok(serde_json::from_value(Value::Object(doc))?)
}

fn decode_all<T: DeserializeOwned>(collection: Collection, docs: Vec<Document>) -> Vec<T> {
    docs.into_iter()
        .filter_map(|doc| {
            let id = doc
                .get(ID_FIELD)
                .and_then(Value::as_str)
                .unwrap_or("?")
                .to_string();
            match decode(doc) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(%collection, %id, error = %e, "Skipping undecodable document");
                    None
                }
            }
        })
        .collect()
}
