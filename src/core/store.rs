//! Document store abstractions
//!
//! The shop keeps four collections of JSON documents. A store assigns each
//! document an `id` plus `createdAt`/`updatedAt` timestamps and applies
//! writes in atomic batches, so multi-record workflows either land
//! completely or not at all.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::fmt::Display;

pub type Document = Map<String, Value>;

pub const ID_FIELD: &str = "id";
pub const CREATED_AT_FIELD: &str = "createdAt";
pub const UPDATED_AT_FIELD: &str = "updatedAt";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Stock,
    Sales,
    DailySummaries,
    Expenses,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::Stock,
        Collection::Sales,
        Collection::DailySummaries,
        Collection::Expenses,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Collection::Stock => "stock",
            Collection::Sales => "sales",
            Collection::DailySummaries => "daily_summaries",
            Collection::Expenses => "expenses",
        }
    }
}

impl Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("No document '{id}' in collection '{collection}'")]
    NotFound { collection: Collection, id: String },

    #[error("Collection '{collection}' already has a document with {field} = {value}")]
    Conflict {
        collection: Collection,
        field: String,
        value: String,
    },

    #[error("Write to '{collection}/{id}' rejected: {reason}")]
    Constraint {
        collection: Collection,
        id: String,
        reason: String,
    },

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Backend(#[from] fjall::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Filter, ordering and paging for a list call.
///
/// Without an explicit order documents come back in creation order.
#[derive(Debug, Clone, Default)]
pub struct Query {
    pub filters: Vec<(String, Value)>,
    pub order_by: Option<(String, SortOrder)>,
    pub limit: Option<usize>,
    pub offset: usize,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn equal(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.filters.push((field.to_string(), value.into()));
        self
    }

    pub fn order_asc(mut self, field: &str) -> Self {
        self.order_by = Some((field.to_string(), SortOrder::Ascending));
        self
    }

    pub fn order_desc(mut self, field: &str) -> Self {
        self.order_by = Some((field.to_string(), SortOrder::Descending));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn matches(&self, doc: &Document) -> bool {
        self.filters
            .iter()
            .all(|(field, value)| doc.get(field) == Some(value))
    }
}

#[derive(Debug, Clone)]
pub enum WriteOp {
    /// Inserts a new document. With `unique_on` set, fails if any document
    /// in the collection (including ones staged earlier in the same batch)
    /// has an equal value for that field.
    Create {
        collection: Collection,
        data: Document,
        unique_on: Option<String>,
    },
    /// Merges `patch` into an existing document.
    Update {
        collection: Collection,
        id: String,
        patch: Document,
    },
    /// Adds `delta` to a numeric field. With `floor` set, fails if the result
    /// would drop below it.
    Adjust {
        collection: Collection,
        id: String,
        field: String,
        delta: f64,
        floor: Option<f64>,
    },
    Delete {
        collection: Collection,
        id: String,
    },
}

#[derive(Debug, Clone, Default)]
pub struct WriteBatch {
    pub ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, collection: Collection, data: Document) -> &mut Self {
        self.ops.push(WriteOp::Create {
            collection,
            data,
            unique_on: None,
        });
        self
    }

    pub fn create_unique(
        &mut self,
        collection: Collection,
        data: Document,
        unique_on: &str,
    ) -> &mut Self {
        self.ops.push(WriteOp::Create {
            collection,
            data,
            unique_on: Some(unique_on.to_string()),
        });
        self
    }

    pub fn update(&mut self, collection: Collection, id: &str, patch: Document) -> &mut Self {
        self.ops.push(WriteOp::Update {
            collection,
            id: id.to_string(),
            patch,
        });
        self
    }

    pub fn adjust(
        &mut self,
        collection: Collection,
        id: &str,
        field: &str,
        delta: f64,
        floor: Option<f64>,
    ) -> &mut Self {
        self.ops.push(WriteOp::Adjust {
            collection,
            id: id.to_string(),
            field: field.to_string(),
            delta,
            floor,
        });
        self
    }

    pub fn delete(&mut self, collection: Collection, id: &str) -> &mut Self {
        self.ops.push(WriteOp::Delete {
            collection,
            id: id.to_string(),
        });
        self
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn list(
        &self,
        collection: Collection,
        query: &Query,
    ) -> Result<Vec<Document>, StoreError>;

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>, StoreError>;

    /// Applies every op of the batch or none of them. Returns the resulting
    /// document of each create, update and adjust, in op order.
    async fn apply(&self, batch: WriteBatch) -> Result<Vec<Document>, StoreError>;

    async fn create(&self, collection: Collection, data: Document) -> Result<Document, StoreError> {
        let mut batch = WriteBatch::new();
        batch.create(collection, data);
        single_result(self.apply(batch).await?)
    }

    async fn update(
        &self,
        collection: Collection,
        id: &str,
        patch: Document,
    ) -> Result<Document, StoreError> {
        let mut batch = WriteBatch::new();
        batch.update(collection, id, patch);
        single_result(self.apply(batch).await?)
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<(), StoreError> {
        let mut batch = WriteBatch::new();
        batch.delete(collection, id);
        self.apply(batch).await.map(|_| ())
    }
}

fn single_result(mut docs: Vec<Document>) -> Result<Document, StoreError> {
    docs.pop()
        .ok_or_else(|| StoreError::InvalidDocument("store returned no document".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_matches_all_filters() {
        let doc: Document = serde_json::from_value(json!({"date": "2026-01-02", "amount": 5}))
            .unwrap();
        assert!(Query::new().equal("date", "2026-01-02").matches(&doc));
        assert!(
            Query::new()
                .equal("date", "2026-01-02")
                .equal("amount", 5)
                .matches(&doc)
        );
        assert!(!Query::new().equal("date", "2026-01-03").matches(&doc));
        assert!(!Query::new().equal("missing", 1).matches(&doc));
    }

    #[test]
    fn test_collection_names() {
        let names: Vec<_> = Collection::ALL.iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["stock", "sales", "daily_summaries", "expenses"]);
    }
}
