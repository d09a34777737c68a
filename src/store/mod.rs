pub mod disk;
pub mod memory;

use crate::core::config::{AppConfig, StoreBackend};
use crate::core::store::{
    CREATED_AT_FIELD, Collection, Document, DocumentStore, ID_FIELD, Query, SortOrder,
    StoreError, UPDATED_AT_FIELD, WriteBatch, WriteOp,
};
use anyhow::{Context, Result};
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde_json::{Number, Value};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

pub use disk::DiskStore;
pub use memory::MemoryStore;

/// Opens the store backend selected in the configuration.
pub fn open_store(config: &AppConfig) -> Result<Arc<dyn DocumentStore>> {
    match config.store {
        StoreBackend::Memory => {
            debug!("Using in-memory store");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreBackend::Disk => {
            let path = config.default_data_path()?.join("store");
            debug!("Opening disk store at {}", path.display());
            let store = DiskStore::open(&path)
                .with_context(|| format!("Failed to open store at {}", path.display()))?;
            Ok(Arc::new(store))
        }
    }
}

/// Read access a backend gives the batch stager.
pub(crate) trait DocumentSource {
    fn fetch(&self, collection: Collection, id: &str) -> Result<Option<Document>, StoreError>;
    fn scan(&self, collection: Collection) -> Result<Vec<Document>, StoreError>;
}

/// A write the backend must persist. `None` removes the document.
#[derive(Debug)]
pub(crate) struct StagedWrite {
    pub collection: Collection,
    pub id: String,
    pub document: Option<Document>,
}

pub(crate) fn doc_id(doc: &Document) -> &str {
    doc.get(ID_FIELD).and_then(Value::as_str).unwrap_or_default()
}

/// Resolves a batch against the current documents without writing anything.
///
/// Every op sees the effect of the ops before it, so a batch may adjust the
/// same document twice or create two documents that collide on a unique
/// field (the second one fails).
pub(crate) fn stage_batch(
    source: &dyn DocumentSource,
    batch: WriteBatch,
    now: DateTime<Utc>,
) -> Result<(Vec<StagedWrite>, Vec<Document>), StoreError> {
    let mut stager = Stager {
        source,
        overlay: HashMap::new(),
        touched: Vec::new(),
    };
    let mut results = Vec::new();

    for (index, op) in batch.ops.into_iter().enumerate() {
        let stamp = (now + Duration::microseconds(index as i64))
            .to_rfc3339_opts(SecondsFormat::Nanos, true);
        match op {
            WriteOp::Create {
                collection,
                mut data,
                unique_on,
            } => {
                let id = match data.get(ID_FIELD).and_then(Value::as_str) {
                    Some(id) if !id.is_empty() => id.to_string(),
                    _ => uuid::Uuid::new_v4().simple().to_string(),
                };
                if stager.current(collection, &id)?.is_some() {
                    return Err(StoreError::Conflict {
                        collection,
                        field: ID_FIELD.to_string(),
                        value: id,
                    });
                }
                if let Some(field) = unique_on {
                    if let Some(value) = data.get(&field) {
                        let taken = stager
                            .visible(collection)?
                            .iter()
                            .any(|doc| doc.get(&field) == Some(value));
                        if taken {
                            return Err(StoreError::Conflict {
                                collection,
                                field,
                                value: display_value(value),
                            });
                        }
                    }
                }
                data.insert(ID_FIELD.to_string(), Value::String(id.clone()));
                data.insert(CREATED_AT_FIELD.to_string(), Value::String(stamp.clone()));
                data.insert(UPDATED_AT_FIELD.to_string(), Value::String(stamp));
                results.push(data.clone());
                stager.stage(collection, id, Some(data));
            }
            WriteOp::Update {
                collection,
                id,
                patch,
            } => {
                let mut doc = stager.existing(collection, &id)?;
                for (key, value) in patch {
                    if key != ID_FIELD && key != CREATED_AT_FIELD {
                        doc.insert(key, value);
                    }
                }
                doc.insert(UPDATED_AT_FIELD.to_string(), Value::String(stamp));
                results.push(doc.clone());
                stager.stage(collection, id, Some(doc));
            }
            WriteOp::Adjust {
                collection,
                id,
                field,
                delta,
                floor,
            } => {
                let mut doc = stager.existing(collection, &id)?;
                let current = doc.get(&field).and_then(Value::as_f64).unwrap_or(0.0);
                let updated = current + delta;
                if let Some(floor) = floor {
                    if updated < floor {
                        return Err(StoreError::Constraint {
                            collection,
                            id,
                            reason: format!("{field} would drop to {updated} (minimum {floor})"),
                        });
                    }
                }
                let number = Number::from_f64(updated).ok_or_else(|| StoreError::Constraint {
                    collection,
                    id: id.clone(),
                    reason: format!("{field} would not be a finite number"),
                })?;
                doc.insert(field, Value::Number(number));
                doc.insert(UPDATED_AT_FIELD.to_string(), Value::String(stamp));
                results.push(doc.clone());
                stager.stage(collection, id, Some(doc));
            }
            WriteOp::Delete { collection, id } => {
                stager.existing(collection, &id)?;
                stager.stage(collection, id, None);
            }
        }
    }

    let Stager {
        mut overlay,
        touched,
        ..
    } = stager;
    let writes = touched
        .into_iter()
        .filter_map(|key| {
            overlay.remove(&key).map(|document| StagedWrite {
                collection: key.0,
                id: key.1,
                document,
            })
        })
        .collect();
    Ok((writes, results))
}

struct Stager<'a> {
    source: &'a dyn DocumentSource,
    overlay: HashMap<(Collection, String), Option<Document>>,
    touched: Vec<(Collection, String)>,
}

impl Stager<'_> {
    fn current(&self, collection: Collection, id: &str) -> Result<Option<Document>, StoreError> {
        match self.overlay.get(&(collection, id.to_string())) {
            Some(staged) => Ok(staged.clone()),
            None => self.source.fetch(collection, id),
        }
    }

    fn existing(&self, collection: Collection, id: &str) -> Result<Document, StoreError> {
        self.current(collection, id)?
            .ok_or_else(|| StoreError::NotFound {
                collection,
                id: id.to_string(),
            })
    }

    fn visible(&self, collection: Collection) -> Result<Vec<Document>, StoreError> {
        let mut docs: Vec<Document> = self
            .source
            .scan(collection)?
            .into_iter()
            .filter(|doc| {
                !self
                    .overlay
                    .contains_key(&(collection, doc_id(doc).to_string()))
            })
            .collect();
        docs.extend(
            self.overlay
                .iter()
                .filter(|((c, _), _)| *c == collection)
                .filter_map(|(_, doc)| doc.clone()),
        );
        Ok(docs)
    }

    fn stage(&mut self, collection: Collection, id: String, document: Option<Document>) {
        let key = (collection, id);
        if !self.touched.contains(&key) {
            self.touched.push(key.clone());
        }
        self.overlay.insert(key, document);
    }
}

/// Filters, orders and pages documents for a list call.
pub(crate) fn run_query(mut docs: Vec<Document>, query: &Query) -> Vec<Document> {
    docs.retain(|doc| query.matches(doc));
    docs.sort_by(|a, b| {
        compare_values(a.get(CREATED_AT_FIELD), b.get(CREATED_AT_FIELD))
            .then_with(|| doc_id(a).cmp(doc_id(b)))
    });
    if let Some((field, order)) = &query.order_by {
        docs.sort_by(|a, b| {
            let ordering = compare_values(a.get(field), b.get(field));
            match order {
                SortOrder::Ascending => ordering,
                SortOrder::Descending => ordering.reverse(),
            }
        });
    }
    docs.into_iter()
        .skip(query.offset)
        .take(query.limit.unwrap_or(usize::MAX))
        .collect()
}

/// Orders JSON values: missing first, then numbers, then strings, then the
/// rest by their text.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(v: Option<&Value>) -> u8 {
        match v {
            None | Some(Value::Null) => 0,
            Some(Value::Number(_)) => 1,
            Some(Value::String(_)) => 2,
            Some(_) => 3,
        }
    }

    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(x), Some(y)) if rank(a) == rank(b) => x.to_string().cmp(&y.to_string()),
        _ => rank(a).cmp(&rank(b)),
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
