use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use super::{Filter, OrderBy, RemoteStore};
use crate::error::AppError;

/// In-memory document store for tests and offline development.
///
/// `set_offline(true)` makes every call fail with a `Transient` error, to
/// exercise remote-unavailable paths.
#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<BTreeMap<String, BTreeMap<String, Value>>>,
    offline: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, AtomicOrdering::SeqCst);
    }

    pub fn count(&self, collection: &str) -> usize {
        self.lock()
            .get(collection)
            .map(|docs| docs.len())
            .unwrap_or(0)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, BTreeMap<String, Value>>> {
        self.collections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn check_online(&self) -> Result<(), AppError> {
        if self.offline.load(AtomicOrdering::SeqCst) {
            Err(AppError::Transient("remote store unavailable".to_string()))
        } else {
            Ok(())
        }
    }
}

fn with_id(mut doc: Value, id: &str) -> Value {
    if let Some(map) = doc.as_object_mut() {
        map.insert("id".to_string(), Value::String(id.to_string()));
    }
    doc
}

fn compare_fields(a: &Value, b: &Value, field: &str) -> Ordering {
    match (a.get(field), b.get(field)) {
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .unwrap_or(0.0)
            .total_cmp(&y.as_f64().unwrap_or(0.0)),
        _ => Ordering::Equal,
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn insert(&self, collection: &str, doc: Value) -> Result<String, AppError> {
        self.check_online()?;
        let id = Uuid::new_v4().to_string();
        self.lock()
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), doc);
        Ok(id)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, AppError> {
        self.check_online()?;
        Ok(self
            .lock()
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|doc| with_id(doc.clone(), id)))
    }

    async fn query(
        &self,
        collection: &str,
        filters: &[Filter],
        order_by: Option<OrderBy>,
    ) -> Result<Vec<Value>, AppError> {
        self.check_online()?;
        let mut results: Vec<Value> = self
            .lock()
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|(_, doc)| {
                        filters
                            .iter()
                            .all(|f| doc.get(&f.field) == Some(&f.equals))
                    })
                    .map(|(id, doc)| with_id(doc.clone(), id))
                    .collect()
            })
            .unwrap_or_default();

        if let Some(order) = order_by {
            results.sort_by(|a, b| {
                let cmp = compare_fields(a, b, order.field);
                if order.descending { cmp.reverse() } else { cmp }
            });
        }
        Ok(results)
    }

    async fn upsert(&self, collection: &str, id: &str, doc: Value) -> Result<(), AppError> {
        self.check_online()?;
        self.lock()
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), doc);
        Ok(())
    }

    async fn update(&self, collection: &str, id: &str, patch: Value) -> Result<(), AppError> {
        self.check_online()?;
        let mut collections = self.lock();
        let doc = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or(AppError::NotFound)?;
        if let (Some(target), Some(fields)) = (doc.as_object_mut(), patch.as_object()) {
            for (key, value) in fields {
                target.insert(key.clone(), value.clone());
            }
        }
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), AppError> {
        self.check_online()?;
        if let Some(docs) = self.lock().get_mut(collection) {
            docs.remove(id);
        }
        Ok(())
    }
}
