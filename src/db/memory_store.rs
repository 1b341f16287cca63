// src/db/memory_store.rs

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::{
    common::error::AppError,
    db::document_store::{new_document_id, strip_meta, Document, DocumentStore, Fields, Query, CREATED_AT},
};

/// Store em memória com a mesma semântica do backend Postgres.
/// Usado em desenvolvimento local (`STORE_BACKEND=memory`) e nos testes.
#[derive(Default)]
pub struct MemoryDocumentStore {
    // Vec preserva a ordem de inserção (a "ordem natural" das listagens).
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn list(&self, collection: &str, query: &Query) -> Result<Vec<Document>, AppError> {
        let collections = self.collections.read().await;
        let Some(docs) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut matched: Vec<(usize, &Document)> = docs
            .iter()
            .enumerate()
            .filter(|(_, doc)| query.filters.iter().all(|f| f.matches(doc)))
            .collect();

        if let Some(field) = &query.order_desc {
            matched.sort_by(|(ia, a), (ib, b)| {
                let by_field = if field == CREATED_AT {
                    a.created_at.cmp(&b.created_at)
                } else {
                    compare_values(a.data.get(field), b.data.get(field))
                };
                by_field.then(ia.cmp(ib)).reverse()
            });
        }

        Ok(matched
            .into_iter()
            .map(|(_, doc)| doc.clone())
            .skip(query.offset.unwrap_or(0))
            .take(query.limit.unwrap_or(usize::MAX))
            .collect())
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Document, AppError> {
        let collections = self.collections.read().await;
        collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| d.id == id))
            .cloned()
            .ok_or_else(|| AppError::not_found(collection, id))
    }

    async fn create(
        &self,
        collection: &str,
        id: Option<&str>,
        fields: Fields,
    ) -> Result<Document, AppError> {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();

        let id = id.map(str::to_string).unwrap_or_else(new_document_id);
        if docs.iter().any(|d| d.id == id) {
            return Err(AppError::Conflict("document_already_exists".into()));
        }

        let now = Utc::now();
        let doc = Document {
            id,
            collection: collection.to_string(),
            created_at: now,
            updated_at: now,
            data: strip_meta(fields),
        };
        docs.push(doc.clone());
        Ok(doc)
    }

    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<Document, AppError> {
        let mut collections = self.collections.write().await;
        let doc = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|d| d.id == id))
            .ok_or_else(|| AppError::not_found(collection, id))?;

        doc.data.extend(strip_meta(fields));
        doc.updated_at = Utc::now();
        Ok(doc.clone())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), AppError> {
        let mut collections = self.collections.write().await;
        let docs = collections
            .get_mut(collection)
            .ok_or_else(|| AppError::not_found(collection, id))?;

        let before = docs.len();
        docs.retain(|d| d.id != id);
        if docs.len() == before {
            return Err(AppError::not_found(collection, id));
        }
        Ok(())
    }
}
