// src/db/collection.rs

use std::{marker::PhantomData, sync::Arc};

use serde::{de::DeserializeOwned, Serialize};

use crate::{
    common::error::AppError,
    db::document_store::{to_fields, DocumentStore, Query},
};

/// Visão tipada de uma coleção: decodifica cada documento em `T`.
pub struct Collection<T> {
    store: Arc<dyn DocumentStore>,
    name: String,
    _model: PhantomData<fn() -> T>,
}

// Clone manual: `T` não precisa ser Clone.
impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            name: self.name.clone(),
            _model: PhantomData,
        }
    }
}

impl<T: DeserializeOwned> Collection<T> {
    pub fn new(store: Arc<dyn DocumentStore>, name: impl Into<String>) -> Self {
        Self { store, name: name.into(), _model: PhantomData }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn list(&self, query: &Query) -> Result<Vec<T>, AppError> {
        self.store
            .list(&self.name, query)
            .await?
            .iter()
            .map(|doc| doc.decode())
            .collect()
    }

    pub async fn first(&self, query: Query) -> Result<Option<T>, AppError> {
        Ok(self.list(&query.limit(1)).await?.into_iter().next())
    }

    pub async fn get(&self, id: &str) -> Result<T, AppError> {
        self.store.get(&self.name, id).await?.decode()
    }

    pub async fn create<P: Serialize>(&self, id: Option<&str>, payload: &P) -> Result<T, AppError> {
        self.store
            .create(&self.name, id, to_fields(payload)?)
            .await?
            .decode()
    }

    pub async fn update<P: Serialize>(&self, id: &str, patch: &P) -> Result<T, AppError> {
        self.store
            .update(&self.name, id, to_fields(patch)?)
            .await?
            .decode()
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        self.store.delete(&self.name, id).await
    }
}
