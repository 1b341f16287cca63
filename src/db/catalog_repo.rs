// src/db/catalog_repo.rs

use std::sync::Arc;

use crate::{
    common::error::AppError,
    db::{
        collection::Collection,
        document_store::{DocumentStore, Query},
    },
    models::catalog::{CatalogItem, CatalogItemPayload, TailoringItem, TailoringItemPayload},
};

// Tabela de preços e serviços de alfaiataria.
#[derive(Clone)]
pub struct CatalogRepository {
    items: Collection<CatalogItem>,
    tailoring: Collection<TailoringItem>,
}

impl CatalogRepository {
    pub fn new(store: Arc<dyn DocumentStore>, items: &str, tailoring: &str) -> Self {
        Self {
            items: Collection::new(store.clone(), items),
            tailoring: Collection::new(store, tailoring),
        }
    }

    pub async fn list_items(&self) -> Result<Vec<CatalogItem>, AppError> {
        self.items.list(&Query::new()).await
    }

    pub async fn get_item(&self, id: &str) -> Result<CatalogItem, AppError> {
        self.items.get(id).await
    }

    pub async fn create_item(&self, item: &CatalogItemPayload) -> Result<CatalogItem, AppError> {
        self.items.create(None, item).await
    }

    pub async fn update_item(&self, id: &str, item: &CatalogItemPayload) -> Result<CatalogItem, AppError> {
        self.items.update(id, item).await
    }

    pub async fn delete_item(&self, id: &str) -> Result<(), AppError> {
        self.items.delete(id).await
    }

    pub async fn list_tailoring(&self) -> Result<Vec<TailoringItem>, AppError> {
        self.tailoring.list(&Query::new()).await
    }

    pub async fn get_tailoring(&self, id: &str) -> Result<TailoringItem, AppError> {
        self.tailoring.get(id).await
    }

    pub async fn create_tailoring(&self, item: &TailoringItemPayload) -> Result<TailoringItem, AppError> {
        self.tailoring.create(None, item).await
    }

    pub async fn update_tailoring(&self, id: &str, item: &TailoringItemPayload) -> Result<TailoringItem, AppError> {
        self.tailoring.update(id, item).await
    }

    pub async fn delete_tailoring(&self, id: &str) -> Result<(), AppError> {
        self.tailoring.delete(id).await
    }
}
