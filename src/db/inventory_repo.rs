// src/db/inventory_repo.rs

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::{
    common::error::AppError,
    db::{
        collection::Collection,
        document_store::{DocumentStore, Page, Query, CREATED_AT},
    },
    models::inventory::{Fabric, FabricPayload, FabricRecord, StockPatch},
};

#[derive(Clone)]
pub struct FabricRepository {
    fabrics: Collection<Fabric>,
}

impl FabricRepository {
    pub fn new(store: Arc<dyn DocumentStore>, collection: &str) -> Self {
        Self { fabrics: Collection::new(store, collection) }
    }

    pub fn collection(&self) -> &str {
        self.fabrics.name()
    }

    pub async fn list_by_shop(&self, shop_id: &str, page: &Page) -> Result<Vec<Fabric>, AppError> {
        self.fabrics
            .list(&Query::new().equal("shopId", shop_id).order_desc(CREATED_AT).page(page))
            .await
    }

    pub async fn get(&self, id: &str) -> Result<Fabric, AppError> {
        self.fabrics.get(id).await
    }

    pub async fn create(&self, record: &FabricRecord<'_>) -> Result<Fabric, AppError> {
        self.fabrics.create(None, record).await
    }

    pub async fn update(&self, id: &str, fabric: &FabricPayload) -> Result<Fabric, AppError> {
        self.fabrics.update(id, fabric).await
    }

    /// Escrita simples do saldo. Não é um decremento atômico: quem chama
    /// leu o valor antes (read-modify-write).
    pub async fn set_stock(&self, id: &str, quantity: Decimal) -> Result<Fabric, AppError> {
        self.fabrics
            .update(id, &StockPatch { stock_quantity: quantity })
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        self.fabrics.delete(id).await
    }
}
