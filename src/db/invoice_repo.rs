// src/db/invoice_repo.rs

use std::sync::Arc;

use crate::{
    common::error::AppError,
    db::{
        collection::Collection,
        document_store::{DocumentStore, Page, Query},
    },
    models::purchasing::{InvoiceFilePatch, InvoicePayload, InvoiceRecord, PurchaseInvoice},
};

#[derive(Clone)]
pub struct InvoiceRepository {
    invoices: Collection<PurchaseInvoice>,
}

impl InvoiceRepository {
    pub fn new(store: Arc<dyn DocumentStore>, collection: &str) -> Self {
        Self { invoices: Collection::new(store, collection) }
    }

    pub async fn list_by_shop(&self, shop_id: &str, page: &Page) -> Result<Vec<PurchaseInvoice>, AppError> {
        self.invoices
            .list(&Query::new().equal("shopId", shop_id).order_desc("invoiceDate").page(page))
            .await
    }

    pub async fn get(&self, id: &str) -> Result<PurchaseInvoice, AppError> {
        self.invoices.get(id).await
    }

    pub async fn create(&self, record: &InvoiceRecord<'_>) -> Result<PurchaseInvoice, AppError> {
        self.invoices.create(None, record).await
    }

    pub async fn update(&self, id: &str, invoice: &InvoicePayload) -> Result<PurchaseInvoice, AppError> {
        self.invoices.update(id, invoice).await
    }

    pub async fn set_file(&self, id: &str, file_id: Option<&str>) -> Result<PurchaseInvoice, AppError> {
        self.invoices.update(id, &InvoiceFilePatch { file_id }).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        self.invoices.delete(id).await
    }
}
