// src/db/sales_repo.rs

use std::sync::Arc;

use crate::{
    common::error::AppError,
    db::{
        collection::Collection,
        document_store::{DocumentStore, Page, Query, CREATED_AT},
    },
    models::sales::{
        FabricSale, FabricSalePatch, FabricSaleRecord, NewPayment, NewTransaction, Payment,
        Transaction,
    },
};

// Transações, vendas de tecido e pagamentos: três coleções sem vínculo
// transacional entre si.
#[derive(Clone)]
pub struct SalesRepository {
    transactions: Collection<Transaction>,
    sales: Collection<FabricSale>,
    payments: Collection<Payment>,
}

impl SalesRepository {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        transactions: &str,
        sales: &str,
        payments: &str,
    ) -> Self {
        Self {
            transactions: Collection::new(store.clone(), transactions),
            sales: Collection::new(store.clone(), sales),
            payments: Collection::new(store, payments),
        }
    }

    pub async fn create_transaction(&self, tx: &NewTransaction<'_>) -> Result<Transaction, AppError> {
        self.transactions.create(None, tx).await
    }

    pub async fn create_sale(&self, sale: &FabricSaleRecord<'_>) -> Result<FabricSale, AppError> {
        self.sales.create(None, sale).await
    }

    pub async fn get_sale(&self, id: &str) -> Result<FabricSale, AppError> {
        self.sales.get(id).await
    }

    pub async fn update_sale(&self, id: &str, patch: &FabricSalePatch<'_>) -> Result<FabricSale, AppError> {
        self.sales.update(id, patch).await
    }

    pub async fn delete_sale(&self, id: &str) -> Result<(), AppError> {
        self.sales.delete(id).await
    }

    pub async fn list_sales(&self, shop_id: &str, page: &Page) -> Result<Vec<FabricSale>, AppError> {
        self.sales
            .list(&Query::new().equal("shopId", shop_id).order_desc(CREATED_AT).page(page))
            .await
    }

    pub async fn create_payment(&self, payment: &NewPayment<'_>) -> Result<Payment, AppError> {
        self.payments.create(None, payment).await
    }
}
