// src/db/crm_repo.rs

use std::sync::Arc;

use crate::{
    common::error::AppError,
    db::{
        collection::Collection,
        document_store::{DocumentStore, Page, Query, CREATED_AT},
    },
    models::crm::{Customer, CustomerPayload, CustomerRecord},
};

#[derive(Clone)]
pub struct CrmRepository {
    customers: Collection<Customer>,
}

impl CrmRepository {
    pub fn new(store: Arc<dyn DocumentStore>, collection: &str) -> Self {
        Self { customers: Collection::new(store, collection) }
    }

    pub async fn list_by_shop(&self, shop_id: &str, page: &Page) -> Result<Vec<Customer>, AppError> {
        self.customers
            .list(&Query::new().equal("shopId", shop_id).order_desc(CREATED_AT).page(page))
            .await
    }

    pub async fn get(&self, id: &str) -> Result<Customer, AppError> {
        self.customers.get(id).await
    }

    pub async fn create(&self, record: &CustomerRecord<'_>) -> Result<Customer, AppError> {
        self.customers.create(None, record).await
    }

    pub async fn update(&self, id: &str, customer: &CustomerPayload) -> Result<Customer, AppError> {
        self.customers.update(id, customer).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        self.customers.delete(id).await
    }
}
