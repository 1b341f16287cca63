// src/db/tenancy_repo.rs

use std::sync::Arc;

use crate::{
    common::error::AppError,
    db::{
        collection::Collection,
        document_store::{DocumentStore, Query},
    },
    models::tenancy::{AssignmentPatch, NewAssignment, Shop, ShopPayload, UserShopAssignment},
};

#[derive(Clone)]
pub struct ShopRepository {
    shops: Collection<Shop>,
}

impl ShopRepository {
    pub fn new(store: Arc<dyn DocumentStore>, collection: &str) -> Self {
        Self { shops: Collection::new(store, collection) }
    }

    /// Todas as lojas, na ordem natural do store (a "primeira" loja é a mais antiga).
    pub async fn list_all(&self) -> Result<Vec<Shop>, AppError> {
        self.shops.list(&Query::new()).await
    }

    pub async fn get(&self, id: &str) -> Result<Shop, AppError> {
        self.shops.get(id).await
    }

    pub async fn create(&self, shop: &ShopPayload) -> Result<Shop, AppError> {
        self.shops.create(None, shop).await
    }

    pub async fn update(&self, id: &str, shop: &ShopPayload) -> Result<Shop, AppError> {
        self.shops.update(id, shop).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        self.shops.delete(id).await
    }
}

// Atribuições usuário-loja. Nenhuma restrição de unicidade no store:
// quem garante "uma por (usuário, loja)" é o serviço (busca antes de criar).
#[derive(Clone)]
pub struct AssignmentRepository {
    assignments: Collection<UserShopAssignment>,
}

impl AssignmentRepository {
    pub fn new(store: Arc<dyn DocumentStore>, collection: &str) -> Self {
        Self { assignments: Collection::new(store, collection) }
    }

    pub async fn find(&self, user_id: &str, shop_id: &str) -> Result<Option<UserShopAssignment>, AppError> {
        self.assignments
            .first(Query::new().equal("userId", user_id).equal("shopId", shop_id))
            .await
    }

    /// Linha "pendente": sem loja e inativa.
    pub async fn find_pending(&self, user_id: &str) -> Result<Option<UserShopAssignment>, AppError> {
        Ok(self
            .list_for_user(user_id)
            .await?
            .into_iter()
            .find(|a| a.is_pending()))
    }

    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<UserShopAssignment>, AppError> {
        self.assignments.list(&Query::new().equal("userId", user_id)).await
    }

    pub async fn list_for_shop(&self, shop_id: &str) -> Result<Vec<UserShopAssignment>, AppError> {
        self.assignments.list(&Query::new().equal("shopId", shop_id)).await
    }

    pub async fn create(&self, assignment: &NewAssignment<'_>) -> Result<UserShopAssignment, AppError> {
        self.assignments.create(None, assignment).await
    }

    pub async fn update(&self, id: &str, patch: &AssignmentPatch<'_>) -> Result<UserShopAssignment, AppError> {
        self.assignments.update(id, patch).await
    }
}
