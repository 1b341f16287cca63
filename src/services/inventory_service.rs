// src/services/inventory_service.rs

use validator::Validate;

use crate::{
    common::error::AppError,
    db::{document_store::Page, reference::DocRef, FabricRepository},
    models::{
        auth::SessionUser,
        inventory::{Fabric, FabricPayload, FabricRecord},
    },
    services::permissions,
};

#[derive(Clone)]
pub struct InventoryService {
    fabric_repo: FabricRepository,
}

impl InventoryService {
    pub fn new(fabric_repo: FabricRepository) -> Self {
        Self { fabric_repo }
    }

    fn require_manager(user: &SessionUser, shop_id: &str) -> Result<(), AppError> {
        if permissions::can_manage_shop(permissions::role_in_shop(user, shop_id)) {
            Ok(())
        } else {
            Err(AppError::forbidden("records_management_denied"))
        }
    }

    pub async fn list_fabrics(&self, shop_id: &str, page: &Page) -> Result<Vec<Fabric>, AppError> {
        self.fabric_repo.list_by_shop(shop_id, page).await
    }

    pub async fn get_fabric(&self, shop_id: &str, id: &str) -> Result<Fabric, AppError> {
        let fabric = self.fabric_repo.get(id).await?;
        if fabric.shop_id.as_ref().map(DocRef::id) != Some(shop_id) {
            return Err(AppError::not_found(self.fabric_repo.collection(), id));
        }
        Ok(fabric)
    }

    pub async fn create_fabric(&self, user: &SessionUser, shop_id: &str, payload: &FabricPayload) -> Result<Fabric, AppError> {
        Self::require_manager(user, shop_id)?;
        payload.validate()?;

        let fabric = self
            .fabric_repo
            .create(&FabricRecord { shop_id, fabric: payload })
            .await?;
        tracing::info!("Tecido {} ({}) cadastrado na loja {}", fabric.id, fabric.code, shop_id);
        Ok(fabric)
    }

    pub async fn update_fabric(
        &self,
        user: &SessionUser,
        shop_id: &str,
        id: &str,
        payload: &FabricPayload,
    ) -> Result<Fabric, AppError> {
        Self::require_manager(user, shop_id)?;
        payload.validate()?;
        self.get_fabric(shop_id, id).await?;

        self.fabric_repo.update(id, payload).await
    }

    pub async fn delete_fabric(&self, user: &SessionUser, shop_id: &str, id: &str) -> Result<(), AppError> {
        Self::require_manager(user, shop_id)?;
        self.get_fabric(shop_id, id).await?;

        self.fabric_repo.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::rbac::Role,
        services::test_support::{memory_store, session_user},
    };
    use rust_decimal::Decimal;

    fn payload(stock: i64) -> FabricPayload {
        FabricPayload {
            name: "Linho".into(),
            code: "LIN-1".into(),
            color: Some("bege".into()),
            stock_quantity: Decimal::from(stock),
            purchase_price: None,
            sale_price: Some(Decimal::from(120)),
        }
    }

    #[tokio::test]
    async fn negative_stock_is_rejected_on_create() {
        let service = InventoryService::new(FabricRepository::new(memory_store(), "fabrics"));
        let manager = session_user("g", Some(Role::Manager), &["s1"]);

        let result = service.create_fabric(&manager, "s1", &payload(-1)).await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn fabrics_are_listed_per_shop() {
        let service = InventoryService::new(FabricRepository::new(memory_store(), "fabrics"));
        let admin = session_user("a", Some(Role::Admin), &[]);

        let mine = service.create_fabric(&admin, "s1", &payload(4)).await.unwrap();
        service.create_fabric(&admin, "s2", &payload(8)).await.unwrap();

        let listed = service.list_fabrics("s1", &Page::default()).await.unwrap();
        assert_eq!(listed, vec![mine.clone()]);
        assert!(matches!(
            service.get_fabric("s2", &mine.id).await,
            Err(AppError::DocumentNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn staff_cannot_edit_the_catalog_of_fabrics() {
        let service = InventoryService::new(FabricRepository::new(memory_store(), "fabrics"));
        let tailor = session_user("t", Some(Role::Tailor), &["s1"]);
        let result = service.create_fabric(&tailor, "s1", &payload(1)).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn managing_one_shop_does_not_reach_another() {
        let service = InventoryService::new(FabricRepository::new(memory_store(), "fabrics"));
        let mut user = session_user("g", Some(Role::Manager), &["s1"]);
        user.shop_roles.insert("s2".into(), Role::Salesman);
        user.shop_ids.push("s2".into());

        service.create_fabric(&user, "s1", &payload(2)).await.unwrap();
        let result = service.create_fabric(&user, "s2", &payload(2)).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }
}
