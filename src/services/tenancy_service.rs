// src/services/tenancy_service.rs

use validator::Validate;

use crate::{
    common::error::AppError,
    db::ShopRepository,
    models::{
        auth::SessionUser,
        tenancy::{Shop, ShopPayload},
    },
    services::permissions,
};

#[derive(Clone)]
pub struct TenancyService {
    shop_repo: ShopRepository,
}

impl TenancyService {
    pub fn new(shop_repo: ShopRepository) -> Self {
        Self { shop_repo }
    }

    fn require_admin(user: &SessionUser) -> Result<(), AppError> {
        if permissions::can_switch_shops(user.role) {
            Ok(())
        } else {
            Err(AppError::forbidden("shop_management_denied"))
        }
    }

    /// Admins veem todas as lojas; os demais só as que têm atribuição ativa.
    pub async fn list_shops(&self, user: &SessionUser) -> Result<Vec<Shop>, AppError> {
        let shops = self.shop_repo.list_all().await?;
        if permissions::can_switch_shops(user.role) {
            return Ok(shops);
        }
        Ok(shops
            .into_iter()
            .filter(|s| user.shop_ids.contains(&s.id))
            .collect())
    }

    pub async fn get_shop(&self, user: &SessionUser, id: &str) -> Result<Shop, AppError> {
        if !permissions::can_switch_shops(user.role) && !user.shop_ids.iter().any(|s| s == id) {
            return Err(AppError::forbidden("shop_scope_denied"));
        }
        self.shop_repo.get(id).await
    }

    pub async fn create_shop(&self, user: &SessionUser, payload: &ShopPayload) -> Result<Shop, AppError> {
        Self::require_admin(user)?;
        payload.validate()?;

        let shop = self.shop_repo.create(payload).await?;
        tracing::info!("Loja {} criada por {}", shop.id, user.profile.id);
        Ok(shop)
    }

    pub async fn update_shop(&self, user: &SessionUser, id: &str, payload: &ShopPayload) -> Result<Shop, AppError> {
        Self::require_admin(user)?;
        payload.validate()?;

        self.shop_repo.update(id, payload).await
    }

    /// Remove só o documento da loja. Atribuições, vendas e cadastros
    /// que apontam para ela continuam no banco.
    pub async fn delete_shop(&self, user: &SessionUser, id: &str) -> Result<(), AppError> {
        Self::require_admin(user)?;

        self.shop_repo.delete(id).await?;
        tracing::warn!(
            "Loja {} removida por {} (registros vinculados não foram apagados)",
            id,
            user.profile.id
        );
        Ok(())
    }
}
