// src/services/catalog_service.rs

use validator::Validate;

use crate::{
    common::error::AppError,
    db::{reference::DocRef, CatalogRepository},
    models::{
        auth::SessionUser,
        catalog::{CatalogItem, CatalogItemPayload, TailoringItem, TailoringItemPayload},
    },
    services::permissions,
};

// Lista vazia de lojas = item vale para todas.
fn visible_in(shop_ids: &[DocRef], shop_id: Option<&str>) -> bool {
    match shop_id {
        None => true,
        Some(shop) => shop_ids.is_empty() || shop_ids.iter().any(|s| s.id() == shop),
    }
}

fn stored(shop_ids: &[DocRef]) -> Vec<&str> {
    shop_ids.iter().map(DocRef::id).collect()
}

fn requested(shop_ids: &[String]) -> Vec<&str> {
    shop_ids.iter().map(String::as_str).collect()
}

#[derive(Clone)]
pub struct CatalogService {
    catalog_repo: CatalogRepository,
}

impl CatalogService {
    pub fn new(catalog_repo: CatalogRepository) -> Self {
        Self { catalog_repo }
    }

    /// Cada lista de lojas tocada exige cargo de gestão em todas elas.
    /// Lista vazia (item global) usa o cargo mais alto do usuário.
    fn require_manager(user: &SessionUser, scopes: &[&[&str]]) -> Result<(), AppError> {
        let allowed = scopes.iter().all(|shop_ids| {
            if shop_ids.is_empty() {
                permissions::can_manage_shop(user.role)
            } else {
                shop_ids
                    .iter()
                    .all(|shop| permissions::can_manage_shop(permissions::role_in_shop(user, shop)))
            }
        });

        if allowed {
            Ok(())
        } else {
            Err(AppError::forbidden("records_management_denied"))
        }
    }

    // --- Itens da tabela de preços ---

    pub async fn list_items(&self, shop_id: Option<&str>) -> Result<Vec<CatalogItem>, AppError> {
        Ok(self
            .catalog_repo
            .list_items()
            .await?
            .into_iter()
            .filter(|item| visible_in(&item.shop_ids, shop_id))
            .collect())
    }

    pub async fn get_item(&self, id: &str) -> Result<CatalogItem, AppError> {
        self.catalog_repo.get_item(id).await
    }

    pub async fn create_item(&self, user: &SessionUser, payload: &CatalogItemPayload) -> Result<CatalogItem, AppError> {
        Self::require_manager(user, &[&requested(&payload.shop_ids)])?;
        payload.validate()?;
        self.catalog_repo.create_item(payload).await
    }

    pub async fn update_item(&self, user: &SessionUser, id: &str, payload: &CatalogItemPayload) -> Result<CatalogItem, AppError> {
        let existing = self.catalog_repo.get_item(id).await?;
        Self::require_manager(user, &[&stored(&existing.shop_ids), &requested(&payload.shop_ids)])?;
        payload.validate()?;
        self.catalog_repo.update_item(id, payload).await
    }

    pub async fn delete_item(&self, user: &SessionUser, id: &str) -> Result<(), AppError> {
        let existing = self.catalog_repo.get_item(id).await?;
        Self::require_manager(user, &[&stored(&existing.shop_ids)])?;
        self.catalog_repo.delete_item(id).await
    }

    // --- Serviços de alfaiataria ---

    pub async fn list_tailoring(&self, shop_id: Option<&str>) -> Result<Vec<TailoringItem>, AppError> {
        Ok(self
            .catalog_repo
            .list_tailoring()
            .await?
            .into_iter()
            .filter(|item| visible_in(&item.shop_ids, shop_id))
            .collect())
    }

    pub async fn create_tailoring(&self, user: &SessionUser, payload: &TailoringItemPayload) -> Result<TailoringItem, AppError> {
        Self::require_manager(user, &[&requested(&payload.shop_ids)])?;
        payload.validate()?;
        self.catalog_repo.create_tailoring(payload).await
    }

    pub async fn update_tailoring(
        &self,
        user: &SessionUser,
        id: &str,
        payload: &TailoringItemPayload,
    ) -> Result<TailoringItem, AppError> {
        let existing = self.catalog_repo.get_tailoring(id).await?;
        Self::require_manager(user, &[&stored(&existing.shop_ids), &requested(&payload.shop_ids)])?;
        payload.validate()?;
        self.catalog_repo.update_tailoring(id, payload).await
    }

    pub async fn delete_tailoring(&self, user: &SessionUser, id: &str) -> Result<(), AppError> {
        let existing = self.catalog_repo.get_tailoring(id).await?;
        Self::require_manager(user, &[&stored(&existing.shop_ids)])?;
        self.catalog_repo.delete_tailoring(id).await
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

    fn service() -> CatalogService {
        CatalogService::new(CatalogRepository::new(memory_store(), "catalog_items", "tailoring_items"))
    }

    fn item(name: &str, shops: &[&str]) -> CatalogItemPayload {
        CatalogItemPayload {
            name: name.into(),
            description: None,
            price: Decimal::from(900),
            worker_price: Decimal::from(300),
            shop_ids: shops.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn shop_filter_keeps_global_and_matching_items() {
        let service = service();
        let admin = session_user("a", Some(Role::Admin), &[]);
        service.create_item(&admin, &item("Terno", &[])).await.unwrap();
        service.create_item(&admin, &item("Colete", &["s1"])).await.unwrap();
        service.create_item(&admin, &item("Fraque", &["s2"])).await.unwrap();

        let names: Vec<String> = service.list_items(Some("s1")).await.unwrap().into_iter().map(|i| i.name).collect();
        assert_eq!(names, vec!["Terno", "Colete"]);
        assert_eq!(service.list_items(None).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn tailoring_requires_a_managing_role() {
        let service = service();
        let payload = TailoringItemPayload {
            name: "Bainha".into(),
            sell_price: Decimal::from(40),
            worker_price: Decimal::from(15),
            shop_ids: vec![],
        };

        let tailor = session_user("t", Some(Role::Tailor), &["s1"]);
        assert!(matches!(
            service.create_tailoring(&tailor, &payload).await,
            Err(AppError::Forbidden(_))
        ));

        let manager = session_user("g", Some(Role::Manager), &["s1"]);
        let created = service.create_tailoring(&manager, &payload).await.unwrap();
        assert_eq!(created.sell_price, Decimal::from(40));
    }

    #[tokio::test]
    async fn managing_one_shop_does_not_reach_another() {
        let service = service();
        let admin = session_user("a", Some(Role::Admin), &[]);
        let colete = service.create_item(&admin, &item("Colete", &["s2"])).await.unwrap();

        let mut manager = session_user("g", Some(Role::Manager), &["s1"]);
        manager.shop_roles.insert("s2".into(), Role::Salesman);
        manager.shop_ids.push("s2".into());

        assert!(matches!(
            service.create_item(&manager, &item("Fraque", &["s1", "s2"])).await,
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            service.update_item(&manager, &colete.id, &item("Colete", &["s1"])).await,
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(service.delete_item(&manager, &colete.id).await, Err(AppError::Forbidden(_))));

        service.create_item(&manager, &item("Gravata", &["s1"])).await.unwrap();
        assert_eq!(service.list_items(Some("s2")).await.unwrap().len(), 1);
    }
}
