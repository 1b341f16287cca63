// src/services/crm_service.rs

use validator::Validate;

use crate::{
    common::error::AppError,
    db::{document_store::Page, reference::DocRef, CrmRepository},
    models::{
        auth::SessionUser,
        crm::{Customer, CustomerPayload, CustomerRecord},
    },
    services::permissions,
};

// Clientes da loja. Qualquer cargo do painel cadastra e edita;
// excluir é só para quem gerencia a loja.
#[derive(Clone)]
pub struct CrmService {
    crm_repo: CrmRepository,
}

impl CrmService {
    pub fn new(crm_repo: CrmRepository) -> Self {
        Self { crm_repo }
    }

    pub async fn list_customers(&self, shop_id: &str, page: &Page) -> Result<Vec<Customer>, AppError> {
        self.crm_repo.list_by_shop(shop_id, page).await
    }

    pub async fn get_customer(&self, shop_id: &str, id: &str) -> Result<Customer, AppError> {
        let customer = self.crm_repo.get(id).await?;
        if customer.shop_id.as_ref().map(DocRef::id) != Some(shop_id) {
            return Err(AppError::not_found("customers", id));
        }
        Ok(customer)
    }

    pub async fn create_customer(&self, shop_id: &str, payload: &CustomerPayload) -> Result<Customer, AppError> {
        payload.validate()?;
        self.crm_repo
            .create(&CustomerRecord { shop_id, customer: payload })
            .await
    }

    pub async fn update_customer(&self, shop_id: &str, id: &str, payload: &CustomerPayload) -> Result<Customer, AppError> {
        payload.validate()?;
        self.get_customer(shop_id, id).await?;
        self.crm_repo.update(id, payload).await
    }

    pub async fn delete_customer(&self, user: &SessionUser, shop_id: &str, id: &str) -> Result<(), AppError> {
        if !permissions::can_manage_shop(permissions::role_in_shop(user, shop_id)) {
            return Err(AppError::forbidden("records_management_denied"));
        }
        self.get_customer(shop_id, id).await?;
        self.crm_repo.delete(id).await?;
        tracing::info!("Cliente {} removido da loja {}", id, shop_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::rbac::Role,
        services::test_support::{memory_store, session_user},
    };

    fn payload(name: &str, email: Option<&str>) -> CustomerPayload {
        CustomerPayload {
            name: name.into(),
            phone: None,
            email: email.map(str::to_string),
            address: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn customer_lifecycle_in_one_shop() {
        let service = CrmService::new(CrmRepository::new(memory_store(), "customers"));

        let created = service.create_customer("s1", &payload("Maria", None)).await.unwrap();
        let updated = service
            .update_customer("s1", &created.id, &payload("Maria Souza", Some("maria@example.com")))
            .await
            .unwrap();
        assert_eq!(updated.name, "Maria Souza");

        let salesman = session_user("v", Some(Role::Salesman), &["s1"]);
        assert!(matches!(
            service.delete_customer(&salesman, "s1", &created.id).await,
            Err(AppError::Forbidden(_))
        ));

        let manager = session_user("g", Some(Role::Manager), &["s1"]);
        service.delete_customer(&manager, "s1", &created.id).await.unwrap();
        assert!(service.list_customers("s1", &Page::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn invalid_email_is_rejected() {
        let service = CrmService::new(CrmRepository::new(memory_store(), "customers"));
        let result = service.create_customer("s1", &payload("Maria", Some("nao-e-email"))).await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }
}
