// src/services/rbac_service.rs

use crate::{
    common::error::AppError,
    db::{AssignmentRepository, ShopRepository, UserRepository},
    models::{
        auth::SessionUser,
        rbac::{AssignmentStatus, Role, RoleOption},
        tenancy::{AssignmentPatch, NewAssignment, UserShopAssignment},
    },
    services::permissions,
};

// Atribuições usuário-loja. Toda verificação de permissão acontece
// ANTES da primeira escrita.
#[derive(Clone)]
pub struct RbacService {
    assignment_repo: AssignmentRepository,
    user_repo: UserRepository,
    shop_repo: ShopRepository,
}

impl RbacService {
    pub fn new(assignment_repo: AssignmentRepository, user_repo: UserRepository, shop_repo: ShopRepository) -> Self {
        Self { assignment_repo, user_repo, shop_repo }
    }

    // Admins atuam em qualquer loja; gerentes só nas suas.
    fn require_shop_scope(acting: &SessionUser, shop_id: &str) -> Result<(), AppError> {
        if permissions::can_switch_shops(acting.role) || acting.shop_ids.iter().any(|s| s == shop_id) {
            Ok(())
        } else {
            Err(AppError::forbidden("shop_scope_denied"))
        }
    }

    // Mexer numa linha existente equivale a conceder o cargo dela de novo:
    // só quem poderia atribuir esse cargo pode alterá-la.
    fn require_authority_over(
        acting: &SessionUser,
        acting_role: Option<Role>,
        existing: &UserShopAssignment,
    ) -> Result<(), AppError> {
        if permissions::can_assign_role(acting_role, existing.role) {
            return Ok(());
        }
        tracing::warn!(
            "{} ({:?}) tentou alterar a atribuição {} ({})",
            acting.profile.id,
            acting_role,
            existing.id,
            existing.role
        );
        Err(AppError::forbidden("role_not_assignable"))
    }

    pub async fn assign_user_role(
        &self,
        acting: &SessionUser,
        user_id: &str,
        shop_id: &str,
        role: Role,
    ) -> Result<UserShopAssignment, AppError> {
        // 1. Autorização, com o cargo que o usuário tem NESTA loja
        Self::require_shop_scope(acting, shop_id)?;
        let acting_role = permissions::role_in_shop(acting, shop_id);
        if !permissions::can_assign_role(acting_role, role) {
            tracing::warn!(
                "{} ({:?}) tentou atribuir o cargo {} a {}",
                acting.profile.id,
                acting_role,
                role,
                user_id
            );
            return Err(AppError::forbidden("role_not_assignable"));
        }

        // 2. Referências precisam existir (não há integridade no store)
        self.user_repo.get_profile(user_id).await?;
        self.shop_repo.get(shop_id).await?;

        // 3. Atualiza a linha (usuário, loja) existente
        if let Some(existing) = self.assignment_repo.find(user_id, shop_id).await? {
            Self::require_authority_over(acting, acting_role, &existing)?;
            let updated = self
                .assignment_repo
                .update(
                    &existing.id,
                    &AssignmentPatch { shop_id: None, role: Some(role), status: AssignmentStatus::Active },
                )
                .await?;
            tracing::info!("Atribuição {} atualizada para {}", updated.id, role);
            return Ok(updated);
        }

        // 4. Reaproveita a linha pendente (sem loja) do usuário
        if let Some(pending) = self.assignment_repo.find_pending(user_id).await? {
            let updated = self
                .assignment_repo
                .update(
                    &pending.id,
                    &AssignmentPatch { shop_id: Some(shop_id), role: Some(role), status: AssignmentStatus::Active },
                )
                .await?;
            tracing::info!("Usuário {} saiu de pendente para {} na loja {}", user_id, role, shop_id);
            return Ok(updated);
        }

        // 5. Nova atribuição
        let created = self
            .assignment_repo
            .create(&NewAssignment {
                user_id,
                shop_id: Some(shop_id),
                role,
                status: AssignmentStatus::Active,
            })
            .await?;
        tracing::info!("Usuário {} recebeu {} na loja {}", user_id, role, shop_id);
        Ok(created)
    }

    pub async fn toggle_user_status(
        &self,
        acting: &SessionUser,
        user_id: &str,
        shop_id: &str,
        status: AssignmentStatus,
    ) -> Result<UserShopAssignment, AppError> {
        Self::require_shop_scope(acting, shop_id)?;
        let acting_role = permissions::role_in_shop(acting, shop_id);
        if !permissions::can_manage_shop(acting_role) {
            return Err(AppError::forbidden("members_management_denied"));
        }

        let assignment = self
            .assignment_repo
            .find(user_id, shop_id)
            .await?
            .ok_or_else(|| AppError::not_found("assignments", &format!("{user_id}/{shop_id}")))?;
        Self::require_authority_over(acting, acting_role, &assignment)?;

        self.assignment_repo
            .update(&assignment.id, &AssignmentPatch { shop_id: None, role: None, status })
            .await
    }

    /// Revogação suave: a linha fica inativa, o histórico é preservado.
    pub async fn remove_user_from_shop(
        &self,
        acting: &SessionUser,
        user_id: &str,
        shop_id: &str,
    ) -> Result<UserShopAssignment, AppError> {
        let revoked = self
            .toggle_user_status(acting, user_id, shop_id, AssignmentStatus::Inactive)
            .await?;
        tracing::info!("Usuário {} removido da loja {} por {}", user_id, shop_id, acting.profile.id);
        Ok(revoked)
    }

    pub fn get_assignable_roles(&self, acting: &SessionUser) -> Vec<RoleOption> {
        permissions::role_options(acting.role)
    }

    pub async fn list_shop_members(&self, acting: &SessionUser, shop_id: &str) -> Result<Vec<UserShopAssignment>, AppError> {
        Self::require_shop_scope(acting, shop_id)?;
        if !permissions::can_manage_shop(permissions::role_in_shop(acting, shop_id)) {
            return Err(AppError::forbidden("members_management_denied"));
        }
        self.assignment_repo.list_for_shop(shop_id).await
    }

    pub async fn list_user_assignments(&self, acting: &SessionUser, user_id: &str) -> Result<Vec<UserShopAssignment>, AppError> {
        if acting.profile.id != user_id && !permissions::can_manage_shop(acting.role) {
            return Err(AppError::forbidden("members_management_denied"));
        }
        self.assignment_repo.list_for_user(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::document_store::DocumentStore,
        models::{
            auth::{Identity, NewUserProfile, UserStatus},
            tenancy::ShopPayload,
        },
        services::{
            test_support::{memory_store, session_user},
            user_service::UserService,
        },
    };
    use serde_json::Map;
    use std::sync::Arc;
    use uuid::Uuid;

    struct Fixture {
        store: Arc<dyn DocumentStore>,
        service: RbacService,
        assignments: AssignmentRepository,
        user_id: String,
        shop_id: String,
    }

    async fn fixture() -> Fixture {
        let store = memory_store();
        let assignments = AssignmentRepository::new(store.clone(), "assignments");
        let users = UserRepository::new(store.clone(), "accounts", "users");
        let shops = ShopRepository::new(store.clone(), "shops");

        let profile = users
            .create_profile(&NewUserProfile {
                account_id: None,
                name: "Bia".into(),
                email: "bia@example.com".into(),
                phone: None,
                avatar: None,
                status: UserStatus::Active,
            })
            .await
            .unwrap();
        let shop = shops
            .create(&ShopPayload { name: "Centro".into(), address: None, contact: None })
            .await
            .unwrap();

        Fixture {
            store: store.clone(),
            service: RbacService::new(assignments.clone(), users, shops),
            assignments,
            user_id: profile.id,
            shop_id: shop.id,
        }
    }

    #[tokio::test]
    async fn repeated_assignment_keeps_one_row_with_latest_role() {
        let f = fixture().await;
        let admin = session_user("adm", Some(Role::Admin), &[]);

        f.service.assign_user_role(&admin, &f.user_id, &f.shop_id, Role::Salesman).await.unwrap();
        f.service.assign_user_role(&admin, &f.user_id, &f.shop_id, Role::Manager).await.unwrap();

        let rows = f.assignments.list_for_user(&f.user_id).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].role, Role::Manager);
        assert!(rows[0].is_active());
    }

    #[tokio::test]
    async fn pending_row_is_promoted_instead_of_duplicated() {
        let f = fixture().await;
        f.assignments
            .create(&NewAssignment {
                user_id: &f.user_id,
                shop_id: None,
                role: Role::User,
                status: AssignmentStatus::Inactive,
            })
            .await
            .unwrap();
        let admin = session_user("adm", Some(Role::SuperAdmin), &[]);

        let row = f.service.assign_user_role(&admin, &f.user_id, &f.shop_id, Role::Tailor).await.unwrap();

        let rows = f.assignments.list_for_user(&f.user_id).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(row.shop_id.as_ref().map(|s| s.id()), Some(f.shop_id.as_str()));
        assert_eq!(row.role, Role::Tailor);
    }

    #[tokio::test]
    async fn forbidden_grant_writes_nothing() {
        let f = fixture().await;
        let manager = session_user("mgr", Some(Role::Manager), &[f.shop_id.as_str()]);

        let denied = f.service.assign_user_role(&manager, &f.user_id, &f.shop_id, Role::Admin).await;
        assert!(matches!(denied, Err(AppError::Forbidden(_))));
        assert!(f.store.list("assignments", &Default::default()).await.unwrap().is_empty());

        let other_shop = f.service.assign_user_role(&manager, &f.user_id, "elsewhere", Role::Tailor).await;
        assert!(matches!(other_shop, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn removal_is_a_soft_revocation() {
        let f = fixture().await;
        let admin = session_user("adm", Some(Role::Admin), &[]);
        f.service.assign_user_role(&admin, &f.user_id, &f.shop_id, Role::Salesman).await.unwrap();

        let salesman = session_user("s", Some(Role::Salesman), &[f.shop_id.as_str()]);
        let denied = f.service.remove_user_from_shop(&salesman, &f.user_id, &f.shop_id).await;
        assert!(matches!(denied, Err(AppError::Forbidden(_))));

        let revoked = f.service.remove_user_from_shop(&admin, &f.user_id, &f.shop_id).await.unwrap();
        assert_eq!(revoked.status, AssignmentStatus::Inactive);
        assert_eq!(f.assignments.list_for_shop(&f.shop_id).await.unwrap().len(), 1);

        let back = f
            .service
            .toggle_user_status(&admin, &f.user_id, &f.shop_id, AssignmentStatus::Active)
            .await
            .unwrap();
        assert!(back.is_active());
    }

    #[tokio::test]
    async fn assignable_roles_mirror_the_policy() {
        let f = fixture().await;
        let manager = session_user("mgr", Some(Role::Manager), &[]);
        let values: Vec<Role> = f.service.get_assignable_roles(&manager).into_iter().map(|o| o.value).collect();
        assert_eq!(values, permissions::assignable_roles(Some(Role::Manager)));
    }

    #[tokio::test]
    async fn manager_cannot_touch_rows_above_their_own_role() {
        let f = fixture().await;
        let root = session_user("root", Some(Role::SuperAdmin), &[]);
        f.service.assign_user_role(&root, &f.user_id, &f.shop_id, Role::Admin).await.unwrap();
        f.service.remove_user_from_shop(&root, &f.user_id, &f.shop_id).await.unwrap();

        let manager = session_user("mgr", Some(Role::Manager), &[f.shop_id.as_str()]);
        let reactivated = f
            .service
            .toggle_user_status(&manager, &f.user_id, &f.shop_id, AssignmentStatus::Active)
            .await;
        assert!(matches!(reactivated, Err(AppError::Forbidden(_))));

        let overwritten = f.service.assign_user_role(&manager, &f.user_id, &f.shop_id, Role::Tailor).await;
        assert!(matches!(overwritten, Err(AppError::Forbidden(_))));

        let row = f.assignments.find(&f.user_id, &f.shop_id).await.unwrap().unwrap();
        assert_eq!((row.role, row.status), (Role::Admin, AssignmentStatus::Inactive));
    }

    #[tokio::test]
    async fn role_from_another_shop_does_not_apply_here() {
        let f = fixture().await;
        let users = UserService::new(UserRepository::new(f.store.clone(), "accounts", "users"), f.assignments.clone());
        let north = ShopRepository::new(f.store.clone(), "shops")
            .create(&ShopPayload { name: "Norte".into(), address: None, contact: None })
            .await
            .unwrap();
        let root = session_user("root", Some(Role::SuperAdmin), &[]);
        f.service.assign_user_role(&root, &f.user_id, &north.id, Role::Tailor).await.unwrap();

        // Gerente no Centro, vendedor no Norte
        let identity = Identity { id: "acc-duo".into(), email: "duo@example.com".into(), name: "Duo".into(), prefs: Map::new() };
        let duo = users.ensure_profile(&identity).await.unwrap();
        f.service.assign_user_role(&root, &duo.id, &f.shop_id, Role::Manager).await.unwrap();
        f.service.assign_user_role(&root, &duo.id, &north.id, Role::Salesman).await.unwrap();
        let acting = users.session_user(Uuid::new_v4(), &identity).await.unwrap();
        assert_eq!(acting.role, Some(Role::Manager));

        let denied = f.service.remove_user_from_shop(&acting, &f.user_id, &north.id).await;
        assert!(matches!(denied, Err(AppError::Forbidden(_))));
        assert!(f.assignments.find(&f.user_id, &north.id).await.unwrap().unwrap().is_active());

        let denied = f.service.list_shop_members(&acting, &north.id).await;
        assert!(matches!(denied, Err(AppError::Forbidden(_))));

        // Na loja em que é gerente, continua valendo.
        f.service.assign_user_role(&root, &f.user_id, &f.shop_id, Role::Tailor).await.unwrap();
        let revoked = f.service.remove_user_from_shop(&acting, &f.user_id, &f.shop_id).await.unwrap();
        assert_eq!(revoked.status, AssignmentStatus::Inactive);
    }
}
