// src/services/user_service.rs

use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::{document_store::Page, AssignmentRepository, UserRepository},
    models::{
        auth::{CreateUserPayload, Identity, NewUserProfile, SessionUser, UserProfile, UserProfilePatch, UserStatus},
        rbac::{AssignmentStatus, Role},
        tenancy::NewAssignment,
    },
    services::permissions,
};

#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    assignment_repo: AssignmentRepository,
}

impl UserService {
    pub fn new(user_repo: UserRepository, assignment_repo: AssignmentRepository) -> Self {
        Self { user_repo, assignment_repo }
    }

    /// Perfil da identidade autenticada. Ausência de perfil não é erro:
    /// é o sinal para provisionar um novo (pendente).
    pub async fn ensure_profile(&self, identity: &Identity) -> Result<UserProfile, AppError> {
        // 1. Perfil já vinculado à conta
        if let Some(profile) = self.user_repo.find_profile_by_account(&identity.id).await? {
            return Ok(profile);
        }

        // 2. Perfil pré-cadastrado por um gerente com o mesmo e-mail
        if let Some(profile) = self.user_repo.find_profile_by_email(&identity.email).await? {
            tracing::info!("Vinculando perfil {} à conta {}", profile.id, identity.id);
            return self.user_repo.link_profile(&profile.id, &identity.id).await;
        }

        // 3. Primeiro acesso: perfil + atribuição pendente
        let profile = self
            .user_repo
            .create_profile(&NewUserProfile {
                account_id: Some(identity.id.clone()),
                name: identity.name.clone(),
                email: identity.email.to_lowercase(),
                phone: None,
                avatar: None,
                status: UserStatus::Active,
            })
            .await?;

        self.create_pending_assignment(&profile.id).await?;
        tracing::info!("Perfil {} provisionado para a conta {}", profile.id, identity.id);

        Ok(profile)
    }

    /// Resolve perfil + atribuições ativas no usuário da requisição.
    pub async fn session_user(&self, session_id: Uuid, identity: &Identity) -> Result<SessionUser, AppError> {
        let profile = self.ensure_profile(identity).await?;
        let assignments = self.assignment_repo.list_for_user(&profile.id).await?;

        let role = permissions::effective_role(&assignments);
        let shop_roles = permissions::shop_roles(&assignments);
        let shop_ids = shop_roles.keys().cloned().collect();

        Ok(SessionUser {
            session_id,
            account_id: identity.id.clone(),
            profile,
            role,
            shop_ids,
            shop_roles,
        })
    }

    pub async fn create_user(&self, acting: &SessionUser, payload: &CreateUserPayload) -> Result<UserProfile, AppError> {
        if !permissions::can_manage_shop(acting.role) {
            return Err(AppError::forbidden("members_management_denied"));
        }
        payload.validate()?;

        let email = payload.email.trim().to_lowercase();
        if self.user_repo.find_profile_by_email(&email).await?.is_some() {
            return Err(AppError::EmailAlreadyExists);
        }

        let profile = self
            .user_repo
            .create_profile(&NewUserProfile {
                account_id: None,
                name: payload.name.trim().to_string(),
                email,
                phone: payload.phone.clone(),
                avatar: None,
                status: UserStatus::Active,
            })
            .await?;

        self.create_pending_assignment(&profile.id).await?;
        tracing::info!("Usuário {} cadastrado por {}", profile.id, acting.profile.id);

        Ok(profile)
    }

    pub async fn list_users(&self, page: &Page) -> Result<Vec<UserProfile>, AppError> {
        self.user_repo.list_profiles(page).await
    }

    pub async fn get_user(&self, id: &str) -> Result<UserProfile, AppError> {
        self.user_repo.get_profile(id).await
    }

    pub async fn update_profile(
        &self,
        acting: &SessionUser,
        id: &str,
        patch: &UserProfilePatch,
    ) -> Result<UserProfile, AppError> {
        let own = acting.profile.id == id;
        if !own && !permissions::can_manage_shop(acting.role) {
            return Err(AppError::forbidden("profile_update_denied"));
        }
        // Status só é alterado por quem gerencia membros.
        if patch.status.is_some() && !permissions::can_manage_shop(acting.role) {
            return Err(AppError::forbidden("members_management_denied"));
        }
        patch.validate()?;

        self.user_repo.update_profile(id, patch).await
    }

    async fn create_pending_assignment(&self, user_id: &str) -> Result<(), AppError> {
        self.assignment_repo
            .create(&NewAssignment {
                user_id,
                shop_id: None,
                role: Role::User,
                status: AssignmentStatus::Inactive,
            })
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{document_store::DocumentStore, memory_store::MemoryDocumentStore};
    use serde_json::Map;
    use std::sync::Arc;

    fn service() -> (UserService, AssignmentRepository) {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryDocumentStore::new());
        let assignments = AssignmentRepository::new(store.clone(), "assignments");
        (
            UserService::new(UserRepository::new(store, "accounts", "users"), assignments.clone()),
            assignments,
        )
    }

    fn identity(id: &str, email: &str) -> Identity {
        Identity { id: id.into(), email: email.into(), name: "Ana".into(), prefs: Map::new() }
    }

    fn manager(profile: UserProfile) -> SessionUser {
        SessionUser {
            session_id: Uuid::new_v4(),
            account_id: "acc-m".into(),
            profile,
            role: Some(Role::Manager),
            shop_ids: vec!["s1".into()],
            shop_roles: [("s1".to_string(), Role::Manager)].into(),
        }
    }

    #[tokio::test]
    async fn first_sign_in_provisions_profile_and_pending_row() {
        let (users, assignments) = service();

        let profile = users.ensure_profile(&identity("acc1", "ana@example.com")).await.unwrap();
        let again = users.ensure_profile(&identity("acc1", "ana@example.com")).await.unwrap();
        assert_eq!(profile.id, again.id);

        let rows = assignments.list_for_user(&profile.id).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].is_pending());
        assert_eq!(rows[0].role, Role::User);

        let session = users.session_user(Uuid::new_v4(), &identity("acc1", "ana@example.com")).await.unwrap();
        assert_eq!(session.role, None);
        assert!(session.shop_ids.is_empty());
    }

    #[tokio::test]
    async fn pre_created_profile_is_linked_by_email() {
        let (users, assignments) = service();
        let boss = users.ensure_profile(&identity("acc-m", "chefe@example.com")).await.unwrap();

        let created = users
            .create_user(
                &manager(boss),
                &CreateUserPayload { name: "Bia".into(), email: "Bia@Example.com".into(), phone: None },
            )
            .await
            .unwrap();

        let linked = users.ensure_profile(&identity("acc2", "bia@example.com")).await.unwrap();
        assert_eq!(linked.id, created.id);
        assert_eq!(linked.account_id.as_deref(), Some("acc2"));
        assert_eq!(assignments.list_for_user(&created.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn create_user_rejects_duplicates_and_staff() {
        let (users, _) = service();
        let boss = users.ensure_profile(&identity("acc-m", "chefe@example.com")).await.unwrap();
        let acting = manager(boss);
        let payload = CreateUserPayload { name: "Bia".into(), email: "bia@example.com".into(), phone: None };

        users.create_user(&acting, &payload).await.unwrap();
        let dup = users.create_user(&acting, &payload).await;
        assert!(matches!(dup, Err(AppError::EmailAlreadyExists)));

        let salesman = SessionUser { role: Some(Role::Salesman), ..acting };
        let denied = users.create_user(&salesman, &payload).await;
        assert!(matches!(denied, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn users_edit_only_their_own_profile() {
        let (users, _) = service();
        let me = users.ensure_profile(&identity("acc1", "ana@example.com")).await.unwrap();
        let other = users.ensure_profile(&identity("acc2", "bia@example.com")).await.unwrap();
        let acting = SessionUser { role: Some(Role::Tailor), ..manager(me.clone()) };

        let patch = UserProfilePatch { phone: Some("1199".into()), ..Default::default() };
        let updated = users.update_profile(&acting, &me.id, &patch).await.unwrap();
        assert_eq!(updated.phone.as_deref(), Some("1199"));

        let denied = users.update_profile(&acting, &other.id, &patch).await;
        assert!(matches!(denied, Err(AppError::Forbidden(_))));
    }
}
