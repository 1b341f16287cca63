// src/db/user_repo.rs

use std::sync::Arc;

use serde_json::{json, Map, Value};

use crate::{
    common::error::AppError,
    db::{
        collection::Collection,
        document_store::{DocumentStore, Page, Query, CREATED_AT},
    },
    models::auth::{Account, NewAccount, NewUserProfile, UserProfile, UserProfilePatch},
};

// Contas de login ("accounts") e perfis ("users").
#[derive(Clone)]
pub struct UserRepository {
    accounts: Collection<Account>,
    profiles: Collection<UserProfile>,
}

impl UserRepository {
    pub fn new(store: Arc<dyn DocumentStore>, accounts: &str, profiles: &str) -> Self {
        Self {
            accounts: Collection::new(store.clone(), accounts),
            profiles: Collection::new(store, profiles),
        }
    }

    // ---
    // Contas
    // ---

    pub async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, AppError> {
        self.accounts
            .first(Query::new().equal("email", email.to_lowercase()))
            .await
    }

    pub async fn find_account(&self, id: &str) -> Result<Account, AppError> {
        self.accounts.get(id).await
    }

    pub async fn create_account(&self, account: &NewAccount<'_>) -> Result<Account, AppError> {
        self.accounts.create(None, account).await
    }

    /// Mescla `patch` nas preferências da conta. `null` remove a chave.
    pub async fn merge_prefs(&self, id: &str, patch: Map<String, Value>) -> Result<Account, AppError> {
        let mut prefs = self.accounts.get(id).await?.prefs;
        for (key, value) in patch {
            if value.is_null() {
                prefs.remove(&key);
            } else {
                prefs.insert(key, value);
            }
        }
        self.accounts.update(id, &json!({ "prefs": prefs })).await
    }

    // ---
    // Perfis
    // ---

    pub async fn find_profile_by_account(&self, account_id: &str) -> Result<Option<UserProfile>, AppError> {
        self.profiles
            .first(Query::new().equal("accountId", account_id))
            .await
    }

    pub async fn find_profile_by_email(&self, email: &str) -> Result<Option<UserProfile>, AppError> {
        self.profiles
            .first(Query::new().equal("email", email.to_lowercase()))
            .await
    }

    pub async fn get_profile(&self, id: &str) -> Result<UserProfile, AppError> {
        self.profiles.get(id).await
    }

    pub async fn create_profile(&self, profile: &NewUserProfile) -> Result<UserProfile, AppError> {
        self.profiles.create(None, profile).await
    }

    pub async fn link_profile(&self, id: &str, account_id: &str) -> Result<UserProfile, AppError> {
        self.profiles.update(id, &json!({ "accountId": account_id })).await
    }

    pub async fn update_profile(&self, id: &str, patch: &UserProfilePatch) -> Result<UserProfile, AppError> {
        self.profiles.update(id, patch).await
    }

    pub async fn list_profiles(&self, page: &Page) -> Result<Vec<UserProfile>, AppError> {
        self.profiles
            .list(&Query::new().order_desc(CREATED_AT).page(page))
            .await
    }
}
