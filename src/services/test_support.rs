// src/services/test_support.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    db::{document_store::DocumentStore, memory_store::MemoryDocumentStore},
    models::{
        auth::{SessionUser, UserProfile, UserStatus},
        rbac::Role,
    },
};

pub fn memory_store() -> Arc<dyn DocumentStore> {
    Arc::new(MemoryDocumentStore::new())
}

pub fn session_user(profile_id: &str, role: Option<Role>, shop_ids: &[&str]) -> SessionUser {
    SessionUser {
        session_id: Uuid::new_v4(),
        account_id: format!("acc-{profile_id}"),
        profile: UserProfile {
            id: profile_id.to_string(),
            account_id: Some(format!("acc-{profile_id}")),
            name: profile_id.to_string(),
            email: format!("{profile_id}@example.com"),
            phone: None,
            avatar: None,
            status: UserStatus::Active,
            created_at: None,
        },
        role,
        shop_ids: shop_ids.iter().map(|s| s.to_string()).collect(),
        // Mesmo cargo em todas as lojas informadas.
        shop_roles: role
            .map(|role| shop_ids.iter().map(|s| (s.to_string(), role)).collect())
            .unwrap_or_default(),
    }
}
