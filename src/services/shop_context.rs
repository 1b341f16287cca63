// src/services/shop_context.rs

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use serde_json::{json, Map, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ShopRepository, UserRepository},
    models::{
        auth::SessionUser,
        rbac::Role,
        tenancy::{Shop, ShopContextSnapshot},
    },
    services::permissions,
};

/// Chave das preferências da conta onde a última loja escolhida fica guardada.
pub const CURRENT_SHOP_PREF: &str = "currentShopId";

#[derive(Default)]
struct ContextState {
    current: Option<Shop>,
    available: Vec<Shop>,
    initialized: bool,
    error: Option<String>,
}

/// Contexto de loja de UMA sessão.
#[derive(Default)]
pub struct ShopContext {
    loading: AtomicBool,
    state: RwLock<ContextState>,
}

// Libera a flag de carregamento mesmo se o load for cancelado no meio.
struct LoadingGuard<'a>(&'a AtomicBool);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl ShopContext {
    /// Marca o início de um carregamento. `None` = já existe um em andamento.
    fn begin_load(&self) -> Option<LoadingGuard<'_>> {
        if self.loading.swap(true, Ordering::AcqRel) {
            return None;
        }
        Some(LoadingGuard(&self.loading))
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    pub async fn is_initialized(&self) -> bool {
        self.state.read().await.initialized
    }

    pub async fn snapshot(&self) -> ShopContextSnapshot {
        let state = self.state.read().await;
        ShopContextSnapshot {
            current: state.current.clone(),
            available: state.available.clone(),
            initialized: state.initialized,
            loading: self.is_loading(),
            error: state.error.clone(),
        }
    }
}

/// Contextos por sessão. Injetado no AppState, nunca global.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    contexts: Arc<RwLock<HashMap<Uuid, Arc<ShopContext>>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn context(&self, session_id: Uuid) -> Arc<ShopContext> {
        if let Some(ctx) = self.contexts.read().await.get(&session_id) {
            return ctx.clone();
        }
        self.contexts
            .write()
            .await
            .entry(session_id)
            .or_default()
            .clone()
    }

    pub async fn remove(&self, session_id: Uuid) -> bool {
        self.contexts.write().await.remove(&session_id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.contexts.read().await.len()
    }
}

// Resultado de uma resolução bem sucedida.
struct Resolved {
    current: Option<Shop>,
    available: Vec<Shop>,
}

#[derive(Clone)]
pub struct ShopContextService {
    registry: SessionRegistry,
    shop_repo: ShopRepository,
    user_repo: UserRepository,
}

impl ShopContextService {
    pub fn new(registry: SessionRegistry, shop_repo: ShopRepository, user_repo: UserRepository) -> Self {
        Self { registry, shop_repo, user_repo }
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub async fn ensure_loaded(&self, user: &SessionUser) -> ShopContextSnapshot {
        let ctx = self.registry.context(user.session_id).await;
        if !ctx.is_initialized().await {
            self.load(&ctx, user).await;
        }
        ctx.snapshot().await
    }

    /// Resolve a loja ativa da sessão. Chamadas concorrentes no mesmo
    /// contexto viram no-op enquanto houver um carregamento em andamento.
    pub async fn load(&self, ctx: &ShopContext, user: &SessionUser) {
        let Some(_guard) = ctx.begin_load() else {
            tracing::debug!("Contexto de loja já está carregando (sessão {})", user.session_id);
            return;
        };

        match self.resolve(user).await {
            Ok(resolved) => {
                let mut state = ctx.state.write().await;
                state.current = resolved.current;
                state.available = resolved.available;
                state.initialized = true;
                state.error = None;
            }
            Err(e) => {
                // Mantém a loja atual; o refresh é a ação de retry.
                tracing::warn!("Falha ao carregar lojas da sessão {}: {}", user.session_id, e);
                let mut state = ctx.state.write().await;
                state.initialized = true;
                state.error = Some(e.to_string());
            }
        }
    }

    async fn resolve(&self, user: &SessionUser) -> Result<Resolved, AppError> {
        // 1. Nível admin: todas as lojas, preferindo a lembrada
        if permissions::can_switch_shops(user.role) {
            let shops = self.shop_repo.list_all().await?;
            let remembered = self.remembered_shop(&user.account_id).await;

            let current = remembered
                .and_then(|id| shops.iter().find(|s| s.id == id).cloned())
                .or_else(|| shops.first().cloned());

            if let Some(shop) = &current {
                self.remember_shop(&user.account_id, &shop.id).await;
            }

            return Ok(Resolved { current, available: shops });
        }

        // 2. Gerente com uma única loja
        if user.role == Some(Role::Manager) && user.shop_ids.len() == 1 {
            let shop = self.shop_repo.get(&user.shop_ids[0]).await?;
            return Ok(Resolved { current: Some(shop.clone()), available: vec![shop] });
        }

        // 3. Sem contexto de loja
        Ok(Resolved { current: None, available: Vec::new() })
    }

    pub async fn switch_shop(&self, user: &SessionUser, shop_id: &str) -> Result<ShopContextSnapshot, AppError> {
        if !permissions::can_switch_shops(user.role) {
            return Err(AppError::forbidden("shop_switch_denied"));
        }

        let ctx = self.registry.context(user.session_id).await;
        if !ctx.is_initialized().await {
            self.load(&ctx, user).await;
        }

        // Só o conjunto já carregado: sem ida ao banco.
        {
            let mut state = ctx.state.write().await;
            let shop = state
                .available
                .iter()
                .find(|s| s.id == shop_id)
                .cloned()
                .ok_or_else(|| AppError::InvalidInput("shop_not_available".into()))?;
            state.current = Some(shop);
        }

        self.remember_shop(&user.account_id, shop_id).await;
        tracing::info!("Sessão {} trocou para a loja {}", user.session_id, shop_id);

        Ok(ctx.snapshot().await)
    }

    pub async fn refresh(&self, user: &SessionUser) -> ShopContextSnapshot {
        let ctx = self.registry.context(user.session_id).await;
        ctx.state.write().await.initialized = false;
        self.load(&ctx, user).await;
        ctx.snapshot().await
    }

    // Preferência é dado auxiliar: falha de leitura/gravação só vira log.
    async fn remembered_shop(&self, account_id: &str) -> Option<String> {
        match self.user_repo.find_account(account_id).await {
            Ok(account) => account
                .prefs
                .get(CURRENT_SHOP_PREF)
                .and_then(Value::as_str)
                .map(str::to_string),
            Err(e) => {
                tracing::warn!("Não foi possível ler as preferências de {}: {}", account_id, e);
                None
            }
        }
    }

    async fn remember_shop(&self, account_id: &str, shop_id: &str) {
        let mut patch = Map::new();
        patch.insert(CURRENT_SHOP_PREF.to_string(), json!(shop_id));
        if let Err(e) = self.user_repo.merge_prefs(account_id, patch).await {
            tracing::warn!("Não foi possível salvar a loja escolhida de {}: {}", account_id, e);
        }
    }
}
