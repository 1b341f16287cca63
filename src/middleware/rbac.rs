// src/middleware/rbac.rs

use std::marker::PhantomData;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale, tenancy::SHOP_ID_HEADER},
    models::rbac::Role,
    services::permissions,
};

/// 1. O Trait que define uma capacidade exigida pela rota
pub trait CapabilityDef: Send + Sync + 'static {
    fn allows(role: Option<Role>) -> bool;
    /// Chave de tradução usada quando a capacidade falta.
    fn denied_key() -> &'static str;
}

/// 2. O Extractor (Guardião)
pub struct RequireCapability<T>(pub PhantomData<T>);

// 3. Implementação do FromRequestParts
impl<T, S> FromRequestParts<S> for RequireCapability<T>
where
    T: CapabilityDef,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let locale = Locale::from_headers(&parts.headers);

        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or_else(|| AppError::InvalidToken.to_api_error(&locale, &app_state.i18n_store))?;

        // Com loja no cabeçalho vale o cargo naquela loja.
        let role = match parts.headers.get(SHOP_ID_HEADER).and_then(|v| v.to_str().ok()).map(str::trim) {
            Some(shop_id) if !shop_id.is_empty() => permissions::role_in_shop(&user.0, shop_id),
            _ => user.0.role,
        };

        if !T::allows(role) {
            return Err(AppError::forbidden(T::denied_key()).to_api_error(&locale, &app_state.i18n_store));
        }

        Ok(RequireCapability(PhantomData))
    }
}

// ---
// DEFINIÇÃO DAS CAPACIDADES (TIPOS)
// ---

/// Qualquer cargo exceto `user` (e sem cargo).
pub struct DashboardAccess;
impl CapabilityDef for DashboardAccess {
    fn allows(role: Option<Role>) -> bool { permissions::can_access_dashboard(role) }
    fn denied_key() -> &'static str { "dashboard_denied" }
}

/// superAdmin, admin e manager.
pub struct ShopManagement;
impl CapabilityDef for ShopManagement {
    fn allows(role: Option<Role>) -> bool { permissions::can_manage_shop(role) }
    fn denied_key() -> &'static str { "members_management_denied" }
}

/// Só o nível admin (troca de loja e cadastro de lojas).
pub struct ShopAdministration;
impl CapabilityDef for ShopAdministration {
    fn allows(role: Option<Role>) -> bool { permissions::can_switch_shops(role) }
    fn denied_key() -> &'static str { "shop_management_denied" }
}
