// src/middleware/tenancy.rs

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
};

// O nome do nosso cabeçalho HTTP customizado
pub const SHOP_ID_HEADER: &str = "x-shop-id";

/// Loja em que a requisição atua. Válida quando o usuário pode trocar de
/// loja ou tem atribuição ativa nela.
#[derive(Debug, Clone)]
pub struct ShopScope(pub String);

impl<S> FromRequestParts<S> for ShopScope
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let locale = Locale::from_headers(&parts.headers);
        let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

        // A. Usuário (colocado pelo auth_guard)
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| to_api(AppError::InvalidToken))?;

        // B. Cabeçalho X-Shop-ID
        let shop_id = parts
            .headers
            .get(SHOP_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| to_api(AppError::InvalidInput("shop_scope_missing".into())))?
            .to_string();

        // C. Acesso à loja (e existência dela)
        app_state
            .tenancy_service
            .get_shop(&user.0, &shop_id)
            .await
            .map_err(to_api)?;

        Ok(ShopScope(shop_id))
    }
}
