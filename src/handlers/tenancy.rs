// src/handlers/tenancy.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{RequireCapability, ShopAdministration},
    },
    models::tenancy::{Shop, ShopContextSnapshot, ShopPayload, SwitchShopPayload},
};

// =============================================================================
//  ÁREA 1: LOJAS
// =============================================================================

// GET /api/shops
#[utoipa::path(
    get,
    path = "/api/shops",
    tag = "Tenancy",
    responses((status = 200, description = "Lojas visíveis para o usuário", body = Vec<Shop>)),
    security(("api_jwt" = []))
)]
pub async fn list_shops(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let shops = app_state
        .tenancy_service
        .list_shops(&user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(shops)))
}

// POST /api/shops
#[utoipa::path(
    post,
    path = "/api/shops",
    tag = "Tenancy",
    request_body = ShopPayload,
    responses(
        (status = 201, description = "Loja criada", body = Shop),
        (status = 403, description = "Apenas administradores")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_shop(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequireCapability<ShopAdministration>,
    Json(payload): Json<ShopPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let shop = app_state
        .tenancy_service
        .create_shop(&user, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(shop)))
}

// GET /api/shops/{id}
#[utoipa::path(
    get,
    path = "/api/shops/{id}",
    tag = "Tenancy",
    params(("id" = String, Path, description = "ID da loja")),
    responses((status = 200, description = "Loja", body = Shop)),
    security(("api_jwt" = []))
)]
pub async fn get_shop(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let shop = app_state
        .tenancy_service
        .get_shop(&user, &id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(shop)))
}

// PUT /api/shops/{id}
#[utoipa::path(
    put,
    path = "/api/shops/{id}",
    tag = "Tenancy",
    params(("id" = String, Path, description = "ID da loja")),
    request_body = ShopPayload,
    responses((status = 200, description = "Loja atualizada", body = Shop)),
    security(("api_jwt" = []))
)]
pub async fn update_shop(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequireCapability<ShopAdministration>,
    Path(id): Path<String>,
    Json(payload): Json<ShopPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let shop = app_state
        .tenancy_service
        .update_shop(&user, &id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(shop)))
}

// DELETE /api/shops/{id}
#[utoipa::path(
    delete,
    path = "/api/shops/{id}",
    tag = "Tenancy",
    params(("id" = String, Path, description = "ID da loja")),
    responses((status = 204, description = "Loja removida (sem cascata)")),
    security(("api_jwt" = []))
)]
pub async fn delete_shop(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequireCapability<ShopAdministration>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .tenancy_service
        .delete_shop(&user, &id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  ÁREA 2: CONTEXTO DE LOJA DA SESSÃO
// =============================================================================

// GET /api/shops/context
#[utoipa::path(
    get,
    path = "/api/shops/context",
    tag = "Tenancy",
    responses((status = 200, description = "Loja ativa e lojas disponíveis", body = ShopContextSnapshot)),
    security(("api_jwt" = []))
)]
pub async fn get_context(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> impl IntoResponse {
    Json(app_state.shop_context.ensure_loaded(&user).await)
}

// POST /api/shops/context/switch
#[utoipa::path(
    post,
    path = "/api/shops/context/switch",
    tag = "Tenancy",
    request_body = SwitchShopPayload,
    responses(
        (status = 200, description = "Loja trocada", body = ShopContextSnapshot),
        (status = 403, description = "Cargo não pode trocar de loja")
    ),
    security(("api_jwt" = []))
)]
pub async fn switch_shop(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<SwitchShopPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let snapshot = app_state
        .shop_context
        .switch_shop(&user, &payload.shop_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(snapshot)))
}

// POST /api/shops/context/refresh
#[utoipa::path(
    post,
    path = "/api/shops/context/refresh",
    tag = "Tenancy",
    responses((status = 200, description = "Contexto recarregado", body = ShopContextSnapshot)),
    security(("api_jwt" = []))
)]
pub async fn refresh_context(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> impl IntoResponse {
    Json(app_state.shop_context.refresh(&user).await)
}
