// src/handlers/catalog.rs

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{DashboardAccess, RequireCapability},
        tenancy::SHOP_ID_HEADER,
    },
    models::catalog::{CatalogItem, CatalogItemPayload, TailoringItem, TailoringItemPayload},
};

/// Filtro opcional de loja. Sem filtro, lista o catálogo inteiro.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CatalogFilter {
    pub shop_id: Option<String>,
}

impl CatalogFilter {
    // A query string tem prioridade sobre o cabeçalho X-Shop-ID.
    fn resolve(self, headers: &HeaderMap) -> Option<String> {
        self.shop_id.filter(|s| !s.is_empty()).or_else(|| {
            headers
                .get(SHOP_ID_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        })
    }
}

// =============================================================================
//  ÁREA 1: ITENS DO CATÁLOGO
// =============================================================================

// GET /api/catalog/items
#[utoipa::path(
    get,
    path = "/api/catalog/items",
    tag = "Catalog",
    params(CatalogFilter),
    responses((status = 200, description = "Itens do catálogo", body = Vec<CatalogItem>)),
    security(("api_jwt" = []))
)]
pub async fn list_items(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireCapability<DashboardAccess>,
    headers: HeaderMap,
    Query(filter): Query<CatalogFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let shop_id = filter.resolve(&headers);
    let items = app_state
        .catalog_service
        .list_items(shop_id.as_deref())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(items)))
}

// POST /api/catalog/items
#[utoipa::path(
    post,
    path = "/api/catalog/items",
    tag = "Catalog",
    request_body = CatalogItemPayload,
    responses((status = 201, description = "Item criado", body = CatalogItem)),
    security(("api_jwt" = []))
)]
pub async fn create_item(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CatalogItemPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let item = app_state
        .catalog_service
        .create_item(&user, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(item)))
}

// GET /api/catalog/items/{id}
#[utoipa::path(
    get,
    path = "/api/catalog/items/{id}",
    tag = "Catalog",
    params(("id" = String, Path, description = "ID do item")),
    responses((status = 200, description = "Item", body = CatalogItem)),
    security(("api_jwt" = []))
)]
pub async fn get_item(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireCapability<DashboardAccess>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let item = app_state
        .catalog_service
        .get_item(&id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(item)))
}

// PUT /api/catalog/items/{id}
#[utoipa::path(
    put,
    path = "/api/catalog/items/{id}",
    tag = "Catalog",
    params(("id" = String, Path, description = "ID do item")),
    request_body = CatalogItemPayload,
    responses((status = 200, description = "Item atualizado", body = CatalogItem)),
    security(("api_jwt" = []))
)]
pub async fn update_item(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<String>,
    Json(payload): Json<CatalogItemPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let item = app_state
        .catalog_service
        .update_item(&user, &id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(item)))
}

// DELETE /api/catalog/items/{id}
#[utoipa::path(
    delete,
    path = "/api/catalog/items/{id}",
    tag = "Catalog",
    params(("id" = String, Path, description = "ID do item")),
    responses((status = 204, description = "Item removido")),
    security(("api_jwt" = []))
)]
pub async fn delete_item(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .catalog_service
        .delete_item(&user, &id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  ÁREA 2: SERVIÇOS DE ALFAIATARIA
// =============================================================================

// GET /api/catalog/tailoring
#[utoipa::path(
    get,
    path = "/api/catalog/tailoring",
    tag = "Catalog",
    params(CatalogFilter),
    responses((status = 200, description = "Serviços de alfaiataria", body = Vec<TailoringItem>)),
    security(("api_jwt" = []))
)]
pub async fn list_tailoring(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireCapability<DashboardAccess>,
    headers: HeaderMap,
    Query(filter): Query<CatalogFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let shop_id = filter.resolve(&headers);
    let items = app_state
        .catalog_service
        .list_tailoring(shop_id.as_deref())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(items)))
}

// POST /api/catalog/tailoring
#[utoipa::path(
    post,
    path = "/api/catalog/tailoring",
    tag = "Catalog",
    request_body = TailoringItemPayload,
    responses((status = 201, description = "Serviço criado", body = TailoringItem)),
    security(("api_jwt" = []))
)]
pub async fn create_tailoring(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<TailoringItemPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let item = app_state
        .catalog_service
        .create_tailoring(&user, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(item)))
}

// PUT /api/catalog/tailoring/{id}
#[utoipa::path(
    put,
    path = "/api/catalog/tailoring/{id}",
    tag = "Catalog",
    params(("id" = String, Path, description = "ID do serviço")),
    request_body = TailoringItemPayload,
    responses((status = 200, description = "Serviço atualizado", body = TailoringItem)),
    security(("api_jwt" = []))
)]
pub async fn update_tailoring(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<String>,
    Json(payload): Json<TailoringItemPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let item = app_state
        .catalog_service
        .update_tailoring(&user, &id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(item)))
}

// DELETE /api/catalog/tailoring/{id}
#[utoipa::path(
    delete,
    path = "/api/catalog/tailoring/{id}",
    tag = "Catalog",
    params(("id" = String, Path, description = "ID do serviço")),
    responses((status = 204, description = "Serviço removido")),
    security(("api_jwt" = []))
)]
pub async fn delete_tailoring(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .catalog_service
        .delete_tailoring(&user, &id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
