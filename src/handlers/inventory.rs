// src/handlers/inventory.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

// Importa os nossos extratores e erros
use crate::{
    common::error::ApiError,
    config::AppState,
    db::document_store::Page,
    middleware::{
        auth::AuthenticatedUser,                            // O extrator de Utilizador
        i18n::Locale,                                       // O extrator de Idioma
        rbac::{DashboardAccess, RequireCapability},         // Guardião
        tenancy::ShopScope,                                 // A loja do X-Shop-ID
    },
    models::inventory::{Fabric, FabricPayload},
};

// GET /api/fabrics
#[utoipa::path(
    get,
    path = "/api/fabrics",
    tag = "Inventory",
    params(Page),
    responses((status = 200, description = "Tecidos da loja", body = Vec<Fabric>)),
    security(("api_jwt" = []))
)]
pub async fn list_fabrics(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireCapability<DashboardAccess>,
    ShopScope(shop_id): ShopScope,
    Query(page): Query<Page>,
) -> Result<impl IntoResponse, ApiError> {
    let fabrics = app_state
        .inventory_service
        .list_fabrics(&shop_id, &page)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(fabrics)))
}

// POST /api/fabrics
#[utoipa::path(
    post,
    path = "/api/fabrics",
    tag = "Inventory",
    request_body = FabricPayload,
    responses(
        (status = 201, description = "Tecido cadastrado", body = Fabric),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_fabric(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    ShopScope(shop_id): ShopScope,
    Json(payload): Json<FabricPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let fabric = app_state
        .inventory_service
        .create_fabric(&user, &shop_id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(fabric)))
}

// GET /api/fabrics/{id}
#[utoipa::path(
    get,
    path = "/api/fabrics/{id}",
    tag = "Inventory",
    params(("id" = String, Path, description = "ID do tecido")),
    responses((status = 200, description = "Tecido", body = Fabric)),
    security(("api_jwt" = []))
)]
pub async fn get_fabric(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireCapability<DashboardAccess>,
    ShopScope(shop_id): ShopScope,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let fabric = app_state
        .inventory_service
        .get_fabric(&shop_id, &id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(fabric)))
}

// PUT /api/fabrics/{id}
#[utoipa::path(
    put,
    path = "/api/fabrics/{id}",
    tag = "Inventory",
    params(("id" = String, Path, description = "ID do tecido")),
    request_body = FabricPayload,
    responses((status = 200, description = "Tecido atualizado", body = Fabric)),
    security(("api_jwt" = []))
)]
pub async fn update_fabric(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    ShopScope(shop_id): ShopScope,
    Path(id): Path<String>,
    Json(payload): Json<FabricPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let fabric = app_state
        .inventory_service
        .update_fabric(&user, &shop_id, &id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(fabric)))
}

// DELETE /api/fabrics/{id}
#[utoipa::path(
    delete,
    path = "/api/fabrics/{id}",
    tag = "Inventory",
    params(("id" = String, Path, description = "ID do tecido")),
    responses((status = 204, description = "Tecido removido")),
    security(("api_jwt" = []))
)]
pub async fn delete_fabric(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    ShopScope(shop_id): ShopScope,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .inventory_service
        .delete_fabric(&user, &shop_id, &id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
