// src/handlers/crm.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    common::error::ApiError,
    config::AppState,
    db::document_store::Page,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{DashboardAccess, RequireCapability},
        tenancy::ShopScope,
    },
    models::crm::{Customer, CustomerPayload},
};

// GET /api/customers
#[utoipa::path(
    get,
    path = "/api/customers",
    tag = "CRM",
    params(Page),
    responses((status = 200, description = "Clientes da loja", body = Vec<Customer>)),
    security(("api_jwt" = []))
)]
pub async fn list_customers(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireCapability<DashboardAccess>,
    ShopScope(shop_id): ShopScope,
    Query(page): Query<Page>,
) -> Result<impl IntoResponse, ApiError> {
    let customers = app_state
        .crm_service
        .list_customers(&shop_id, &page)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(customers)))
}

// POST /api/customers
#[utoipa::path(
    post,
    path = "/api/customers",
    tag = "CRM",
    request_body = CustomerPayload,
    responses((status = 201, description = "Cliente cadastrado", body = Customer)),
    security(("api_jwt" = []))
)]
pub async fn create_customer(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireCapability<DashboardAccess>,
    ShopScope(shop_id): ShopScope,
    Json(payload): Json<CustomerPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let customer = app_state
        .crm_service
        .create_customer(&shop_id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(customer)))
}

// GET /api/customers/{id}
#[utoipa::path(
    get,
    path = "/api/customers/{id}",
    tag = "CRM",
    params(("id" = String, Path, description = "ID do cliente")),
    responses((status = 200, description = "Cliente", body = Customer)),
    security(("api_jwt" = []))
)]
pub async fn get_customer(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireCapability<DashboardAccess>,
    ShopScope(shop_id): ShopScope,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let customer = app_state
        .crm_service
        .get_customer(&shop_id, &id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(customer)))
}

// PUT /api/customers/{id}
#[utoipa::path(
    put,
    path = "/api/customers/{id}",
    tag = "CRM",
    params(("id" = String, Path, description = "ID do cliente")),
    request_body = CustomerPayload,
    responses((status = 200, description = "Cliente atualizado", body = Customer)),
    security(("api_jwt" = []))
)]
pub async fn update_customer(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireCapability<DashboardAccess>,
    ShopScope(shop_id): ShopScope,
    Path(id): Path<String>,
    Json(payload): Json<CustomerPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let customer = app_state
        .crm_service
        .update_customer(&shop_id, &id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(customer)))
}

// DELETE /api/customers/{id}
#[utoipa::path(
    delete,
    path = "/api/customers/{id}",
    tag = "CRM",
    params(("id" = String, Path, description = "ID do cliente")),
    responses((status = 204, description = "Cliente removido")),
    security(("api_jwt" = []))
)]
pub async fn delete_customer(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    ShopScope(shop_id): ShopScope,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .crm_service
        .delete_customer(&user, &shop_id, &id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
