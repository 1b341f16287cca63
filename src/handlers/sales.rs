// src/handlers/sales.rs

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
    models::sales::{FabricSale, FabricSaleInput, LedgerReceipt, SaleDeletion},
};

// POST /api/sales/fabric
// Transação + venda + pagamento + baixa de estoque. Falhas depois da venda
// gravada voltam como `warnings` com status 201.
#[utoipa::path(
    post,
    path = "/api/sales/fabric",
    tag = "Sales",
    request_body = FabricSaleInput,
    responses(
        (status = 201, description = "Venda registrada", body = LedgerReceipt),
        (status = 400, description = "Venda sem itens ou valores negativos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_fabric_sale(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequireCapability<DashboardAccess>,
    ShopScope(shop_id): ShopScope,
    Json(payload): Json<FabricSaleInput>,
) -> Result<impl IntoResponse, ApiError> {
    let receipt = app_state
        .sales_ledger
        .create_fabric_sale(&user, &shop_id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(receipt)))
}

// GET /api/sales/fabric
#[utoipa::path(
    get,
    path = "/api/sales/fabric",
    tag = "Sales",
    params(Page),
    responses((status = 200, description = "Vendas da loja", body = Vec<FabricSale>)),
    security(("api_jwt" = []))
)]
pub async fn list_fabric_sales(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireCapability<DashboardAccess>,
    ShopScope(shop_id): ShopScope,
    Query(page): Query<Page>,
) -> Result<impl IntoResponse, ApiError> {
    let sales = app_state
        .sales_ledger
        .list_fabric_sales(&shop_id, &page)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(sales)))
}

// GET /api/sales/fabric/{id}
#[utoipa::path(
    get,
    path = "/api/sales/fabric/{id}",
    tag = "Sales",
    params(("id" = String, Path, description = "ID da venda")),
    responses(
        (status = 200, description = "Venda", body = FabricSale),
        (status = 404, description = "Venda inexistente ou de outra loja")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_fabric_sale(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireCapability<DashboardAccess>,
    ShopScope(shop_id): ShopScope,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let sale = app_state
        .sales_ledger
        .get_fabric_sale(&shop_id, &id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(sale)))
}

// PUT /api/sales/fabric/{id}
#[utoipa::path(
    put,
    path = "/api/sales/fabric/{id}",
    tag = "Sales",
    params(("id" = String, Path, description = "ID da venda")),
    request_body = FabricSaleInput,
    responses((status = 200, description = "Venda atualizada e estoque reconciliado", body = LedgerReceipt)),
    security(("api_jwt" = []))
)]
pub async fn update_fabric_sale(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequireCapability<DashboardAccess>,
    ShopScope(shop_id): ShopScope,
    Path(id): Path<String>,
    Json(payload): Json<FabricSaleInput>,
) -> Result<impl IntoResponse, ApiError> {
    let receipt = app_state
        .sales_ledger
        .update_fabric_sale(&user, &shop_id, &id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(receipt)))
}

// DELETE /api/sales/fabric/{id}
#[utoipa::path(
    delete,
    path = "/api/sales/fabric/{id}",
    tag = "Sales",
    params(("id" = String, Path, description = "ID da venda")),
    responses(
        (status = 200, description = "Venda removida", body = SaleDeletion),
        (status = 403, description = "Apenas gerentes ou acima")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_fabric_sale(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequireCapability<DashboardAccess>,
    ShopScope(shop_id): ShopScope,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let deletion = app_state
        .sales_ledger
        .delete_fabric_sale(&user, &shop_id, &id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(deletion)))
}
