// src/handlers/invoices.rs

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    db::{document_store::Page, file_store::FileUpload},
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{RequireCapability, ShopManagement},
        tenancy::ShopScope,
    },
    models::purchasing::{InvoicePayload, InvoiceView},
};

// Campo do formulário que carrega o arquivo.
const FILE_FIELD: &str = "file";

/// Lê o primeiro campo `file` do multipart.
async fn read_upload(multipart: &mut Multipart) -> Result<FileUpload, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| {
            tracing::warn!("Multipart inválido: {}", e);
            AppError::InvalidInput("invalid_multipart".into())
        })?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let name = field.file_name().unwrap_or("invoice").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field.bytes().await.map_err(|e| {
            tracing::warn!("Falha ao ler o arquivo enviado: {}", e);
            AppError::InvalidInput("invalid_multipart".into())
        })?;

        return Ok(FileUpload { name, content_type, bytes: bytes.to_vec() });
    }

    Err(AppError::InvalidInput("invalid_multipart".into()))
}

// GET /api/invoices
#[utoipa::path(
    get,
    path = "/api/invoices",
    tag = "Purchasing",
    params(Page),
    responses((status = 200, description = "Notas de compra da loja", body = Vec<InvoiceView>)),
    security(("api_jwt" = []))
)]
pub async fn list_invoices(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequireCapability<ShopManagement>,
    ShopScope(shop_id): ShopScope,
    Query(page): Query<Page>,
) -> Result<impl IntoResponse, ApiError> {
    let invoices = app_state
        .invoice_service
        .list_invoices(&user, &shop_id, &page)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(invoices)))
}

// POST /api/invoices
#[utoipa::path(
    post,
    path = "/api/invoices",
    tag = "Purchasing",
    request_body = InvoicePayload,
    responses((status = 201, description = "Nota cadastrada", body = InvoiceView)),
    security(("api_jwt" = []))
)]
pub async fn create_invoice(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    ShopScope(shop_id): ShopScope,
    Json(payload): Json<InvoicePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let invoice = app_state
        .invoice_service
        .create_invoice(&user, &shop_id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(invoice)))
}

// GET /api/invoices/{id}
#[utoipa::path(
    get,
    path = "/api/invoices/{id}",
    tag = "Purchasing",
    params(("id" = String, Path, description = "ID da nota")),
    responses((status = 200, description = "Nota com URL do anexo", body = InvoiceView)),
    security(("api_jwt" = []))
)]
pub async fn get_invoice(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    ShopScope(shop_id): ShopScope,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let invoice = app_state
        .invoice_service
        .get_invoice(&user, &shop_id, &id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(invoice)))
}

// PUT /api/invoices/{id}
#[utoipa::path(
    put,
    path = "/api/invoices/{id}",
    tag = "Purchasing",
    params(("id" = String, Path, description = "ID da nota")),
    request_body = InvoicePayload,
    responses((status = 200, description = "Nota atualizada", body = InvoiceView)),
    security(("api_jwt" = []))
)]
pub async fn update_invoice(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    ShopScope(shop_id): ShopScope,
    Path(id): Path<String>,
    Json(payload): Json<InvoicePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let invoice = app_state
        .invoice_service
        .update_invoice(&user, &shop_id, &id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(invoice)))
}

// DELETE /api/invoices/{id}
#[utoipa::path(
    delete,
    path = "/api/invoices/{id}",
    tag = "Purchasing",
    params(("id" = String, Path, description = "ID da nota")),
    responses((status = 204, description = "Nota e anexo removidos")),
    security(("api_jwt" = []))
)]
pub async fn delete_invoice(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    ShopScope(shop_id): ShopScope,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .invoice_service
        .delete_invoice(&user, &shop_id, &id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// PUT /api/invoices/{id}/file
// multipart/form-data com o campo "file". Substitui o anexo anterior.
#[utoipa::path(
    put,
    path = "/api/invoices/{id}/file",
    tag = "Purchasing",
    params(("id" = String, Path, description = "ID da nota")),
    responses(
        (status = 200, description = "Anexo gravado", body = InvoiceView),
        (status = 400, description = "Formulário sem arquivo ou arquivo vazio")
    ),
    security(("api_jwt" = []))
)]
pub async fn attach_file(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    ShopScope(shop_id): ShopScope,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let upload = read_upload(&mut multipart).await.map_err(to_api)?;
    let invoice = app_state
        .invoice_service
        .attach_file(&user, &shop_id, &id, upload)
        .await
        .map_err(to_api)?;

    Ok((StatusCode::OK, Json(invoice)))
}

// DELETE /api/invoices/{id}/file
#[utoipa::path(
    delete,
    path = "/api/invoices/{id}/file",
    tag = "Purchasing",
    params(("id" = String, Path, description = "ID da nota")),
    responses((status = 200, description = "Anexo removido", body = InvoiceView)),
    security(("api_jwt" = []))
)]
pub async fn detach_file(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    ShopScope(shop_id): ShopScope,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let invoice = app_state
        .invoice_service
        .detach_file(&user, &shop_id, &id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(invoice)))
}
