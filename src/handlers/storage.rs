// src/handlers/storage.rs

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
};

use crate::{common::error::ApiError, config::AppState, middleware::i18n::Locale};

// GET /storage/buckets/{bucket}/files/{file_id}/view
// Rota pública: é o destino das URLs montadas pelo FileUrlBuilder.
// O parâmetro `project` da URL é ignorado.
#[utoipa::path(
    get,
    path = "/storage/buckets/{bucket}/files/{file_id}/view",
    tag = "Storage",
    params(
        ("bucket" = String, Path, description = "Bucket"),
        ("file_id" = String, Path, description = "ID do arquivo")
    ),
    responses(
        (status = 200, description = "Conteúdo do arquivo"),
        (status = 404, description = "Arquivo inexistente")
    )
)]
pub async fn view_file(
    State(app_state): State<AppState>,
    locale: Locale,
    Path((bucket, file_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let file = app_state
        .file_store
        .download(&bucket, &file_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let disposition = format!("inline; filename=\"{}\"", file.name.replace('"', ""));
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, file.content_type), (header::CONTENT_DISPOSITION, disposition)],
        file.bytes,
    ))
}
