// src/handlers/rbac.rs

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
        rbac::{RequireCapability, ShopManagement},
    },
    models::{
        rbac::RoleOption,
        tenancy::{AssignRolePayload, ToggleStatusPayload, UserShopAssignment},
    },
};

// GET /api/users/roles/assignable
#[utoipa::path(
    get,
    path = "/api/users/roles/assignable",
    tag = "RBAC",
    responses((status = 200, description = "Cargos que o usuário pode atribuir", body = Vec<RoleOption>)),
    security(("api_jwt" = []))
)]
pub async fn assignable_roles(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> impl IntoResponse {
    Json(app_state.rbac_service.get_assignable_roles(&user))
}

// GET /api/users/{id}/assignments
#[utoipa::path(
    get,
    path = "/api/users/{id}/assignments",
    tag = "RBAC",
    params(("id" = String, Path, description = "ID do perfil")),
    responses((status = 200, description = "Atribuições do usuário", body = Vec<UserShopAssignment>)),
    security(("api_jwt" = []))
)]
pub async fn list_user_assignments(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let assignments = app_state
        .rbac_service
        .list_user_assignments(&user, &id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(assignments)))
}

// POST /api/users/{id}/assignments
#[utoipa::path(
    post,
    path = "/api/users/{id}/assignments",
    tag = "RBAC",
    params(("id" = String, Path, description = "ID do perfil")),
    request_body = AssignRolePayload,
    responses(
        (status = 200, description = "Atribuição criada ou atualizada", body = UserShopAssignment),
        (status = 403, description = "Cargo não atribuível pelo usuário atual")
    ),
    security(("api_jwt" = []))
)]
pub async fn assign_role(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequireCapability<ShopManagement>,
    Path(id): Path<String>,
    Json(payload): Json<AssignRolePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let assignment = app_state
        .rbac_service
        .assign_user_role(&user, &id, &payload.shop_id, payload.role)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(assignment)))
}

// PUT /api/users/{id}/status
#[utoipa::path(
    put,
    path = "/api/users/{id}/status",
    tag = "RBAC",
    params(("id" = String, Path, description = "ID do perfil")),
    request_body = ToggleStatusPayload,
    responses((status = 200, description = "Status alterado", body = UserShopAssignment)),
    security(("api_jwt" = []))
)]
pub async fn toggle_status(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequireCapability<ShopManagement>,
    Path(id): Path<String>,
    Json(payload): Json<ToggleStatusPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let assignment = app_state
        .rbac_service
        .toggle_user_status(&user, &id, &payload.shop_id, payload.status)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(assignment)))
}

// DELETE /api/users/{id}/shops/{shop_id}
#[utoipa::path(
    delete,
    path = "/api/users/{id}/shops/{shop_id}",
    tag = "RBAC",
    params(
        ("id" = String, Path, description = "ID do perfil"),
        ("shop_id" = String, Path, description = "ID da loja")
    ),
    responses((status = 200, description = "Atribuição inativada", body = UserShopAssignment)),
    security(("api_jwt" = []))
)]
pub async fn remove_from_shop(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequireCapability<ShopManagement>,
    Path((id, shop_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let assignment = app_state
        .rbac_service
        .remove_user_from_shop(&user, &id, &shop_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(assignment)))
}

// GET /api/shops/{id}/members
#[utoipa::path(
    get,
    path = "/api/shops/{id}/members",
    tag = "RBAC",
    params(("id" = String, Path, description = "ID da loja")),
    responses((status = 200, description = "Atribuições da loja", body = Vec<UserShopAssignment>)),
    security(("api_jwt" = []))
)]
pub async fn list_shop_members(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let members = app_state
        .rbac_service
        .list_shop_members(&user, &id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(members)))
}
