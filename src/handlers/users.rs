// src/handlers/users.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::{Map, Value};

use crate::{
    common::error::ApiError,
    config::AppState,
    db::document_store::Page,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{DashboardAccess, RequireCapability, ShopManagement},
    },
    models::auth::{CreateUserPayload, Identity, SessionUser, UserProfile, UserProfilePatch},
};

// GET /api/users/me
#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "Users",
    responses((status = 200, description = "Usuário da sessão", body = SessionUser)),
    security(("api_jwt" = []))
)]
pub async fn get_me(AuthenticatedUser(user): AuthenticatedUser) -> Json<SessionUser> {
    Json(user)
}

// PATCH /api/users/me
#[utoipa::path(
    patch,
    path = "/api/users/me",
    tag = "Users",
    request_body = UserProfilePatch,
    responses((status = 200, description = "Perfil atualizado", body = UserProfile)),
    security(("api_jwt" = []))
)]
pub async fn update_me(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<UserProfilePatch>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = app_state
        .user_service
        .update_profile(&user, &user.profile.id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(profile)))
}

// PATCH /api/users/me/prefs
#[utoipa::path(
    patch,
    path = "/api/users/me/prefs",
    tag = "Users",
    responses((status = 200, description = "Identidade com as preferências atualizadas", body = Identity)),
    security(("api_jwt" = []))
)]
pub async fn update_my_prefs(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(patch): Json<Map<String, Value>>,
) -> Result<impl IntoResponse, ApiError> {
    let identity = app_state
        .auth_service
        .update_prefs(&user.account_id, patch)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(identity)))
}

// GET /api/users
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    params(Page),
    responses((status = 200, description = "Perfis cadastrados", body = Vec<UserProfile>)),
    security(("api_jwt" = []))
)]
pub async fn list_users(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireCapability<DashboardAccess>,
    Query(page): Query<Page>,
) -> Result<impl IntoResponse, ApiError> {
    let users = app_state
        .user_service
        .list_users(&page)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(users)))
}

// POST /api/users
#[utoipa::path(
    post,
    path = "/api/users",
    tag = "Users",
    request_body = CreateUserPayload,
    responses(
        (status = 201, description = "Usuário pré-cadastrado (pendente)", body = UserProfile),
        (status = 409, description = "E-mail já existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_user(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequireCapability<ShopManagement>,
    Json(payload): Json<CreateUserPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = app_state
        .user_service
        .create_user(&user, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(profile)))
}

// GET /api/users/{id}
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = "Users",
    params(("id" = String, Path, description = "ID do perfil")),
    responses(
        (status = 200, description = "Perfil", body = UserProfile),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_user(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireCapability<DashboardAccess>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = app_state
        .user_service
        .get_user(&id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(profile)))
}

// PATCH /api/users/{id}
#[utoipa::path(
    patch,
    path = "/api/users/{id}",
    tag = "Users",
    params(("id" = String, Path, description = "ID do perfil")),
    request_body = UserProfilePatch,
    responses((status = 200, description = "Perfil atualizado", body = UserProfile)),
    security(("api_jwt" = []))
)]
pub async fn update_user(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<String>,
    Json(payload): Json<UserProfilePatch>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = app_state
        .user_service
        .update_profile(&user, &id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(profile)))
}
