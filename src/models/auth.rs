// src/models/auth.rs

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::rbac::Role;

// Conta de login (coleção "accounts"). Um documento por identidade autenticada.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    #[serde(rename = "$id")]
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub password_hash: Option<String>,
    #[serde(default)]
    pub prefs: Map<String, Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAccount<'a> {
    pub email: &'a str,
    pub name: &'a str,
    pub password_hash: &'a str,
    pub prefs: Map<String, Value>,
}

// O que o resto do sistema enxerga da conta (sem hash de senha).
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: String,
    pub email: String,
    pub name: String,
    #[schema(value_type = Object)]
    pub prefs: Map<String, Value>,
}

impl From<Account> for Identity {
    fn from(account: Account) -> Self {
        Identity {
            id: account.id,
            email: account.email,
            name: account.name,
            prefs: account.prefs,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Inactive,
}

// Perfil do usuário (coleção "users"). Não carrega cargo: o cargo vem das atribuições.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(default)]
    pub account_id: Option<String>,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    pub status: UserStatus,
    #[serde(rename = "$createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUserProfile {
    pub account_id: Option<String>,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub avatar: Option<String>,
    pub status: UserStatus,
}

#[derive(Debug, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfilePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "required"))]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<UserStatus>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Ahmed Ali")]
    pub name: String,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    #[schema(example = "ahmed@example.com")]
    pub email: String,

    pub phone: Option<String>,
}

/// Usuário da requisição: identidade + perfil + cargo efetivo.
/// `role` é o cargo mais alto entre as atribuições ativas; `shop_roles`
/// guarda o cargo de cada loja. Verificações dentro de uma loja usam
/// `permissions::role_in_shop`.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    #[serde(skip)]
    pub session_id: Uuid,
    pub account_id: String,
    pub profile: UserProfile,
    pub role: Option<Role>,
    pub shop_ids: Vec<String>,
    pub shop_roles: BTreeMap<String, Role>,
}

// Dados para registro de um novo usuário
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterUserPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,
    #[validate(length(min = 1, message = "required"))]
    pub name: String,
}

// Dados para login
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginUserPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct OAuthRedirectParams {
    pub success: String,
    pub failure: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OAuthRedirect {
    pub redirect_url: String,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // ID da conta
    pub sid: Uuid,   // ID da sessão (revogável)
    pub exp: usize,
    pub iat: usize,
}
