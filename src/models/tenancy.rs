// src/models/tenancy.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    db::reference::{self, DocRef},
    models::rbac::{AssignmentStatus, Role},
};

// ---
// 1. Shop (A "Loja")
// ---
// Escopo de quase todos os dados do negócio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Shop {
    #[serde(rename = "$id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub contact: Option<String>,
    #[serde(rename = "$createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShopPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Loja Centro")]
    pub name: String,

    #[schema(example = "Rua das Flores, 120")]
    pub address: Option<String>,

    #[schema(example = "+55 11 99999-0000")]
    pub contact: Option<String>,
}

// ---
// 2. UserShopAssignment (A "Ponte" Usuário-Loja)
// ---
// Única fonte do cargo de um usuário. Sem loja + inativo = usuário pendente.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserShopAssignment {
    #[serde(rename = "$id")]
    pub id: String,

    pub user_id: DocRef,

    #[serde(default, deserialize_with = "reference::optional")]
    pub shop_id: Option<DocRef>,

    pub role: Role,
    pub status: AssignmentStatus,

    #[serde(rename = "$updatedAt", default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserShopAssignment {
    pub fn is_active(&self) -> bool {
        self.status == AssignmentStatus::Active
    }

    pub fn is_pending(&self) -> bool {
        self.shop_id.is_none() && self.status == AssignmentStatus::Inactive
    }
}

// shopId é gravado como null (não omitido) para o filtro de "pendente" funcionar.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAssignment<'a> {
    pub user_id: &'a str,
    pub shop_id: Option<&'a str>,
    pub role: Role,
    pub status: AssignmentStatus,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentPatch<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shop_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    pub status: AssignmentStatus,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignRolePayload {
    #[schema(example = "b0e1c2...")]
    pub shop_id: String,
    #[schema(example = "salesman")]
    pub role: Role,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ToggleStatusPayload {
    pub shop_id: String,
    pub status: AssignmentStatus,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SwitchShopPayload {
    pub shop_id: String,
}

/// Estado do contexto de loja de uma sessão, como o frontend consome.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShopContextSnapshot {
    pub current: Option<Shop>,
    pub available: Vec<Shop>,
    pub initialized: bool,
    pub loading: bool,
    pub error: Option<String>,
}
