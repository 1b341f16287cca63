// src/models/crm.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::db::reference::{self, DocRef};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    #[serde(rename = "$id")]
    pub id: String,

    #[serde(default, deserialize_with = "reference::optional")]
    pub shop_id: Option<DocRef>,

    #[schema(example = "Maria Souza")]
    pub name: String,

    #[serde(default)]
    pub phone: Option<String>,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub address: Option<String>,

    #[serde(default)]
    pub notes: Option<String>,

    #[serde(rename = "$createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerPayload {
    #[validate(length(min = 1, message = "required"))]
    pub name: String,

    pub phone: Option<String>,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,

    pub address: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRecord<'a> {
    pub shop_id: &'a str,
    #[serde(flatten)]
    pub customer: &'a CustomerPayload,
}
