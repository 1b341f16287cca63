// src/models/catalog.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::validation::validate_not_negative,
    db::reference::{self, DocRef},
};

// Item da tabela de preços (ex: "Terno sob medida").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    #[serde(rename = "$id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub worker_price: Decimal,
    // Vazio = vale para todas as lojas.
    #[serde(default, deserialize_with = "reference::list")]
    pub shop_ids: Vec<DocRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItemPayload {
    #[validate(length(min = 1, message = "required"))]
    pub name: String,
    pub description: Option<String>,
    #[validate(custom(function = "validate_not_negative"))]
    pub price: Decimal,
    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub worker_price: Decimal,
    #[serde(default)]
    pub shop_ids: Vec<String>,
}

// Serviço de alfaiataria (ex: "Bainha", "Bordado de gola").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TailoringItem {
    #[serde(rename = "$id")]
    pub id: String,
    pub name: String,
    pub sell_price: Decimal,
    #[serde(default)]
    pub worker_price: Decimal,
    #[serde(default, deserialize_with = "reference::list")]
    pub shop_ids: Vec<DocRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TailoringItemPayload {
    #[validate(length(min = 1, message = "required"))]
    pub name: String,
    #[validate(custom(function = "validate_not_negative"))]
    pub sell_price: Decimal,
    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub worker_price: Decimal,
    #[serde(default)]
    pub shop_ids: Vec<String>,
}
