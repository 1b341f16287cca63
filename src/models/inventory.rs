// src/models/inventory.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::validation::validate_not_negative,
    db::reference::{self, DocRef},
};

// --- Tecido (SKU de estoque) ---
// stock_quantity é ajustado pelo livro de vendas e nunca fica negativo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Fabric {
    #[serde(rename = "$id")]
    pub id: String,

    #[serde(default, deserialize_with = "reference::optional")]
    pub shop_id: Option<DocRef>,

    #[schema(example = "Linho Italiano")]
    pub name: String,

    #[schema(example = "LIN-042")]
    pub code: String,

    #[serde(default)]
    pub color: Option<String>,

    #[schema(example = "12.5")]
    pub stock_quantity: Decimal,

    #[serde(default)]
    pub purchase_price: Option<Decimal>,

    #[serde(default)]
    pub sale_price: Option<Decimal>,

    #[serde(rename = "$createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FabricPayload {
    #[validate(length(min = 1, message = "required"))]
    pub name: String,

    #[validate(length(min = 1, message = "required"))]
    pub code: String,

    pub color: Option<String>,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub stock_quantity: Decimal,

    pub purchase_price: Option<Decimal>,
    pub sale_price: Option<Decimal>,
}

// Registro gravado: payload + loja do escopo.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FabricRecord<'a> {
    pub shop_id: &'a str,
    #[serde(flatten)]
    pub fabric: &'a FabricPayload,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockPatch {
    pub stock_quantity: Decimal,
}
