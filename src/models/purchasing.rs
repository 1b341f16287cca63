// src/models/purchasing.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::validation::validate_not_negative,
    db::reference::{self, DocRef},
};

// Nota fiscal de fornecedor, com anexo opcional no bucket de notas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseInvoice {
    #[serde(rename = "$id")]
    pub id: String,

    #[serde(default, deserialize_with = "reference::optional")]
    pub shop_id: Option<DocRef>,

    #[schema(example = "Tecelagem São Jorge")]
    pub supplier_name: String,

    #[schema(example = "NF-000123")]
    pub invoice_number: String,

    #[schema(value_type = String, format = Date, example = "2025-03-01")]
    pub invoice_date: NaiveDate,

    pub total_amount: Decimal,

    #[serde(default)]
    pub notes: Option<String>,

    #[serde(default)]
    pub file_id: Option<String>,

    #[serde(rename = "$createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoicePayload {
    #[validate(length(min = 1, message = "required"))]
    pub supplier_name: String,

    #[validate(length(min = 1, message = "required"))]
    pub invoice_number: String,

    #[schema(value_type = String, format = Date, example = "2025-03-01")]
    pub invoice_date: NaiveDate,

    #[validate(custom(function = "validate_not_negative"))]
    pub total_amount: Decimal,

    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceRecord<'a> {
    pub shop_id: &'a str,
    #[serde(flatten)]
    pub invoice: &'a InvoicePayload,
    pub file_id: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceFilePatch<'a> {
    pub file_id: Option<&'a str>,
}

/// Nota + URL pública do anexo (quando existe).
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceView {
    #[serde(flatten)]
    pub invoice: PurchaseInvoice,
    pub file_url: Option<String>,
}
