// src/models/sales.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::validation::{validate_not_negative, validate_positive},
    db::reference::{self, DocRef},
};

// --- Enums ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    FabricSale, // Vira "fabric_sale"
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Paid,
    Pending,
}

// --- Item de venda ---
// Formato gravado: {"fabricId", "quantity", "sale_price"}.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct SaleItem {
    #[serde(rename = "fabricId", alias = "fabric_id")]
    #[validate(length(min = 1, message = "required"))]
    pub fabric_id: String,

    #[validate(custom(function = "validate_positive"))]
    #[schema(example = "3")]
    pub quantity: Decimal,

    #[serde(rename = "sale_price", alias = "salePrice", default)]
    #[validate(custom(function = "validate_not_negative"))]
    #[schema(example = "500")]
    pub sale_price: Decimal,
}

/// Serializa cada item como uma string JSON (formato de armazenamento).
pub fn encode_items(items: &[SaleItem]) -> Result<Vec<String>, serde_json::Error> {
    items.iter().map(serde_json::to_string).collect()
}

/// Lê os itens guardados aceitando todos os formatos que já existiram:
/// lista de strings JSON, lista de objetos, uma string com a lista inteira
/// ou um objeto solto.
pub fn decode_items(value: &Value) -> Result<Vec<SaleItem>, String> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::String(raw) => {
            let parsed: Value = serde_json::from_str(raw)
                .map_err(|e| format!("item de venda ilegível ({raw}): {e}"))?;
            if parsed.is_string() {
                return Err(format!("item de venda duplamente serializado: {raw}"));
            }
            decode_items(&parsed)
        }
        Value::Array(entries) => {
            let mut items = Vec::with_capacity(entries.len());
            for entry in entries {
                items.extend(decode_items(entry)?);
            }
            Ok(items)
        }
        Value::Object(_) => serde_json::from_value(value.clone())
            .map(|item| vec![item])
            .map_err(|e| format!("item de venda inválido ({value}): {e}")),
        other => Err(format!("formato de itens inesperado: {other}")),
    }
}

fn deserialize_items<'de, D>(deserializer: D) -> Result<Vec<SaleItem>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?.unwrap_or(Value::Null);
    decode_items(&value).map_err(de::Error::custom)
}

// --- Transação (evento monetário, imutável na prática) ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub transaction_date: DateTime<Utc>,
    pub total_amount: Decimal,
    #[serde(default, deserialize_with = "reference::optional")]
    pub shop_id: Option<DocRef>,
    #[serde(default, deserialize_with = "reference::optional")]
    pub customer_id: Option<DocRef>,
    #[serde(default, deserialize_with = "reference::optional")]
    pub created_by: Option<DocRef>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction<'a> {
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub transaction_date: DateTime<Utc>,
    pub total_amount: Decimal,
    pub shop_id: &'a str,
    pub customer_id: Option<&'a str>,
    pub created_by: &'a str,
}

// --- Venda de tecido (linha do livro) ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FabricSale {
    #[serde(rename = "$id")]
    pub id: String,

    #[serde(deserialize_with = "reference::optional", default)]
    pub transaction_id: Option<DocRef>,

    #[serde(deserialize_with = "reference::optional", default)]
    pub shop_id: Option<DocRef>,

    #[serde(deserialize_with = "reference::optional", default)]
    pub customer_id: Option<DocRef>,

    #[serde(deserialize_with = "reference::optional", default)]
    pub seller_id: Option<DocRef>,

    #[serde(deserialize_with = "deserialize_items", default)]
    pub items: Vec<SaleItem>,

    pub total_amount: Decimal,
    #[serde(default)]
    pub discount_amount: Decimal,
    #[serde(default)]
    pub payment_amount: Decimal,
    pub payment_status: PaymentStatus,

    #[serde(default)]
    pub sale_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,

    #[serde(rename = "$createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "$updatedAt", default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FabricSaleRecord<'a> {
    pub transaction_id: &'a str,
    pub shop_id: &'a str,
    pub customer_id: Option<&'a str>,
    pub seller_id: &'a str,
    pub items: Vec<String>,
    pub total_amount: Decimal,
    pub discount_amount: Decimal,
    pub payment_amount: Decimal,
    pub payment_status: PaymentStatus,
    pub sale_date: DateTime<Utc>,
    pub notes: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FabricSalePatch<'a> {
    pub items: Vec<String>,
    pub total_amount: Decimal,
    pub discount_amount: Decimal,
    pub payment_amount: Decimal,
    pub payment_status: PaymentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<&'a str>,
}

// --- Pagamento (só existe se payment_amount > 0 na criação) ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(deserialize_with = "reference::optional", default)]
    pub transaction_id: Option<DocRef>,
    #[serde(deserialize_with = "reference::optional", default)]
    pub shop_id: Option<DocRef>,
    #[serde(deserialize_with = "reference::optional", default)]
    pub customer_id: Option<DocRef>,
    pub amount: Decimal,
    #[serde(default)]
    pub payment_method: Option<String>,
    pub payment_date: DateTime<Utc>,
    #[serde(deserialize_with = "reference::optional", default)]
    pub received_by: Option<DocRef>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPayment<'a> {
    pub transaction_id: &'a str,
    pub shop_id: &'a str,
    pub customer_id: Option<&'a str>,
    pub amount: Decimal,
    pub payment_method: Option<&'a str>,
    pub payment_date: DateTime<Utc>,
    pub received_by: &'a str,
}

// --- Entrada da API (criação e edição) ---
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FabricSaleInput {
    pub customer_id: Option<String>,

    #[validate(length(min = 1, message = "empty_sale"), nested)]
    pub items: Vec<SaleItem>,

    #[validate(custom(function = "validate_not_negative"))]
    #[schema(example = "1500")]
    pub total_amount: Decimal,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub discount_amount: Decimal,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub payment_amount: Decimal,

    pub payment_method: Option<String>,
    pub notes: Option<String>,
}

// --- Resultado do livro ---

/// Efeito aplicado ao estoque de um tecido.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockAdjustment {
    pub fabric_id: String,
    /// Positivo devolve estoque; negativo consome.
    pub delta: Decimal,
    pub new_quantity: Decimal,
}

/// Passo secundário que falhou depois de a venda já estar gravada.
/// Nada é desfeito; o operador é avisado.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum LedgerWarning {
    PaymentNotRecorded {
        reason: String,
    },
    StockNotAdjusted {
        #[serde(rename = "fabricId")]
        fabric_id: String,
        delta: Decimal,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LedgerReceipt {
    pub transaction: Option<Transaction>,
    pub sale: FabricSale,
    pub payment: Option<Payment>,
    pub adjustments: Vec<StockAdjustment>,
    pub warnings: Vec<LedgerWarning>,
}

/// Resultado da exclusão de uma venda.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleDeletion {
    pub sale_id: String,
    /// Vazio, a menos que a devolução de estoque na exclusão esteja ligada.
    pub adjustments: Vec<StockAdjustment>,
    pub warnings: Vec<LedgerWarning>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(id: &str, qty: i64) -> SaleItem {
        SaleItem { fabric_id: id.into(), quantity: Decimal::new(qty, 0), sale_price: Decimal::new(500, 0) }
    }

    #[test]
    fn encoded_items_use_the_stored_field_names() {
        let encoded = encode_items(&[item("fx", 3)]).unwrap();
        let parsed: Value = serde_json::from_str(&encoded[0]).unwrap();
        assert_eq!(parsed["fabricId"], json!("fx"));
        assert!(parsed.get("sale_price").is_some());
    }

    #[test]
    fn decodes_list_of_json_strings() {
        let stored = json!(encode_items(&[item("a", 5), item("b", 2)]).unwrap());
        assert_eq!(decode_items(&stored).unwrap(), vec![item("a", 5), item("b", 2)]);
    }

    #[test]
    fn decodes_already_parsed_objects() {
        let stored = json!([{"fabricId": "a", "quantity": 5, "sale_price": 500}]);
        assert_eq!(decode_items(&stored).unwrap(), vec![item("a", 5)]);
    }

    #[test]
    fn decodes_whole_list_serialized_as_one_string() {
        let stored = json!("[{\"fabricId\":\"a\",\"quantity\":5,\"sale_price\":500}]");
        assert_eq!(decode_items(&stored).unwrap(), vec![item("a", 5)]);
    }

    #[test]
    fn missing_sale_price_defaults_to_zero() {
        let stored = json!([{"fabricId": "a", "quantity": 5}]);
        assert_eq!(decode_items(&stored).unwrap()[0].sale_price, Decimal::ZERO);
    }

    #[test]
    fn garbage_is_reported_not_ignored() {
        assert!(decode_items(&json!(["not json"])).is_err());
        assert!(decode_items(&json!(42)).is_err());
    }
}
