// src/db/document_store.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

use crate::{common::error::AppError, db::reference::DocRef};

pub type Fields = Map<String, Value>;

// Campo "virtual" de ordenação pela data de criação do documento.
pub const CREATED_AT: &str = "$createdAt";

/// Documento como sai do store: metadados + dados livres.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub collection: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub data: Fields,
}

impl Document {
    /// Converte para um modelo tipado. Os metadados entram como
    /// `$id`, `$createdAt` e `$updatedAt`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, AppError> {
        let mut map = self.data.clone();
        map.insert("$id".into(), Value::String(self.id.clone()));
        map.insert("$createdAt".into(), Value::String(self.created_at.to_rfc3339()));
        map.insert("$updatedAt".into(), Value::String(self.updated_at.to_rfc3339()));
        Ok(serde_json::from_value(Value::Object(map))?)
    }
}

/// Serializa um payload para o mapa de campos gravável.
/// Chaves com `$` são metadados do store e nunca viram dados.
pub fn to_fields<T: Serialize>(value: &T) -> Result<Fields, AppError> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(strip_meta(map)),
        other => Err(AppError::InternalServerError(anyhow::anyhow!(
            "payload de documento deve ser um objeto, recebido: {other}"
        ))),
    }
}

pub fn strip_meta(fields: Fields) -> Fields {
    fields.into_iter().filter(|(k, _)| !k.starts_with('$')).collect()
}

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Igualdade. Um valor guardado como `{"$id": v}` ou como lista
    /// contendo `v` também casa (ver `DocRef`).
    Equal(String, Value),
}

impl Filter {
    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Filter::Equal(field, expected) => match doc.data.get(field) {
                Some(stored) if stored == expected => true,
                Some(stored) => match expected {
                    Value::String(id) => DocRef::value_points_to(stored, id),
                    _ => false,
                },
                None => expected.is_null(),
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order_desc: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn equal(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Equal(field.to_string(), value.into()));
        self
    }

    pub fn order_desc(mut self, field: &str) -> Self {
        self.order_desc = Some(field.to_string());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn page(self, page: &Page) -> Self {
        let query = self.limit(page.limit());
        match page.offset {
            Some(offset) => query.offset(offset),
            None => query,
        }
    }
}

/// Paginação vinda da query string (`?limit=25&offset=50`).
#[derive(Debug, Clone, Default, serde::Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct Page {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl Page {
    pub const DEFAULT_LIMIT: usize = 25;
    pub const MAX_LIMIT: usize = 100;

    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(Self::DEFAULT_LIMIT).clamp(1, Self::MAX_LIMIT)
    }
}

/// Cliente do banco de documentos (coleções nomeadas, CRUD simples).
///
/// Não há transações entre chamadas nem controle de concorrência:
/// cada escrita é independente.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn list(&self, collection: &str, query: &Query) -> Result<Vec<Document>, AppError>;

    async fn get(&self, collection: &str, id: &str) -> Result<Document, AppError>;

    async fn create(
        &self,
        collection: &str,
        id: Option<&str>,
        fields: Fields,
    ) -> Result<Document, AppError>;

    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<Document, AppError>;

    async fn delete(&self, collection: &str, id: &str) -> Result<(), AppError>;
}

pub fn new_document_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    fn doc(data: Value) -> Document {
        Document {
            id: "d1".into(),
            collection: "c".into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            data: data.as_object().cloned().unwrap(),
        }
    }

    #[test]
    fn equality_filter_tolerates_reference_shapes() {
        let f = Filter::Equal("shopId".into(), json!("s1"));
        assert!(f.matches(&doc(json!({"shopId": "s1"}))));
        assert!(f.matches(&doc(json!({"shopId": {"$id": "s1"}}))));
        assert!(f.matches(&doc(json!({"shopId": ["s1"]}))));
        assert!(!f.matches(&doc(json!({"shopId": "s2"}))));
        assert!(!f.matches(&doc(json!({}))));
    }

    #[test]
    fn null_filter_matches_missing_field() {
        let f = Filter::Equal("shopId".into(), Value::Null);
        assert!(f.matches(&doc(json!({}))));
        assert!(f.matches(&doc(json!({"shopId": null}))));
    }

    #[test]
    fn decode_injects_metadata() {
        #[derive(Deserialize)]
        struct Named {
            #[serde(rename = "$id")]
            id: String,
            name: String,
        }

        let named: Named = doc(json!({"name": "Linho"})).decode().unwrap();
        assert_eq!(named.id, "d1");
        assert_eq!(named.name, "Linho");
    }

    #[test]
    fn to_fields_drops_metadata_keys() {
        let fields = to_fields(&json!({"$id": "x", "name": "a"})).unwrap();
        assert!(!fields.contains_key("$id"));
        assert_eq!(fields.get("name"), Some(&json!("a")));
    }

    #[test]
    fn page_limit_is_clamped() {
        assert_eq!(Page::default().limit(), Page::DEFAULT_LIMIT);
        assert_eq!(Page { limit: Some(10_000), offset: None }.limit(), Page::MAX_LIMIT);
        assert_eq!(Page { limit: Some(0), offset: None }.limit(), 1);
    }
}
