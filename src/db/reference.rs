// src/db/reference.rs

use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use utoipa::ToSchema;

/// Referência canônica para outro documento.
///
/// O banco já guardou relações em três formatos: id puro (`"abc"`),
/// objeto expandido (`{"$id": "abc", ...}`) e lista com um elemento
/// (`["abc"]`). Tudo é normalizado aqui na leitura; na escrita sai sempre
/// o id puro.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, ToSchema)]
pub struct DocRef(String);

impl DocRef {
    pub fn new(id: impl Into<String>) -> Self {
        DocRef(id.into())
    }

    pub fn id(&self) -> &str {
        &self.0
    }

    /// Extrai um id de qualquer um dos formatos conhecidos.
    pub fn from_value(value: &Value) -> Option<DocRef> {
        match value {
            Value::String(s) if !s.is_empty() => Some(DocRef(s.clone())),
            Value::Object(map) => map.get("$id").and_then(DocRef::from_value),
            Value::Array(items) => items.first().and_then(DocRef::from_value),
            _ => None,
        }
    }

    /// Versão para campos de lista (`shopIds`): aceita id solto, lista ou null.
    pub fn list_from_value(value: &Value) -> Vec<DocRef> {
        match value {
            Value::Array(items) => items.iter().filter_map(DocRef::from_value).collect(),
            other => DocRef::from_value(other).into_iter().collect(),
        }
    }

    /// `true` se o valor guardado aponta para `id`, seja qual for o formato.
    pub fn value_points_to(value: &Value, id: &str) -> bool {
        DocRef::list_from_value(value).iter().any(|r| r.id() == id)
    }
}

impl fmt::Display for DocRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocRef {
    fn from(id: &str) -> Self {
        DocRef::new(id)
    }
}

impl From<String> for DocRef {
    fn from(id: String) -> Self {
        DocRef(id)
    }
}

impl Serialize for DocRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for DocRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        DocRef::from_value(&value)
            .ok_or_else(|| de::Error::custom(format!("referência inválida: {value}")))
    }
}

// Para `Option<DocRef>`: lista vazia, string vazia e null viram None.
pub fn optional<'de, D>(deserializer: D) -> Result<Option<DocRef>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(DocRef::from_value))
}

pub fn list<'de, D>(deserializer: D) -> Result<Vec<DocRef>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(DocRef::list_from_value).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Deserialize)]
    struct Holder {
        #[serde(default, deserialize_with = "optional")]
        shop: Option<DocRef>,
        #[serde(default, deserialize_with = "list")]
        shops: Vec<DocRef>,
    }

    #[test]
    fn normalizes_every_stored_shape() {
        for raw in [json!("s1"), json!({"$id": "s1", "name": "Centro"}), json!(["s1"]), json!([{"$id": "s1"}])] {
            assert_eq!(DocRef::from_value(&raw), Some(DocRef::new("s1")), "{raw}");
        }
    }

    #[test]
    fn empty_shapes_become_none() {
        let h: Holder = serde_json::from_value(json!({"shop": [], "shops": null})).unwrap();
        assert!(h.shop.is_none());
        assert!(h.shops.is_empty());

        let h: Holder = serde_json::from_value(json!({"shop": ""})).unwrap();
        assert!(h.shop.is_none());
    }

    #[test]
    fn list_accepts_single_id_or_mixed_array() {
        let h: Holder = serde_json::from_value(json!({"shops": "a"})).unwrap();
        assert_eq!(h.shops, vec![DocRef::new("a")]);

        let h: Holder = serde_json::from_value(json!({"shops": ["a", {"$id": "b"}]})).unwrap();
        assert_eq!(h.shops, vec![DocRef::new("a"), DocRef::new("b")]);
    }

    #[test]
    fn always_writes_the_bare_id() {
        assert_eq!(serde_json::to_value(DocRef::new("x")).unwrap(), json!("x"));
    }

    #[test]
    fn membership_check_covers_arrays_and_objects() {
        assert!(DocRef::value_points_to(&json!(["a", "b"]), "b"));
        assert!(DocRef::value_points_to(&json!({"$id": "b"}), "b"));
        assert!(!DocRef::value_points_to(&json!("a"), "b"));
    }
}
