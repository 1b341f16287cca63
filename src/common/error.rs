// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::common::i18n::I18nStore;
use crate::middleware::i18n::Locale;

// Erro de domínio. Os serviços só conhecem este tipo; a camada HTTP
// converte para ApiError (já traduzido) através de `to_api_error`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Entrada inválida: {0}")]
    InvalidInput(String),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    // Autorização: sempre levantado ANTES de qualquer escrita.
    // O texto é uma chave de tradução (ver I18nStore).
    #[error("Acesso negado: {0}")]
    Forbidden(String),

    #[error("Documento não encontrado: {collection}/{id}")]
    DocumentNotFound { collection: String, id: String },

    #[error("Conflito: {0}")]
    Conflict(String),

    // Falhas conhecidas de conectividade/configuração. Repetir não resolve.
    #[error("Armazenamento mal configurado: {0}")]
    StoreMisconfigured(String),

    #[error("Armazenamento indisponível: {0}")]
    StoreUnavailable(String),

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro de serialização: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    pub fn not_found(collection: &str, id: &str) -> Self {
        AppError::DocumentNotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        }
    }

    pub fn forbidden(key: &str) -> Self {
        AppError::Forbidden(key.to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::DocumentNotFound { .. } => StatusCode::NOT_FOUND,
            AppError::EmailAlreadyExists | AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::StoreMisconfigured(_) | AppError::StoreUnavailable(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Converte o erro de domínio na resposta HTTP traduzida para o idioma do cliente.
    pub fn to_api_error(self, locale: &Locale, store: &I18nStore) -> ApiError {
        let status = self.status();
        let lang = locale.0.as_str();

        let (error, details) = match self {
            AppError::ValidationError(errors) => {
                let mut details = serde_json::Map::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<Value> = field_errors
                        .iter()
                        .map(|e| {
                            let key = e
                                .message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string());
                            Value::String(store.translate(lang, &key))
                        })
                        .collect();
                    details.insert(field.to_string(), Value::Array(messages));
                }
                (store.translate(lang, "validation_failed"), Some(Value::Object(details)))
            }
            AppError::InvalidInput(key) => (store.translate(lang, &key), None),
            AppError::EmailAlreadyExists => (store.translate(lang, "email_already_exists"), None),
            AppError::InvalidCredentials => (store.translate(lang, "invalid_credentials"), None),
            AppError::InvalidToken => (store.translate(lang, "invalid_token"), None),
            AppError::Forbidden(key) => (store.translate(lang, &key), None),
            AppError::DocumentNotFound { collection, id } => (
                store
                    .translate(lang, "document_not_found")
                    .replace("{resource}", &collection),
                Some(json!({ "collection": collection, "id": id })),
            ),
            AppError::Conflict(key) => (store.translate(lang, &key), None),
            AppError::StoreMisconfigured(reason) => {
                tracing::error!("Armazenamento mal configurado: {}", reason);
                (
                    store.translate(lang, "store_misconfigured"),
                    Some(json!({ "retryable": false })),
                )
            }
            AppError::StoreUnavailable(reason) => {
                tracing::warn!("Armazenamento indisponível: {}", reason);
                (
                    store.translate(lang, "store_unavailable"),
                    Some(json!({ "retryable": true })),
                )
            }
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (store.translate(lang, "internal_error"), None)
            }
        };

        ApiError { status, error, details }
    }
}

// Erro já pronto para o cliente (traduzido).
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

// Usado onde não há Locale disponível (ex: middleware de autenticação).
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error(&Locale::default(), &I18nStore::default())
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_error_taxonomy() {
        assert_eq!(AppError::forbidden("x").status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::not_found("fabrics", "1").status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::EmailAlreadyExists.status(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::StoreMisconfigured("tls".into()).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(AppError::InvalidToken.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn misconfigured_store_is_flagged_as_not_retryable() {
        let api = AppError::StoreMisconfigured("connection refused".into())
            .to_api_error(&Locale("en".into()), &I18nStore::default());

        assert_eq!(api.details, Some(json!({ "retryable": false })));
        assert!(!api.error.is_empty());
    }

    #[test]
    fn not_found_message_names_the_collection() {
        let api = AppError::not_found("fabrics", "abc")
            .to_api_error(&Locale("en".into()), &I18nStore::default());

        assert!(api.error.contains("fabrics"));
    }
}
