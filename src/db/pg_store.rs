// src/db/pg_store.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{types::Json, FromRow, PgPool, Postgres, QueryBuilder};

use crate::{
    common::error::AppError,
    db::document_store::{
        new_document_id, strip_meta, Document, DocumentStore, Fields, Filter, Query, CREATED_AT,
    },
};

const SELECT_COLUMNS: &str = "SELECT id, collection, data, created_at, updated_at FROM documents";

// Linha da tabela 'documents' (um JSONB por documento).
#[derive(Debug, FromRow)]
struct DocumentRow {
    id: String,
    collection: String,
    data: Json<Fields>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<DocumentRow> for Document {
    fn from(row: DocumentRow) -> Self {
        Document {
            id: row.id,
            collection: row.collection,
            created_at: row.created_at,
            updated_at: row.updated_at,
            data: row.data.0,
        }
    }
}

/// Separa as falhas "conhecidas" (não adianta repetir) das demais.
pub(crate) fn classify(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::PoolTimedOut => AppError::StoreUnavailable(err.to_string()),
        sqlx::Error::Io(io) if io.kind() == std::io::ErrorKind::ConnectionRefused => {
            AppError::StoreMisconfigured(err.to_string())
        }
        sqlx::Error::Tls(_) | sqlx::Error::Configuration(_) => {
            AppError::StoreMisconfigured(err.to_string())
        }
        sqlx::Error::Io(_) => AppError::StoreUnavailable(err.to_string()),
        _ => AppError::DatabaseError(err),
    }
}

/// Document store sobre Postgres: tabela única `documents`, particionada
/// logicamente por `database_id` e `collection`.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
    database_id: String,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool, database_id: impl Into<String>) -> Self {
        Self { pool, database_id: database_id.into() }
    }

    fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &Filter) {
        match filter {
            Filter::Equal(field, Value::Null) => {
                qb.push(" AND (data -> ")
                    .push_bind(field.clone())
                    .push(" IS NULL OR data -> ")
                    .push_bind(field.clone())
                    .push(" = 'null'::jsonb)");
            }
            Filter::Equal(field, value) => {
                // Igualdade direta, objeto expandido {"$id": ...} ou lista que contém o valor.
                qb.push(" AND (data -> ")
                    .push_bind(field.clone())
                    .push(" = ")
                    .push_bind(Json(value.clone()))
                    .push(" OR data -> ")
                    .push_bind(field.clone())
                    .push(" -> '$id' = ")
                    .push_bind(Json(value.clone()))
                    .push(" OR data -> ")
                    .push_bind(field.clone())
                    .push(" @> jsonb_build_array(")
                    .push_bind(Json(value.clone()))
                    .push(") OR data -> ")
                    .push_bind(field.clone())
                    .push(" @> jsonb_build_array(jsonb_build_object('$id', ")
                    .push_bind(Json(value.clone()))
                    .push(")))");
            }
        }
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn list(&self, collection: &str, query: &Query) -> Result<Vec<Document>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new(SELECT_COLUMNS);
        qb.push(" WHERE database_id = ")
            .push_bind(self.database_id.clone())
            .push(" AND collection = ")
            .push_bind(collection.to_string());

        for filter in &query.filters {
            Self::push_filter(&mut qb, filter);
        }

        match &query.order_desc {
            Some(field) if field == CREATED_AT => {
                qb.push(" ORDER BY created_at DESC, seq DESC");
            }
            Some(field) => {
                qb.push(" ORDER BY data -> ")
                    .push_bind(field.clone())
                    .push(" DESC NULLS LAST, seq DESC");
            }
            None => {
                qb.push(" ORDER BY seq ASC");
            }
        }

        if let Some(limit) = query.limit {
            qb.push(" LIMIT ").push_bind(limit as i64);
        }
        if let Some(offset) = query.offset {
            qb.push(" OFFSET ").push_bind(offset as i64);
        }

        let rows = qb
            .build_query_as::<DocumentRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(classify)?;

        Ok(rows.into_iter().map(Document::from).collect())
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Document, AppError> {
        let sql = format!("{SELECT_COLUMNS} WHERE database_id = $1 AND collection = $2 AND id = $3");
        sqlx::query_as::<_, DocumentRow>(&sql)
            .bind(&self.database_id)
            .bind(collection)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(classify)?
            .map(Document::from)
            .ok_or_else(|| AppError::not_found(collection, id))
    }

    async fn create(
        &self,
        collection: &str,
        id: Option<&str>,
        fields: Fields,
    ) -> Result<Document, AppError> {
        let id = id.map(str::to_string).unwrap_or_else(new_document_id);

        sqlx::query_as::<_, DocumentRow>(
            r#"
            INSERT INTO documents (database_id, collection, id, data)
            VALUES ($1, $2, $3, $4)
            RETURNING id, collection, data, created_at, updated_at
            "#,
        )
        .bind(&self.database_id)
        .bind(collection)
        .bind(&id)
        .bind(Json(strip_meta(fields)))
        .fetch_one(&self.pool)
        .await
        .map(Document::from)
        .map_err(|e| {
            // Converte erro de violação de chave única em um erro mais amigável
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::Conflict("document_already_exists".into());
                }
            }
            classify(e)
        })
    }

    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<Document, AppError> {
        // `||` faz o merge raso, igual ao update parcial do store em memória.
        sqlx::query_as::<_, DocumentRow>(
            r#"
            UPDATE documents
            SET data = data || $4, updated_at = now()
            WHERE database_id = $1 AND collection = $2 AND id = $3
            RETURNING id, collection, data, created_at, updated_at
            "#,
        )
        .bind(&self.database_id)
        .bind(collection)
        .bind(id)
        .bind(Json(strip_meta(fields)))
        .fetch_optional(&self.pool)
        .await
        .map_err(classify)?
        .map(Document::from)
        .ok_or_else(|| AppError::not_found(collection, id))
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), AppError> {
        let result = sqlx::query(
            "DELETE FROM documents WHERE database_id = $1 AND collection = $2 AND id = $3",
        )
        .bind(&self.database_id)
        .bind(collection)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(classify)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(collection, id));
        }
        Ok(())
    }
}
