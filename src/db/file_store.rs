// src/db/file_store.rs

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use tokio::sync::RwLock;
use url::Url;

use crate::{
    common::error::AppError,
    db::{document_store::new_document_id, pg_store::classify},
};

#[derive(Debug, Clone)]
pub struct FileUpload {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, FromRow)]
pub struct StoredFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Cliente do armazenamento de arquivos (buckets nomeados).
#[async_trait]
pub trait FileStore: Send + Sync {
    async fn upload(&self, bucket: &str, id: Option<&str>, file: FileUpload) -> Result<String, AppError>;

    async fn download(&self, bucket: &str, file_id: &str) -> Result<StoredFile, AppError>;

    async fn delete(&self, bucket: &str, file_id: &str) -> Result<(), AppError>;
}

/// Monta a URL pública de visualização. Determinística e sem assinatura:
/// `{endpoint}/storage/buckets/{bucket}/files/{id}/view?project={project}`.
#[derive(Debug, Clone)]
pub struct FileUrlBuilder {
    endpoint: String,
    project_id: String,
}

impl FileUrlBuilder {
    pub fn new(endpoint: &str, project_id: &str) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            project_id: project_id.to_string(),
        }
    }

    pub fn view_url(&self, bucket: &str, file_id: &str) -> Result<String, AppError> {
        let raw = format!("{}/storage/buckets/{}/files/{}/view", self.endpoint, bucket, file_id);
        let url = Url::parse_with_params(&raw, &[("project", self.project_id.as_str())])
            .map_err(|e| AppError::StoreMisconfigured(format!("endpoint público inválido: {e}")))?;
        Ok(url.to_string())
    }
}

fn bucket_file(bucket: &str, file_id: &str) -> String {
    format!("{bucket}/{file_id}")
}

#[derive(Default)]
pub struct MemoryFileStore {
    files: RwLock<HashMap<(String, String), StoredFile>>,
}

impl MemoryFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn contains(&self, bucket: &str, file_id: &str) -> bool {
        self.files
            .read()
            .await
            .contains_key(&(bucket.to_string(), file_id.to_string()))
    }
}

#[async_trait]
impl FileStore for MemoryFileStore {
    async fn upload(&self, bucket: &str, id: Option<&str>, file: FileUpload) -> Result<String, AppError> {
        let id = id.map(str::to_string).unwrap_or_else(new_document_id);
        let mut files = self.files.write().await;
        let key = (bucket.to_string(), id.clone());
        if files.contains_key(&key) {
            return Err(AppError::Conflict("document_already_exists".into()));
        }
        files.insert(
            key,
            StoredFile {
                name: file.name,
                content_type: file.content_type,
                bytes: file.bytes,
            },
        );
        Ok(id)
    }

    async fn download(&self, bucket: &str, file_id: &str) -> Result<StoredFile, AppError> {
        self.files
            .read()
            .await
            .get(&(bucket.to_string(), file_id.to_string()))
            .cloned()
            .ok_or_else(|| AppError::not_found(&bucket_file(bucket, file_id), file_id))
    }

    async fn delete(&self, bucket: &str, file_id: &str) -> Result<(), AppError> {
        self.files
            .write()
            .await
            .remove(&(bucket.to_string(), file_id.to_string()))
            .map(|_| ())
            .ok_or_else(|| AppError::not_found(&bucket_file(bucket, file_id), file_id))
    }
}

#[derive(Clone)]
pub struct PgFileStore {
    pool: PgPool,
}

impl PgFileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FileStore for PgFileStore {
    async fn upload(&self, bucket: &str, id: Option<&str>, file: FileUpload) -> Result<String, AppError> {
        let id = id.map(str::to_string).unwrap_or_else(new_document_id);

        sqlx::query(
            r#"
            INSERT INTO stored_files (bucket_id, id, name, content_type, size_bytes, bytes)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(bucket)
        .bind(&id)
        .bind(&file.name)
        .bind(&file.content_type)
        .bind(file.bytes.len() as i64)
        .bind(&file.bytes)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::Conflict("document_already_exists".into());
                }
            }
            classify(e)
        })?;

        Ok(id)
    }

    async fn download(&self, bucket: &str, file_id: &str) -> Result<StoredFile, AppError> {
        sqlx::query_as::<_, StoredFile>(
            "SELECT name, content_type, bytes FROM stored_files WHERE bucket_id = $1 AND id = $2",
        )
        .bind(bucket)
        .bind(file_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(classify)?
        .ok_or_else(|| AppError::not_found(&bucket_file(bucket, file_id), file_id))
    }

    async fn delete(&self, bucket: &str, file_id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM stored_files WHERE bucket_id = $1 AND id = $2")
            .bind(bucket)
            .bind(file_id)
            .execute(&self.pool)
            .await
            .map_err(classify)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(&bucket_file(bucket, file_id), file_id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_url_is_deterministic() {
        let builder = FileUrlBuilder::new("https://api.example.com/v1/", "atelier");
        let url = builder.view_url("invoices", "f1").unwrap();
        assert_eq!(
            url,
            "https://api.example.com/v1/storage/buckets/invoices/files/f1/view?project=atelier"
        );
        assert_eq!(url, builder.view_url("invoices", "f1").unwrap());
    }

    #[test]
    fn bad_endpoint_is_a_configuration_error() {
        let builder = FileUrlBuilder::new("not a url", "p");
        assert!(matches!(
            builder.view_url("b", "f"),
            Err(AppError::StoreMisconfigured(_))
        ));
    }

    #[tokio::test]
    async fn memory_upload_download_delete() {
        let store = MemoryFileStore::new();
        let id = store
            .upload(
                "invoices",
                None,
                FileUpload { name: "nf.pdf".into(), content_type: "application/pdf".into(), bytes: vec![1, 2, 3] },
            )
            .await
            .unwrap();

        let file = store.download("invoices", &id).await.unwrap();
        assert_eq!(file.bytes, vec![1, 2, 3]);

        store.delete("invoices", &id).await.unwrap();
        assert!(!store.contains("invoices", &id).await);
        assert!(store.delete("invoices", &id).await.is_err());
    }
}
