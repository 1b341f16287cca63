// src/services/invoice_service.rs

use std::sync::Arc;

use validator::Validate;

use crate::{
    common::error::AppError,
    db::{
        document_store::Page,
        file_store::{FileStore, FileUpload, FileUrlBuilder},
        reference::DocRef,
        InvoiceRepository,
    },
    models::{
        auth::SessionUser,
        purchasing::{InvoicePayload, InvoiceRecord, InvoiceView, PurchaseInvoice},
    },
    services::permissions,
};

// Notas de compra + anexo no bucket de notas.
#[derive(Clone)]
pub struct InvoiceService {
    invoice_repo: InvoiceRepository,
    files: Arc<dyn FileStore>,
    urls: FileUrlBuilder,
    bucket: String,
}

impl InvoiceService {
    pub fn new(invoice_repo: InvoiceRepository, files: Arc<dyn FileStore>, urls: FileUrlBuilder, bucket: String) -> Self {
        Self { invoice_repo, files, urls, bucket }
    }

    fn require_manager(user: &SessionUser, shop_id: &str) -> Result<(), AppError> {
        if permissions::can_manage_shop(permissions::role_in_shop(user, shop_id)) {
            Ok(())
        } else {
            Err(AppError::forbidden("records_management_denied"))
        }
    }

    fn view(&self, invoice: PurchaseInvoice) -> Result<InvoiceView, AppError> {
        let file_url = match &invoice.file_id {
            Some(file_id) => Some(self.urls.view_url(&self.bucket, file_id)?),
            None => None,
        };
        Ok(InvoiceView { invoice, file_url })
    }

    async fn find(&self, shop_id: &str, id: &str) -> Result<PurchaseInvoice, AppError> {
        let invoice = self.invoice_repo.get(id).await?;
        if invoice.shop_id.as_ref().map(DocRef::id) != Some(shop_id) {
            return Err(AppError::not_found("purchase_invoices", id));
        }
        Ok(invoice)
    }

    pub async fn list_invoices(&self, user: &SessionUser, shop_id: &str, page: &Page) -> Result<Vec<InvoiceView>, AppError> {
        Self::require_manager(user, shop_id)?;
        self.invoice_repo
            .list_by_shop(shop_id, page)
            .await?
            .into_iter()
            .map(|invoice| self.view(invoice))
            .collect()
    }

    pub async fn get_invoice(&self, user: &SessionUser, shop_id: &str, id: &str) -> Result<InvoiceView, AppError> {
        Self::require_manager(user, shop_id)?;
        let invoice = self.find(shop_id, id).await?;
        self.view(invoice)
    }

    pub async fn create_invoice(&self, user: &SessionUser, shop_id: &str, payload: &InvoicePayload) -> Result<InvoiceView, AppError> {
        Self::require_manager(user, shop_id)?;
        payload.validate()?;

        let invoice = self
            .invoice_repo
            .create(&InvoiceRecord { shop_id, invoice: payload, file_id: None })
            .await?;
        self.view(invoice)
    }

    pub async fn update_invoice(
        &self,
        user: &SessionUser,
        shop_id: &str,
        id: &str,
        payload: &InvoicePayload,
    ) -> Result<InvoiceView, AppError> {
        Self::require_manager(user, shop_id)?;
        payload.validate()?;
        self.find(shop_id, id).await?;

        let invoice = self.invoice_repo.update(id, payload).await?;
        self.view(invoice)
    }

    /// Sobe o arquivo e aponta a nota para ele. O anexo anterior é apagado;
    /// se a nota não puder ser atualizada, o upload novo é descartado.
    pub async fn attach_file(
        &self,
        user: &SessionUser,
        shop_id: &str,
        id: &str,
        file: FileUpload,
    ) -> Result<InvoiceView, AppError> {
        Self::require_manager(user, shop_id)?;
        if file.bytes.is_empty() {
            return Err(AppError::InvalidInput("empty_file".into()));
        }
        let invoice = self.find(shop_id, id).await?;

        // 1. Upload
        let file_id = self.files.upload(&self.bucket, None, file).await?;

        // 2. Aponta a nota para o novo arquivo
        let updated = match self.invoice_repo.set_file(id, Some(&file_id)).await {
            Ok(updated) => updated,
            Err(e) => {
                if let Err(cleanup) = self.files.delete(&self.bucket, &file_id).await {
                    tracing::error!("Arquivo órfão {} no bucket {}: {}", file_id, self.bucket, cleanup);
                }
                return Err(e);
            }
        };

        // 3. Remove o anexo antigo
        if let Some(old) = invoice.file_id.as_deref() {
            self.delete_file_quietly(old).await;
        }

        self.view(updated)
    }

    pub async fn detach_file(&self, user: &SessionUser, shop_id: &str, id: &str) -> Result<InvoiceView, AppError> {
        Self::require_manager(user, shop_id)?;
        let invoice = self.find(shop_id, id).await?;

        let updated = self.invoice_repo.set_file(id, None).await?;
        if let Some(old) = invoice.file_id.as_deref() {
            self.delete_file_quietly(old).await;
        }
        self.view(updated)
    }

    pub async fn delete_invoice(&self, user: &SessionUser, shop_id: &str, id: &str) -> Result<(), AppError> {
        Self::require_manager(user, shop_id)?;
        let invoice = self.find(shop_id, id).await?;

        self.invoice_repo.delete(id).await?;
        if let Some(file_id) = invoice.file_id.as_deref() {
            self.delete_file_quietly(file_id).await;
        }
        Ok(())
    }

    // O registro principal já foi alterado; um arquivo que sobrou só gera log.
    async fn delete_file_quietly(&self, file_id: &str) {
        if let Err(e) = self.files.delete(&self.bucket, file_id).await {
            tracing::warn!("Não foi possível remover o arquivo {} do bucket {}: {}", file_id, self.bucket, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::file_store::MemoryFileStore,
        models::rbac::Role,
        services::test_support::{memory_store, session_user},
    };
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn fixture() -> (InvoiceService, Arc<MemoryFileStore>) {
        let files = Arc::new(MemoryFileStore::new());
        let service = InvoiceService::new(
            InvoiceRepository::new(memory_store(), "purchase_invoices"),
            files.clone(),
            FileUrlBuilder::new("https://files.example.com/v1", "alfaiataria"),
            "invoices".into(),
        );
        (service, files)
    }

    fn payload() -> InvoicePayload {
        InvoicePayload {
            supplier_name: "Tecelagem São Jorge".into(),
            invoice_number: "NF-1".into(),
            invoice_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            total_amount: Decimal::from(2500),
            notes: None,
        }
    }

    fn pdf(name: &str) -> FileUpload {
        FileUpload { name: name.into(), content_type: "application/pdf".into(), bytes: b"%PDF".to_vec() }
    }

    #[tokio::test]
    async fn replacing_the_attachment_removes_the_old_file() {
        let (service, files) = fixture();
        let manager = session_user("g", Some(Role::Manager), &["s1"]);
        let invoice = service.create_invoice(&manager, "s1", &payload()).await.unwrap();
        assert!(invoice.file_url.is_none());

        let first = service.attach_file(&manager, "s1", &invoice.invoice.id, pdf("a.pdf")).await.unwrap();
        let first_id = first.invoice.file_id.clone().unwrap();
        let url = first.file_url.unwrap();
        assert!(url.starts_with(&format!("https://files.example.com/v1/storage/buckets/invoices/files/{first_id}/view")));
        assert!(url.ends_with("project=alfaiataria"));

        let second = service.attach_file(&manager, "s1", &invoice.invoice.id, pdf("b.pdf")).await.unwrap();
        let second_id = second.invoice.file_id.unwrap();

        assert!(!files.contains("invoices", &first_id).await);
        assert!(files.contains("invoices", &second_id).await);
    }

    #[tokio::test]
    async fn deleting_the_invoice_deletes_its_file() {
        let (service, files) = fixture();
        let manager = session_user("g", Some(Role::Manager), &["s1"]);
        let invoice = service.create_invoice(&manager, "s1", &payload()).await.unwrap();
        let attached = service.attach_file(&manager, "s1", &invoice.invoice.id, pdf("a.pdf")).await.unwrap();
        let file_id = attached.invoice.file_id.unwrap();

        service.delete_invoice(&manager, "s1", &invoice.invoice.id).await.unwrap();
        assert!(!files.contains("invoices", &file_id).await);
    }

    #[tokio::test]
    async fn empty_upload_and_staff_are_rejected() {
        let (service, _) = fixture();
        let manager = session_user("g", Some(Role::Manager), &["s1"]);
        let invoice = service.create_invoice(&manager, "s1", &payload()).await.unwrap();

        let empty = FileUpload { name: "x".into(), content_type: "text/plain".into(), bytes: vec![] };
        assert!(matches!(
            service.attach_file(&manager, "s1", &invoice.invoice.id, empty).await,
            Err(AppError::InvalidInput(_))
        ));

        let salesman = session_user("v", Some(Role::Salesman), &["s1"]);
        assert!(matches!(
            service.list_invoices(&salesman, "s1", &Page::default()).await,
            Err(AppError::Forbidden(_))
        ));
    }
}
