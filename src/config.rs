// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::{bail, Context};
use sqlx::postgres::PgPoolOptions;

use crate::{
    common::i18n::I18nStore,
    db::{
        document_store::DocumentStore,
        file_store::{FileStore, FileUrlBuilder, MemoryFileStore, PgFileStore},
        memory_store::MemoryDocumentStore,
        pg_store::PgDocumentStore,
        AssignmentRepository, CatalogRepository, CrmRepository, FabricRepository,
        InvoiceRepository, SalesRepository, ShopRepository, UserRepository,
    },
    services::{
        auth::{AuthService, OAuthConfig},
        catalog_service::CatalogService,
        crm_service::CrmService,
        inventory_service::InventoryService,
        invoice_service::InvoiceService,
        rbac_service::RbacService,
        sales_ledger::SalesLedger,
        shop_context::{SessionRegistry, ShopContextService},
        tenancy_service::TenancyService,
        user_service::UserService,
    },
};

// IDs das coleções no banco de documentos.
#[derive(Debug, Clone)]
pub struct CollectionIds {
    pub accounts: String,
    pub users: String,
    pub shops: String,
    pub assignments: String,
    pub fabrics: String,
    pub customers: String,
    pub transactions: String,
    pub fabric_sales: String,
    pub payments: String,
    pub invoices: String,
    pub catalog_items: String,
    pub tailoring_items: String,
}

#[derive(Debug, Clone)]
pub struct BucketIds {
    pub invoices: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

/// Configuração vinda do ambiente. Todo identificador tem um valor
/// padrão; só o segredo do JWT (e a URL do banco, no backend Postgres)
/// são obrigatórios.
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_id: String,
    pub collections: CollectionIds,
    pub buckets: BucketIds,
    pub public_endpoint: String,
    pub project_id: String,
    pub oauth_endpoint: String,
    pub oauth_providers: Vec<String>,
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub session_ttl_hours: i64,
    pub restore_stock_on_sale_delete: bool,
    pub server_addr: String,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str, fallback: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| fallback.to_string())
        };

        let jwt_secret = lookup("JWT_SECRET")
            .filter(|v| !v.trim().is_empty())
            .context("JWT_SECRET deve ser definido")?;

        let store_backend = match var("STORE_BACKEND", "postgres").to_lowercase().as_str() {
            "postgres" => StoreBackend::Postgres,
            "memory" => StoreBackend::Memory,
            other => bail!("STORE_BACKEND inválido: {other} (use postgres ou memory)"),
        };

        let database_url = lookup("DATABASE_URL").filter(|v| !v.trim().is_empty());
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            bail!("DATABASE_URL deve ser definida para o backend postgres");
        }

        let public_endpoint = var("PUBLIC_ENDPOINT", "http://localhost:3000");

        Ok(Self {
            database_id: var("DATABASE_ID", "tailor_main"),
            collections: CollectionIds {
                accounts: var("COLLECTION_ACCOUNTS", "accounts"),
                users: var("COLLECTION_USERS", "users"),
                shops: var("COLLECTION_SHOPS", "shops"),
                assignments: var("COLLECTION_USER_SHOP_ASSIGNMENTS", "user_shop_assignments"),
                fabrics: var("COLLECTION_FABRICS", "fabrics"),
                customers: var("COLLECTION_CUSTOMERS", "customers"),
                transactions: var("COLLECTION_TRANSACTIONS", "transactions"),
                fabric_sales: var("COLLECTION_FABRIC_SALES", "fabric_sales"),
                payments: var("COLLECTION_PAYMENTS", "payments"),
                invoices: var("COLLECTION_PURCHASE_INVOICES", "purchase_invoices"),
                catalog_items: var("COLLECTION_CATALOG_ITEMS", "catalog_items"),
                tailoring_items: var("COLLECTION_TAILORING_ITEMS", "tailoring_items"),
            },
            buckets: BucketIds {
                invoices: var("BUCKET_INVOICES", "invoices"),
            },
            oauth_endpoint: var("OAUTH_ENDPOINT", &public_endpoint),
            public_endpoint,
            project_id: var("PROJECT_ID", "tailor-backend"),
            oauth_providers: var("OAUTH_PROVIDERS", "google")
                .split(',')
                .map(|p| p.trim().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
            store_backend,
            database_url,
            jwt_secret,
            session_ttl_hours: var("SESSION_TTL_HOURS", "168")
                .parse()
                .context("SESSION_TTL_HOURS deve ser um número inteiro")?,
            restore_stock_on_sale_delete: var("RESTORE_STOCK_ON_SALE_DELETE", "false")
                .parse()
                .context("RESTORE_STOCK_ON_SALE_DELETE deve ser true ou false")?,
            server_addr: var("SERVER_ADDR", "0.0.0.0:3000"),
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub i18n_store: Arc<I18nStore>,
    pub file_store: Arc<dyn FileStore>,
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub shop_context: ShopContextService,
    pub tenancy_service: TenancyService,
    pub rbac_service: RbacService,
    pub sales_ledger: SalesLedger,
    pub inventory_service: InventoryService,
    pub crm_service: CrmService,
    pub catalog_service: CatalogService,
    pub invoice_service: InvoiceService,
}

impl AppState {
    pub async fn new(settings: Settings) -> anyhow::Result<Self> {
        let (documents, files): (Arc<dyn DocumentStore>, Arc<dyn FileStore>) = match settings.store_backend {
            StoreBackend::Postgres => {
                let database_url = settings
                    .database_url
                    .as_deref()
                    .context("DATABASE_URL deve ser definida")?;

                let pool = PgPoolOptions::new()
                    .max_connections(5)
                    .acquire_timeout(Duration::from_secs(3))
                    .connect(database_url)
                    .await
                    .context("Falha ao conectar ao banco de dados")?;
                tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

                sqlx::migrate!()
                    .run(&pool)
                    .await
                    .context("Falha ao rodar as migrações do banco de dados")?;
                tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

                (
                    Arc::new(PgDocumentStore::new(pool.clone(), settings.database_id.clone())),
                    Arc::new(PgFileStore::new(pool)),
                )
            }
            StoreBackend::Memory => {
                tracing::warn!("⚠️ Usando armazenamento em memória: os dados somem ao reiniciar");
                (Arc::new(MemoryDocumentStore::new()), Arc::new(MemoryFileStore::new()))
            }
        };

        Ok(Self::with_backends(settings, documents, files))
    }

    /// Monta o gráfico de dependências sobre os backends dados.
    pub fn with_backends(settings: Settings, documents: Arc<dyn DocumentStore>, files: Arc<dyn FileStore>) -> Self {
        let c = &settings.collections;

        let user_repo = UserRepository::new(documents.clone(), &c.accounts, &c.users);
        let shop_repo = ShopRepository::new(documents.clone(), &c.shops);
        let assignment_repo = AssignmentRepository::new(documents.clone(), &c.assignments);
        let fabric_repo = FabricRepository::new(documents.clone(), &c.fabrics);
        let sales_repo = SalesRepository::new(documents.clone(), &c.transactions, &c.fabric_sales, &c.payments);
        let invoice_repo = InvoiceRepository::new(documents.clone(), &c.invoices);
        let catalog_repo = CatalogRepository::new(documents.clone(), &c.catalog_items, &c.tailoring_items);
        let crm_repo = CrmRepository::new(documents, &c.customers);

        let sessions = SessionRegistry::new();
        let auth_service = AuthService::new(
            user_repo.clone(),
            sessions.clone(),
            settings.jwt_secret.clone(),
            chrono::Duration::hours(settings.session_ttl_hours),
            OAuthConfig {
                endpoint: settings.oauth_endpoint.clone(),
                project_id: settings.project_id.clone(),
                providers: settings.oauth_providers.clone(),
            },
        );
        let file_urls = FileUrlBuilder::new(&settings.public_endpoint, &settings.project_id);

        Self {
            auth_service,
            user_service: UserService::new(user_repo.clone(), assignment_repo.clone()),
            shop_context: ShopContextService::new(sessions, shop_repo.clone(), user_repo.clone()),
            tenancy_service: TenancyService::new(shop_repo.clone()),
            rbac_service: RbacService::new(assignment_repo, user_repo, shop_repo),
            sales_ledger: SalesLedger::new(sales_repo, fabric_repo.clone(), settings.restore_stock_on_sale_delete),
            inventory_service: InventoryService::new(fabric_repo),
            crm_service: CrmService::new(crm_repo),
            catalog_service: CatalogService::new(catalog_repo),
            invoice_service: InvoiceService::new(invoice_repo, files.clone(), file_urls, settings.buckets.invoices.clone()),
            file_store: files,
            i18n_store: Arc::new(I18nStore::default()),
            settings: Arc::new(settings),
        }
    }

    /// Estado completo sobre os stores em memória.
    pub fn in_memory(settings: Settings) -> Self {
        Self::with_backends(settings, Arc::new(MemoryDocumentStore::new()), Arc::new(MemoryFileStore::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn fallbacks_fill_every_identifier() {
        let settings = Settings::from_lookup(lookup(&[("JWT_SECRET", "s"), ("STORE_BACKEND", "memory")])).unwrap();

        assert_eq!(settings.collections.fabric_sales, "fabric_sales");
        assert_eq!(settings.buckets.invoices, "invoices");
        assert_eq!(settings.oauth_providers, vec!["google"]);
        assert!(!settings.restore_stock_on_sale_delete);
        assert_eq!(settings.oauth_endpoint, settings.public_endpoint);
    }

    #[test]
    fn environment_overrides_fallbacks() {
        let settings = Settings::from_lookup(lookup(&[
            ("JWT_SECRET", "s"),
            ("STORE_BACKEND", "memory"),
            ("COLLECTION_FABRICS", "tecidos"),
            ("OAUTH_PROVIDERS", "Google, github"),
            ("RESTORE_STOCK_ON_SALE_DELETE", "true"),
        ]))
        .unwrap();

        assert_eq!(settings.collections.fabrics, "tecidos");
        assert_eq!(settings.oauth_providers, vec!["google", "github"]);
        assert!(settings.restore_stock_on_sale_delete);
    }

    #[test]
    fn required_values_are_enforced() {
        assert!(Settings::from_lookup(lookup(&[("STORE_BACKEND", "memory")])).is_err());
        assert!(Settings::from_lookup(lookup(&[("JWT_SECRET", "s")])).is_err());
        assert!(Settings::from_lookup(lookup(&[("JWT_SECRET", "s"), ("STORE_BACKEND", "redis")])).is_err());
    }
}
