pub mod collection;
pub mod document_store;
pub mod file_store;
pub mod memory_store;
pub mod pg_store;
pub mod reference;

pub mod user_repo;
pub use user_repo::UserRepository;
pub mod tenancy_repo;
pub use tenancy_repo::{AssignmentRepository, ShopRepository};
pub mod inventory_repo;
pub use inventory_repo::FabricRepository;
pub mod sales_repo;
pub use sales_repo::SalesRepository;
pub mod invoice_repo;
pub use invoice_repo::InvoiceRepository;
pub mod catalog_repo;
pub use catalog_repo::CatalogRepository;
pub mod crm_repo;
pub use crm_repo::CrmRepository;
