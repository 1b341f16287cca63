pub mod auth;
pub mod catalog_service;
pub mod crm_service;
pub mod inventory_service;
pub mod invoice_service;
pub mod permissions;
pub mod rbac_service;
pub mod sales_ledger;
pub mod shop_context;
pub mod tenancy_service;
pub mod user_service;

#[cfg(test)]
pub mod test_support;
