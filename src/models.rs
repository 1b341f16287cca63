pub mod auth;
pub mod catalog;
pub mod crm;
pub mod inventory;
pub mod purchasing;
pub mod rbac;
pub mod sales;
pub mod tenancy;
