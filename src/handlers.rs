// src/handlers.rs

pub mod auth;
pub mod catalog;
pub mod crm;
pub mod inventory;
pub mod invoices;
pub mod rbac;
pub mod sales;
pub mod storage;
pub mod tenancy;
pub mod users;
