// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::db;
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::start_oauth,
        handlers::auth::logout,

        // --- Users ---
        handlers::users::get_me,
        handlers::users::update_me,
        handlers::users::update_my_prefs,
        handlers::users::list_users,
        handlers::users::create_user,
        handlers::users::get_user,
        handlers::users::update_user,

        // --- RBAC ---
        handlers::rbac::assignable_roles,
        handlers::rbac::list_user_assignments,
        handlers::rbac::assign_role,
        handlers::rbac::toggle_status,
        handlers::rbac::remove_from_shop,
        handlers::rbac::list_shop_members,

        // --- Tenancy ---
        handlers::tenancy::list_shops,
        handlers::tenancy::create_shop,
        handlers::tenancy::get_shop,
        handlers::tenancy::update_shop,
        handlers::tenancy::delete_shop,
        handlers::tenancy::get_context,
        handlers::tenancy::switch_shop,
        handlers::tenancy::refresh_context,

        // --- INVENTORY ---
        handlers::inventory::list_fabrics,
        handlers::inventory::create_fabric,
        handlers::inventory::get_fabric,
        handlers::inventory::update_fabric,
        handlers::inventory::delete_fabric,

        // --- SALES ---
        handlers::sales::create_fabric_sale,
        handlers::sales::list_fabric_sales,
        handlers::sales::get_fabric_sale,
        handlers::sales::update_fabric_sale,
        handlers::sales::delete_fabric_sale,

        // --- CRM ---
        handlers::crm::list_customers,
        handlers::crm::create_customer,
        handlers::crm::get_customer,
        handlers::crm::update_customer,
        handlers::crm::delete_customer,

        // --- CATALOG ---
        handlers::catalog::list_items,
        handlers::catalog::create_item,
        handlers::catalog::get_item,
        handlers::catalog::update_item,
        handlers::catalog::delete_item,
        handlers::catalog::list_tailoring,
        handlers::catalog::create_tailoring,
        handlers::catalog::update_tailoring,
        handlers::catalog::delete_tailoring,

        // --- PURCHASING ---
        handlers::invoices::list_invoices,
        handlers::invoices::create_invoice,
        handlers::invoices::get_invoice,
        handlers::invoices::update_invoice,
        handlers::invoices::delete_invoice,
        handlers::invoices::attach_file,
        handlers::invoices::detach_file,

        // --- STORAGE ---
        handlers::storage::view_file,
    ),
    components(
        schemas(
            db::reference::DocRef,

            // --- Auth ---
            models::auth::Identity,
            models::auth::UserStatus,
            models::auth::UserProfile,
            models::auth::UserProfilePatch,
            models::auth::CreateUserPayload,
            models::auth::SessionUser,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,
            models::auth::OAuthRedirect,

            // --- RBAC ---
            models::rbac::Role,
            models::rbac::AssignmentStatus,
            models::rbac::RoleOption,

            // --- TENANCY ---
            models::tenancy::Shop,
            models::tenancy::ShopPayload,
            models::tenancy::UserShopAssignment,
            models::tenancy::AssignRolePayload,
            models::tenancy::ToggleStatusPayload,
            models::tenancy::SwitchShopPayload,
            models::tenancy::ShopContextSnapshot,

            // --- Inventory ---
            models::inventory::Fabric,
            models::inventory::FabricPayload,

            // --- Sales ---
            models::sales::TransactionType,
            models::sales::PaymentStatus,
            models::sales::SaleItem,
            models::sales::Transaction,
            models::sales::FabricSale,
            models::sales::Payment,
            models::sales::FabricSaleInput,
            models::sales::StockAdjustment,
            models::sales::LedgerWarning,
            models::sales::LedgerReceipt,
            models::sales::SaleDeletion,

            // --- CRM ---
            models::crm::Customer,
            models::crm::CustomerPayload,

            // --- Catalog ---
            models::catalog::CatalogItem,
            models::catalog::CatalogItemPayload,
            models::catalog::TailoringItem,
            models::catalog::TailoringItemPayload,

            // --- Purchasing ---
            models::purchasing::PurchaseInvoice,
            models::purchasing::InvoicePayload,
            models::purchasing::InvoiceView,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação, OAuth e Sessões"),
        (name = "Users", description = "Dados do Usuário e Perfil"),
        (name = "RBAC", description = "Cargos por Loja"),
        (name = "Tenancy", description = "Gestão de Lojas e Loja Ativa da Sessão"),
        (name = "Inventory", description = "Estoque de Tecidos"),
        (name = "Sales", description = "Livro de Vendas de Tecido"),
        (name = "CRM", description = "Clientes"),
        (name = "Catalog", description = "Catálogo e Serviços de Alfaiataria"),
        (name = "Purchasing", description = "Notas de Compra e Anexos"),
        (name = "Storage", description = "Visualização de Arquivos")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
