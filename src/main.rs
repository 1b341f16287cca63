// src/main.rs

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, patch, post, put},
    Router,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::{AppState, Settings};
use crate::docs::ApiDoc;
use crate::middleware::auth::auth_guard;

// Notas fiscais em PDF/imagem passam do limite padrão de 2 MB.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logger: RUST_LOG controla o nível (padrão "info").
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let settings = Settings::from_env()?;
    let app_state = AppState::new(settings).await?;

    let listener = TcpListener::bind(app_state.settings.server_addr.as_str()).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app(app_state)).await?;

    Ok(())
}

fn app(app_state: AppState) -> Router {
    // Rotas de autenticação (públicas)
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .route("/oauth/{provider}", get(handlers::auth::start_oauth))
        .route("/logout", post(handlers::auth::logout));

    // Usuários e cargos
    let user_routes = Router::new()
        .route(
            "/api/users",
            get(handlers::users::list_users).post(handlers::users::create_user),
        )
        .route(
            "/api/users/me",
            get(handlers::users::get_me).patch(handlers::users::update_me),
        )
        .route("/api/users/me/prefs", patch(handlers::users::update_my_prefs))
        .route("/api/users/roles/assignable", get(handlers::rbac::assignable_roles))
        .route(
            "/api/users/{id}",
            get(handlers::users::get_user).patch(handlers::users::update_user),
        )
        .route(
            "/api/users/{id}/assignments",
            get(handlers::rbac::list_user_assignments).post(handlers::rbac::assign_role),
        )
        .route("/api/users/{id}/status", put(handlers::rbac::toggle_status))
        .route(
            "/api/users/{id}/shops/{shop_id}",
            axum::routing::delete(handlers::rbac::remove_from_shop),
        );

    // Lojas e loja ativa da sessão
    let shop_routes = Router::new()
        .route(
            "/api/shops",
            get(handlers::tenancy::list_shops).post(handlers::tenancy::create_shop),
        )
        .route("/api/shops/context", get(handlers::tenancy::get_context))
        .route("/api/shops/context/switch", post(handlers::tenancy::switch_shop))
        .route("/api/shops/context/refresh", post(handlers::tenancy::refresh_context))
        .route(
            "/api/shops/{id}",
            get(handlers::tenancy::get_shop)
                .put(handlers::tenancy::update_shop)
                .delete(handlers::tenancy::delete_shop),
        )
        .route("/api/shops/{id}/members", get(handlers::rbac::list_shop_members));

    // Dados do negócio (escopo de loja via X-Shop-ID)
    let business_routes = Router::new()
        .route(
            "/api/fabrics",
            get(handlers::inventory::list_fabrics).post(handlers::inventory::create_fabric),
        )
        .route(
            "/api/fabrics/{id}",
            get(handlers::inventory::get_fabric)
                .put(handlers::inventory::update_fabric)
                .delete(handlers::inventory::delete_fabric),
        )
        .route(
            "/api/sales/fabric",
            get(handlers::sales::list_fabric_sales).post(handlers::sales::create_fabric_sale),
        )
        .route(
            "/api/sales/fabric/{id}",
            get(handlers::sales::get_fabric_sale)
                .put(handlers::sales::update_fabric_sale)
                .delete(handlers::sales::delete_fabric_sale),
        )
        .route(
            "/api/customers",
            get(handlers::crm::list_customers).post(handlers::crm::create_customer),
        )
        .route(
            "/api/customers/{id}",
            get(handlers::crm::get_customer)
                .put(handlers::crm::update_customer)
                .delete(handlers::crm::delete_customer),
        )
        .route(
            "/api/catalog/items",
            get(handlers::catalog::list_items).post(handlers::catalog::create_item),
        )
        .route(
            "/api/catalog/items/{id}",
            get(handlers::catalog::get_item)
                .put(handlers::catalog::update_item)
                .delete(handlers::catalog::delete_item),
        )
        .route(
            "/api/catalog/tailoring",
            get(handlers::catalog::list_tailoring).post(handlers::catalog::create_tailoring),
        )
        .route(
            "/api/catalog/tailoring/{id}",
            put(handlers::catalog::update_tailoring).delete(handlers::catalog::delete_tailoring),
        )
        .route(
            "/api/invoices",
            get(handlers::invoices::list_invoices).post(handlers::invoices::create_invoice),
        )
        .route(
            "/api/invoices/{id}",
            get(handlers::invoices::get_invoice)
                .put(handlers::invoices::update_invoice)
                .delete(handlers::invoices::delete_invoice),
        )
        .route(
            "/api/invoices/{id}/file",
            put(handlers::invoices::attach_file).delete(handlers::invoices::detach_file),
        )
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES));

    // Tudo que exige sessão passa pelo auth_guard
    let protected = Router::new()
        .merge(user_routes)
        .merge(shop_routes)
        .merge(business_routes)
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/health", get(|| async { "OK" }))
        .route(
            "/storage/buckets/{bucket}/files/{file_id}/view",
            get(handlers::storage::view_file),
        )
        .nest("/api/auth", auth_routes)
        .merge(protected)
        .with_state(app_state)
}
