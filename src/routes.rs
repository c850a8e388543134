// src/routes.rs

use axum::{
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers, middleware::auth::auth_guard};

pub fn build_router(app_state: AppState) -> anyhow::Result<Router> {
    // Rotas de autenticação (públicas)
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    // Todo o resto exige Bearer token
    let protected_routes = Router::new()
        .route("/users/me", get(handlers::auth::get_me))
        .route(
            "/users/me/profile",
            get(handlers::auth::get_profile).put(handlers::auth::update_profile),
        )
        // Produtos
        .route(
            "/products",
            get(handlers::products::list_products).post(handlers::products::create_product),
        )
        .route("/products/low-stock", get(handlers::products::list_low_stock))
        .route(
            "/products/{id}",
            get(handlers::products::get_product)
                .put(handlers::products::update_product)
                .delete(handlers::products::delete_product),
        )
        // Clientes
        .route(
            "/customers",
            get(handlers::customers::list_customers).post(handlers::customers::create_customer),
        )
        .route(
            "/customers/{id}",
            get(handlers::customers::get_customer).put(handlers::customers::update_customer),
        )
        // Vendas
        .route(
            "/sales",
            get(handlers::sales::list_sales).post(handlers::sales::finalize_sale),
        )
        .route("/sales/{id}", get(handlers::sales::get_sale))
        .route("/sales/{id}/receipt", get(handlers::sales::sale_receipt))
        // Despesas
        .route(
            "/expenses",
            get(handlers::finance::list_expenses).post(handlers::finance::create_expense),
        )
        .route(
            "/expenses/{id}",
            put(handlers::finance::update_expense).delete(handlers::finance::delete_expense),
        )
        // Contas a pagar
        .route(
            "/bills",
            get(handlers::finance::list_bills).post(handlers::finance::create_bill),
        )
        .route("/bills/upcoming", get(handlers::finance::upcoming_bills))
        .route(
            "/bills/{id}",
            put(handlers::finance::update_bill).delete(handlers::finance::delete_bill),
        )
        .route("/bills/{id}/pay", post(handlers::finance::pay_bill))
        // Livro-caixa
        .route("/transactions", get(handlers::finance::list_transactions))
        // Dashboard
        .route("/dashboard/summary", get(handlers::dashboard::get_summary))
        .route("/dashboard/today", get(handlers::dashboard::get_today))
        // Relatórios
        .route("/reports", get(handlers::reports::get_report))
        .route("/reports/xlsx", get(handlers::reports::export_xlsx))
        .route("/reports/pdf", get(handlers::reports::export_pdf))
        // Configurações
        .route(
            "/settings",
            get(handlers::settings::get_settings).put(handlers::settings::update_settings),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let cors = cors_layer(app_state.config.cors_allowed_origin.as_deref())?;

    // Combina tudo no router principal
    let app = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api", protected_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    Ok(app)
}

// Sem origem configurada, libera qualquer uma (uso local)
fn cors_layer(origin: Option<&str>) -> anyhow::Result<CorsLayer> {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT_LANGUAGE]);

    Ok(match origin {
        Some(origin) => layer.allow_origin(HeaderValue::from_str(origin)?),
        None => layer.allow_origin(Any),
    })
}
