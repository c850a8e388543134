// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;
use crate::common::period::Period;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,

        // --- Users ---
        handlers::auth::get_me,
        handlers::auth::get_profile,
        handlers::auth::update_profile,

        // --- Products ---
        handlers::products::list_products,
        handlers::products::list_low_stock,
        handlers::products::get_product,
        handlers::products::create_product,
        handlers::products::update_product,
        handlers::products::delete_product,

        // --- Customers ---
        handlers::customers::list_customers,
        handlers::customers::get_customer,
        handlers::customers::create_customer,
        handlers::customers::update_customer,

        // --- Sales ---
        handlers::sales::finalize_sale,
        handlers::sales::list_sales,
        handlers::sales::get_sale,
        handlers::sales::sale_receipt,

        // --- Expenses ---
        handlers::finance::list_expenses,
        handlers::finance::create_expense,
        handlers::finance::update_expense,
        handlers::finance::delete_expense,

        // --- Bills ---
        handlers::finance::list_bills,
        handlers::finance::upcoming_bills,
        handlers::finance::create_bill,
        handlers::finance::update_bill,
        handlers::finance::pay_bill,
        handlers::finance::delete_bill,

        // --- Transactions ---
        handlers::finance::list_transactions,

        // --- Dashboard ---
        handlers::dashboard::get_summary,
        handlers::dashboard::get_today,

        // --- Reports ---
        handlers::reports::get_report,
        handlers::reports::export_xlsx,
        handlers::reports::export_pdf,

        // --- Settings ---
        handlers::settings::get_settings,
        handlers::settings::update_settings,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::UserRole,
            models::auth::User,
            models::auth::UserProfile,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::UpdateProfilePayload,
            models::auth::AuthResponse,

            // --- Products ---
            models::product::ProductCategory,
            models::product::Product,
            models::product::ProductPayload,

            // --- Customers ---
            models::customer::Customer,
            models::customer::CreateCustomerPayload,
            models::customer::UpdateCustomerPayload,

            // --- Sales ---
            models::sale::PaymentMethod,
            models::sale::Sale,
            models::sale::SaleItem,
            models::sale::SaleDetail,
            models::sale::CartLine,
            models::sale::FinalizeSalePayload,

            // --- Finance ---
            models::finance::ExpenseCategory,
            models::finance::BillStatus,
            models::finance::TransactionType,
            models::finance::Expense,
            models::finance::Bill,
            models::finance::FinancialTransaction,
            models::finance::ExpensePayload,
            models::finance::BillPayload,
            models::finance::MarkBillPaidPayload,

            // --- Dashboard ---
            Period,
            models::dashboard::DashboardSummary,
            models::dashboard::TodayOverview,

            // --- Reports ---
            models::report::ReportSummary,
            models::report::Report,

            // --- Settings ---
            models::settings::ShopSettings,
            models::settings::UpdateSettingsRequest,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Users", description = "Dados do Usuário e Perfil"),
        (name = "Products", description = "Catálogo e Estoque"),
        (name = "Customers", description = "Clientes e Pontos de Fidelidade"),
        (name = "Sales", description = "Frente de Caixa e Recibos"),
        (name = "Expenses", description = "Despesas"),
        (name = "Bills", description = "Contas a Pagar"),
        (name = "Transactions", description = "Livro-Caixa"),
        (name = "Dashboard", description = "Indicadores Gerenciais"),
        (name = "Reports", description = "Relatórios e Exportação"),
        (name = "Settings", description = "Configurações da Loja")
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
