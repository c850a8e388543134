// src/config.rs

use crate::{
    common::{i18n::I18nStore, period::ShopClock},
    db::{
        CustomerRepository, DashboardRepository, FinanceRepository, ProductRepository,
        SaleRepository, SettingsRepository, UserRepository,
    },
    services::{
        auth::AuthService, customer_service::CustomerService, dashboard_service::DashboardService,
        document_service::DocumentService, finance_service::FinanceService,
        product_service::ProductService, report_service::ReportService, sale_service::SaleService,
    },
};
use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, path::PathBuf, str::FromStr, time::Duration};

/// Configuração lida das variáveis de ambiente (e do .env, se existir).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub shop_utc_offset_hours: i32,
    pub fonts_dir: PathBuf,
    pub cors_allowed_origin: Option<String>,
    pub token_ttl_days: i64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            db_max_connections: parse_var("DB_MAX_CONNECTIONS", 5)?,
            shop_utc_offset_hours: parse_var("SHOP_UTC_OFFSET_HOURS", -3)?,
            fonts_dir: env::var("FONTS_DIR").unwrap_or_else(|_| "./fonts".to_string()).into(),
            cors_allowed_origin: env::var("CORS_ALLOWED_ORIGIN").ok().filter(|v| !v.trim().is_empty()),
            token_ttl_days: parse_var("TOKEN_TTL_DAYS", 7)?,
        })
    }
}

fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{} inválida ({}): {}", name, raw, e)),
        Err(_) => Ok(default),
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Config,
    pub clock: ShopClock,
    pub i18n_store: I18nStore,
    pub settings_repo: SettingsRepository,
    pub auth_service: AuthService,
    pub product_service: ProductService,
    pub customer_service: CustomerService,
    pub sale_service: SaleService,
    pub finance_service: FinanceService,
    pub dashboard_service: DashboardService,
    pub report_service: ReportService,
    pub document_service: DocumentService,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Self::with_pool(db_pool, config)
    }

    // --- Monta o gráfico de dependências ---
    pub fn with_pool(db_pool: PgPool, config: Config) -> anyhow::Result<Self> {
        let clock = ShopClock::new(config.shop_utc_offset_hours)?;

        let user_repo = UserRepository::new(db_pool.clone());
        let product_repo = ProductRepository::new();
        let customer_repo = CustomerRepository::new();
        let sale_repo = SaleRepository::new();
        let finance_repo = FinanceRepository::new();
        let settings_repo = SettingsRepository::new();

        let auth_service = AuthService::new(
            user_repo,
            config.jwt_secret.clone(),
            config.token_ttl_days,
            db_pool.clone(),
        );
        let product_service = ProductService::new(product_repo.clone());
        let customer_service = CustomerService::new(customer_repo.clone());
        let sale_service = SaleService::new(sale_repo.clone(), product_repo, customer_repo, clock);
        let finance_service = FinanceService::new(finance_repo.clone(), clock);
        let dashboard_service = DashboardService::new(
            DashboardRepository::new(),
            sale_repo.clone(),
            finance_repo.clone(),
            clock,
        );
        let report_service = ReportService::new(sale_repo.clone(), finance_repo, clock);
        let document_service = DocumentService::new(
            sale_repo,
            settings_repo.clone(),
            config.fonts_dir.clone(),
            clock,
        );

        Ok(Self {
            db_pool,
            config,
            clock,
            i18n_store: I18nStore::new(),
            settings_repo,
            auth_service,
            product_service,
            customer_service,
            sale_service,
            finance_service,
            dashboard_service,
            report_service,
            document_service,
        })
    }
}
