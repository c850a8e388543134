// src/models/sale.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "payment_method", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Pix,
    Dinheiro,
    CartaoDebito,
    CartaoCredito,
}

impl PaymentMethod {
    /// Nome exibido em recibos e relatórios
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Pix => "PIX",
            PaymentMethod::Dinheiro => "Dinheiro",
            PaymentMethod::CartaoDebito => "Cartão de Débito",
            PaymentMethod::CartaoCredito => "Cartão de Crédito",
        }
    }
}

// Venda: imutável depois de criada
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: Uuid,
    pub customer_id: Option<Uuid>,
    #[schema(example = "259.80")]
    pub total_amount: Decimal,
    pub payment_method: PaymentMethod,
    #[schema(example = 25)]
    pub points_earned: i32,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleItem {
    pub id: Uuid,
    pub sale_id: Uuid,
    pub product_id: Option<Uuid>,
    /// Nome do produto no momento da venda
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
    pub created_at: Option<DateTime<Utc>>,
}

/// Venda com o nome do cliente e seus itens.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleDetail {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub sale: Sale,
    pub customer_name: Option<String>,
    #[sqlx(skip)]
    pub items: Vec<SaleItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: Uuid,
    #[validate(range(min = 1, message = "A quantidade deve ser maior que zero."))]
    pub quantity: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FinalizeSalePayload {
    #[validate(length(min = 1, message = "Adicione produtos ao carrinho."), nested)]
    pub items: Vec<CartLine>,

    pub customer_id: Option<Uuid>,

    pub payment_method: PaymentMethod,

    /// Pontos a creditar. Quando ausente, vale floor(total / 10).
    #[validate(range(min = 0, message = "Os pontos não podem ser negativos."))]
    pub points: Option<i32>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SaleFilter {
    /// Primeiro dia (inclusivo), no fuso da loja
    pub start_date: Option<NaiveDate>,
    /// Último dia (inclusivo), no fuso da loja
    pub end_date: Option<NaiveDate>,
    pub payment_method: Option<PaymentMethod>,
}
