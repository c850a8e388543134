// src/models/report.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::models::{
    finance::Expense,
    sale::{PaymentMethod, SaleDetail},
};

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ReportFilter {
    /// Primeiro dia (inclusivo)
    pub start_date: NaiveDate,
    /// Último dia (inclusivo)
    pub end_date: NaiveDate,
    /// Ausente = todos os métodos. Não se aplica às despesas.
    pub payment_method: Option<PaymentMethod>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub revenue: Decimal,
    pub expenses: Decimal,
    pub profit: Decimal,
    pub sales_count: usize,
    pub average_ticket: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    #[schema(value_type = String, format = Date)]
    pub start_date: NaiveDate,
    #[schema(value_type = String, format = Date)]
    pub end_date: NaiveDate,
    pub payment_method: Option<PaymentMethod>,
    pub summary: ReportSummary,
    pub sales: Vec<SaleDetail>,
    pub expenses: Vec<Expense>,
}
