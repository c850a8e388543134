// src/models/dashboard.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    common::period::Period,
    models::{finance::Expense, sale::SaleDetail},
};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SummaryQuery {
    /// day | week | month | year (padrão: day)
    #[serde(default)]
    pub period: Period,
}

// 1. Os Cards do Topo
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    #[schema(example = "day")]
    pub period: String,
    #[schema(value_type = String, format = Date)]
    pub start_date: NaiveDate,
    #[schema(value_type = String, format = Date)]
    pub end_date: NaiveDate,
    pub revenue: Decimal,     // Soma das vendas do período
    pub costs: Decimal,       // Soma das despesas do período
    pub profit: Decimal,      // revenue - costs
    pub sales_count: i64,
    pub stock_units: i64,     // Peças em estoque (produtos ativos)
}

// 2. Movimento do dia
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TodayOverview {
    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,
    pub sales: Vec<SaleDetail>,
    pub expenses: Vec<Expense>,
    pub sales_total: Decimal,
    pub expenses_total: Decimal,
}
