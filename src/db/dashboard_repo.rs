// src/db/dashboard_repo.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{Acquire, Postgres};

use crate::common::error::AppError;

/// Totais brutos de um período, lidos em um único snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodTotals {
    pub revenue: Decimal,
    pub sales_count: i64,
    pub costs: Decimal,
    pub stock_units: i64,
}

#[derive(Clone, Default)]
pub struct DashboardRepository;

impl DashboardRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn period_totals<'e, A>(
        &self,
        conn: A,
        sales_from: DateTime<Utc>,
        sales_until: DateTime<Utc>,
        expenses_from: NaiveDate,
        expenses_until: NaiveDate,
    ) -> Result<PeriodTotals, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        // Transação só de leitura para os números baterem entre si
        let mut tx = conn.begin().await?;

        // A. Vendas do período
        let (revenue, sales_count) = sqlx::query_as::<_, (Decimal, i64)>(
            r#"
            SELECT COALESCE(SUM(total_amount), 0), COUNT(*)
            FROM sales
            WHERE created_at >= $1 AND created_at < $2
            "#,
        )
        .bind(sales_from)
        .bind(sales_until)
        .fetch_one(&mut *tx)
        .await?;

        // B. Despesas do período (por data de competência)
        let costs = sqlx::query_scalar::<_, Decimal>(
            "SELECT COALESCE(SUM(amount), 0) FROM expenses WHERE date >= $1 AND date <= $2",
        )
        .bind(expenses_from)
        .bind(expenses_until)
        .fetch_one(&mut *tx)
        .await?;

        // C. Peças em estoque
        let stock_units = sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(stock_quantity), 0)::BIGINT FROM products WHERE hidden = TRUE",
        )
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(PeriodTotals { revenue, sales_count, costs, stock_units })
    }
}
