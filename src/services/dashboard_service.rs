// src/services/dashboard_service.rs

use chrono::NaiveDate;
use sqlx::{Acquire, Postgres};

use crate::{
    common::{error::AppError, period::{Period, ShopClock}},
    db::{dashboard_repo::PeriodTotals, DashboardRepository, FinanceRepository, SaleRepository},
    models::dashboard::{DashboardSummary, TodayOverview},
};

#[derive(Clone)]
pub struct DashboardService {
    repo: DashboardRepository,
    sale_repo: SaleRepository,
    finance_repo: FinanceRepository,
    clock: ShopClock,
}

impl DashboardService {
    pub fn new(
        repo: DashboardRepository,
        sale_repo: SaleRepository,
        finance_repo: FinanceRepository,
        clock: ShopClock,
    ) -> Self {
        Self { repo, sale_repo, finance_repo, clock }
    }

    pub async fn get_summary<'e, A>(&self, conn: A, period: Period) -> Result<DashboardSummary, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let (start, end) = period.range(self.clock.today());
        let (from, until) = self.clock.utc_bounds(start, end)?;

        let totals = self.repo.period_totals(conn, from, until, start, end).await?;

        Ok(build_summary(period, start, end, totals))
    }

    /// Vendas e despesas do dia corrente da loja.
    pub async fn get_today<'e, A>(&self, conn: A) -> Result<TodayOverview, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let today = self.clock.today();
        let (from, until) = self.clock.utc_bounds(today, today)?;

        let mut conn = conn.acquire().await?;

        let sales = self.sale_repo
            .list_details(&mut *conn, Some(from), Some(until), None)
            .await?;
        let expenses = self.finance_repo
            .list_expenses(&mut *conn, Some(today), Some(today), None)
            .await?;

        let sales_total = sales.iter().map(|s| s.sale.total_amount).sum();
        let expenses_total = expenses.iter().map(|e| e.amount).sum();

        Ok(TodayOverview { date: today, sales, expenses, sales_total, expenses_total })
    }
}

fn build_summary(period: Period, start: NaiveDate, end: NaiveDate, totals: PeriodTotals) -> DashboardSummary {
    DashboardSummary {
        period: period.as_str().to_string(),
        start_date: start,
        end_date: end,
        revenue: totals.revenue,
        costs: totals.costs,
        profit: totals.revenue - totals.costs,
        sales_count: totals.sales_count,
        stock_units: totals.stock_units,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    #[test]
    fn profit_can_be_negative() {
        let day = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let summary = build_summary(
            Period::Week,
            day,
            day,
            PeriodTotals { revenue: dec!(120.00), sales_count: 2, costs: dec!(300.50), stock_units: 40 },
        );
        assert_eq!(summary.period, "week");
        assert_eq!(summary.profit, dec!(-180.50));
        assert_eq!(summary.stock_units, 40);
    }

    #[test]
    fn empty_period_is_all_zero() {
        let day = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let summary = build_summary(
            Period::Day,
            day,
            day,
            PeriodTotals { revenue: Decimal::ZERO, sales_count: 0, costs: Decimal::ZERO, stock_units: 0 },
        );
        assert_eq!(summary.profit, Decimal::ZERO);
        assert_eq!(summary.sales_count, 0);
    }
}
