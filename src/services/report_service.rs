// src/services/report_service.rs

use rust_decimal::Decimal;
use sqlx::{Acquire, Postgres};

use crate::{
    common::{error::AppError, period::ShopClock},
    db::{FinanceRepository, SaleRepository},
    models::{
        finance::Expense,
        report::{Report, ReportFilter, ReportSummary},
        sale::SaleDetail,
    },
    services::finance_service::check_range,
};

#[derive(Clone)]
pub struct ReportService {
    sale_repo: SaleRepository,
    finance_repo: FinanceRepository,
    clock: ShopClock,
}

impl ReportService {
    pub fn new(sale_repo: SaleRepository, finance_repo: FinanceRepository, clock: ShopClock) -> Self {
        Self { sale_repo, finance_repo, clock }
    }

    /// Vendas e despesas do intervalo, com os totais já calculados.
    /// O filtro de método de pagamento vale só para as vendas.
    pub async fn build_report<'e, A>(&self, conn: A, filter: &ReportFilter) -> Result<Report, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        check_range(Some(filter.start_date), Some(filter.end_date))?;

        let (from, until) = self.clock.utc_bounds(filter.start_date, filter.end_date)?;

        let mut conn = conn.acquire().await?;

        let sales = self.sale_repo
            .list_details(&mut *conn, Some(from), Some(until), filter.payment_method)
            .await?;
        let expenses = self.finance_repo
            .list_expenses(&mut *conn, Some(filter.start_date), Some(filter.end_date), None)
            .await?;

        Ok(Report {
            start_date: filter.start_date,
            end_date: filter.end_date,
            payment_method: filter.payment_method,
            summary: summarize(&sales, &expenses),
            sales,
            expenses,
        })
    }
}

pub fn summarize(sales: &[SaleDetail], expenses: &[Expense]) -> ReportSummary {
    let revenue: Decimal = sales.iter().map(|s| s.sale.total_amount).sum();
    let total_expenses: Decimal = expenses.iter().map(|e| e.amount).sum();

    let average_ticket = if sales.is_empty() {
        Decimal::ZERO
    } else {
        (revenue / Decimal::from(sales.len())).round_dp(2)
    };

    ReportSummary {
        revenue,
        expenses: total_expenses,
        profit: revenue - total_expenses,
        sales_count: sales.len(),
        average_ticket,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        finance::ExpenseCategory,
        sale::{PaymentMethod, Sale},
    };
    use chrono::{NaiveDate, Utc};
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn sale(total: Decimal) -> SaleDetail {
        SaleDetail {
            sale: Sale {
                id: Uuid::new_v4(),
                customer_id: None,
                total_amount: total,
                payment_method: PaymentMethod::Dinheiro,
                points_earned: 0,
                created_by: None,
                created_at: Utc::now(),
            },
            customer_name: None,
            items: Vec::new(),
        }
    }

    fn expense(amount: Decimal) -> Expense {
        Expense {
            id: Uuid::new_v4(),
            description: "Aluguel".into(),
            amount,
            category: ExpenseCategory::Aluguel,
            date: NaiveDate::from_ymd_opt(2025, 4, 5).unwrap(),
            created_by: None,
            bill_id: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn average_ticket_is_zero_without_sales() {
        let summary = summarize(&[], &[expense(dec!(50))]);
        assert_eq!(summary.average_ticket, Decimal::ZERO);
        assert_eq!(summary.sales_count, 0);
        assert_eq!(summary.profit, dec!(-50));
    }

    #[test]
    fn totals_and_average_ticket() {
        let summary = summarize(
            &[sale(dec!(100)), sale(dec!(50)), sale(dec!(50.01))],
            &[expense(dec!(30)), expense(dec!(20))],
        );
        assert_eq!(
            summary,
            ReportSummary {
                revenue: dec!(200.01),
                expenses: dec!(50),
                profit: dec!(150.01),
                sales_count: 3,
                average_ticket: dec!(66.67),
            }
        );
    }
}
