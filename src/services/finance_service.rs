// src/services/finance_service.rs

use chrono::NaiveDate;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::{error::AppError, period::ShopClock},
    db::FinanceRepository,
    models::finance::{
        Bill, BillFilter, BillPayload, BillStatus, Expense, ExpenseFilter, ExpensePayload,
        FinancialTransaction, TransactionFilter, TransactionType,
    },
};

#[derive(Clone)]
pub struct FinanceService {
    repo: FinanceRepository,
    clock: ShopClock,
}

impl FinanceService {
    pub fn new(repo: FinanceRepository, clock: ShopClock) -> Self {
        Self { repo, clock }
    }

    // =========================================================================
    //  DESPESAS
    // =========================================================================

    pub async fn list_expenses<'e, E>(&self, executor: E, filter: &ExpenseFilter) -> Result<Vec<Expense>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        check_range(filter.start_date, filter.end_date)?;
        self.repo
            .list_expenses(executor, filter.start_date, filter.end_date, filter.search.as_deref())
            .await
    }

    /// Registra a despesa e o lançamento de saída no livro-caixa.
    pub async fn create_expense<'e, A>(
        &self,
        conn: A,
        payload: &ExpensePayload,
        user_email: &str,
    ) -> Result<Expense, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let date = payload.date.unwrap_or_else(|| self.clock.today());
        let description = payload.description.trim();

        let mut tx = conn.begin().await?;

        let expense = self.repo
            .create_expense(&mut *tx, description, payload.amount, payload.category, date, user_email, None)
            .await?;

        self.repo
            .record_transaction(
                &mut *tx,
                TransactionType::Saida,
                description,
                payload.amount,
                payload.category.as_str(),
                user_email,
            )
            .await?;

        tx.commit().await?;

        Ok(expense)
    }

    /// Sem data no payload, mantém a data atual da despesa.
    pub async fn update_expense<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        payload: &ExpensePayload,
    ) -> Result<Expense, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .update_expense(
                executor,
                id,
                payload.description.trim(),
                payload.amount,
                payload.category,
                payload.date,
            )
            .await?
            .ok_or(AppError::ExpenseNotFound)
    }

    pub async fn delete_expense<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if !self.repo.delete_expense(executor, id).await? {
            return Err(AppError::ExpenseNotFound);
        }
        Ok(())
    }

    // =========================================================================
    //  CONTAS A PAGAR
    // =========================================================================

    /// Lista as contas depois de gravar ATRASADO nas vencidas.
    pub async fn list_bills<'e, A>(&self, conn: A, filter: &BillFilter) -> Result<Vec<Bill>, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut tx = conn.begin().await?;

        let overdue = self.repo.mark_overdue_bills(&mut *tx, self.clock.today()).await?;
        if overdue > 0 {
            tracing::info!("⏰ {} conta(s) marcada(s) como ATRASADO", overdue);
        }

        let bills = self.repo.list_bills(&mut *tx, filter.status).await?;
        tx.commit().await?;

        Ok(bills)
    }

    pub async fn create_bill<'e, E>(&self, executor: E, payload: &BillPayload, user_email: &str) -> Result<Bill, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .create_bill(
                executor,
                payload.description.trim(),
                payload.amount,
                payload.category,
                payload.due_date,
                BillStatus::Pendente,
                payload.notify_days_before,
                user_email,
            )
            .await
    }

    /// Conta paga não pode ser editada. O status volta a ser derivado do vencimento.
    pub async fn update_bill<'e, A>(&self, conn: A, id: Uuid, payload: &BillPayload) -> Result<Bill, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut tx = conn.begin().await?;

        let current = self.repo
            .find_bill_for_update(&mut *tx, id)
            .await?
            .ok_or(AppError::BillNotFound)?;

        if current.status == BillStatus::Pago {
            return Err(AppError::BillAlreadyPaid);
        }

        let status = BillStatus::for_unpaid(payload.due_date, self.clock.today());

        let bill = self.repo
            .update_bill(
                &mut *tx,
                id,
                payload.description.trim(),
                payload.amount,
                payload.category,
                payload.due_date,
                status,
                payload.notify_days_before,
            )
            .await?;

        tx.commit().await?;
        Ok(bill)
    }

    pub async fn delete_bill<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if !self.repo.delete_bill(executor, id).await? {
            return Err(AppError::BillNotFound);
        }
        Ok(())
    }

    /// Quita a conta: status PAGO, despesa vinculada e saída no livro-caixa.
    pub async fn mark_bill_paid<'e, A>(
        &self,
        conn: A,
        id: Uuid,
        payment_date: Option<NaiveDate>,
        user_email: &str,
    ) -> Result<Bill, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let payment_date = payment_date.unwrap_or_else(|| self.clock.today());

        let mut tx = conn.begin().await?;

        let current = self.repo
            .find_bill_for_update(&mut *tx, id)
            .await?
            .ok_or(AppError::BillNotFound)?;

        if current.status == BillStatus::Pago {
            return Err(AppError::BillAlreadyPaid);
        }

        let bill = self.repo.mark_bill_paid(&mut *tx, id, payment_date).await?;

        self.repo
            .create_expense(
                &mut *tx,
                &bill.description,
                bill.amount,
                bill.category,
                payment_date,
                user_email,
                Some(bill.id),
            )
            .await?;

        self.repo
            .record_transaction(
                &mut *tx,
                TransactionType::Saida,
                &bill.description,
                bill.amount,
                bill.category.as_str(),
                user_email,
            )
            .await?;

        tx.commit().await?;

        tracing::info!("💸 Conta '{}' paga em {} por {}", bill.description, payment_date, user_email);

        Ok(bill)
    }

    /// Contas em aberto dentro da janela de aviso, incluindo as vencidas.
    pub async fn upcoming_bills<'e, A>(&self, conn: A) -> Result<Vec<Bill>, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let today = self.clock.today();
        let mut tx = conn.begin().await?;

        self.repo.mark_overdue_bills(&mut *tx, today).await?;
        let bills = self.repo.list_unpaid_bills(&mut *tx).await?;

        tx.commit().await?;

        Ok(bills.into_iter().filter(|b| b.needs_attention(today)).collect())
    }

    // =========================================================================
    //  LIVRO-CAIXA
    // =========================================================================

    pub async fn list_transactions<'e, E>(
        &self,
        executor: E,
        filter: &TransactionFilter,
    ) -> Result<Vec<FinancialTransaction>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        check_range(filter.start_date, filter.end_date)?;

        let start = filter.start_date.map(|d| self.clock.start_of_day(d)).transpose()?;
        let end = filter.end_date.map(|d| self.clock.utc_bounds(d, d).map(|(_, until)| until)).transpose()?;

        self.repo.list_transactions(executor, filter.kind, start, end).await
    }
}

pub(crate) fn check_range(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<(), AppError> {
    match (start, end) {
        (Some(start), Some(end)) if start > end => Err(AppError::InvalidDateRange),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn open_ranges_are_accepted() {
        assert!(check_range(None, None).is_ok());
        assert!(check_range(Some(date(2025, 1, 1)), None).is_ok());
        assert!(check_range(None, Some(date(2025, 1, 1))).is_ok());
        assert!(check_range(Some(date(2025, 1, 1)), Some(date(2025, 1, 1))).is_ok());
    }

    #[test]
    fn inverted_range_is_rejected() {
        assert!(matches!(
            check_range(Some(date(2025, 2, 1)), Some(date(2025, 1, 31))),
            Err(AppError::InvalidDateRange)
        ));
    }
}
