// src/db/finance_repo.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::contains_pattern,
    models::finance::{
        Bill, BillStatus, Expense, ExpenseCategory, FinancialTransaction, TransactionType,
    },
};

#[derive(Clone, Default)]
pub struct FinanceRepository;

impl FinanceRepository {
    pub fn new() -> Self {
        Self
    }

    // =========================================================================
    //  DESPESAS
    // =========================================================================

    pub async fn list_expenses<'e, E>(
        &self,
        executor: E,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        search: Option<&str>,
    ) -> Result<Vec<Expense>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let pattern = contains_pattern(search);

        let expenses = sqlx::query_as::<_, Expense>(
            r#"
            SELECT * FROM expenses
            WHERE ($1::date IS NULL OR date >= $1)
              AND ($2::date IS NULL OR date <= $2)
              AND ($3::text IS NULL OR description ILIKE $3 ESCAPE '\')
            ORDER BY date DESC, created_at DESC
            "#,
        )
        .bind(start)
        .bind(end)
        .bind(pattern)
        .fetch_all(executor)
        .await?;

        Ok(expenses)
    }

    pub async fn create_expense<'e, E>(
        &self,
        executor: E,
        description: &str,
        amount: Decimal,
        category: ExpenseCategory,
        date: NaiveDate,
        created_by: &str,
        bill_id: Option<Uuid>,
    ) -> Result<Expense, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let expense = sqlx::query_as::<_, Expense>(
            r#"
            INSERT INTO expenses (description, amount, category, date, created_by, bill_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(description)
        .bind(amount)
        .bind(category)
        .bind(date)
        .bind(created_by)
        .bind(bill_id)
        .fetch_one(executor)
        .await?;

        Ok(expense)
    }

    pub async fn update_expense<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        description: &str,
        amount: Decimal,
        category: ExpenseCategory,
        date: Option<NaiveDate>,
    ) -> Result<Option<Expense>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let expense = sqlx::query_as::<_, Expense>(
            r#"
            UPDATE expenses SET description = $2, amount = $3, category = $4, date = COALESCE($5, date)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(description)
        .bind(amount)
        .bind(category)
        .bind(date)
        .fetch_optional(executor)
        .await?;

        Ok(expense)
    }

    pub async fn delete_expense<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM expenses WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  CONTAS A PAGAR
    // =========================================================================

    /// Persiste ATRASADO para toda conta PENDENTE vencida antes de `today`.
    pub async fn mark_overdue_bills<'e, E>(&self, executor: E, today: NaiveDate) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "UPDATE bills SET status = 'ATRASADO' WHERE status = 'PENDENTE' AND due_date < $1",
        )
        .bind(today)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn list_bills<'e, E>(
        &self,
        executor: E,
        status: Option<BillStatus>,
    ) -> Result<Vec<Bill>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let bills = sqlx::query_as::<_, Bill>(
            r#"
            SELECT * FROM bills
            WHERE ($1::bill_status IS NULL OR status = $1)
            ORDER BY due_date ASC, created_at ASC
            "#,
        )
        .bind(status)
        .fetch_all(executor)
        .await?;
        Ok(bills)
    }

    pub async fn list_unpaid_bills<'e, E>(&self, executor: E) -> Result<Vec<Bill>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let bills = sqlx::query_as::<_, Bill>(
            "SELECT * FROM bills WHERE status <> 'PAGO' ORDER BY due_date ASC",
        )
        .fetch_all(executor)
        .await?;
        Ok(bills)
    }

    pub async fn find_bill_for_update<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Bill>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let bill = sqlx::query_as::<_, Bill>("SELECT * FROM bills WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(bill)
    }

    pub async fn create_bill<'e, E>(
        &self,
        executor: E,
        description: &str,
        amount: Decimal,
        category: ExpenseCategory,
        due_date: NaiveDate,
        status: BillStatus,
        notify_days_before: i32,
        created_by: &str,
    ) -> Result<Bill, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let bill = sqlx::query_as::<_, Bill>(
            r#"
            INSERT INTO bills (description, amount, category, due_date, status, notify_days_before, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(description)
        .bind(amount)
        .bind(category)
        .bind(due_date)
        .bind(status)
        .bind(notify_days_before)
        .bind(created_by)
        .fetch_one(executor)
        .await?;
        Ok(bill)
    }

    pub async fn update_bill<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        description: &str,
        amount: Decimal,
        category: ExpenseCategory,
        due_date: NaiveDate,
        status: BillStatus,
        notify_days_before: i32,
    ) -> Result<Bill, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let bill = sqlx::query_as::<_, Bill>(
            r#"
            UPDATE bills SET
                description = $2, amount = $3, category = $4,
                due_date = $5, status = $6, notify_days_before = $7
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(description)
        .bind(amount)
        .bind(category)
        .bind(due_date)
        .bind(status)
        .bind(notify_days_before)
        .fetch_one(executor)
        .await?;
        Ok(bill)
    }

    pub async fn mark_bill_paid<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        payment_date: NaiveDate,
    ) -> Result<Bill, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let bill = sqlx::query_as::<_, Bill>(
            "UPDATE bills SET status = 'PAGO', payment_date = $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(payment_date)
        .fetch_one(executor)
        .await?;
        Ok(bill)
    }

    pub async fn delete_bill<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM bills WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  LIVRO-CAIXA
    // =========================================================================

    pub async fn record_transaction<'e, E>(
        &self,
        executor: E,
        kind: TransactionType,
        description: &str,
        amount: Decimal,
        category: &str,
        created_by: &str,
    ) -> Result<FinancialTransaction, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let tx = sqlx::query_as::<_, FinancialTransaction>(
            r#"
            INSERT INTO financial_transactions (type, description, amount, category, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(kind)
        .bind(description)
        .bind(amount)
        .bind(category)
        .bind(created_by)
        .fetch_one(executor)
        .await?;
        Ok(tx)
    }

    pub async fn list_transactions<'e, E>(
        &self,
        executor: E,
        kind: Option<TransactionType>,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Vec<FinancialTransaction>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, FinancialTransaction>(
            r#"
            SELECT * FROM financial_transactions
            WHERE ($1::transaction_type IS NULL OR type = $1)
              AND ($2::timestamptz IS NULL OR created_at >= $2)
              AND ($3::timestamptz IS NULL OR created_at < $3)
            ORDER BY created_at DESC
            "#,
        )
        .bind(kind)
        .bind(start)
        .bind(end)
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }
}
