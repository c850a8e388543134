// src/services/customer_service.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::CustomerRepository,
    models::customer::{CreateCustomerPayload, Customer, UpdateCustomerPayload},
};

#[derive(Clone)]
pub struct CustomerService {
    repo: CustomerRepository,
}

impl CustomerService {
    pub fn new(repo: CustomerRepository) -> Self {
        Self { repo }
    }

    pub async fn list_customers<'e, E>(&self, executor: E) -> Result<Vec<Customer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list(executor).await
    }

    pub async fn get_customer<'e, E>(&self, executor: E, id: Uuid) -> Result<Customer, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .find_by_id(executor, id)
            .await?
            .ok_or(AppError::CustomerNotFound)
    }

    pub async fn create_customer<'e, E>(&self, executor: E, payload: &CreateCustomerPayload) -> Result<Customer, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .create(executor, payload.name.trim(), normalize_phone(payload.phone.as_deref()))
            .await
    }

    pub async fn update_customer<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        payload: &UpdateCustomerPayload,
    ) -> Result<Customer, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .update(
                executor,
                id,
                payload.name.trim(),
                normalize_phone(payload.phone.as_deref()),
                payload.total_points,
            )
            .await?
            .ok_or(AppError::CustomerNotFound)
    }
}

// Telefone em branco vira NULL
fn normalize_phone(phone: Option<&str>) -> Option<&str> {
    phone.map(str::trim).filter(|p| !p.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_phone_is_dropped() {
        assert_eq!(normalize_phone(Some("   ")), None);
        assert_eq!(normalize_phone(None), None);
        assert_eq!(normalize_phone(Some(" (11) 9999-0000 ")), Some("(11) 9999-0000"));
    }
}
