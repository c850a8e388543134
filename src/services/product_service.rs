// src/services/product_service.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::ProductRepository,
    models::product::{Product, ProductFilter, ProductPayload},
};

#[derive(Clone)]
pub struct ProductService {
    repo: ProductRepository,
}

impl ProductService {
    pub fn new(repo: ProductRepository) -> Self {
        Self { repo }
    }

    pub async fn list_products<'e, E>(&self, executor: E, filter: &ProductFilter) -> Result<Vec<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list_active(executor, filter).await
    }

    pub async fn get_product<'e, E>(&self, executor: E, id: Uuid) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .find_by_id(executor, id)
            .await?
            .ok_or(AppError::ProductNotFound)
    }

    pub async fn create_product<'e, E>(
        &self,
        executor: E,
        payload: &ProductPayload,
        user_email: &str,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = self.repo.create(executor, payload, user_email).await?;
        tracing::info!("📦 Produto '{}' cadastrado por {}", product.name, user_email);
        Ok(product)
    }

    pub async fn update_product<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        payload: &ProductPayload,
        user_email: &str,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .update(executor, id, payload, user_email)
            .await?
            .ok_or(AppError::ProductNotFound)
    }

    /// Desativa o produto. A linha continua no banco para o histórico de vendas.
    pub async fn deactivate_product<'e, E>(&self, executor: E, id: Uuid, user_email: &str) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if !self.repo.soft_delete(executor, id, user_email).await? {
            return Err(AppError::ProductNotFound);
        }
        tracing::info!("🗑️ Produto {} desativado por {}", id, user_email);
        Ok(())
    }

    pub async fn low_stock<'e, E>(&self, executor: E) -> Result<Vec<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list_low_stock(executor).await
    }
}
