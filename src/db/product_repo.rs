// src/db/product_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::contains_pattern,
    models::product::{Product, ProductFilter, ProductPayload},
};

#[derive(Clone, Default)]
pub struct ProductRepository;

impl ProductRepository {
    pub fn new() -> Self {
        Self
    }

    // ---
    // Leitura
    // ---

    /// Produtos ativos (hidden = TRUE), ordenados por nome.
    pub async fn list_active<'e, E>(
        &self,
        executor: E,
        filter: &ProductFilter,
    ) -> Result<Vec<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let search = contains_pattern(filter.search.as_deref());

        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT * FROM products
            WHERE hidden = TRUE
              AND ($1::text IS NULL OR name ILIKE $1 ESCAPE '\' OR description ILIKE $1 ESCAPE '\')
              AND ($2::product_category IS NULL OR category = $2)
            ORDER BY name ASC
            "#,
        )
        .bind(search)
        .bind(filter.category)
        .fetch_all(executor)
        .await?;

        Ok(products)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(product)
    }

    /// Trava as linhas dos produtos até o fim da transação.
    pub async fn find_many_for_update<'e, E>(
        &self,
        executor: E,
        ids: &[Uuid],
    ) -> Result<Vec<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let products = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE id = ANY($1) ORDER BY id FOR UPDATE",
        )
        .bind(ids)
        .fetch_all(executor)
        .await?;
        Ok(products)
    }

    pub async fn list_low_stock<'e, E>(&self, executor: E) -> Result<Vec<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT * FROM products
            WHERE hidden = TRUE AND stock_quantity <= min_stock
            ORDER BY stock_quantity ASC, name ASC
            "#,
        )
        .fetch_all(executor)
        .await?;
        Ok(products)
    }

    // ---
    // Escrita
    // ---

    pub async fn create<'e, E>(
        &self,
        executor: E,
        input: &ProductPayload,
        user_email: &str,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (
                name, category, description, image_url, sale_price, cost_price,
                stock_quantity, min_stock, brand, size, reference, hidden,
                created_by, updated_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, TRUE, $12, $12)
            RETURNING *
            "#,
        )
        .bind(&input.name)
        .bind(input.category)
        .bind(&input.description)
        .bind(&input.image_url)
        .bind(input.sale_price)
        .bind(input.cost_price)
        .bind(input.stock_quantity)
        .bind(input.min_stock)
        .bind(&input.brand)
        .bind(&input.size)
        .bind(&input.reference)
        .bind(user_email)
        .fetch_one(executor)
        .await?;

        Ok(product)
    }

    /// Edição completa. O produto continua (ou volta a ficar) ativo.
    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        input: &ProductPayload,
        user_email: &str,
    ) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products SET
                name = $2, category = $3, description = $4, image_url = $5,
                sale_price = $6, cost_price = $7, stock_quantity = $8, min_stock = $9,
                brand = $10, size = $11, reference = $12, hidden = TRUE,
                updated_by = $13, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(input.category)
        .bind(&input.description)
        .bind(&input.image_url)
        .bind(input.sale_price)
        .bind(input.cost_price)
        .bind(input.stock_quantity)
        .bind(input.min_stock)
        .bind(&input.brand)
        .bind(&input.size)
        .bind(&input.reference)
        .bind(user_email)
        .fetch_optional(executor)
        .await?;

        Ok(product)
    }

    /// Exclusão lógica: hidden = FALSE tira o produto das listagens.
    pub async fn soft_delete<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        user_email: &str,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "UPDATE products SET hidden = FALSE, updated_by = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(user_email)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn set_stock_quantity<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        stock_quantity: i32,
        user_email: &str,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            "UPDATE products SET stock_quantity = $2, updated_by = $3, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(stock_quantity)
        .bind(user_email)
        .execute(executor)
        .await?;
        Ok(())
    }
}
