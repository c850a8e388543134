// src/db/sale_repo.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, Postgres};
use std::collections::HashMap;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::sale::{PaymentMethod, Sale, SaleDetail, SaleItem},
};

/// Linha do carrinho já precificada, pronta para virar sale_item.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSaleItem {
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
}

#[derive(Clone, Default)]
pub struct SaleRepository;

impl SaleRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn insert_sale<'e, E>(
        &self,
        executor: E,
        customer_id: Option<Uuid>,
        total_amount: Decimal,
        payment_method: PaymentMethod,
        points_earned: i32,
        created_by: &str,
    ) -> Result<Sale, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            INSERT INTO sales (customer_id, total_amount, payment_method, points_earned, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(customer_id)
        .bind(total_amount)
        .bind(payment_method)
        .bind(points_earned)
        .bind(created_by)
        .fetch_one(executor)
        .await?;

        Ok(sale)
    }

    /// Insere todos os itens da venda em um único comando.
    pub async fn insert_items<'e, E>(
        &self,
        executor: E,
        sale_id: Uuid,
        items: &[NewSaleItem],
    ) -> Result<Vec<SaleItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product_ids: Vec<Uuid> = items.iter().map(|i| i.product_id).collect();
        let names: Vec<String> = items.iter().map(|i| i.product_name.clone()).collect();
        let quantities: Vec<i32> = items.iter().map(|i| i.quantity).collect();
        let unit_prices: Vec<Decimal> = items.iter().map(|i| i.unit_price).collect();
        let totals: Vec<Decimal> = items.iter().map(|i| i.total_price).collect();

        let inserted = sqlx::query_as::<_, SaleItem>(
            r#"
            INSERT INTO sale_items (sale_id, product_id, product_name, quantity, unit_price, total_price)
            SELECT $1, u.product_id, u.product_name, u.quantity, u.unit_price, u.total_price
            FROM UNNEST($2::uuid[], $3::text[], $4::int[], $5::numeric[], $6::numeric[])
                AS u(product_id, product_name, quantity, unit_price, total_price)
            RETURNING *
            "#,
        )
        .bind(sale_id)
        .bind(product_ids)
        .bind(names)
        .bind(quantities)
        .bind(unit_prices)
        .bind(totals)
        .fetch_all(executor)
        .await?;

        Ok(inserted)
    }

    /// Vendas no intervalo [start, end), mais recentes primeiro, com cliente e itens.
    pub async fn list_details<'e, A>(
        &self,
        conn: A,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        payment_method: Option<PaymentMethod>,
    ) -> Result<Vec<SaleDetail>, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut conn = conn.acquire().await?;

        let sales = sqlx::query_as::<_, SaleDetail>(
            r#"
            SELECT s.*, c.name AS customer_name
            FROM sales s
            LEFT JOIN customers c ON c.id = s.customer_id
            WHERE ($1::timestamptz IS NULL OR s.created_at >= $1)
              AND ($2::timestamptz IS NULL OR s.created_at < $2)
              AND ($3::payment_method IS NULL OR s.payment_method = $3)
            ORDER BY s.created_at DESC
            "#,
        )
        .bind(start)
        .bind(end)
        .bind(payment_method)
        .fetch_all(&mut *conn)
        .await?;

        let sale_ids: Vec<Uuid> = sales.iter().map(|s| s.sale.id).collect();
        let items = self.items_for_sales(&mut *conn, &sale_ids).await?;

        Ok(attach_items(sales, items))
    }

    pub async fn find_detail<'e, A>(&self, conn: A, id: Uuid) -> Result<Option<SaleDetail>, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut conn = conn.acquire().await?;

        let sale = sqlx::query_as::<_, SaleDetail>(
            r#"
            SELECT s.*, c.name AS customer_name
            FROM sales s
            LEFT JOIN customers c ON c.id = s.customer_id
            WHERE s.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        let Some(sale) = sale else {
            return Ok(None);
        };

        let items = self.items_for_sales(&mut *conn, &[id]).await?;
        Ok(attach_items(vec![sale], items).pop())
    }

    async fn items_for_sales<'e, E>(&self, executor: E, sale_ids: &[Uuid]) -> Result<Vec<SaleItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if sale_ids.is_empty() {
            return Ok(Vec::new());
        }

        let items = sqlx::query_as::<_, SaleItem>(
            "SELECT * FROM sale_items WHERE sale_id = ANY($1) ORDER BY created_at ASC, product_name ASC",
        )
        .bind(sale_ids)
        .fetch_all(executor)
        .await?;
        Ok(items)
    }
}

/// Distribui os itens entre as vendas, preservando a ordem de ambos.
pub fn attach_items(mut sales: Vec<SaleDetail>, items: Vec<SaleItem>) -> Vec<SaleDetail> {
    let mut by_sale: HashMap<Uuid, Vec<SaleItem>> = HashMap::new();
    for item in items {
        by_sale.entry(item.sale_id).or_default().push(item);
    }
    for sale in &mut sales {
        sale.items = by_sale.remove(&sale.sale.id).unwrap_or_default();
    }
    sales
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn detail(id: Uuid) -> SaleDetail {
        SaleDetail {
            sale: Sale {
                id,
                customer_id: None,
                total_amount: dec!(10),
                payment_method: PaymentMethod::Pix,
                points_earned: 1,
                created_by: None,
                created_at: Utc::now(),
            },
            customer_name: None,
            items: Vec::new(),
        }
    }

    fn item(sale_id: Uuid, name: &str) -> SaleItem {
        SaleItem {
            id: Uuid::new_v4(),
            sale_id,
            product_id: None,
            product_name: name.to_string(),
            quantity: 1,
            unit_price: dec!(5),
            total_price: dec!(5),
            created_at: None,
        }
    }

    #[test]
    fn items_are_grouped_under_their_sale() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let sales = attach_items(
            vec![detail(a), detail(b), detail(c)],
            vec![item(b, "Pijama"), item(a, "Vestido"), item(b, "Meia")],
        );

        assert_eq!(sales[0].items.len(), 1);
        assert_eq!(sales[0].items[0].product_name, "Vestido");
        let names: Vec<&str> = sales[1].items.iter().map(|i| i.product_name.as_str()).collect();
        assert_eq!(names, ["Pijama", "Meia"]);
        assert!(sales[2].items.is_empty());
    }
}
