// src/services/sale_service.rs

use chrono::NaiveDate;
use rust_decimal::{prelude::ToPrimitive, Decimal};
use sqlx::{Acquire, Postgres};
use std::collections::HashMap;
use uuid::Uuid;

use crate::{
    common::{error::AppError, period::ShopClock},
    db::{sale_repo::NewSaleItem, CustomerRepository, ProductRepository, SaleRepository},
    models::{
        product::Product,
        sale::{CartLine, FinalizeSalePayload, PaymentMethod, SaleDetail},
    },
    services::finance_service::check_range,
};

#[derive(Clone)]
pub struct SaleService {
    repo: SaleRepository,
    product_repo: ProductRepository,
    customer_repo: CustomerRepository,
    clock: ShopClock,
}

impl SaleService {
    pub fn new(
        repo: SaleRepository,
        product_repo: ProductRepository,
        customer_repo: CustomerRepository,
        clock: ShopClock,
    ) -> Self {
        Self { repo, product_repo, customer_repo, clock }
    }

    /// Fecha a venda: grava venda e itens, baixa o estoque e credita pontos.
    /// Tudo em uma transação, com as linhas dos produtos travadas.
    pub async fn finalize_sale<'e, A>(
        &self,
        conn: A,
        payload: &FinalizeSalePayload,
        user_email: &str,
    ) -> Result<SaleDetail, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let lines = merge_cart(&payload.items)?;

        let mut tx = conn.begin().await?;

        // 1. Cliente (opcional)
        let customer = match payload.customer_id {
            Some(id) => Some(
                self.customer_repo
                    .find_by_id(&mut *tx, id)
                    .await?
                    .ok_or(AppError::CustomerNotFound)?,
            ),
            None => None,
        };

        // 2. Produtos travados até o commit
        let ids: Vec<Uuid> = lines.iter().map(|(id, _)| *id).collect();
        let products = self.product_repo.find_many_for_update(&mut *tx, &ids).await?;
        let items = price_cart(&lines, &products)?;

        let total: Decimal = items.iter().map(|i| i.total_price).sum();
        let points = payload.points.unwrap_or_else(|| default_points(total));

        // 3. Venda e itens
        let sale = self.repo
            .insert_sale(&mut *tx, payload.customer_id, total, payload.payment_method, points, user_email)
            .await?;
        let sale_items = self.repo.insert_items(&mut *tx, sale.id, &items).await?;

        // 4. Baixa de estoque
        let stock: HashMap<Uuid, i32> = products.iter().map(|p| (p.id, p.stock_quantity)).collect();
        for item in &items {
            let previous = stock.get(&item.product_id).copied().unwrap_or_default();
            self.product_repo
                .set_stock_quantity(&mut *tx, item.product_id, previous - item.quantity, user_email)
                .await?;
        }

        // 5. Fidelidade
        if let Some(customer) = &customer {
            if points > 0 {
                self.customer_repo.add_points(&mut *tx, customer.id, points).await?;
            }
        }

        tx.commit().await?;

        tracing::info!(
            "🛒 Venda {} finalizada: {} itens, total {}, {} pontos",
            sale.id,
            sale_items.len(),
            total,
            points
        );

        Ok(SaleDetail {
            sale,
            customer_name: customer.map(|c| c.name),
            items: sale_items,
        })
    }

    pub async fn list_sales<'e, A>(
        &self,
        conn: A,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        payment_method: Option<PaymentMethod>,
    ) -> Result<Vec<SaleDetail>, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        check_range(start_date, end_date)?;

        let start = start_date.map(|d| self.clock.start_of_day(d)).transpose()?;
        let end = end_date.map(|d| self.clock.utc_bounds(d, d).map(|(_, until)| until)).transpose()?;

        self.repo.list_details(conn, start, end, payment_method).await
    }

    pub async fn get_sale<'e, A>(&self, conn: A, id: Uuid) -> Result<SaleDetail, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        self.repo
            .find_detail(conn, id)
            .await?
            .ok_or(AppError::SaleNotFound)
    }
}

/// Soma linhas repetidas do mesmo produto, mantendo a ordem em que apareceram.
pub fn merge_cart(cart: &[CartLine]) -> Result<Vec<(Uuid, i32)>, AppError> {
    if cart.is_empty() {
        return Err(AppError::EmptyCart);
    }

    let mut merged: Vec<(Uuid, i32)> = Vec::with_capacity(cart.len());
    for line in cart {
        if line.quantity <= 0 {
            return Err(AppError::InvalidQuantity(line.quantity));
        }
        match merged.iter_mut().find(|(id, _)| *id == line.product_id) {
            Some((_, qty)) => *qty = qty.saturating_add(line.quantity),
            None => merged.push((line.product_id, line.quantity)),
        }
    }
    Ok(merged)
}

/// Confere cada linha contra o produto carregado e congela nome e preço.
pub fn price_cart(lines: &[(Uuid, i32)], products: &[Product]) -> Result<Vec<NewSaleItem>, AppError> {
    let by_id: HashMap<Uuid, &Product> = products.iter().map(|p| (p.id, p)).collect();

    lines
        .iter()
        .map(|&(product_id, quantity)| {
            let product = by_id.get(&product_id).ok_or(AppError::ProductNotFound)?;

            if !product.is_active() {
                return Err(AppError::ProductInactive(product.name.clone()));
            }
            if quantity > product.stock_quantity {
                return Err(AppError::InsufficientStock {
                    product: product.name.clone(),
                    available: product.stock_quantity,
                    requested: quantity,
                });
            }

            Ok(NewSaleItem {
                product_id,
                product_name: product.name.clone(),
                quantity,
                unit_price: product.sale_price,
                total_price: product.sale_price * Decimal::from(quantity),
            })
        })
        .collect()
}

/// Um ponto a cada 10 reais, arredondado para baixo.
pub fn default_points(total: Decimal) -> i32 {
    (total / Decimal::TEN).floor().to_i32().unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::product::ProductCategory;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn product(name: &str, price: Decimal, stock: i32, active: bool) -> Product {
        Product {
            id: Uuid::new_v4(),
            name: name.into(),
            category: ProductCategory::Vestidos,
            description: None,
            image_url: None,
            sale_price: price,
            cost_price: Decimal::ZERO,
            stock_quantity: stock,
            min_stock: 0,
            brand: String::new(),
            size: "M".into(),
            reference: String::new(),
            hidden: active,
            created_by: None,
            updated_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn line(product_id: Uuid, quantity: i32) -> CartLine {
        CartLine { product_id, quantity }
    }

    #[test]
    fn points_round_down() {
        assert_eq!(default_points(dec!(0)), 0);
        assert_eq!(default_points(dec!(9.99)), 0);
        assert_eq!(default_points(dec!(10)), 1);
        assert_eq!(default_points(dec!(259.80)), 25);
    }

    #[test]
    fn empty_cart_is_rejected() {
        assert!(matches!(merge_cart(&[]), Err(AppError::EmptyCart)));
    }

    #[test]
    fn non_positive_quantity_is_rejected() {
        let id = Uuid::new_v4();
        assert!(matches!(merge_cart(&[line(id, 0)]), Err(AppError::InvalidQuantity(0))));
        assert!(matches!(merge_cart(&[line(id, -2)]), Err(AppError::InvalidQuantity(-2))));
    }

    #[test]
    fn duplicate_lines_are_merged_in_order() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let merged = merge_cart(&[line(a, 1), line(b, 2), line(a, 3)]).unwrap();
        assert_eq!(merged, vec![(a, 4), (b, 2)]);
    }

    #[test]
    fn cart_is_priced_from_current_product_data() {
        let vestido = product("Vestido", dec!(129.90), 5, true);
        let meia = product("Meia", dec!(9.50), 10, true);
        let items = price_cart(
            &[(vestido.id, 2), (meia.id, 3)],
            &[meia.clone(), vestido.clone()],
        )
        .unwrap();

        assert_eq!(items[0].product_name, "Vestido");
        assert_eq!(items[0].total_price, dec!(259.80));
        assert_eq!(items[1].unit_price, dec!(9.50));
        assert_eq!(items[1].total_price, dec!(28.50));

        let total: Decimal = items.iter().map(|i| i.total_price).sum();
        assert_eq!(total, dec!(288.30));
        assert_eq!(default_points(total), 28);
    }

    #[test]
    fn selling_more_than_stock_fails() {
        let body = product("Body", dec!(39.90), 2, true);
        let err = price_cart(&[(body.id, 3)], &[body]).unwrap_err();
        match err {
            AppError::InsufficientStock { available, requested, .. } => {
                assert_eq!((available, requested), (2, 3));
            }
            other => panic!("erro inesperado: {other:?}"),
        }
    }

    #[test]
    fn selling_exact_stock_is_allowed() {
        let body = product("Body", dec!(39.90), 2, true);
        assert!(price_cart(&[(body.id, 2)], &[body]).is_ok());
    }

    #[test]
    fn inactive_or_missing_products_fail() {
        let old = product("Casaco antigo", dec!(80), 4, false);
        assert!(matches!(
            price_cart(&[(old.id, 1)], &[old]),
            Err(AppError::ProductInactive(_))
        ));
        assert!(matches!(
            price_cart(&[(Uuid::new_v4(), 1)], &[]),
            Err(AppError::ProductNotFound)
        ));
    }
}
