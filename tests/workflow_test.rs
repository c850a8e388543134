// Fluxos com várias escritas, contra um Postgres de verdade.
// O `sqlx::test` cria um banco isolado por teste a partir de DATABASE_URL e roda as migrações.

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sqlx::PgPool;
use uuid::Uuid;

use loja_gestao::{
    common::{error::AppError, period::ShopClock},
    db::{CustomerRepository, FinanceRepository, ProductRepository, SaleRepository},
    models::{
        customer::CreateCustomerPayload,
        finance::{BillFilter, BillStatus, ExpenseCategory, TransactionType},
        product::{Product, ProductCategory, ProductPayload},
        sale::{CartLine, FinalizeSalePayload, PaymentMethod},
    },
    services::{
        customer_service::CustomerService, finance_service::FinanceService, sale_service::SaleService,
    },
};

const CAIXA: &str = "caixa@loja.com";

fn clock() -> ShopClock {
    ShopClock::new(-3).unwrap()
}

fn sale_service() -> SaleService {
    SaleService::new(
        SaleRepository::new(),
        ProductRepository::new(),
        CustomerRepository::new(),
        clock(),
    )
}

fn finance_service() -> FinanceService {
    FinanceService::new(FinanceRepository::new(), clock())
}

async fn seed_product(pool: &PgPool, name: &str, price: Decimal, stock: i32) -> Product {
    let payload = ProductPayload {
        name: name.to_string(),
        category: ProductCategory::Vestidos,
        description: None,
        image_url: None,
        sale_price: price,
        cost_price: Decimal::ZERO,
        stock_quantity: stock,
        min_stock: 0,
        brand: String::new(),
        size: "M".to_string(),
        reference: String::new(),
    };
    ProductRepository::new().create(pool, &payload, CAIXA).await.unwrap()
}

async fn seed_customer(pool: &PgPool) -> Uuid {
    let payload = CreateCustomerPayload { name: "Ana".to_string(), phone: None };
    CustomerService::new(CustomerRepository::new())
        .create_customer(pool, &payload)
        .await
        .unwrap()
        .id
}

async fn stock_of(pool: &PgPool, id: Uuid) -> i32 {
    ProductRepository::new().find_by_id(pool, id).await.unwrap().unwrap().stock_quantity
}

async fn points_of(pool: &PgPool, id: Uuid) -> i32 {
    CustomerService::new(CustomerRepository::new())
        .get_customer(pool, id)
        .await
        .unwrap()
        .total_points
}

async fn count(pool: &PgPool, sql: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(sql).fetch_one(pool).await.unwrap()
}

fn cart(product_id: Uuid, quantity: i32, customer_id: Option<Uuid>, points: Option<i32>) -> FinalizeSalePayload {
    FinalizeSalePayload {
        items: vec![CartLine { product_id, quantity }],
        customer_id,
        payment_method: PaymentMethod::Pix,
        points,
    }
}

// ---
// Vendas
// ---

#[sqlx::test(migrations = "./migrations")]
async fn finalize_sale_persists_stock_and_points(pool: PgPool) {
    let vestido = seed_product(&pool, "Vestido Floral", dec!(129.90), 5).await;
    let ana = seed_customer(&pool).await;

    let detail = sale_service()
        .finalize_sale(&pool, &cart(vestido.id, 2, Some(ana), None), CAIXA)
        .await
        .unwrap();

    assert_eq!(detail.sale.total_amount, dec!(259.80));
    assert_eq!(detail.sale.points_earned, 25);
    assert_eq!(detail.customer_name.as_deref(), Some("Ana"));
    assert_eq!(detail.items.len(), 1);
    assert_eq!(detail.items[0].product_name, "Vestido Floral");

    assert_eq!(stock_of(&pool, vestido.id).await, 3);
    assert_eq!(points_of(&pool, ana).await, 25);
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM sales").await, 1);
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM sale_items").await, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn points_are_credited_only_with_customer_and_positive_points(pool: PgPool) {
    let body = seed_product(&pool, "Body", dec!(50.00), 10).await;
    let ana = seed_customer(&pool).await;

    // Sem cliente: a venda registra os pontos, mas ninguém recebe
    let anonymous = sale_service()
        .finalize_sale(&pool, &cart(body.id, 1, None, None), CAIXA)
        .await
        .unwrap();
    assert_eq!(anonymous.sale.points_earned, 5);
    assert_eq!(points_of(&pool, ana).await, 0);

    // Cliente com zero pontos informados
    sale_service()
        .finalize_sale(&pool, &cart(body.id, 1, Some(ana), Some(0)), CAIXA)
        .await
        .unwrap();
    assert_eq!(points_of(&pool, ana).await, 0);

    // Pontos informados substituem o cálculo padrão
    sale_service()
        .finalize_sale(&pool, &cart(body.id, 1, Some(ana), Some(12)), CAIXA)
        .await
        .unwrap();
    assert_eq!(points_of(&pool, ana).await, 12);
    assert_eq!(stock_of(&pool, body.id).await, 7);
}

#[sqlx::test(migrations = "./migrations")]
async fn insufficient_stock_writes_nothing(pool: PgPool) {
    let saia = seed_product(&pool, "Saia", dec!(80.00), 1).await;

    let err = sale_service()
        .finalize_sale(&pool, &cart(saia.id, 2, None, None), CAIXA)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::InsufficientStock { available: 1, requested: 2, .. }));
    assert_eq!(stock_of(&pool, saia.id).await, 1);
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM sales").await, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn failure_after_inserting_the_sale_rolls_everything_back(pool: PgPool) {
    let blusa = seed_product(&pool, "Blusa", dec!(60.00), 2).await;
    let ana = seed_customer(&pool).await;

    // Zerar o estoque passa a violar a regra, e a baixa falha depois de venda e itens gravados
    sqlx::query("ALTER TABLE products ADD CONSTRAINT stock_never_zero CHECK (stock_quantity <> 0)")
        .execute(&pool)
        .await
        .unwrap();

    let err = sale_service()
        .finalize_sale(&pool, &cart(blusa.id, 2, Some(ana), None), CAIXA)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::DatabaseError(_)));
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM sales").await, 0);
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM sale_items").await, 0);
    assert_eq!(stock_of(&pool, blusa.id).await, 2);
    assert_eq!(points_of(&pool, ana).await, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn sales_listing_rejects_dates_outside_the_calendar(pool: PgPool) {
    let err = sale_service()
        .list_sales(&pool, None, Some(NaiveDate::MAX), None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidDateRange));
}

// ---
// Contas a pagar
// ---

async fn seed_bill(pool: &PgPool, description: &str, due_date: NaiveDate) -> Uuid {
    FinanceRepository::new()
        .create_bill(
            pool,
            description,
            dec!(2500.00),
            ExpenseCategory::Aluguel,
            due_date,
            BillStatus::Pendente,
            3,
            CAIXA,
        )
        .await
        .unwrap()
        .id
}

async fn status_of(pool: &PgPool, id: Uuid) -> BillStatus {
    sqlx::query_scalar::<_, BillStatus>("SELECT status FROM bills WHERE id = $1")
        .bind(id)
        .fetch_one(pool)
        .await
        .unwrap()
}

#[sqlx::test(migrations = "./migrations")]
async fn listing_bills_persists_overdue_status(pool: PgPool) {
    let today = clock().today();
    let late = seed_bill(&pool, "Aluguel de maio", today.checked_sub_days(Days::new(1)).unwrap()).await;
    let due_today = seed_bill(&pool, "Internet", today).await;

    let bills = finance_service().list_bills(&pool, &BillFilter::default()).await.unwrap();

    let listed = bills.iter().find(|b| b.id == late).unwrap();
    assert_eq!(listed.status, BillStatus::Atrasado);
    assert_eq!(status_of(&pool, late).await, BillStatus::Atrasado);
    assert_eq!(status_of(&pool, due_today).await, BillStatus::Pendente);
}

#[sqlx::test(migrations = "./migrations")]
async fn paying_a_bill_links_expense_and_ledger_once(pool: PgPool) {
    let today = clock().today();
    let bill_id = seed_bill(&pool, "Aluguel da loja", today).await;
    let paid_on = today.checked_sub_days(Days::new(2)).unwrap();

    let bill = finance_service()
        .mark_bill_paid(&pool, bill_id, Some(paid_on), CAIXA)
        .await
        .unwrap();
    assert_eq!(bill.status, BillStatus::Pago);
    assert_eq!(bill.payment_date, Some(paid_on));

    let (amount, date): (Decimal, NaiveDate) =
        sqlx::query_as("SELECT amount, date FROM expenses WHERE bill_id = $1")
            .bind(bill_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(amount, dec!(2500.00));
    assert_eq!(date, paid_on);

    let ledger = finance_service()
        .list_transactions(&pool, &Default::default())
        .await
        .unwrap();
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger[0].kind, TransactionType::Saida);
    assert_eq!(ledger[0].amount, dec!(2500.00));
    assert_eq!(ledger[0].category, "ALUGUEL");

    // Segunda quitação: 409 e nada novo gravado
    let err = finance_service()
        .mark_bill_paid(&pool, bill_id, None, CAIXA)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BillAlreadyPaid));
    assert_eq!(err.status_code(), axum::http::StatusCode::CONFLICT);
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM expenses").await, 1);
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM financial_transactions").await, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn deleting_the_linked_expense_keeps_the_bill_paid(pool: PgPool) {
    let bill_id = seed_bill(&pool, "Energia", clock().today()).await;
    finance_service().mark_bill_paid(&pool, bill_id, None, CAIXA).await.unwrap();

    let expense_id = sqlx::query_scalar::<_, Uuid>("SELECT id FROM expenses WHERE bill_id = $1")
        .bind(bill_id)
        .fetch_one(&pool)
        .await
        .unwrap();

    finance_service().delete_expense(&pool, expense_id).await.unwrap();

    assert_eq!(status_of(&pool, bill_id).await, BillStatus::Pago);
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM expenses").await, 0);
    // O livro-caixa só recebe inserções
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM financial_transactions").await, 1);
}
