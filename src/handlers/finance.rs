// src/handlers/finance.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        role::{Admin, RequireRole},
    },
    models::finance::{
        Bill, BillFilter, BillPayload, Expense, ExpenseFilter, ExpensePayload, FinancialTransaction,
        MarkBillPaidPayload, TransactionFilter,
    },
};

// =============================================================================
//  DESPESAS
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/expenses",
    tag = "Expenses",
    params(ExpenseFilter),
    responses(
        (status = 200, description = "Despesas, mais recentes primeiro", body = Vec<Expense>),
        (status = 400, description = "Intervalo de datas inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_expenses(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(filter): Query<ExpenseFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let expenses = app_state.finance_service
        .list_expenses(&app_state.db_pool, &filter)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(expenses)))
}

#[utoipa::path(
    post,
    path = "/api/expenses",
    tag = "Expenses",
    request_body = ExpensePayload,
    responses(
        (status = 201, description = "Despesa lançada (com saída no livro-caixa)", body = Expense),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_expense(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<ExpensePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let expense = app_state.finance_service
        .create_expense(&app_state.db_pool, &payload, user.email())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(expense)))
}

#[utoipa::path(
    put,
    path = "/api/expenses/{id}",
    tag = "Expenses",
    params(("id" = Uuid, Path, description = "ID da despesa")),
    request_body = ExpensePayload,
    responses(
        (status = 200, description = "Despesa atualizada", body = Expense),
        (status = 404, description = "Despesa não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_expense(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    Json(payload): Json<ExpensePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let expense = app_state.finance_service
        .update_expense(&app_state.db_pool, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(expense)))
}

#[utoipa::path(
    delete,
    path = "/api/expenses/{id}",
    tag = "Expenses",
    params(("id" = Uuid, Path, description = "ID da despesa")),
    responses(
        (status = 204, description = "Despesa removida"),
        (status = 403, description = "Apenas ADMIN"),
        (status = 404, description = "Despesa não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_expense(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<Admin>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state.finance_service
        .delete_expense(&app_state.db_pool, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  CONTAS A PAGAR
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/bills",
    tag = "Bills",
    params(BillFilter),
    responses(
        (status = 200, description = "Contas por vencimento (vencidas já marcadas como ATRASADO)", body = Vec<Bill>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_bills(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(filter): Query<BillFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let bills = app_state.finance_service
        .list_bills(&app_state.db_pool, &filter)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(bills)))
}

#[utoipa::path(
    get,
    path = "/api/bills/upcoming",
    tag = "Bills",
    responses(
        (status = 200, description = "Contas em aberto dentro da janela de aviso", body = Vec<Bill>)
    ),
    security(("api_jwt" = []))
)]
pub async fn upcoming_bills(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let bills = app_state.finance_service
        .upcoming_bills(&app_state.db_pool)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(bills)))
}

#[utoipa::path(
    post,
    path = "/api/bills",
    tag = "Bills",
    request_body = BillPayload,
    responses(
        (status = 201, description = "Conta cadastrada como PENDENTE", body = Bill),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_bill(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<BillPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let bill = app_state.finance_service
        .create_bill(&app_state.db_pool, &payload, user.email())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(bill)))
}

#[utoipa::path(
    put,
    path = "/api/bills/{id}",
    tag = "Bills",
    params(("id" = Uuid, Path, description = "ID da conta")),
    request_body = BillPayload,
    responses(
        (status = 200, description = "Conta atualizada", body = Bill),
        (status = 404, description = "Conta não encontrada"),
        (status = 409, description = "Conta já paga")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_bill(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    Json(payload): Json<BillPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let bill = app_state.finance_service
        .update_bill(&app_state.db_pool, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(bill)))
}

#[utoipa::path(
    post,
    path = "/api/bills/{id}/pay",
    tag = "Bills",
    params(("id" = Uuid, Path, description = "ID da conta")),
    request_body = MarkBillPaidPayload,
    responses(
        (status = 200, description = "Conta paga (gera despesa e saída no livro-caixa)", body = Bill),
        (status = 404, description = "Conta não encontrada"),
        (status = 409, description = "Conta já paga")
    ),
    security(("api_jwt" = []))
)]
pub async fn pay_bill(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    payload: Option<Json<MarkBillPaidPayload>>,
) -> Result<impl IntoResponse, ApiError> {
    let payment_date = payload.and_then(|Json(p)| p.payment_date);

    let bill = app_state.finance_service
        .mark_bill_paid(&app_state.db_pool, id, payment_date, user.email())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(bill)))
}

#[utoipa::path(
    delete,
    path = "/api/bills/{id}",
    tag = "Bills",
    params(("id" = Uuid, Path, description = "ID da conta")),
    responses(
        (status = 204, description = "Conta removida"),
        (status = 403, description = "Apenas ADMIN"),
        (status = 404, description = "Conta não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_bill(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<Admin>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state.finance_service
        .delete_bill(&app_state.db_pool, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  LIVRO-CAIXA
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/transactions",
    tag = "Transactions",
    params(TransactionFilter),
    responses(
        (status = 200, description = "Lançamentos do livro-caixa", body = Vec<FinancialTransaction>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_transactions(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(filter): Query<TransactionFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let transactions = app_state.finance_service
        .list_transactions(&app_state.db_pool, &filter)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(transactions)))
}
