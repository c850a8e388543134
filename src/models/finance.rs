// src/models/finance.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "expense_category")]
pub enum ExpenseCategory {
    #[sqlx(rename = "FORNECEDORES")]
    #[serde(rename = "FORNECEDORES")]
    Fornecedores,
    #[sqlx(rename = "ALUGUEL")]
    #[serde(rename = "ALUGUEL")]
    Aluguel,
    #[sqlx(rename = "ENERGIA")]
    #[serde(rename = "ENERGIA")]
    Energia,
    #[sqlx(rename = "ÁGUA")]
    #[serde(rename = "ÁGUA")]
    Agua,
    #[sqlx(rename = "INTERNET")]
    #[serde(rename = "INTERNET")]
    Internet,
    #[sqlx(rename = "MARKETING")]
    #[serde(rename = "MARKETING")]
    Marketing,
    #[sqlx(rename = "MANUTENÇÃO")]
    #[serde(rename = "MANUTENÇÃO")]
    Manutencao,
    #[sqlx(rename = "SALÁRIOS")]
    #[serde(rename = "SALÁRIOS")]
    Salarios,
    #[sqlx(rename = "IMPOSTOS")]
    #[serde(rename = "IMPOSTOS")]
    Impostos,
    #[sqlx(rename = "OUTROS")]
    #[serde(rename = "OUTROS")]
    #[default]
    Outros,
}

impl ExpenseCategory {
    /// Texto gravado na coluna `category` do livro-caixa
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseCategory::Fornecedores => "FORNECEDORES",
            ExpenseCategory::Aluguel => "ALUGUEL",
            ExpenseCategory::Energia => "ENERGIA",
            ExpenseCategory::Agua => "ÁGUA",
            ExpenseCategory::Internet => "INTERNET",
            ExpenseCategory::Marketing => "MARKETING",
            ExpenseCategory::Manutencao => "MANUTENÇÃO",
            ExpenseCategory::Salarios => "SALÁRIOS",
            ExpenseCategory::Impostos => "IMPOSTOS",
            ExpenseCategory::Outros => "OUTROS",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "bill_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillStatus {
    Pendente,
    Pago,
    Atrasado,
}

impl BillStatus {
    /// Status de uma conta ainda não paga, derivado do vencimento.
    pub fn for_unpaid(due_date: NaiveDate, today: NaiveDate) -> Self {
        if due_date < today {
            BillStatus::Atrasado
        } else {
            BillStatus::Pendente
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "transaction_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Entrada,
    Saida,
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: Uuid,
    #[schema(example = "Conta de luz")]
    pub description: String,
    #[schema(example = "180.35")]
    pub amount: Decimal,
    pub category: ExpenseCategory,
    #[schema(value_type = String, format = Date, example = "2025-03-10")]
    pub date: NaiveDate,
    pub created_by: Option<String>,
    /// Conta a pagar que originou esta despesa
    pub bill_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Conta a pagar (despesa futura).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    pub id: Uuid,
    #[schema(example = "Aluguel da loja")]
    pub description: String,
    #[schema(example = "2500.00")]
    pub amount: Decimal,
    pub category: ExpenseCategory,
    #[schema(value_type = String, format = Date, example = "2025-04-05")]
    pub due_date: NaiveDate,
    pub status: BillStatus,
    #[schema(example = 3)]
    pub notify_days_before: i32,
    #[schema(value_type = Option<String>, format = Date)]
    pub payment_date: Option<NaiveDate>,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Bill {
    /// Conta em aberto que vence dentro da janela de aviso (ou já venceu).
    pub fn needs_attention(&self, today: NaiveDate) -> bool {
        if self.status == BillStatus::Pago {
            return false;
        }
        let days_left = (self.due_date - today).num_days();
        days_left <= self.notify_days_before as i64
    }
}

/// Livro-caixa: só recebe inserções.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FinancialTransaction {
    pub id: Uuid,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: TransactionType,
    pub description: String,
    pub amount: Decimal,
    pub category: String,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

// --- Payloads ---

fn validate_positive(val: &Decimal) -> Result<(), ValidationError> {
    if *val <= Decimal::ZERO {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.01);
        err.message = Some("O valor deve ser maior que zero.".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpensePayload {
    #[validate(length(min = 1, message = "A descrição é obrigatória."))]
    pub description: String,

    #[validate(custom(function = "validate_positive"))]
    pub amount: Decimal,

    #[serde(default)]
    pub category: ExpenseCategory,

    /// Padrão: hoje, no fuso da loja
    #[schema(value_type = Option<String>, format = Date)]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BillPayload {
    #[validate(length(min = 1, message = "A descrição é obrigatória."))]
    pub description: String,

    #[validate(custom(function = "validate_positive"))]
    pub amount: Decimal,

    #[serde(default)]
    pub category: ExpenseCategory,

    #[schema(value_type = String, format = Date)]
    pub due_date: NaiveDate,

    #[validate(range(min = 0, max = 365, message = "Informe entre 0 e 365 dias."))]
    #[serde(default = "default_notify_days")]
    pub notify_days_before: i32,
}

fn default_notify_days() -> i32 {
    3
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkBillPaidPayload {
    /// Padrão: hoje, no fuso da loja
    #[schema(value_type = Option<String>, format = Date)]
    pub payment_date: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ExpenseFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Busca na descrição
    pub search: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct BillFilter {
    pub status: Option<BillStatus>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct TransactionFilter {
    #[serde(rename = "type")]
    pub kind: Option<TransactionType>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn bill(due: NaiveDate, status: BillStatus, notify: i32) -> Bill {
        Bill {
            id: Uuid::new_v4(),
            description: "Internet".into(),
            amount: dec!(99.90),
            category: ExpenseCategory::Internet,
            due_date: due,
            status,
            notify_days_before: notify,
            payment_date: None,
            created_by: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn unpaid_status_is_derived_from_due_date() {
        let today = date(2025, 6, 10);
        assert_eq!(BillStatus::for_unpaid(date(2025, 6, 9), today), BillStatus::Atrasado);
        assert_eq!(BillStatus::for_unpaid(date(2025, 6, 10), today), BillStatus::Pendente);
        assert_eq!(BillStatus::for_unpaid(date(2025, 6, 11), today), BillStatus::Pendente);
    }

    #[test]
    fn attention_window_uses_notify_days() {
        let today = date(2025, 6, 10);
        assert!(bill(date(2025, 6, 13), BillStatus::Pendente, 3).needs_attention(today));
        assert!(!bill(date(2025, 6, 14), BillStatus::Pendente, 3).needs_attention(today));
        assert!(bill(date(2025, 6, 1), BillStatus::Atrasado, 0).needs_attention(today));
        assert!(!bill(date(2025, 6, 11), BillStatus::Pago, 3).needs_attention(today));
    }

    #[test]
    fn accented_categories_round_trip_through_json() {
        let json = serde_json::to_string(&ExpenseCategory::Manutencao).unwrap();
        assert_eq!(json, "\"MANUTENÇÃO\"");
        let parsed: ExpenseCategory = serde_json::from_str("\"ÁGUA\"").unwrap();
        assert_eq!(parsed, ExpenseCategory::Agua);
        assert_eq!(parsed.as_str(), "ÁGUA");
    }

    #[test]
    fn bill_payload_defaults_and_validation() {
        let payload: BillPayload = serde_json::from_str(
            r#"{"description":"Aluguel","amount":2500,"dueDate":"2025-07-05"}"#,
        )
        .unwrap();
        assert_eq!(payload.notify_days_before, 3);
        assert_eq!(payload.category, ExpenseCategory::Outros);
        assert!(payload.validate().is_ok());

        let zero: BillPayload = serde_json::from_str(
            r#"{"description":"Aluguel","amount":0,"dueDate":"2025-07-05","notifyDaysBefore":-1}"#,
        )
        .unwrap();
        let errors = zero.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("amount"));
        assert!(errors.field_errors().contains_key("notify_days_before"));
    }

    #[test]
    fn transaction_kind_serializes_as_type() {
        let tx = FinancialTransaction {
            id: Uuid::nil(),
            kind: TransactionType::Saida,
            description: "Conta de luz".into(),
            amount: dec!(10),
            category: "ENERGIA".into(),
            created_by: None,
            created_at: Utc::now(),
        };
        let value = serde_json::to_value(&tx).unwrap();
        assert_eq!(value["type"], "SAIDA");
    }
}
