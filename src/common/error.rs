use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::{common::i18n::I18nStore, middleware::i18n::Locale};

// Nosso tipo de erro interno. Os handlers convertem para ApiError com o idioma do cliente.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Perfil '{0}' necessário")]
    Forbidden(&'static str),

    #[error("Produto não encontrado")]
    ProductNotFound,

    #[error("Produto inativo: {0}")]
    ProductInactive(String),

    #[error("Cliente não encontrado")]
    CustomerNotFound,

    #[error("Venda não encontrada")]
    SaleNotFound,

    #[error("Despesa não encontrada")]
    ExpenseNotFound,

    #[error("Conta não encontrada")]
    BillNotFound,

    #[error("Carrinho vazio")]
    EmptyCart,

    #[error("Quantidade inválida: {0}")]
    InvalidQuantity(i32),

    #[error("Estoque insuficiente para {product} (disponível {available}, solicitado {requested})")]
    InsufficientStock {
        product: String,
        available: i32,
        requested: i32,
    },

    #[error("Conta já paga")]
    BillAlreadyPaid,

    #[error("Intervalo de datas inválido")]
    InvalidDateRange,

    #[error("Fonte não encontrada: {0}")]
    FontNotFound(String),

    #[error("Erro ao gerar documento: {0}")]
    DocumentError(String),

    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // `anyhow::Error` é ótimo para capturar o contexto do erro.
    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

/// Erro no formato que o frontend recebe.
#[derive(Debug, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    pub status: StatusCode,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self { status, error: error.into(), details: None }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status;
        (status, Json(self)).into_response()
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::EmptyCart
            | AppError::InvalidQuantity(_)
            | AppError::InvalidDateRange
            | AppError::ProductInactive(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::ProductNotFound
            | AppError::CustomerNotFound
            | AppError::SaleNotFound
            | AppError::ExpenseNotFound
            | AppError::BillNotFound => StatusCode::NOT_FOUND,
            AppError::EmailAlreadyExists | AppError::BillAlreadyPaid => StatusCode::CONFLICT,
            AppError::InsufficientStock { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Chave da mensagem no catálogo e os parâmetros para interpolação.
    fn message_key(&self) -> (&'static str, Vec<(&'static str, String)>) {
        match self {
            AppError::ValidationError(_) => ("validation_failed", vec![]),
            AppError::EmailAlreadyExists => ("email_already_exists", vec![]),
            AppError::InvalidCredentials => ("invalid_credentials", vec![]),
            AppError::InvalidToken => ("invalid_token", vec![]),
            AppError::Forbidden(role) => ("forbidden", vec![("role", role.to_string())]),
            AppError::ProductNotFound => ("product_not_found", vec![]),
            AppError::ProductInactive(name) => ("product_inactive", vec![("name", name.clone())]),
            AppError::CustomerNotFound => ("customer_not_found", vec![]),
            AppError::SaleNotFound => ("sale_not_found", vec![]),
            AppError::ExpenseNotFound => ("expense_not_found", vec![]),
            AppError::BillNotFound => ("bill_not_found", vec![]),
            AppError::EmptyCart => ("empty_cart", vec![]),
            AppError::InvalidQuantity(qty) => ("invalid_quantity", vec![("quantity", qty.to_string())]),
            AppError::InsufficientStock { product, available, requested } => (
                "insufficient_stock",
                vec![
                    ("name", product.clone()),
                    ("available", available.to_string()),
                    ("requested", requested.to_string()),
                ],
            ),
            AppError::BillAlreadyPaid => ("bill_already_paid", vec![]),
            AppError::InvalidDateRange => ("invalid_date_range", vec![]),
            AppError::FontNotFound(_) | AppError::DocumentError(_) => ("document_error", vec![]),
            _ => ("internal_error", vec![]),
        }
    }

    pub fn to_api_error(&self, locale: &Locale, store: &I18nStore) -> ApiError {
        let status = self.status_code();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            // A mensagem detalhada fica só no log.
            tracing::error!("Erro Interno do Servidor: {}", self);
        }

        let (key, params) = self.message_key();
        let error = store.translate(&locale.0, key, &params);

        let details = match self {
            AppError::ValidationError(errors) => {
                let mut details = serde_json::Map::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), json!(messages));
                }
                Some(Value::Object(details))
            }
            _ => None,
        };

        ApiError { status, error, details }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::i18n::MESSAGES;
    use axum::body::to_bytes;
    use std::collections::HashSet;
    use validator::{ValidationError, ValidationErrors};

    fn pt() -> Locale {
        Locale("pt".to_string())
    }

    #[test]
    fn status_code_mapping() {
        assert_eq!(AppError::EmptyCart.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::InvalidQuantity(0).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::InvalidToken.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Forbidden("ADMIN").status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::BillNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::BillAlreadyPaid.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::InsufficientStock { product: "x".into(), available: 1, requested: 2 }.status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::DatabaseError(sqlx::Error::RowNotFound).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_errors_hide_details() {
        let api = AppError::DatabaseError(sqlx::Error::PoolTimedOut).to_api_error(&pt(), &I18nStore::new());
        assert_eq!(api.error, "Ocorreu um erro inesperado.");
        assert!(api.details.is_none());
    }

    #[test]
    fn validation_errors_list_fields() {
        let mut errors = ValidationErrors::new();
        let mut err = ValidationError::new("range");
        err.message = Some("O valor não pode ser negativo.".into());
        errors.add("salePrice", err);

        let api = AppError::ValidationError(errors).to_api_error(&pt(), &I18nStore::new());
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        let details = api.details.expect("details");
        assert_eq!(details["salePrice"][0], "O valor não pode ser negativo.");
    }

    #[test]
    fn every_catalog_message_belongs_to_an_error() {
        let errors = vec![
            AppError::ValidationError(ValidationErrors::new()),
            AppError::EmailAlreadyExists,
            AppError::InvalidCredentials,
            AppError::InvalidToken,
            AppError::Forbidden("ADMIN"),
            AppError::ProductNotFound,
            AppError::ProductInactive("Vestido".into()),
            AppError::CustomerNotFound,
            AppError::SaleNotFound,
            AppError::ExpenseNotFound,
            AppError::BillNotFound,
            AppError::EmptyCart,
            AppError::InvalidQuantity(0),
            AppError::InsufficientStock { product: "Vestido".into(), available: 0, requested: 1 },
            AppError::BillAlreadyPaid,
            AppError::InvalidDateRange,
            AppError::FontNotFound("Roboto".into()),
            AppError::DatabaseError(sqlx::Error::RowNotFound),
        ];
        let used: HashSet<&str> = errors.iter().map(|e| e.message_key().0).collect();
        let catalog: HashSet<&str> = MESSAGES.iter().map(|(key, _, _)| *key).collect();
        assert_eq!(used, catalog);
    }

    #[test]
    fn invalid_quantity_names_the_quantity() {
        let api = AppError::InvalidQuantity(-2).to_api_error(&pt(), &I18nStore::new());
        assert_eq!(api.error, "A quantidade deve ser maior que zero (recebido: -2).");
    }

    #[tokio::test]
    async fn api_error_serializes_without_status() {
        let response = ApiError::new(StatusCode::CONFLICT, "Esta conta já foi paga.").into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let payload: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(payload, json!({ "error": "Esta conta já foi paga." }));
    }
}
