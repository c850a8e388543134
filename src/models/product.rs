// src/models/product.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "product_category", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductCategory {
    Vestidos,
    Conjuntos,
    Macacao,
    Calcados,
    Acessorios,
    Bodies,
    Pijamas,
    Casacos,
    Outros,
}

/// Produto do catálogo.
///
/// Atenção à polaridade herdada dos dados: `hidden = true` significa produto
/// ATIVO. A exclusão é lógica e grava `hidden = false`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    #[schema(example = "Vestido Floral")]
    pub name: String,
    pub category: ProductCategory,
    pub description: Option<String>,
    pub image_url: Option<String>,
    #[schema(example = "129.90")]
    pub sale_price: Decimal,
    #[schema(example = "60.00")]
    pub cost_price: Decimal,
    #[schema(example = 12)]
    pub stock_quantity: i32,
    #[schema(example = 2)]
    pub min_stock: i32,
    pub brand: String,
    #[schema(example = "M")]
    pub size: String,
    pub reference: String,
    pub hidden: bool,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn is_active(&self) -> bool {
        self.hidden
    }
}

pub fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() && !val.is_zero() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

// Payload usado tanto na criação quanto na edição
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,

    pub category: ProductCategory,

    pub description: Option<String>,
    pub image_url: Option<String>,

    #[validate(custom(function = "validate_not_negative"))]
    pub sale_price: Decimal,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub cost_price: Decimal,

    #[validate(range(min = 0, message = "O estoque não pode ser negativo."))]
    #[serde(default)]
    pub stock_quantity: i32,

    #[validate(range(min = 0, message = "O estoque mínimo não pode ser negativo."))]
    #[serde(default)]
    pub min_stock: i32,

    #[serde(default)]
    pub brand: String,

    #[validate(length(min = 1, message = "O tamanho é obrigatório."))]
    pub size: String,

    #[serde(default)]
    pub reference: String,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ProductFilter {
    /// Busca por nome ou descrição (sem diferenciar maiúsculas)
    pub search: Option<String>,
    pub category: Option<ProductCategory>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn payload() -> ProductPayload {
        ProductPayload {
            name: "Body Manga Longa".into(),
            category: ProductCategory::Bodies,
            description: None,
            image_url: None,
            sale_price: dec!(39.90),
            cost_price: dec!(15.00),
            stock_quantity: 10,
            min_stock: 2,
            brand: "Marca".into(),
            size: "RN".into(),
            reference: "BD-01".into(),
        }
    }

    #[test]
    fn accepts_valid_product() {
        assert!(payload().validate().is_ok());
    }

    #[test]
    fn rejects_negative_values_and_missing_size() {
        let mut p = payload();
        p.sale_price = dec!(-1);
        p.stock_quantity = -3;
        p.size = String::new();
        let errors = p.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("sale_price"));
        assert!(fields.contains_key("stock_quantity"));
        assert!(fields.contains_key("size"));
    }

    #[test]
    fn zero_price_is_allowed() {
        let mut p = payload();
        p.sale_price = Decimal::ZERO;
        assert!(p.validate().is_ok());
    }

    #[test]
    fn category_uses_screaming_case_on_the_wire() {
        let json = serde_json::to_string(&ProductCategory::Acessorios).unwrap();
        assert_eq!(json, "\"ACESSORIOS\"");
    }
}
