// src/common/i18n.rs

use std::collections::HashMap;
use std::sync::Arc;

pub const DEFAULT_LANG: &str = "pt";

// (chave, português, inglês)
pub(crate) const MESSAGES: &[(&str, &str, &str)] = &[
    ("validation_failed", "Um ou mais campos são inválidos.", "One or more fields are invalid."),
    ("email_already_exists", "Este e-mail já está em uso.", "This e-mail is already in use."),
    ("invalid_credentials", "E-mail ou senha inválidos.", "Invalid e-mail or password."),
    ("invalid_token", "Token de autenticação inválido ou ausente.", "Missing or invalid authentication token."),
    ("forbidden", "Você precisa do perfil '{role}' para realizar esta ação.", "You need the '{role}' role to perform this action."),
    ("product_not_found", "Produto não encontrado.", "Product not found."),
    ("product_inactive", "O produto '{name}' não está disponível para venda.", "Product '{name}' is not available for sale."),
    ("customer_not_found", "Cliente não encontrado.", "Customer not found."),
    ("sale_not_found", "Venda não encontrada.", "Sale not found."),
    ("expense_not_found", "Despesa não encontrada.", "Expense not found."),
    ("bill_not_found", "Conta não encontrada.", "Bill not found."),
    ("empty_cart", "Adicione produtos ao carrinho.", "Add products to the cart."),
    (
        "invalid_quantity",
        "A quantidade deve ser maior que zero (recebido: {quantity}).",
        "Quantity must be greater than zero (got: {quantity}).",
    ),
    (
        "insufficient_stock",
        "Estoque insuficiente para '{name}' (disponível: {available}, solicitado: {requested}).",
        "Insufficient stock for '{name}' (available: {available}, requested: {requested}).",
    ),
    ("bill_already_paid", "Esta conta já foi paga.", "This bill has already been paid."),
    ("invalid_date_range", "A data inicial deve ser anterior ou igual à data final.", "The start date must not be after the end date."),
    ("document_error", "Falha ao gerar o documento.", "Failed to generate the document."),
    ("internal_error", "Ocorreu um erro inesperado.", "An unexpected error occurred."),
];

/// Catálogo de mensagens de erro por idioma.
#[derive(Clone)]
pub struct I18nStore {
    messages: Arc<HashMap<&'static str, HashMap<&'static str, &'static str>>>,
}

impl I18nStore {
    pub fn new() -> Self {
        let mut messages: HashMap<&'static str, HashMap<&'static str, &'static str>> = HashMap::new();
        for &(key, pt, en) in MESSAGES {
            messages.entry("pt").or_default().insert(key, pt);
            messages.entry("en").or_default().insert(key, en);
        }
        Self { messages: Arc::new(messages) }
    }

    /// Busca a mensagem no idioma pedido, caindo para o português.
    /// Chaves desconhecidas são devolvidas como estão.
    pub fn translate(&self, lang: &str, key: &str, params: &[(&str, String)]) -> String {
        let template = self
            .messages
            .get(lang)
            .and_then(|table| table.get(key))
            .or_else(|| self.messages.get(DEFAULT_LANG).and_then(|table| table.get(key)))
            .copied()
            .unwrap_or(key);

        params.iter().fold(template.to_string(), |text, (name, value)| {
            text.replace(&format!("{{{}}}", name), value)
        })
    }
}

impl Default for I18nStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translates_to_requested_language() {
        let store = I18nStore::new();
        assert_eq!(store.translate("en", "sale_not_found", &[]), "Sale not found.");
        assert_eq!(store.translate("pt", "sale_not_found", &[]), "Venda não encontrada.");
    }

    #[test]
    fn unknown_language_falls_back_to_portuguese() {
        let store = I18nStore::new();
        assert_eq!(store.translate("de", "empty_cart", &[]), "Adicione produtos ao carrinho.");
    }

    #[test]
    fn interpolates_parameters() {
        let store = I18nStore::new();
        let text = store.translate(
            "pt",
            "insufficient_stock",
            &[
                ("name", "Vestido Floral".to_string()),
                ("available", "2".to_string()),
                ("requested", "5".to_string()),
            ],
        );
        assert_eq!(text, "Estoque insuficiente para 'Vestido Floral' (disponível: 2, solicitado: 5).");
    }

    #[test]
    fn unknown_key_is_returned_verbatim() {
        let store = I18nStore::new();
        assert_eq!(store.translate("en", "no_such_key", &[]), "no_such_key");
    }
}
