pub mod user_repo;
pub use user_repo::UserRepository;
pub mod product_repo;
pub use product_repo::ProductRepository;
pub mod customer_repo;
pub use customer_repo::CustomerRepository;
pub mod sale_repo;
pub use sale_repo::SaleRepository;
pub mod finance_repo;
pub mod dashboard_repo;
pub use dashboard_repo::DashboardRepository;
pub mod settings_repo;
pub use settings_repo::SettingsRepository;

pub use finance_repo::FinanceRepository;

/// Padrão `ILIKE` de "contém" para o texto digitado pelo usuário.
/// `%`, `_` e `\` são escapados e casam literalmente (use com `ESCAPE '\'`).
pub(crate) fn contains_pattern(search: Option<&str>) -> Option<String> {
    let term = search.map(str::trim).filter(|s| !s.is_empty())?;
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    Some(pattern)
}

#[cfg(test)]
mod tests {
    use super::contains_pattern;

    #[test]
    fn blank_search_means_no_filter() {
        assert_eq!(contains_pattern(None), None);
        assert_eq!(contains_pattern(Some("   ")), None);
    }

    #[test]
    fn wildcards_typed_by_the_user_match_literally() {
        assert_eq!(contains_pattern(Some(" vestido ")).as_deref(), Some("%vestido%"));
        assert_eq!(contains_pattern(Some("50%")).as_deref(), Some(r"%50\%%"));
        assert_eq!(contains_pattern(Some("tam_P")).as_deref(), Some(r"%tam\_P%"));
        assert_eq!(contains_pattern(Some(r"a\b")).as_deref(), Some(r"%a\\b%"));
    }
}
