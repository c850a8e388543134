pub mod auth;
pub mod customer_service;
pub mod dashboard_service;
pub mod document_service;
pub mod export_service;
pub mod finance_service;
pub mod product_service;
pub mod report_service;
pub mod sale_service;
