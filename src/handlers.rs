pub mod auth;
pub mod customers;
pub mod dashboard;
pub mod finance;
pub mod products;
pub mod reports;
pub mod sales;
pub mod settings;
