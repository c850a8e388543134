pub mod auth;
pub mod customer;
pub mod dashboard;
pub mod finance;
pub mod product;
pub mod report;
pub mod sale;
pub mod settings;
