pub mod config;
pub mod domain;
pub mod errors;

pub use domain::product::{NewProduct, Product, ProductFields, ProductId};
pub use errors::DomainError;
