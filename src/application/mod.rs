//! Request-scoped storefront services.

pub mod category;
pub mod error;
pub mod layout;
pub mod repos;
pub mod request;
pub mod unit;
pub mod url;
