pub mod accounts;
pub mod cart;
pub mod catalog;
pub mod cli;
pub mod logging;
pub mod money;
pub mod password;
pub mod query;
pub mod shop_config;

pub use catalog::{Catalog, CatalogItem};
pub use money::Money;
pub use query::{search, Query};
