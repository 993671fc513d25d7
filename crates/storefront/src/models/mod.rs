//! Domain models for the storefront.
//!
//! These are validated domain objects, separate from the database row types
//! in [`crate::db`].

pub mod cart;
pub mod order;
pub mod product;

pub use cart::{CartLine, CartSnapshot};
pub use order::{CustomerDetails, NewOrder, NewOrderLine};
pub use product::{Category, Product};
