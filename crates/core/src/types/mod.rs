//! Core types for Corner Shop.
//!
//! This module provides type-safe wrappers for the storefront's domain concepts.

pub mod id;
pub mod price;
pub mod quantity;
pub mod session;
pub mod status;

pub use id::*;
pub use price::{CurrencyCode, Price, PriceError};
pub use quantity::Quantity;
pub use session::SessionId;
pub use status::*;
