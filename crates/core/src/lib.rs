//! Corner Shop Core - Shared domain types.
//!
//! This crate provides the types shared by every Corner Shop component:
//! - `storefront` - Public storefront and cart synchronization
//! - `cli` - Migrations and catalog seeding
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP
//! clients. Database encoding is available behind the `postgres` feature.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, session identifiers, quantities, prices and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
