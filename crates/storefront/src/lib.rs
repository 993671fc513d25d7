//! Corner Shop storefront library.
//!
//! The cart synchronizer and everything it depends on live here so they can
//! be tested without a running server.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod session;
pub mod state;
pub mod store;
