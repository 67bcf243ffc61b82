//! TCGDESK — Pokémon trading-card inventory and pricing desk
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod catalog;
pub mod pricing;
pub mod lookup;
pub mod inventory;
pub mod dashboard;
