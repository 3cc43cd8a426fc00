//! Domain models for Stockgate.
//!
//! These are the core types shared across all crates.

pub mod audit;
pub mod product;
pub mod role;
pub mod user;
