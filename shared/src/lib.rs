//! Shared types and models for the Nimble inventory system
//!
//! This crate contains the domain models and the pure order arithmetic
//! (totals, proration, pricing) used by both the backend and the browser
//! draft editor (via WASM).

pub mod models;
pub mod pricing;
pub mod proration;
pub mod validation;

pub use models::*;
pub use pricing::*;
pub use proration::*;
pub use validation::*;
