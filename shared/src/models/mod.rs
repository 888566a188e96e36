//! Domain models for the Nimble inventory system

mod catalog;
mod dashboard;
mod product;
mod purchase;
mod sales;

pub use catalog::*;
pub use dashboard::*;
pub use product::*;
pub use purchase::*;
pub use sales::*;
