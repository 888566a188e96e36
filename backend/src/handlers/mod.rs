//! HTTP handlers. Each one builds its service from the shared state and
//! delegates; no business rules live here.

pub mod catalog;
pub mod dashboard;
pub mod health;
pub mod price_history;
pub mod product;
pub mod purchase;
pub mod sales;

pub use catalog::*;
pub use dashboard::*;
pub use health::*;
pub use price_history::*;
pub use product::*;
pub use purchase::*;
pub use sales::*;
