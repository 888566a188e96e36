//! Business logic services for the Nimble inventory system
//!
//! Every service holds the injected entity store and runs each operation in
//! one store transaction.

pub mod category;
pub mod customer;
pub mod dashboard;
pub mod price_history;
pub mod product;
pub mod purchase;
pub mod sales;
pub mod supplier;
pub mod warehouse;

pub use category::CategoryService;
pub use customer::CustomerService;
pub use dashboard::DashboardService;
pub use price_history::PriceHistoryService;
pub use product::ProductService;
pub use purchase::PurchaseService;
pub use sales::SalesService;
pub use supplier::SupplierService;
pub use warehouse::WarehouseService;

use crate::error::{AppError, AppResult};

/// Attach a field name to one of the shared field checks
pub(crate) fn check_field(field: &str, result: Result<(), &'static str>) -> AppResult<()> {
    result.map_err(|message| {
        AppError::validation(field, message, &format!("Valor inválido para {}", field))
    })
}
