//! Entity store: transactional persistence for every domain entity
//!
//! Services never talk to a database directly. They open a
//! [`StoreTransaction`] through [`EntityStore::begin`], do all reads and
//! writes of one operation through it, and commit. A transaction that is
//! dropped without `commit` is rolled back, so any `?` between `begin` and
//! `commit` leaves the store untouched.

use async_trait::async_trait;
use shared::models::{
    Category, Customer, PriceHistory, Product, PurchaseOrder, SalesOrder, Supplier, Warehouse,
};
use uuid::Uuid;

use crate::error::AppResult;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Factory for transactions against one backend
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Start a new all-or-nothing unit of work
    async fn begin(&self) -> AppResult<Box<dyn StoreTransaction>>;

    /// Check the backend is reachable
    async fn health(&self) -> AppResult<()>;
}

/// One open unit of work.
///
/// `update_*` and `delete_*` return `false` when no row has the given id.
/// Orders are read and written together with their items; updating an
/// order replaces its whole item list. Price history is append-only.
#[async_trait]
pub trait StoreTransaction: Send {
    // Products
    async fn list_products(&mut self) -> AppResult<Vec<Product>>;
    async fn get_product(&mut self, id: Uuid) -> AppResult<Option<Product>>;
    async fn insert_product(&mut self, product: &Product) -> AppResult<()>;
    async fn update_product(&mut self, product: &Product) -> AppResult<bool>;
    async fn delete_product(&mut self, id: Uuid) -> AppResult<bool>;

    // Categories
    async fn list_categories(&mut self) -> AppResult<Vec<Category>>;
    async fn get_category(&mut self, id: Uuid) -> AppResult<Option<Category>>;
    async fn insert_category(&mut self, category: &Category) -> AppResult<()>;
    async fn update_category(&mut self, category: &Category) -> AppResult<bool>;
    async fn delete_category(&mut self, id: Uuid) -> AppResult<bool>;

    // Warehouses
    async fn list_warehouses(&mut self) -> AppResult<Vec<Warehouse>>;
    async fn get_warehouse(&mut self, id: Uuid) -> AppResult<Option<Warehouse>>;
    async fn insert_warehouse(&mut self, warehouse: &Warehouse) -> AppResult<()>;
    async fn update_warehouse(&mut self, warehouse: &Warehouse) -> AppResult<bool>;
    async fn delete_warehouse(&mut self, id: Uuid) -> AppResult<bool>;

    // Customers
    async fn list_customers(&mut self) -> AppResult<Vec<Customer>>;
    async fn get_customer(&mut self, id: Uuid) -> AppResult<Option<Customer>>;
    async fn insert_customer(&mut self, customer: &Customer) -> AppResult<()>;
    async fn update_customer(&mut self, customer: &Customer) -> AppResult<bool>;
    async fn delete_customer(&mut self, id: Uuid) -> AppResult<bool>;

    // Suppliers
    async fn list_suppliers(&mut self) -> AppResult<Vec<Supplier>>;
    async fn get_supplier(&mut self, id: Uuid) -> AppResult<Option<Supplier>>;
    async fn insert_supplier(&mut self, supplier: &Supplier) -> AppResult<()>;
    async fn update_supplier(&mut self, supplier: &Supplier) -> AppResult<bool>;
    async fn delete_supplier(&mut self, id: Uuid) -> AppResult<bool>;

    // Purchase orders
    async fn list_purchase_orders(&mut self) -> AppResult<Vec<PurchaseOrder>>;
    /// Locks the order until the transaction ends, so status checks and
    /// delivery effects see a settled status
    async fn get_purchase_order(&mut self, id: Uuid) -> AppResult<Option<PurchaseOrder>>;
    async fn insert_purchase_order(&mut self, order: &PurchaseOrder) -> AppResult<()>;
    async fn update_purchase_order(&mut self, order: &PurchaseOrder) -> AppResult<bool>;
    async fn delete_purchase_order(&mut self, id: Uuid) -> AppResult<bool>;

    // Sales orders
    async fn list_sales_orders(&mut self) -> AppResult<Vec<SalesOrder>>;
    async fn get_sales_order(&mut self, id: Uuid) -> AppResult<Option<SalesOrder>>;
    async fn insert_sales_order(&mut self, order: &SalesOrder) -> AppResult<()>;
    async fn update_sales_order(&mut self, order: &SalesOrder) -> AppResult<bool>;
    async fn delete_sales_order(&mut self, id: Uuid) -> AppResult<bool>;

    // Price history
    async fn insert_price_history(&mut self, entry: &PriceHistory) -> AppResult<()>;
    /// All entries, newest first
    async fn list_price_history(&mut self) -> AppResult<Vec<PriceHistory>>;
    /// Entries for one product, newest first
    async fn price_history_for_product(&mut self, product_id: Uuid) -> AppResult<Vec<PriceHistory>>;

    async fn commit(self: Box<Self>) -> AppResult<()>;
    async fn rollback(self: Box<Self>) -> AppResult<()>;
}
