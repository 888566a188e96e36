//! Process-local entity store
//!
//! All tables live behind one async mutex. A transaction takes the lock for
//! its whole lifetime and works on a copy of the tables; commit swaps the
//! copy in, dropping the transaction throws it away. Transactions are
//! therefore fully serialized.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use shared::models::{
    Category, Customer, PriceHistory, Product, PurchaseOrder, SalesOrder, Supplier, Warehouse,
};
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use super::{EntityStore, StoreTransaction};
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Default)]
struct Tables {
    products: HashMap<Uuid, Product>,
    categories: HashMap<Uuid, Category>,
    warehouses: HashMap<Uuid, Warehouse>,
    customers: HashMap<Uuid, Customer>,
    suppliers: HashMap<Uuid, Supplier>,
    purchase_orders: HashMap<Uuid, PurchaseOrder>,
    sales_orders: HashMap<Uuid, SalesOrder>,
    /// Insertion order
    price_history: Vec<PriceHistory>,
}

/// In-memory store used by tests and the `memory` backend setting
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn begin(&self) -> AppResult<Box<dyn StoreTransaction>> {
        let guard = self.tables.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryTransaction { guard, working }))
    }

    async fn health(&self) -> AppResult<()> {
        Ok(())
    }
}

/// Open transaction on a [`MemoryStore`]
pub struct MemoryTransaction {
    guard: OwnedMutexGuard<Tables>,
    working: Tables,
}

fn by_name<T: Clone>(table: &HashMap<Uuid, T>, name: impl Fn(&T) -> &str) -> Vec<T> {
    let mut rows: Vec<T> = table.values().cloned().collect();
    rows.sort_by(|a, b| name(a).cmp(name(b)));
    rows
}

fn insert_new<T: Clone>(table: &mut HashMap<Uuid, T>, id: Uuid, row: &T, kind: &str) -> AppResult<()> {
    if table.contains_key(&id) {
        return Err(AppError::Transaction(format!("duplicate {} id {}", kind, id)));
    }
    table.insert(id, row.clone());
    Ok(())
}

fn replace<T: Clone>(table: &mut HashMap<Uuid, T>, id: Uuid, row: &T) -> bool {
    match table.get_mut(&id) {
        Some(slot) => {
            *slot = row.clone();
            true
        }
        None => false,
    }
}

fn newest_first(entries: impl DoubleEndedIterator<Item = PriceHistory>) -> Vec<PriceHistory> {
    // Reverse insertion order first so equal dates keep latest-written first
    let mut rows: Vec<PriceHistory> = entries.rev().collect();
    rows.sort_by(|a, b| b.date.cmp(&a.date));
    rows
}

#[async_trait]
impl StoreTransaction for MemoryTransaction {
    async fn list_products(&mut self) -> AppResult<Vec<Product>> {
        Ok(by_name(&self.working.products, |p| p.name.as_str()))
    }

    async fn get_product(&mut self, id: Uuid) -> AppResult<Option<Product>> {
        Ok(self.working.products.get(&id).cloned())
    }

    async fn insert_product(&mut self, product: &Product) -> AppResult<()> {
        insert_new(&mut self.working.products, product.id, product, "product")
    }

    async fn update_product(&mut self, product: &Product) -> AppResult<bool> {
        Ok(replace(&mut self.working.products, product.id, product))
    }

    async fn delete_product(&mut self, id: Uuid) -> AppResult<bool> {
        Ok(self.working.products.remove(&id).is_some())
    }

    async fn list_categories(&mut self) -> AppResult<Vec<Category>> {
        Ok(by_name(&self.working.categories, |c| c.name.as_str()))
    }

    async fn get_category(&mut self, id: Uuid) -> AppResult<Option<Category>> {
        Ok(self.working.categories.get(&id).cloned())
    }

    async fn insert_category(&mut self, category: &Category) -> AppResult<()> {
        insert_new(&mut self.working.categories, category.id, category, "category")
    }

    async fn update_category(&mut self, category: &Category) -> AppResult<bool> {
        Ok(replace(&mut self.working.categories, category.id, category))
    }

    async fn delete_category(&mut self, id: Uuid) -> AppResult<bool> {
        Ok(self.working.categories.remove(&id).is_some())
    }

    async fn list_warehouses(&mut self) -> AppResult<Vec<Warehouse>> {
        Ok(by_name(&self.working.warehouses, |w| w.name.as_str()))
    }

    async fn get_warehouse(&mut self, id: Uuid) -> AppResult<Option<Warehouse>> {
        Ok(self.working.warehouses.get(&id).cloned())
    }

    async fn insert_warehouse(&mut self, warehouse: &Warehouse) -> AppResult<()> {
        insert_new(&mut self.working.warehouses, warehouse.id, warehouse, "warehouse")
    }

    async fn update_warehouse(&mut self, warehouse: &Warehouse) -> AppResult<bool> {
        Ok(replace(&mut self.working.warehouses, warehouse.id, warehouse))
    }

    async fn delete_warehouse(&mut self, id: Uuid) -> AppResult<bool> {
        Ok(self.working.warehouses.remove(&id).is_some())
    }

    async fn list_customers(&mut self) -> AppResult<Vec<Customer>> {
        Ok(by_name(&self.working.customers, |c| c.name.as_str()))
    }

    async fn get_customer(&mut self, id: Uuid) -> AppResult<Option<Customer>> {
        Ok(self.working.customers.get(&id).cloned())
    }

    async fn insert_customer(&mut self, customer: &Customer) -> AppResult<()> {
        insert_new(&mut self.working.customers, customer.id, customer, "customer")
    }

    async fn update_customer(&mut self, customer: &Customer) -> AppResult<bool> {
        Ok(replace(&mut self.working.customers, customer.id, customer))
    }

    async fn delete_customer(&mut self, id: Uuid) -> AppResult<bool> {
        Ok(self.working.customers.remove(&id).is_some())
    }

    async fn list_suppliers(&mut self) -> AppResult<Vec<Supplier>> {
        Ok(by_name(&self.working.suppliers, |s| s.name.as_str()))
    }

    async fn get_supplier(&mut self, id: Uuid) -> AppResult<Option<Supplier>> {
        Ok(self.working.suppliers.get(&id).cloned())
    }

    async fn insert_supplier(&mut self, supplier: &Supplier) -> AppResult<()> {
        insert_new(&mut self.working.suppliers, supplier.id, supplier, "supplier")
    }

    async fn update_supplier(&mut self, supplier: &Supplier) -> AppResult<bool> {
        Ok(replace(&mut self.working.suppliers, supplier.id, supplier))
    }

    async fn delete_supplier(&mut self, id: Uuid) -> AppResult<bool> {
        Ok(self.working.suppliers.remove(&id).is_some())
    }

    async fn list_purchase_orders(&mut self) -> AppResult<Vec<PurchaseOrder>> {
        let mut orders: Vec<PurchaseOrder> = self.working.purchase_orders.values().cloned().collect();
        orders.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));
        Ok(orders)
    }

    async fn get_purchase_order(&mut self, id: Uuid) -> AppResult<Option<PurchaseOrder>> {
        Ok(self.working.purchase_orders.get(&id).cloned())
    }

    async fn insert_purchase_order(&mut self, order: &PurchaseOrder) -> AppResult<()> {
        insert_new(&mut self.working.purchase_orders, order.id, order, "purchase order")
    }

    async fn update_purchase_order(&mut self, order: &PurchaseOrder) -> AppResult<bool> {
        Ok(replace(&mut self.working.purchase_orders, order.id, order))
    }

    async fn delete_purchase_order(&mut self, id: Uuid) -> AppResult<bool> {
        Ok(self.working.purchase_orders.remove(&id).is_some())
    }

    async fn list_sales_orders(&mut self) -> AppResult<Vec<SalesOrder>> {
        let mut orders: Vec<SalesOrder> = self.working.sales_orders.values().cloned().collect();
        orders.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));
        Ok(orders)
    }

    async fn get_sales_order(&mut self, id: Uuid) -> AppResult<Option<SalesOrder>> {
        Ok(self.working.sales_orders.get(&id).cloned())
    }

    async fn insert_sales_order(&mut self, order: &SalesOrder) -> AppResult<()> {
        insert_new(&mut self.working.sales_orders, order.id, order, "sales order")
    }

    async fn update_sales_order(&mut self, order: &SalesOrder) -> AppResult<bool> {
        Ok(replace(&mut self.working.sales_orders, order.id, order))
    }

    async fn delete_sales_order(&mut self, id: Uuid) -> AppResult<bool> {
        Ok(self.working.sales_orders.remove(&id).is_some())
    }

    async fn insert_price_history(&mut self, entry: &PriceHistory) -> AppResult<()> {
        if self.working.price_history.iter().any(|e| e.id == entry.id) {
            return Err(AppError::Transaction(format!("duplicate price history id {}", entry.id)));
        }
        self.working.price_history.push(entry.clone());
        Ok(())
    }

    async fn list_price_history(&mut self) -> AppResult<Vec<PriceHistory>> {
        Ok(newest_first(self.working.price_history.iter().cloned()))
    }

    async fn price_history_for_product(&mut self, product_id: Uuid) -> AppResult<Vec<PriceHistory>> {
        Ok(newest_first(
            self.working
                .price_history
                .iter()
                .filter(|e| e.product_id == product_id)
                .cloned(),
        ))
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let MemoryTransaction { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        Ok(())
    }
}
