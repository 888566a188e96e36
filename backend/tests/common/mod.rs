//! Fixtures shared by the backend integration tests

#![allow(dead_code)]

use std::str::FromStr;
use std::sync::Arc;

use nimble_inventory_backend::services::customer::CreateCustomerInput;
use nimble_inventory_backend::services::product::CreateProductInput;
use nimble_inventory_backend::services::purchase::{
    PurchaseOrderInput, PurchaseOrderItemInput, PurchaseService,
};
use nimble_inventory_backend::services::sales::SalesOrderItemInput;
use nimble_inventory_backend::services::supplier::CreateSupplierInput;
use nimble_inventory_backend::services::{
    CustomerService, PriceHistoryService, ProductService, SupplierService,
};
use nimble_inventory_backend::store::{EntityStore, MemoryStore};
use rust_decimal::Decimal;
use shared::models::{Customer, Product, PurchaseStatus, Supplier};
use uuid::Uuid;

// Helper to create Decimal from string
pub fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

pub fn store() -> Arc<dyn EntityStore> {
    Arc::new(MemoryStore::new())
}

pub async fn supplier(store: &Arc<dyn EntityStore>) -> Supplier {
    SupplierService::new(store.clone())
        .create(CreateSupplierInput {
            name: "Distribuidora Norte".to_string(),
            address: "Av. Corrientes 1234".to_string(),
            phone: "+54 11 4555-1234".to_string(),
            email: Some("ventas@norte.com.ar".to_string()),
            website: None,
        })
        .await
        .unwrap()
}

pub async fn customer(store: &Arc<dyn EntityStore>) -> Customer {
    CustomerService::new(store.clone())
        .create(CreateCustomerInput {
            name: "Juan Pérez".to_string(),
            address: "San Martín 55".to_string(),
            phone: String::new(),
            email: None,
        })
        .await
        .unwrap()
}

/// Product with no purchase price, so creation records no history
pub async fn product(store: &Arc<dyn EntityStore>, name: &str, selling_price: &str, stock: i32) -> Product {
    ProductService::new(store.clone())
        .create(CreateProductInput {
            name: name.to_string(),
            description: String::new(),
            warehouse_id: None,
            category_id: None,
            last_purchase_price: Decimal::ZERO,
            selling_price: dec(selling_price),
            stock,
        })
        .await
        .unwrap()
}

pub fn existing_line(product_id: Uuid, quantity: i32, unit_price: &str) -> PurchaseOrderItemInput {
    PurchaseOrderItemInput {
        product_id: Some(product_id),
        quantity,
        unit_price: dec(unit_price),
        ..Default::default()
    }
}

pub fn new_product_line(name: &str, quantity: i32, unit_price: &str) -> PurchaseOrderItemInput {
    PurchaseOrderItemInput {
        product_name: name.to_string(),
        quantity,
        unit_price: dec(unit_price),
        is_new_product: true,
        ..Default::default()
    }
}

pub fn sale_line(product_id: Uuid, quantity: i32, unit_price: &str) -> SalesOrderItemInput {
    SalesOrderItemInput {
        product_id,
        quantity,
        unit_price: Some(dec(unit_price)),
    }
}

/// Stock of a product as currently stored
pub async fn stock_of(store: &Arc<dyn EntityStore>, id: Uuid) -> i32 {
    ProductService::new(store.clone()).get(id).await.unwrap().stock
}

/// Deliver one ORDERED purchase order from several tasks at once and check
/// the stock and price history moved exactly once
pub async fn deliver_concurrently(store: Arc<dyn EntityStore>, attempts: usize) {
    let supplier = supplier(&store).await;
    let mouse = product(&store, "Mouse Logitech M170", "25", 0).await;
    let service = PurchaseService::new(store.clone());

    let delivery = |status: PurchaseStatus| PurchaseOrderInput {
        supplier_id: Some(supplier.id),
        status,
        items: vec![existing_line(mouse.id, 5, "15")],
        ..Default::default()
    };
    let order_id = service.create(delivery(PurchaseStatus::Ordered)).await.unwrap().id;

    let handles: Vec<_> = (0..attempts)
        .map(|_| {
            let service = service.clone();
            let input = delivery(PurchaseStatus::Delivered);
            tokio::spawn(async move { service.update(order_id, input).await })
        })
        .collect();
    for handle in handles {
        let order = handle.await.unwrap().unwrap();
        assert_eq!(order.status, PurchaseStatus::Delivered);
    }

    assert_eq!(stock_of(&store, mouse.id).await, 5);
    let history = PriceHistoryService::new(store.clone())
        .get_by_product_id(mouse.id)
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
}
