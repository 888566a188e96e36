//! Sales order workflow tests
//!
//! Tests for sales orders including:
//! - Stock decrement and sale price history at creation
//! - Oversell rejection with full rollback
//! - Updates that never move stock

mod common;

use common::*;
use nimble_inventory_backend::error::AppError;
use nimble_inventory_backend::services::sales::{SalesOrderInput, SalesOrderItemInput, SalesService};
use nimble_inventory_backend::services::PriceHistoryService;
use rust_decimal::Decimal;
use shared::models::PriceType;
use uuid::Uuid;

fn sale(customer_id: Uuid, items: Vec<SalesOrderItemInput>) -> SalesOrderInput {
    SalesOrderInput {
        customer_id: Some(customer_id),
        date: None,
        items,
    }
}

#[tokio::test]
async fn test_create_sale_moves_stock_and_records_price() {
    let store = store();
    let customer = customer(&store).await;
    let laptop = product(&store, "Laptop HP ProBook", "700", 8).await;

    let order = SalesService::new(store.clone())
        .create(sale(customer.id, vec![sale_line(laptop.id, 2, "700")]))
        .await
        .unwrap();

    assert_eq!(order.customer_name, "Juan Pérez");
    assert_eq!(order.total, dec("1400"));
    assert_eq!(stock_of(&store, laptop.id).await, 6);

    let history = PriceHistoryService::new(store.clone())
        .get_by_product_id(laptop.id)
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].price, dec("700"));
    assert_eq!(history[0].price_type, PriceType::Sale);
}

#[tokio::test]
async fn test_unit_price_defaults_to_selling_price() {
    let store = store();
    let customer = customer(&store).await;
    let mouse = product(&store, "Mouse Logitech M170", "25", 5).await;

    let order = SalesService::new(store.clone())
        .create(sale(
            customer.id,
            vec![SalesOrderItemInput {
                product_id: mouse.id,
                quantity: 3,
                unit_price: None,
            }],
        ))
        .await
        .unwrap();

    assert_eq!(order.items[0].unit_price, dec("25"));
    assert_eq!(order.items[0].product_name, "Mouse Logitech M170");
    assert_eq!(order.total, dec("75"));
}

#[tokio::test]
async fn test_oversell_rejected_and_rolled_back() {
    let store = store();
    let customer = customer(&store).await;
    let laptop = product(&store, "Laptop HP ProBook", "700", 8).await;
    let mouse = product(&store, "Mouse Logitech M170", "25", 1).await;

    let service = SalesService::new(store.clone());
    let result = service
        .create(sale(
            customer.id,
            vec![sale_line(laptop.id, 2, "700"), sale_line(mouse.id, 2, "25")],
        ))
        .await;

    assert!(matches!(result, Err(AppError::InsufficientStock(_))));
    // The first line's decrement did not survive
    assert_eq!(stock_of(&store, laptop.id).await, 8);
    assert_eq!(stock_of(&store, mouse.id).await, 1);
    assert!(service.list().await.unwrap().is_empty());
    assert!(PriceHistoryService::new(store.clone()).list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_repeated_product_lines_share_stock() {
    let store = store();
    let customer = customer(&store).await;
    let mouse = product(&store, "Mouse Logitech M170", "25", 3).await;

    let service = SalesService::new(store.clone());
    let result = service
        .create(sale(
            customer.id,
            vec![sale_line(mouse.id, 2, "25"), sale_line(mouse.id, 2, "25")],
        ))
        .await;
    assert!(matches!(result, Err(AppError::InsufficientStock(_))));

    service
        .create(sale(
            customer.id,
            vec![sale_line(mouse.id, 2, "25"), sale_line(mouse.id, 1, "20")],
        ))
        .await
        .unwrap();
    assert_eq!(stock_of(&store, mouse.id).await, 0);

    let history = PriceHistoryService::new(store.clone())
        .get_by_product_id(mouse.id)
        .await
        .unwrap();
    assert_eq!(history.len(), 2);
}

#[tokio::test]
async fn test_selling_entire_stock_is_allowed() {
    let store = store();
    let customer = customer(&store).await;
    let mouse = product(&store, "Mouse Logitech M170", "25", 4).await;

    SalesService::new(store.clone())
        .create(sale(customer.id, vec![sale_line(mouse.id, 4, "25")]))
        .await
        .unwrap();

    assert_eq!(stock_of(&store, mouse.id).await, 0);
}

#[tokio::test]
async fn test_update_does_not_move_stock() {
    let store = store();
    let customer = customer(&store).await;
    let laptop = product(&store, "Laptop HP ProBook", "700", 8).await;

    let service = SalesService::new(store.clone());
    let order = service
        .create(sale(customer.id, vec![sale_line(laptop.id, 2, "700")]))
        .await
        .unwrap();

    let updated = service
        .update(order.id, sale(customer.id, vec![sale_line(laptop.id, 5, "650")]))
        .await
        .unwrap();

    assert_eq!(updated.total, dec("3250"));
    assert_eq!(updated.created_at, order.created_at);
    assert_eq!(stock_of(&store, laptop.id).await, 6);

    let history = PriceHistoryService::new(store.clone())
        .get_by_product_id(laptop.id)
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
}

#[tokio::test]
async fn test_validation_and_missing_references() {
    let store = store();
    let customer = customer(&store).await;
    let laptop = product(&store, "Laptop HP ProBook", "700", 8).await;
    let service = SalesService::new(store.clone());

    let no_customer = SalesOrderInput {
        items: vec![sale_line(laptop.id, 1, "700")],
        ..Default::default()
    };
    match service.create(no_customer).await {
        Err(AppError::Validation { field, .. }) => assert_eq!(field, "customer_id"),
        other => panic!("expected validation error, got {:?}", other),
    }

    match service.create(sale(customer.id, vec![])).await {
        Err(AppError::Validation { field, .. }) => assert_eq!(field, "items"),
        other => panic!("expected validation error, got {:?}", other),
    }

    let negative = sale(customer.id, vec![sale_line(laptop.id, -1, "700")]);
    assert!(matches!(service.create(negative).await, Err(AppError::Validation { .. })));

    let unknown_customer = sale(Uuid::new_v4(), vec![sale_line(laptop.id, 1, "700")]);
    assert!(matches!(service.create(unknown_customer).await, Err(AppError::NotFound(_))));

    let unknown_product = sale(customer.id, vec![sale_line(Uuid::new_v4(), 1, "700")]);
    assert!(matches!(service.create(unknown_product).await, Err(AppError::NotFound(_))));

    assert_eq!(stock_of(&store, laptop.id).await, 8);
}

#[tokio::test]
async fn test_oversized_amounts_rejected() {
    let store = store();
    let customer = customer(&store).await;
    let laptop = product(&store, "Laptop HP ProBook", "700", 8).await;
    let service = SalesService::new(store.clone());

    let overflowing = sale(
        customer.id,
        vec![
            sale_line(laptop.id, 1, "700"),
            SalesOrderItemInput {
                product_id: laptop.id,
                quantity: 2,
                unit_price: Some(Decimal::MAX),
            },
        ],
    );
    match service.create(overflowing).await {
        Err(AppError::Validation { field, .. }) => assert_eq!(field, "items"),
        other => panic!("expected validation error, got {:?}", other),
    }

    let line_total_too_large = sale(customer.id, vec![sale_line(laptop.id, 3, "9999999999")]);
    assert!(matches!(
        service.create(line_total_too_large).await,
        Err(AppError::Validation { .. })
    ));

    let order_total_too_large = sale(
        customer.id,
        vec![sale_line(laptop.id, 1, "9999999999"), sale_line(laptop.id, 1, "9999999999")],
    );
    match service.create(order_total_too_large).await {
        Err(AppError::Validation { field, .. }) => assert_eq!(field, "total"),
        other => panic!("expected validation error, got {:?}", other),
    }

    let too_precise = sale(customer.id, vec![sale_line(laptop.id, 1, "699.99999")]);
    assert!(matches!(service.create(too_precise).await, Err(AppError::Validation { .. })));

    // The first line of each order was rolled back with the rest
    assert_eq!(stock_of(&store, laptop.id).await, 8);
    assert!(service.list().await.unwrap().is_empty());
    assert!(PriceHistoryService::new(store.clone()).list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_update_rejects_oversized_amounts() {
    let store = store();
    let customer = customer(&store).await;
    let laptop = product(&store, "Laptop HP ProBook", "700", 8).await;
    let service = SalesService::new(store.clone());
    let order = service
        .create(sale(customer.id, vec![sale_line(laptop.id, 2, "700")]))
        .await
        .unwrap();

    let overflowing = sale(
        customer.id,
        vec![SalesOrderItemInput {
            product_id: laptop.id,
            quantity: 2,
            unit_price: Some(Decimal::MAX),
        }],
    );
    assert!(matches!(
        service.update(order.id, overflowing).await,
        Err(AppError::Validation { .. })
    ));
    assert_eq!(service.get(order.id).await.unwrap().total, dec("1400"));
}

#[tokio::test]
async fn test_delete_does_not_restock() {
    let store = store();
    let customer = customer(&store).await;
    let laptop = product(&store, "Laptop HP ProBook", "700", 8).await;

    let service = SalesService::new(store.clone());
    let order = service
        .create(sale(customer.id, vec![sale_line(laptop.id, 3, "700")]))
        .await
        .unwrap();

    service.delete(order.id).await.unwrap();

    assert_eq!(stock_of(&store, laptop.id).await, 5);
    assert!(matches!(service.get(order.id).await, Err(AppError::NotFound(_))));
}
