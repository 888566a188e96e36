//! Purchase order workflow tests
//!
//! Tests for purchase orders including:
//! - Delivery effects on stock, prices and price history
//! - Status transitions and duplicate deliveries
//! - All-or-nothing rollback when a line fails
//! - Draft proration

mod common;

use common::*;
use nimble_inventory_backend::error::AppError;
use nimble_inventory_backend::services::purchase::{
    PurchaseOrderInput, PurchaseOrderItemInput, PurchaseService,
};
use nimble_inventory_backend::services::{PriceHistoryService, ProductService};
use rust_decimal::Decimal;
use shared::models::{PriceType, PurchaseStatus};
use shared::{ProrationError, ProrationOutcome};
use uuid::Uuid;

fn order(supplier_id: Uuid, status: PurchaseStatus, items: Vec<PurchaseOrderItemInput>) -> PurchaseOrderInput {
    PurchaseOrderInput {
        supplier_id: Some(supplier_id),
        status,
        items,
        ..Default::default()
    }
}

// ============================================================================
// Delivery Effects
// ============================================================================

#[tokio::test]
async fn test_create_delivered_order_applies_effects() {
    let store = store();
    let supplier = supplier(&store).await;
    let laptop = product(&store, "Laptop HP ProBook", "700", 3).await;

    let service = PurchaseService::new(store.clone());
    let created = service
        .create(order(
            supplier.id,
            PurchaseStatus::Delivered,
            vec![existing_line(laptop.id, 5, "500")],
        ))
        .await
        .unwrap();

    assert_eq!(created.supplier_name, "Distribuidora Norte");
    assert_eq!(created.items[0].product_name, "Laptop HP ProBook");

    let stored = ProductService::new(store.clone()).get(laptop.id).await.unwrap();
    assert_eq!(stored.stock, 8);
    assert_eq!(stored.last_purchase_price, dec("500"));
    // No suggested price on the line, selling price untouched
    assert_eq!(stored.selling_price, dec("700"));

    let history = PriceHistoryService::new(store.clone())
        .get_by_product_id(laptop.id)
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].price, dec("500"));
    assert_eq!(history[0].price_type, PriceType::Purchase);
}

#[tokio::test]
async fn test_ordered_order_has_no_effects_until_delivered() {
    let store = store();
    let supplier = supplier(&store).await;
    let mouse = product(&store, "Mouse Logitech M170", "25", 10).await;

    let service = PurchaseService::new(store.clone());
    let created = service
        .create(order(supplier.id, PurchaseStatus::Ordered, vec![existing_line(mouse.id, 4, "15")]))
        .await
        .unwrap();

    assert_eq!(created.status, PurchaseStatus::Ordered);
    assert_eq!(stock_of(&store, mouse.id).await, 10);

    let delivered = service
        .update(
            created.id,
            order(supplier.id, PurchaseStatus::Delivered, vec![existing_line(mouse.id, 4, "15")]),
        )
        .await
        .unwrap();

    assert_eq!(delivered.status, PurchaseStatus::Delivered);
    assert_eq!(delivered.created_at, created.created_at);
    assert_eq!(stock_of(&store, mouse.id).await, 14);
}

#[tokio::test]
async fn test_redelivery_does_not_double_apply() {
    let store = store();
    let supplier = supplier(&store).await;
    let mouse = product(&store, "Mouse Logitech M170", "25", 0).await;

    let service = PurchaseService::new(store.clone());
    let delivered = service
        .create(order(supplier.id, PurchaseStatus::Delivered, vec![existing_line(mouse.id, 6, "15")]))
        .await
        .unwrap();
    assert_eq!(stock_of(&store, mouse.id).await, 6);

    service
        .update(
            delivered.id,
            order(supplier.id, PurchaseStatus::Delivered, vec![existing_line(mouse.id, 6, "15")]),
        )
        .await
        .unwrap();

    assert_eq!(stock_of(&store, mouse.id).await, 6);
    let history = PriceHistoryService::new(store.clone())
        .get_by_product_id(mouse.id)
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_deliveries_apply_once() {
    deliver_concurrently(store(), 4).await;
}

#[tokio::test]
async fn test_delivered_back_to_ordered_is_rejected() {
    let store = store();
    let supplier = supplier(&store).await;
    let mouse = product(&store, "Mouse Logitech M170", "25", 0).await;

    let service = PurchaseService::new(store.clone());
    let delivered = service
        .create(order(supplier.id, PurchaseStatus::Delivered, vec![existing_line(mouse.id, 2, "15")]))
        .await
        .unwrap();

    let result = service
        .update(
            delivered.id,
            order(supplier.id, PurchaseStatus::Ordered, vec![existing_line(mouse.id, 2, "15")]),
        )
        .await;

    assert!(matches!(result, Err(AppError::InvalidStateTransition(_))));
    let stored = service.get(delivered.id).await.unwrap();
    assert_eq!(stored.status, PurchaseStatus::Delivered);
    assert_eq!(stock_of(&store, mouse.id).await, 2);
}

#[tokio::test]
async fn test_new_product_line_creates_product() {
    let store = store();
    let supplier = supplier(&store).await;

    let service = PurchaseService::new(store.clone());
    let created = service
        .create(order(
            supplier.id,
            PurchaseStatus::Delivered,
            vec![new_product_line("Monitor Samsung 24", 3, "120.50")],
        ))
        .await
        .unwrap();

    let product_id = created.items[0].product_id.expect("delivery sets the product reference");
    let product = ProductService::new(store.clone()).get(product_id).await.unwrap();

    assert_eq!(product.name, "Monitor Samsung 24");
    assert_eq!(product.stock, 3);
    assert_eq!(product.last_purchase_price, dec("120.50"));
    // round(120.50 * 1.4) = round(168.7)
    assert_eq!(product.selling_price, dec("169"));
    assert!(product.warehouse_id.is_none());

    let history = PriceHistoryService::new(store.clone())
        .get_by_product_id(product_id)
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].price_type, PriceType::Purchase);

    // The stored order carries the created product too
    let stored = service.get(created.id).await.unwrap();
    assert_eq!(stored.items[0].product_id, Some(product_id));
}

#[tokio::test]
async fn test_new_product_line_stays_unlinked_while_ordered() {
    let store = store();
    let supplier = supplier(&store).await;

    let service = PurchaseService::new(store.clone());
    let mut line = new_product_line("Parlante JBL Go", 2, "40");
    line.product_id = Some(Uuid::new_v4());

    let created = service
        .create(order(supplier.id, PurchaseStatus::Ordered, vec![line]))
        .await
        .unwrap();

    assert_eq!(created.items[0].product_id, None);
    assert!(ProductService::new(store.clone()).list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_suggested_price_overwrites_selling_price() {
    let store = store();
    let supplier = supplier(&store).await;
    let laptop = product(&store, "Laptop HP ProBook", "650", 1).await;

    let mut line = existing_line(laptop.id, 5, "500");
    line.suggested_selling_price = Some(dec("713"));

    PurchaseService::new(store.clone())
        .create(order(supplier.id, PurchaseStatus::Delivered, vec![line]))
        .await
        .unwrap();

    let stored = ProductService::new(store.clone()).get(laptop.id).await.unwrap();
    assert_eq!(stored.selling_price, dec("713"));
}

#[tokio::test]
async fn test_missing_product_rolls_back_whole_delivery() {
    let store = store();
    let supplier = supplier(&store).await;
    let laptop = product(&store, "Laptop HP ProBook", "700", 2).await;
    let cable = product(&store, "Cable HDMI", "10", 0).await;

    let service = PurchaseService::new(store.clone());
    let created = service
        .create(order(
            supplier.id,
            PurchaseStatus::Ordered,
            vec![existing_line(laptop.id, 5, "500"), existing_line(cable.id, 10, "5")],
        ))
        .await
        .unwrap();

    ProductService::new(store.clone()).delete(cable.id).await.unwrap();

    let lines = vec![existing_line(laptop.id, 5, "500"), existing_line(cable.id, 10, "5")];
    let result = service
        .update(created.id, order(supplier.id, PurchaseStatus::Delivered, lines))
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert_eq!(stock_of(&store, laptop.id).await, 2);
    assert_eq!(service.get(created.id).await.unwrap().status, PurchaseStatus::Ordered);
    assert!(PriceHistoryService::new(store.clone()).list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_failing_line_undoes_earlier_lines() {
    let store = store();
    let supplier = supplier(&store).await;
    let laptop = product(&store, "Laptop HP ProBook", "700", 2).await;
    let full = product(&store, "Tornillos x100", "1", i32::MAX).await;

    // Second line overflows the stock counter after the first was applied
    let result = PurchaseService::new(store.clone())
        .create(order(
            supplier.id,
            PurchaseStatus::Delivered,
            vec![existing_line(laptop.id, 5, "500"), existing_line(full.id, 1, "1")],
        ))
        .await;

    assert!(matches!(result, Err(AppError::ValidationError(_))));
    assert_eq!(stock_of(&store, laptop.id).await, 2);
    assert!(PriceHistoryService::new(store.clone()).list_all().await.unwrap().is_empty());
    assert!(PurchaseService::new(store.clone()).list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_keeps_inventory_effects() {
    let store = store();
    let supplier = supplier(&store).await;
    let mouse = product(&store, "Mouse Logitech M170", "25", 0).await;

    let service = PurchaseService::new(store.clone());
    let delivered = service
        .create(order(supplier.id, PurchaseStatus::Delivered, vec![existing_line(mouse.id, 3, "15")]))
        .await
        .unwrap();

    service.delete(delivered.id).await.unwrap();

    assert_eq!(stock_of(&store, mouse.id).await, 3);
    assert!(matches!(service.get(delivered.id).await, Err(AppError::NotFound(_))));
    assert!(matches!(service.delete(delivered.id).await, Err(AppError::NotFound(_))));
}

// ============================================================================
// Validation and Totals
// ============================================================================

#[tokio::test]
async fn test_validation_errors() {
    let store = store();
    let supplier = supplier(&store).await;
    let mouse = product(&store, "Mouse Logitech M170", "25", 0).await;
    let service = PurchaseService::new(store.clone());

    let no_supplier = PurchaseOrderInput {
        items: vec![existing_line(mouse.id, 1, "15")],
        ..Default::default()
    };
    match service.create(no_supplier).await {
        Err(AppError::Validation { field, .. }) => assert_eq!(field, "supplier_id"),
        other => panic!("expected validation error, got {:?}", other),
    }

    match service.create(order(supplier.id, PurchaseStatus::Ordered, vec![])).await {
        Err(AppError::Validation { field, .. }) => assert_eq!(field, "items"),
        other => panic!("expected validation error, got {:?}", other),
    }

    let zero_quantity = order(supplier.id, PurchaseStatus::Ordered, vec![existing_line(mouse.id, 0, "15")]);
    assert!(matches!(service.create(zero_quantity).await, Err(AppError::Validation { .. })));

    let unknown_supplier = order(Uuid::new_v4(), PurchaseStatus::Ordered, vec![existing_line(mouse.id, 1, "15")]);
    assert!(matches!(service.create(unknown_supplier).await, Err(AppError::NotFound(_))));

    let unknown_product = order(supplier.id, PurchaseStatus::Ordered, vec![existing_line(Uuid::new_v4(), 1, "15")]);
    assert!(matches!(service.create(unknown_product).await, Err(AppError::NotFound(_))));

    assert!(service.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_totals_are_recomputed() {
    let store = store();
    let supplier = supplier(&store).await;
    let laptop = product(&store, "Laptop HP ProBook", "700", 0).await;
    let keyboard = product(&store, "Teclado Logitech K380", "30", 0).await;

    let input = PurchaseOrderInput {
        supplier_id: Some(supplier.id),
        shipping_cost: dec("30"),
        additional_fees: dec("30"),
        discount: dec("10"),
        items: vec![existing_line(laptop.id, 5, "500"), existing_line(keyboard.id, 10, "20")],
        ..Default::default()
    };

    let created = PurchaseService::new(store.clone()).create(input).await.unwrap();

    assert_eq!(created.items[0].total, dec("2500"));
    assert_eq!(created.items[1].total, dec("200"));
    assert_eq!(created.subtotal().unwrap(), dec("2700"));
    assert_eq!(created.total, dec("2750"));
}

#[tokio::test]
async fn test_negative_costs_rejected() {
    let store = store();
    let supplier = supplier(&store).await;
    let mouse = product(&store, "Mouse Logitech M170", "25", 0).await;

    let mut input = order(supplier.id, PurchaseStatus::Ordered, vec![existing_line(mouse.id, 1, "15")]);
    input.discount = dec("-5");

    match PurchaseService::new(store.clone()).create(input).await {
        Err(AppError::Validation { field, .. }) => assert_eq!(field, "discount"),
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_oversized_amounts_rejected() {
    let store = store();
    let supplier = supplier(&store).await;
    let mouse = product(&store, "Mouse Logitech M170", "25", 0).await;
    let service = PurchaseService::new(store.clone());

    // quantity * unit price leaves the decimal range
    let mut overflowing = existing_line(mouse.id, 2, "0");
    overflowing.unit_price = Decimal::MAX;
    match service
        .create(order(supplier.id, PurchaseStatus::Delivered, vec![overflowing]))
        .await
    {
        Err(AppError::Validation { field, .. }) => assert_eq!(field, "items"),
        other => panic!("expected validation error, got {:?}", other),
    }

    let unit_price_too_large = order(
        supplier.id,
        PurchaseStatus::Delivered,
        vec![existing_line(mouse.id, 1, "10000000000")],
    );
    assert!(matches!(
        service.create(unit_price_too_large).await,
        Err(AppError::Validation { .. })
    ));

    let line_total_too_large = order(
        supplier.id,
        PurchaseStatus::Delivered,
        vec![existing_line(mouse.id, 3, "9999999999")],
    );
    assert!(matches!(
        service.create(line_total_too_large).await,
        Err(AppError::Validation { .. })
    ));

    let mut order_total_too_large = order(
        supplier.id,
        PurchaseStatus::Delivered,
        vec![existing_line(mouse.id, 1, "9999999999")],
    );
    order_total_too_large.shipping_cost = dec("9999999999");
    match service.create(order_total_too_large).await {
        Err(AppError::Validation { field, .. }) => assert_eq!(field, "total"),
        other => panic!("expected validation error, got {:?}", other),
    }

    let mut shipping_overflow = order(supplier.id, PurchaseStatus::Delivered, vec![existing_line(mouse.id, 1, "15")]);
    shipping_overflow.shipping_cost = Decimal::MAX;
    match service.create(shipping_overflow).await {
        Err(AppError::Validation { field, .. }) => assert_eq!(field, "shipping_cost"),
        other => panic!("expected validation error, got {:?}", other),
    }

    assert_eq!(stock_of(&store, mouse.id).await, 0);
    assert!(service.list().await.unwrap().is_empty());
    assert!(PriceHistoryService::new(store.clone()).list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_amounts_keep_stored_precision() {
    let store = store();
    let supplier = supplier(&store).await;
    let laptop = product(&store, "Laptop HP ProBook", "700", 0).await;
    let service = PurchaseService::new(store.clone());

    let too_precise = order(supplier.id, PurchaseStatus::Ordered, vec![existing_line(laptop.id, 1, "15.00001")]);
    assert!(matches!(service.create(too_precise).await, Err(AppError::Validation { .. })));

    let mut line = existing_line(laptop.id, 5, "500");
    line.prorated_unit_cost = Some(dec("509.259259259259"));
    let created = service
        .create(order(supplier.id, PurchaseStatus::Ordered, vec![line]))
        .await
        .unwrap();

    assert_eq!(created.items[0].prorated_unit_cost, Some(dec("509.25925926")));
    let stored = service.get(created.id).await.unwrap();
    assert_eq!(stored.items[0].prorated_unit_cost, Some(dec("509.25925926")));
}

// ============================================================================
// Draft Proration
// ============================================================================

#[tokio::test]
async fn test_prorate_draft() {
    let service = PurchaseService::new(store());
    let input = PurchaseOrderInput {
        shipping_cost: dec("30"),
        additional_fees: dec("30"),
        discount: dec("10"),
        items: vec![
            new_product_line("Laptop HP ProBook", 5, "500"),
            new_product_line("Teclado Logitech K380", 10, "20"),
        ],
        ..Default::default()
    };

    let draft = service.prorate_draft(input).unwrap();

    assert_eq!(draft.outcome, ProrationOutcome::Prorated);
    assert_eq!(draft.order.total, dec("2750"));
    assert_eq!(draft.order.items[0].suggested_selling_price, Some(dec("713")));
    assert_eq!(draft.order.items[1].suggested_selling_price, Some(dec("29")));
    assert_eq!(
        draft.order.items[0].prorated_unit_cost.unwrap().round_dp(2),
        dec("509.26")
    );
}

#[tokio::test]
async fn test_prorate_draft_without_costs_is_unchanged() {
    let service = PurchaseService::new(store());
    let input = PurchaseOrderInput {
        items: vec![new_product_line("Cable HDMI", 2, "5")],
        ..Default::default()
    };

    let draft = service.prorate_draft(input).unwrap();

    assert_eq!(draft.outcome, ProrationOutcome::Unchanged);
    assert_eq!(draft.order.items[0].prorated_unit_cost, None);
    assert_eq!(draft.order.total, dec("10"));
}

#[tokio::test]
async fn test_prorate_draft_errors() {
    let service = PurchaseService::new(store());

    let empty = PurchaseOrderInput {
        shipping_cost: dec("10"),
        ..Default::default()
    };
    assert!(matches!(
        service.prorate_draft(empty),
        Err(AppError::Proration(ProrationError::EmptyItems))
    ));

    let zero_subtotal = PurchaseOrderInput {
        shipping_cost: dec("10"),
        items: vec![new_product_line("Muestra gratis", 1, "0")],
        ..Default::default()
    };
    assert!(matches!(
        service.prorate_draft(zero_subtotal),
        Err(AppError::Proration(ProrationError::ZeroSubtotal))
    ));

    let bad_quantity = PurchaseOrderInput {
        shipping_cost: dec("10"),
        items: vec![new_product_line("Cable HDMI", 0, "5")],
        ..Default::default()
    };
    assert!(matches!(
        service.prorate_draft(bad_quantity),
        Err(AppError::Proration(ProrationError::InvalidQuantity { .. }))
    ));
}

#[tokio::test]
async fn test_prorate_draft_rejects_oversized_amounts() {
    let service = PurchaseService::new(store());

    let mut line = new_product_line("Servidor Dell", 2, "0");
    line.unit_price = Decimal::MAX;
    let overflowing_line = PurchaseOrderInput {
        shipping_cost: dec("10"),
        items: vec![line],
        ..Default::default()
    };
    assert!(matches!(
        service.prorate_draft(overflowing_line),
        Err(AppError::Validation { .. })
    ));

    let mut line = new_product_line("Servidor Dell", 1, "0");
    line.unit_price = Decimal::MAX;
    let overflowing_total = PurchaseOrderInput {
        shipping_cost: dec("10"),
        items: vec![line],
        ..Default::default()
    };
    assert!(matches!(
        service.prorate_draft(overflowing_total),
        Err(AppError::Proration(ProrationError::Overflow))
    ));
}

#[tokio::test]
async fn test_prorate_draft_rounds_unit_costs() {
    let service = PurchaseService::new(store());
    let input = PurchaseOrderInput {
        shipping_cost: dec("50"),
        items: vec![
            new_product_line("Laptop HP ProBook", 5, "500"),
            new_product_line("Teclado Logitech K380", 10, "20"),
        ],
        ..Default::default()
    };

    let draft = service.prorate_draft(input).unwrap();

    assert_eq!(draft.order.items[0].prorated_unit_cost, Some(dec("509.25925926")));
    assert_eq!(draft.order.items[1].prorated_unit_cost, Some(dec("20.37037037")));
}
