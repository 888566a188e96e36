//! PostgreSQL entity store
//!
//! Each store transaction wraps one `sqlx` transaction. Rows are read into
//! private `FromRow` structs and converted to domain types explicitly, so a
//! bad enum value in the database is rejected here instead of leaking out.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use shared::models::{
    Category, Customer, PriceHistory, PriceType, Product, PurchaseOrder, PurchaseOrderItem,
    PurchaseStatus, SalesOrder, SalesOrderItem, Supplier, Warehouse,
};
use sqlx::{FromRow, PgConnection, PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::{EntityStore, StoreTransaction};
use crate::error::{AppError, AppResult};

/// Entity store backed by a PostgreSQL pool
#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    /// Create a new PgStore instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EntityStore for PgStore {
    async fn begin(&self) -> AppResult<Box<dyn StoreTransaction>> {
        let tx = self.db.begin().await?;
        Ok(Box::new(PgTransaction { tx }))
    }

    async fn health(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.db).await?;
        Ok(())
    }
}

/// Open transaction on a [`PgStore`]
pub struct PgTransaction {
    tx: Transaction<'static, Postgres>,
}

// ============================================================================
// Row types and mapping
// ============================================================================

#[derive(Debug, FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    description: String,
    warehouse_id: Option<Uuid>,
    category_id: Option<Uuid>,
    last_purchase_price: Decimal,
    selling_price: Decimal,
    stock: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(r: ProductRow) -> Self {
        Product {
            id: r.id,
            name: r.name,
            description: r.description,
            warehouse_id: r.warehouse_id,
            category_id: r.category_id,
            last_purchase_price: r.last_purchase_price,
            selling_price: r.selling_price,
            stock: r.stock,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct CategoryRow {
    id: Uuid,
    name: String,
    description: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CategoryRow> for Category {
    fn from(r: CategoryRow) -> Self {
        Category {
            id: r.id,
            name: r.name,
            description: r.description,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct WarehouseRow {
    id: Uuid,
    name: String,
    code: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<WarehouseRow> for Warehouse {
    fn from(r: WarehouseRow) -> Self {
        Warehouse {
            id: r.id,
            name: r.name,
            code: r.code,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct CustomerRow {
    id: Uuid,
    name: String,
    address: String,
    phone: String,
    email: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CustomerRow> for Customer {
    fn from(r: CustomerRow) -> Self {
        Customer {
            id: r.id,
            name: r.name,
            address: r.address,
            phone: r.phone,
            email: r.email,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct SupplierRow {
    id: Uuid,
    name: String,
    address: String,
    phone: String,
    email: String,
    website: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<SupplierRow> for Supplier {
    fn from(r: SupplierRow) -> Self {
        Supplier {
            id: r.id,
            name: r.name,
            address: r.address,
            phone: r.phone,
            email: r.email,
            website: r.website,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct PurchaseOrderRow {
    id: Uuid,
    supplier_id: Uuid,
    supplier_name: String,
    date: DateTime<Utc>,
    status: String,
    shipping_cost: Decimal,
    additional_fees: Decimal,
    discount: Decimal,
    total: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct PurchaseOrderItemRow {
    purchase_order_id: Uuid,
    product_id: Option<Uuid>,
    product_name: String,
    quantity: i32,
    unit_price: Decimal,
    total: Decimal,
    is_new_product: bool,
    prorated_unit_cost: Option<Decimal>,
    suggested_selling_price: Option<Decimal>,
}

impl From<PurchaseOrderItemRow> for PurchaseOrderItem {
    fn from(r: PurchaseOrderItemRow) -> Self {
        PurchaseOrderItem {
            product_id: r.product_id,
            product_name: r.product_name,
            quantity: r.quantity,
            unit_price: r.unit_price,
            total: r.total,
            is_new_product: r.is_new_product,
            prorated_unit_cost: r.prorated_unit_cost,
            suggested_selling_price: r.suggested_selling_price,
        }
    }
}

fn map_purchase_order(row: PurchaseOrderRow, items: Vec<PurchaseOrderItem>) -> AppResult<PurchaseOrder> {
    let status = PurchaseStatus::from_str(&row.status).ok_or_else(|| {
        AppError::Internal(format!("Purchase order {} has unknown status '{}'", row.id, row.status))
    })?;

    Ok(PurchaseOrder {
        id: row.id,
        supplier_id: row.supplier_id,
        supplier_name: row.supplier_name,
        date: row.date,
        status,
        shipping_cost: row.shipping_cost,
        additional_fees: row.additional_fees,
        discount: row.discount,
        total: row.total,
        items,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

#[derive(Debug, FromRow)]
struct SalesOrderRow {
    id: Uuid,
    customer_id: Uuid,
    customer_name: String,
    date: DateTime<Utc>,
    total: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct SalesOrderItemRow {
    sales_order_id: Uuid,
    product_id: Uuid,
    product_name: String,
    quantity: i32,
    unit_price: Decimal,
    total: Decimal,
}

impl From<SalesOrderItemRow> for SalesOrderItem {
    fn from(r: SalesOrderItemRow) -> Self {
        SalesOrderItem {
            product_id: r.product_id,
            product_name: r.product_name,
            quantity: r.quantity,
            unit_price: r.unit_price,
            total: r.total,
        }
    }
}

fn map_sales_order(row: SalesOrderRow, items: Vec<SalesOrderItem>) -> SalesOrder {
    SalesOrder {
        id: row.id,
        customer_id: row.customer_id,
        customer_name: row.customer_name,
        date: row.date,
        total: row.total,
        items,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

#[derive(Debug, FromRow)]
struct PriceHistoryRow {
    id: Uuid,
    product_id: Uuid,
    price: Decimal,
    date: DateTime<Utc>,
    price_type: String,
    created_at: DateTime<Utc>,
}

fn map_price_history(row: PriceHistoryRow) -> AppResult<PriceHistory> {
    let price_type = PriceType::from_str(&row.price_type).ok_or_else(|| {
        AppError::Internal(format!("Price history {} has unknown type '{}'", row.id, row.price_type))
    })?;

    Ok(PriceHistory {
        id: row.id,
        product_id: row.product_id,
        price: row.price,
        date: row.date,
        price_type,
        created_at: row.created_at,
    })
}

// ============================================================================
// Item helpers
// ============================================================================

const PRODUCT_COLUMNS: &str = "id, name, description, warehouse_id, category_id, \
    last_purchase_price, selling_price, stock, created_at, updated_at";

const PURCHASE_ORDER_COLUMNS: &str = "id, supplier_id, supplier_name, date, status, \
    shipping_cost, additional_fees, discount, total, created_at, updated_at";

const PURCHASE_ITEM_COLUMNS: &str = "purchase_order_id, product_id, product_name, quantity, \
    unit_price, total, is_new_product, prorated_unit_cost, suggested_selling_price";

const SALES_ORDER_COLUMNS: &str = "id, customer_id, customer_name, date, total, created_at, updated_at";

const SALES_ITEM_COLUMNS: &str = "sales_order_id, product_id, product_name, quantity, unit_price, total";

const PRICE_HISTORY_COLUMNS: &str = "id, product_id, price, date, price_type, created_at";

async fn purchase_items_for(
    conn: &mut PgConnection,
    order_ids: Vec<Uuid>,
) -> AppResult<HashMap<Uuid, Vec<PurchaseOrderItem>>> {
    let rows = sqlx::query_as::<_, PurchaseOrderItemRow>(&format!(
        "SELECT {} FROM purchase_order_items WHERE purchase_order_id = ANY($1) \
         ORDER BY purchase_order_id, line_no",
        PURCHASE_ITEM_COLUMNS
    ))
    .bind(order_ids)
    .fetch_all(&mut *conn)
    .await?;

    let mut items: HashMap<Uuid, Vec<PurchaseOrderItem>> = HashMap::new();
    for row in rows {
        items.entry(row.purchase_order_id).or_default().push(row.into());
    }
    Ok(items)
}

async fn insert_purchase_items(conn: &mut PgConnection, order: &PurchaseOrder) -> AppResult<()> {
    for (line_no, item) in order.items.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO purchase_order_items (
                purchase_order_id, line_no, product_id, product_name, quantity, unit_price,
                total, is_new_product, prorated_unit_cost, suggested_selling_price
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(order.id)
        .bind(line_no as i32)
        .bind(item.product_id)
        .bind(&item.product_name)
        .bind(item.quantity)
        .bind(item.unit_price)
        .bind(item.total)
        .bind(item.is_new_product)
        .bind(item.prorated_unit_cost)
        .bind(item.suggested_selling_price)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

async fn sales_items_for(
    conn: &mut PgConnection,
    order_ids: Vec<Uuid>,
) -> AppResult<HashMap<Uuid, Vec<SalesOrderItem>>> {
    let rows = sqlx::query_as::<_, SalesOrderItemRow>(&format!(
        "SELECT {} FROM sales_order_items WHERE sales_order_id = ANY($1) \
         ORDER BY sales_order_id, line_no",
        SALES_ITEM_COLUMNS
    ))
    .bind(order_ids)
    .fetch_all(&mut *conn)
    .await?;

    let mut items: HashMap<Uuid, Vec<SalesOrderItem>> = HashMap::new();
    for row in rows {
        items.entry(row.sales_order_id).or_default().push(row.into());
    }
    Ok(items)
}

async fn insert_sales_items(conn: &mut PgConnection, order: &SalesOrder) -> AppResult<()> {
    for (line_no, item) in order.items.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO sales_order_items (
                sales_order_id, line_no, product_id, product_name, quantity, unit_price, total
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(order.id)
        .bind(line_no as i32)
        .bind(item.product_id)
        .bind(&item.product_name)
        .bind(item.quantity)
        .bind(item.unit_price)
        .bind(item.total)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

// ============================================================================
// Transaction
// ============================================================================

#[async_trait]
impl StoreTransaction for PgTransaction {
    async fn list_products(&mut self) -> AppResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products ORDER BY name",
            PRODUCT_COLUMNS
        ))
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn get_product(&mut self, id: Uuid) -> AppResult<Option<Product>> {
        // Row lock: concurrent stock changes to one product queue up here
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products WHERE id = $1 FOR UPDATE",
            PRODUCT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(row.map(Product::from))
    }

    async fn insert_product(&mut self, product: &Product) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, description, warehouse_id, category_id,
                last_purchase_price, selling_price, stock, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.warehouse_id)
        .bind(product.category_id)
        .bind(product.last_purchase_price)
        .bind(product.selling_price)
        .bind(product.stock)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn update_product(&mut self, product: &Product) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET name = $1, description = $2, warehouse_id = $3, category_id = $4,
                last_purchase_price = $5, selling_price = $6, stock = $7, updated_at = $8
            WHERE id = $9
            "#,
        )
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.warehouse_id)
        .bind(product.category_id)
        .bind(product.last_purchase_price)
        .bind(product.selling_price)
        .bind(product.stock)
        .bind(product.updated_at)
        .bind(product.id)
        .execute(&mut *self.tx)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_product(&mut self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_categories(&mut self) -> AppResult<Vec<Category>> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name, description, created_at, updated_at FROM categories ORDER BY name",
        )
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(rows.into_iter().map(Category::from).collect())
    }

    async fn get_category(&mut self, id: Uuid) -> AppResult<Option<Category>> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name, description, created_at, updated_at FROM categories WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(row.map(Category::from))
    }

    async fn insert_category(&mut self, category: &Category) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO categories (id, name, description, created_at, updated_at) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(category.id)
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.created_at)
        .bind(category.updated_at)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn update_category(&mut self, category: &Category) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE categories SET name = $1, description = $2, updated_at = $3 WHERE id = $4",
        )
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.updated_at)
        .bind(category.id)
        .execute(&mut *self.tx)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_category(&mut self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_warehouses(&mut self) -> AppResult<Vec<Warehouse>> {
        let rows = sqlx::query_as::<_, WarehouseRow>(
            "SELECT id, name, code, created_at, updated_at FROM warehouses ORDER BY name ASC",
        )
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(rows.into_iter().map(Warehouse::from).collect())
    }

    async fn get_warehouse(&mut self, id: Uuid) -> AppResult<Option<Warehouse>> {
        let row = sqlx::query_as::<_, WarehouseRow>(
            "SELECT id, name, code, created_at, updated_at FROM warehouses WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(row.map(Warehouse::from))
    }

    async fn insert_warehouse(&mut self, warehouse: &Warehouse) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO warehouses (id, name, code, created_at, updated_at) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(warehouse.id)
        .bind(&warehouse.name)
        .bind(&warehouse.code)
        .bind(warehouse.created_at)
        .bind(warehouse.updated_at)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn update_warehouse(&mut self, warehouse: &Warehouse) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE warehouses SET name = $1, code = $2, updated_at = $3 WHERE id = $4",
        )
        .bind(&warehouse.name)
        .bind(&warehouse.code)
        .bind(warehouse.updated_at)
        .bind(warehouse.id)
        .execute(&mut *self.tx)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_warehouse(&mut self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM warehouses WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_customers(&mut self) -> AppResult<Vec<Customer>> {
        let rows = sqlx::query_as::<_, CustomerRow>(
            "SELECT id, name, address, phone, email, created_at, updated_at FROM customers ORDER BY name",
        )
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(rows.into_iter().map(Customer::from).collect())
    }

    async fn get_customer(&mut self, id: Uuid) -> AppResult<Option<Customer>> {
        let row = sqlx::query_as::<_, CustomerRow>(
            "SELECT id, name, address, phone, email, created_at, updated_at FROM customers WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(row.map(Customer::from))
    }

    async fn insert_customer(&mut self, customer: &Customer) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO customers (id, name, address, phone, email, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(customer.id)
        .bind(&customer.name)
        .bind(&customer.address)
        .bind(&customer.phone)
        .bind(&customer.email)
        .bind(customer.created_at)
        .bind(customer.updated_at)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn update_customer(&mut self, customer: &Customer) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE customers
            SET name = $1, address = $2, phone = $3, email = $4, updated_at = $5
            WHERE id = $6
            "#,
        )
        .bind(&customer.name)
        .bind(&customer.address)
        .bind(&customer.phone)
        .bind(&customer.email)
        .bind(customer.updated_at)
        .bind(customer.id)
        .execute(&mut *self.tx)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_customer(&mut self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_suppliers(&mut self) -> AppResult<Vec<Supplier>> {
        let rows = sqlx::query_as::<_, SupplierRow>(
            r#"
            SELECT id, name, address, phone, email, website, created_at, updated_at
            FROM suppliers
            ORDER BY name
            "#,
        )
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(rows.into_iter().map(Supplier::from).collect())
    }

    async fn get_supplier(&mut self, id: Uuid) -> AppResult<Option<Supplier>> {
        let row = sqlx::query_as::<_, SupplierRow>(
            r#"
            SELECT id, name, address, phone, email, website, created_at, updated_at
            FROM suppliers
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(row.map(Supplier::from))
    }

    async fn insert_supplier(&mut self, supplier: &Supplier) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO suppliers (id, name, address, phone, email, website, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(supplier.id)
        .bind(&supplier.name)
        .bind(&supplier.address)
        .bind(&supplier.phone)
        .bind(&supplier.email)
        .bind(&supplier.website)
        .bind(supplier.created_at)
        .bind(supplier.updated_at)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn update_supplier(&mut self, supplier: &Supplier) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE suppliers
            SET name = $1, address = $2, phone = $3, email = $4, website = $5, updated_at = $6
            WHERE id = $7
            "#,
        )
        .bind(&supplier.name)
        .bind(&supplier.address)
        .bind(&supplier.phone)
        .bind(&supplier.email)
        .bind(&supplier.website)
        .bind(supplier.updated_at)
        .bind(supplier.id)
        .execute(&mut *self.tx)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_supplier(&mut self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM suppliers WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_purchase_orders(&mut self) -> AppResult<Vec<PurchaseOrder>> {
        let rows = sqlx::query_as::<_, PurchaseOrderRow>(&format!(
            "SELECT {} FROM purchase_orders ORDER BY date DESC, created_at DESC",
            PURCHASE_ORDER_COLUMNS
        ))
        .fetch_all(&mut *self.tx)
        .await?;

        let ids = rows.iter().map(|r| r.id).collect();
        let mut items = purchase_items_for(&mut self.tx, ids).await?;

        rows.into_iter()
            .map(|row| {
                let order_items = items.remove(&row.id).unwrap_or_default();
                map_purchase_order(row, order_items)
            })
            .collect()
    }

    async fn get_purchase_order(&mut self, id: Uuid) -> AppResult<Option<PurchaseOrder>> {
        // Row lock: a second delivery of the same order waits here and then
        // sees DELIVERED
        let row = sqlx::query_as::<_, PurchaseOrderRow>(&format!(
            "SELECT {} FROM purchase_orders WHERE id = $1 FOR UPDATE",
            PURCHASE_ORDER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut items = purchase_items_for(&mut self.tx, vec![id]).await?;
        map_purchase_order(row, items.remove(&id).unwrap_or_default()).map(Some)
    }

    async fn insert_purchase_order(&mut self, order: &PurchaseOrder) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO purchase_orders (
                id, supplier_id, supplier_name, date, status, shipping_cost,
                additional_fees, discount, total, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(order.id)
        .bind(order.supplier_id)
        .bind(&order.supplier_name)
        .bind(order.date)
        .bind(order.status.as_str())
        .bind(order.shipping_cost)
        .bind(order.additional_fees)
        .bind(order.discount)
        .bind(order.total)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *self.tx)
        .await?;

        insert_purchase_items(&mut self.tx, order).await
    }

    async fn update_purchase_order(&mut self, order: &PurchaseOrder) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE purchase_orders
            SET supplier_id = $1, supplier_name = $2, date = $3, status = $4,
                shipping_cost = $5, additional_fees = $6, discount = $7, total = $8,
                updated_at = $9
            WHERE id = $10
            "#,
        )
        .bind(order.supplier_id)
        .bind(&order.supplier_name)
        .bind(order.date)
        .bind(order.status.as_str())
        .bind(order.shipping_cost)
        .bind(order.additional_fees)
        .bind(order.discount)
        .bind(order.total)
        .bind(order.updated_at)
        .bind(order.id)
        .execute(&mut *self.tx)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        // Delete-then-reinsert keeps line numbers dense
        sqlx::query("DELETE FROM purchase_order_items WHERE purchase_order_id = $1")
            .bind(order.id)
            .execute(&mut *self.tx)
            .await?;
        insert_purchase_items(&mut self.tx, order).await?;

        Ok(true)
    }

    async fn delete_purchase_order(&mut self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM purchase_orders WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_sales_orders(&mut self) -> AppResult<Vec<SalesOrder>> {
        let rows = sqlx::query_as::<_, SalesOrderRow>(&format!(
            "SELECT {} FROM sales_orders ORDER BY date DESC, created_at DESC",
            SALES_ORDER_COLUMNS
        ))
        .fetch_all(&mut *self.tx)
        .await?;

        let ids = rows.iter().map(|r| r.id).collect();
        let mut items = sales_items_for(&mut self.tx, ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let order_items = items.remove(&row.id).unwrap_or_default();
                map_sales_order(row, order_items)
            })
            .collect())
    }

    async fn get_sales_order(&mut self, id: Uuid) -> AppResult<Option<SalesOrder>> {
        let row = sqlx::query_as::<_, SalesOrderRow>(&format!(
            "SELECT {} FROM sales_orders WHERE id = $1",
            SALES_ORDER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut items = sales_items_for(&mut self.tx, vec![id]).await?;
        Ok(Some(map_sales_order(row, items.remove(&id).unwrap_or_default())))
    }

    async fn insert_sales_order(&mut self, order: &SalesOrder) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO sales_orders (id, customer_id, customer_name, date, total, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(order.id)
        .bind(order.customer_id)
        .bind(&order.customer_name)
        .bind(order.date)
        .bind(order.total)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *self.tx)
        .await?;

        insert_sales_items(&mut self.tx, order).await
    }

    async fn update_sales_order(&mut self, order: &SalesOrder) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE sales_orders
            SET customer_id = $1, customer_name = $2, date = $3, total = $4, updated_at = $5
            WHERE id = $6
            "#,
        )
        .bind(order.customer_id)
        .bind(&order.customer_name)
        .bind(order.date)
        .bind(order.total)
        .bind(order.updated_at)
        .bind(order.id)
        .execute(&mut *self.tx)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        sqlx::query("DELETE FROM sales_order_items WHERE sales_order_id = $1")
            .bind(order.id)
            .execute(&mut *self.tx)
            .await?;
        insert_sales_items(&mut self.tx, order).await?;

        Ok(true)
    }

    async fn delete_sales_order(&mut self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM sales_orders WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn insert_price_history(&mut self, entry: &PriceHistory) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO price_history (id, product_id, price, date, price_type, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(entry.id)
        .bind(entry.product_id)
        .bind(entry.price)
        .bind(entry.date)
        .bind(entry.price_type.as_str())
        .bind(entry.created_at)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn list_price_history(&mut self) -> AppResult<Vec<PriceHistory>> {
        let rows = sqlx::query_as::<_, PriceHistoryRow>(&format!(
            "SELECT {} FROM price_history ORDER BY date DESC, created_at DESC",
            PRICE_HISTORY_COLUMNS
        ))
        .fetch_all(&mut *self.tx)
        .await?;

        rows.into_iter().map(map_price_history).collect()
    }

    async fn price_history_for_product(&mut self, product_id: Uuid) -> AppResult<Vec<PriceHistory>> {
        let rows = sqlx::query_as::<_, PriceHistoryRow>(&format!(
            "SELECT {} FROM price_history WHERE product_id = $1 ORDER BY date DESC, created_at DESC",
            PRICE_HISTORY_COLUMNS
        ))
        .bind(product_id)
        .fetch_all(&mut *self.tx)
        .await?;

        rows.into_iter().map(map_price_history).collect()
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| AppError::Transaction(format!("commit failed: {}", e)))
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        self.tx
            .rollback()
            .await
            .map_err(|e| AppError::Transaction(format!("rollback failed: {}", e)))
    }
}
