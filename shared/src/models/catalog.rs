//! Reference data: categories, warehouses, customers and suppliers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A product category
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A storage location that holds products
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Warehouse {
    pub id: Uuid,
    pub name: String,
    /// Short uppercase code, e.g. `DC001`
    pub code: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Warehouse {
    /// Build a warehouse code from the name and the warehouse's ordinal.
    ///
    /// Takes the first two alphanumeric characters of the name upper-cased,
    /// falling back to `WH`, followed by the ordinal padded to three digits.
    pub fn generate_code(name: &str, ordinal: usize) -> String {
        let prefix: String = name
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .take(2)
            .collect::<String>()
            .to_ascii_uppercase();
        let prefix = if prefix.len() < 2 { "WH".to_string() } else { prefix };
        format!("{}{:03}", prefix, ordinal)
    }
}

/// A customer that places sales orders
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A supplier that fulfils purchase orders
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Supplier {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub website: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
