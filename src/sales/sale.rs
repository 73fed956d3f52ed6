use getset::{CopyGetters, Getters};
use rust_decimal::Decimal;
use serde::Serialize;

use super::{Category, ValidationError, PRECISION};

/// A recorded ticket purchase. Sales are immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Getters, CopyGetters)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    #[getset(get_copy = "pub")]
    id: u64,
    #[getset(get = "pub")]
    client_name: String,
    #[getset(get_copy = "pub")]
    category: Category,
    #[getset(get_copy = "pub")]
    quantity: u32,
    #[getset(get_copy = "pub")]
    #[serde(with = "rust_decimal::serde::float")]
    total: Decimal,
}

impl Sale {
    pub fn new(id: u64, client_name: &str, category: Category, quantity: u32) -> Result<Sale, ValidationError> {
        let client_name = client_name.trim();
        if client_name.is_empty() {
            return Err(ValidationError::EmptyClientName);
        }

        if quantity < 1 {
            return Err(ValidationError::InvalidQuantity);
        }

        Ok(Sale {
            id,
            client_name: client_name.to_string(),
            category,
            quantity,
            total: (category.price() * Decimal::from(quantity)).round_dp(PRECISION),
        })
    }
}
