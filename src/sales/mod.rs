use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::SerializationError;
use crate::storage::StorageError;

pub mod ledger;
pub mod sale;
pub mod totals;


/// Amounts are kept at cent precision.
pub const PRECISION: u32 = 2;

#[derive(Debug, PartialEq, Error)]
pub enum ValidationError {
    #[error("empty client name")]
    EmptyClientName,
    #[error("invalid category")]
    InvalidCategory,
    #[error("invalid quantity")]
    InvalidQuantity,
}

#[derive(Debug, PartialEq, Error)]
pub enum LedgerError {
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("sale {0} not found")]
    NotFound(u64),
    #[error("no sale ids left")]
    IdsExhausted,
    #[error("{0}")]
    Serialization(#[from] SerializationError),
    #[error("{0}")]
    Storage(#[from] StorageError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Vip,
    Butacas,
    Generales,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Vip, Category::Butacas, Category::Generales];

    pub fn price(&self) -> Decimal {
        match self {
            Category::Vip => dec!(50.00),
            Category::Butacas => dec!(30.00),
            Category::Generales => dec!(15.00),
        }
    }

    /// Human readable name shown in tables and summaries.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Vip => "VIP",
            Category::Butacas => "Butacas",
            Category::Generales => "Generales",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Category::Vip => "vip",
            Category::Butacas => "butacas",
            Category::Generales => "generales",
        }
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "vip" => Ok(Category::Vip),
            "butacas" => Ok(Category::Butacas),
            "generales" => Ok(Category::Generales),
            _ => Err(ValidationError::InvalidCategory),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_category_parsing() {
        assert_eq!("vip".parse::<Category>(), Ok(Category::Vip));
        assert_eq!(" butacas ".parse::<Category>(), Ok(Category::Butacas));
        assert_eq!("generales".parse::<Category>(), Ok(Category::Generales));
        assert_eq!("".parse::<Category>(), Err(ValidationError::InvalidCategory));
        assert_eq!("VIP".parse::<Category>(), Err(ValidationError::InvalidCategory));
        assert_eq!("palco".parse::<Category>(), Err(ValidationError::InvalidCategory));
    }

    #[test]
    fn test_price_and_label_tables() {
        assert_eq!(Category::Vip.price(), dec!(50));
        assert_eq!(Category::Butacas.price(), dec!(30));
        assert_eq!(Category::Generales.price(), dec!(15));

        assert_eq!(Category::Vip.label(), "VIP");
        assert_eq!(Category::Butacas.label(), "Butacas");
        assert_eq!(Category::Generales.label(), "Generales");
    }
}
