use std::collections::HashSet;
use std::io::Write;

use anyhow::Result;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sales::ledger::Ledger;
use crate::sales::sale::Sale;
use crate::sales::totals::Totals;
use crate::sales::{Category, ValidationError};

/// Key the ledger state is stored under.
pub const STORAGE_KEY: &str = "eventosPanamaSales";

#[derive(Debug, PartialEq, Error)]
pub enum SerializationError {
    #[error("malformed ledger data: {0}")]
    Malformed(String),
    #[error("failed to encode ledger data: {0}")]
    Encode(String),
    #[error("stored sale {id} is invalid: {source}")]
    InvalidSale { id: u64, source: ValidationError },
    #[error("stored sale {0} has a total that does not match its price")]
    TotalMismatch(u64),
    #[error("stored sale id {0} is used more than once")]
    DuplicateId(u64),
    #[error("stored sale id {0} is out of range")]
    IdOutOfRange(u64),
}

/// Persisted form of the ledger.
#[derive(Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerRecord<'a> {
    pub sales: &'a [Sale],
    pub totals: &'a Totals,
    pub next_id: u64,
}

/// A sale as found in storage, before it is checked.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleEntry {
    pub id: u64,
    pub client_name: String,
    pub category: Category,
    pub quantity: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
}

impl TryFrom<SaleEntry> for Sale {
    type Error = SerializationError;

    fn try_from(entry: SaleEntry) -> Result<Self, Self::Error> {
        let sale = Sale::new(entry.id, &entry.client_name, entry.category, entry.quantity)
            .map_err(|source| SerializationError::InvalidSale { id: entry.id, source })?;

        if sale.total() != entry.total {
            return Err(SerializationError::TotalMismatch(entry.id));
        }

        Ok(sale)
    }
}

// Older data carries neither `totals` nor `nextId`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LedgerEntry {
    #[serde(default)] // Default to no sales if the field is missing
    sales: Vec<SaleEntry>,
    #[serde(default)]
    totals: Option<Totals>,
    #[serde(default)]
    next_id: Option<u64>,
}

/// Checked form of the stored ledger.
#[derive(Debug, PartialEq)]
pub struct StoredLedger {
    pub sales: Vec<Sale>,
    pub totals: Option<Totals>,
    /// Never below one past the highest stored id.
    pub next_id: u64,
}

pub fn encode(sales: &[Sale], totals: &Totals, next_id: u64) -> Result<String, SerializationError> {
    serde_json::to_string(&LedgerRecord { sales, totals, next_id })
        .map_err(|err| SerializationError::Encode(err.to_string()))
}

pub fn decode(raw: &str) -> Result<StoredLedger, SerializationError> {
    let entry: LedgerEntry =
        serde_json::from_str(raw).map_err(|err| SerializationError::Malformed(err.to_string()))?;

    let mut ids = HashSet::new();
    let mut next_id = entry.next_id.unwrap_or(1).max(1);
    let mut sales = Vec::with_capacity(entry.sales.len());

    for sale_entry in entry.sales {
        let sale = Sale::try_from(sale_entry)?;
        if !ids.insert(sale.id()) {
            return Err(SerializationError::DuplicateId(sale.id()));
        }

        let after = sale.id().checked_add(1).ok_or(SerializationError::IdOutOfRange(sale.id()))?;
        next_id = next_id.max(after);
        sales.push(sale);
    }

    Ok(StoredLedger {
        sales,
        totals: entry.totals,
        next_id,
    })
}

#[derive(Debug, Serialize)]
pub struct SaleRecord<'a> {
    pub id: u64,
    pub client: &'a str,
    pub category: &'a str,
    pub quantity: u32,
    pub total: Decimal,
}

impl<'a> From<&'a Sale> for SaleRecord<'a> {
    fn from(sale: &'a Sale) -> Self {
        SaleRecord {
            id: sale.id(),
            client: sale.client_name(),
            category: sale.category().label(),
            quantity: sale.quantity(),
            total: sale.total(),
        }
    }
}

pub fn export_csv<W: Write>(ledger: &Ledger, writer: W) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new().from_writer(writer);
    for sale in ledger.sales() {
        let record: SaleRecord = sale.into();
        csv_writer.serialize(record)?;
    }

    csv_writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::storage::{MemoryStore, Store};

    #[test]
    fn test_decode_original_format() -> Result<()> {
        let raw = r#"{
            "sales": [
                {"id": 1718000000000, "clientName": "Ana", "category": "vip", "quantity": 2, "total": 100}
            ],
            "totals": {
                "vip": {"quantity": 2, "amount": 100},
                "butacas": {"quantity": 0, "amount": 0},
                "generales": {"quantity": 0, "amount": 0},
                "overall": {"quantity": 2, "amount": 100}
            }
        }"#;

        let stored = decode(raw)?;

        assert_eq!(stored.sales.len(), 1);
        assert_eq!(stored.sales[0].id(), 1718000000000);
        assert_eq!(stored.sales[0].total(), dec!(100));
        assert_eq!(stored.totals.map(|t| t.overall.amount), Some(dec!(100)));

        Ok(())
    }

    #[test]
    fn test_decode_missing_fields() -> Result<()> {
        let stored = decode("{}")?;

        assert_eq!(
            stored,
            StoredLedger {
                sales: vec![],
                totals: None,
                next_id: 1,
            }
        );

        Ok(())
    }

    #[test]
    fn test_decode_malformed() {
        assert!(decode("{not json").is_err());
        assert!(decode(r#"{"sales": 5}"#).is_err());
        assert!(decode(r#"{"sales": [{"id": 1, "clientName": "A", "category": "palco", "quantity": 1, "total": 1}]}"#).is_err());
    }

    fn sale_json(id: u64, name: &str, category: &str, quantity: i64, total: f64) -> String {
        format!(
            r#"{{"id": {id}, "clientName": "{name}", "category": "{category}", "quantity": {quantity}, "total": {total}}}"#
        )
    }

    fn decode_sales(sales: &[String]) -> Result<StoredLedger, SerializationError> {
        decode(&format!(r#"{{"sales": [{}]}}"#, sales.join(",")))
    }

    #[test]
    fn test_decode_rejects_invalid_sales() {
        assert_eq!(
            decode_sales(&[sale_json(1, "", "vip", 1, 50.0)]),
            Err(SerializationError::InvalidSale {
                id: 1,
                source: ValidationError::EmptyClientName
            })
        );
        assert_eq!(
            decode_sales(&[sale_json(2, "Ana", "vip", 0, 0.0)]),
            Err(SerializationError::InvalidSale {
                id: 2,
                source: ValidationError::InvalidQuantity
            })
        );
        assert_eq!(
            decode_sales(&[sale_json(3, "Ana", "vip", 1, -7.0)]),
            Err(SerializationError::TotalMismatch(3))
        );
        assert_eq!(
            decode_sales(&[sale_json(4, "Ana", "butacas", 2, 50.0)]),
            Err(SerializationError::TotalMismatch(4))
        );
        assert!(matches!(
            decode_sales(&[sale_json(5, "Ana", "vip", -1, -50.0)]),
            Err(SerializationError::Malformed(_))
        ));
    }

    #[test]
    fn test_decode_rejects_duplicate_ids() {
        assert_eq!(
            decode_sales(&[sale_json(5, "Ana", "vip", 1, 50.0), sale_json(5, "Beto", "vip", 1, 50.0)]),
            Err(SerializationError::DuplicateId(5))
        );
    }

    #[test]
    fn test_decode_rejects_last_id() {
        assert_eq!(
            decode_sales(&[sale_json(u64::MAX, "Ana", "vip", 1, 50.0)]),
            Err(SerializationError::IdOutOfRange(u64::MAX))
        );
    }

    #[test]
    fn test_decode_next_id() -> Result<()> {
        let stored = decode(&format!(r#"{{"sales": [{}], "nextId": 9}}"#, sale_json(3, "Ana", "vip", 1, 50.0)))?;
        assert_eq!(stored.next_id, 9);

        // A counter behind the stored ids is moved past them.
        let stored = decode(&format!(r#"{{"sales": [{}], "nextId": 2}}"#, sale_json(3, "Ana", "vip", 1, 50.0)))?;
        assert_eq!(stored.next_id, 4);

        let stored = decode_sales(&[sale_json(7, "Ana", "vip", 1, 50.0)])?;
        assert_eq!(stored.next_id, 8);

        Ok(())
    }

    #[test]
    fn test_encode_keeps_next_id() -> Result<()> {
        let sales = vec![Sale::new(3, "Ana", Category::Vip, 1)?];
        let totals = Totals::from_sales(&sales);

        let stored = decode(&encode(&sales, &totals, 12)?)?;

        assert_eq!(stored.sales, sales);
        assert_eq!(stored.totals, Some(totals));
        assert_eq!(stored.next_id, 12);

        Ok(())
    }

    #[test]
    fn test_export_csv() -> Result<()> {
        let mut ledger = Ledger::new(Store::from(MemoryStore::new()));
        ledger.add_sale("Ana", Category::Vip, 2)?;
        ledger.add_sale("Beto", Category::Generales, 3)?;

        let mut out = Vec::new();
        export_csv(&ledger, &mut out)?;

        assert_eq!(
            String::from_utf8(out)?,
            "id,client,category,quantity,total\n1,Ana,VIP,2,100.00\n2,Beto,Generales,3,45.00\n"
        );

        Ok(())
    }
}
