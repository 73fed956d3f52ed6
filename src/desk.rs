//! Request/response surface for front ends.
//!
//! The desk takes raw form input, validates it and routes it to the
//! [`Ledger`]. It also formats the ledger for display: one [`SaleRow`] per
//! sale and a [`Summary`] of the totals. Confirmation prompts and the way a
//! [`Notice`] is shown are left to the caller.

use std::fmt;

use log::debug;
use rust_decimal::Decimal;

use crate::sales::ledger::Ledger;
use crate::sales::sale::Sale;
use crate::sales::totals::TotalsBucket;
use crate::sales::{Category, LedgerError, ValidationError};

/// `$` followed by the amount at two decimals.
pub fn format_money(amount: Decimal) -> String {
    format!("${:.2}", amount.round_dp(2))
}

#[derive(Debug, Clone, PartialEq)]
pub struct SaleRow {
    pub id: u64,
    pub client_name: String,
    pub category: &'static str,
    pub quantity: u32,
    pub total: String,
}

impl From<&Sale> for SaleRow {
    fn from(sale: &Sale) -> Self {
        SaleRow {
            id: sale.id(),
            client_name: sale.client_name().clone(),
            category: sale.category().label(),
            quantity: sale.quantity(),
            total: format_money(sale.total()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryLine {
    pub quantity: u64,
    pub amount: String,
}

impl From<&TotalsBucket> for SummaryLine {
    fn from(bucket: &TotalsBucket) -> Self {
        SummaryLine {
            quantity: bucket.quantity,
            amount: format_money(bucket.amount),
        }
    }
}

impl fmt::Display for SummaryLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} tickets - {}", self.quantity, self.amount)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub overall: SummaryLine,
    pub vip: SummaryLine,
    pub butacas: SummaryLine,
    pub generales: SummaryLine,
}

impl Summary {
    pub fn line(&self, category: Category) -> &SummaryLine {
        match category {
            Category::Vip => &self.vip,
            Category::Butacas => &self.butacas,
            Category::Generales => &self.generales,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// A short message for the user after an operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Notice {
        Notice {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Notice {
        Notice {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }

    pub fn sale_recorded<T>(result: &Result<T, LedgerError>) -> Notice {
        match result {
            Ok(_) => Notice::success("Sale recorded successfully"),
            Err(err) => Notice::for_error(err),
        }
    }

    pub fn sale_deleted<T>(result: &Result<T, LedgerError>) -> Notice {
        match result {
            Ok(_) => Notice::success("Sale deleted successfully"),
            Err(err) => Notice::for_error(err),
        }
    }

    fn for_error(err: &LedgerError) -> Notice {
        match err {
            LedgerError::Validation(ValidationError::EmptyClientName) => {
                Notice::error("Please enter the client name")
            },
            LedgerError::Validation(ValidationError::InvalidCategory) => {
                Notice::error("Please select a ticket category")
            },
            LedgerError::Validation(ValidationError::InvalidQuantity) => {
                Notice::error("Please enter a valid number of tickets")
            },
            err => Notice::error(err.to_string()),
        }
    }
}

/// Parses the quantity field of the form. Only whole numbers of at least one
/// are accepted.
pub fn parse_quantity(raw: &str) -> Result<u32, ValidationError> {
    match raw.trim().parse::<u32>() {
        Ok(quantity) if quantity >= 1 => Ok(quantity),
        _ => Err(ValidationError::InvalidQuantity),
    }
}

pub struct Desk<'a> {
    ledger: &'a mut Ledger,
}

impl<'a> Desk<'a> {
    pub fn new(ledger: &'a mut Ledger) -> Desk<'a> {
        Desk { ledger }
    }

    /// Validates the raw form fields in form order and records the sale.
    pub fn submit_sale(&mut self, raw_name: &str, raw_category: &str, raw_quantity: &str) -> Result<Sale, LedgerError> {
        let name = raw_name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyClientName.into());
        }

        let category: Category = raw_category.parse()?;
        let quantity = parse_quantity(raw_quantity)?;

        self.ledger.add_sale(name, category, quantity)
    }

    /// Deletes a sale the user has already confirmed.
    pub fn request_delete(&mut self, id: u64) -> Result<(), LedgerError> {
        match self.ledger.delete_sale(id) {
            Ok(_) => Ok(()),
            Err(LedgerError::NotFound(id)) => {
                debug!("delete requested for unknown sale, id={}", id);
                Err(LedgerError::NotFound(id))
            },
            Err(err) => Err(err),
        }
    }

    pub fn summary(&self) -> Summary {
        let totals = self.ledger.totals();
        Summary {
            overall: (&totals.overall).into(),
            vip: (&totals.vip).into(),
            butacas: (&totals.butacas).into(),
            generales: (&totals.generales).into(),
        }
    }

    pub fn rows(&self) -> Vec<SaleRow> {
        self.ledger.sales().iter().map(SaleRow::from).collect()
    }

    pub fn ledger(&self) -> &Ledger {
        &*self.ledger
    }
}
