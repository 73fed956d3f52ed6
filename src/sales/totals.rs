use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::sale::Sale;
use super::{Category, PRECISION};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TotalsBucket {
    pub quantity: u64,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

impl TotalsBucket {
    fn add(&mut self, quantity: u32, amount: Decimal) {
        self.quantity += u64::from(quantity);
        self.amount = (self.amount + amount).round_dp(PRECISION);
    }

    // Callers only subtract sales that were previously added.
    fn subtract(&mut self, quantity: u32, amount: Decimal) {
        self.quantity = self.quantity.saturating_sub(u64::from(quantity));
        self.amount = (self.amount - amount).round_dp(PRECISION);
    }
}

/// Running totals per category plus the overall bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub vip: TotalsBucket,
    pub butacas: TotalsBucket,
    pub generales: TotalsBucket,
    pub overall: TotalsBucket,
}

impl Totals {
    pub fn new() -> Totals {
        Totals::default()
    }

    /// Rebuilds the totals from scratch.
    pub fn from_sales<'a>(sales: impl IntoIterator<Item = &'a Sale>) -> Totals {
        let mut totals = Totals::new();
        for sale in sales {
            totals.record(sale);
        }
        totals
    }

    pub fn bucket(&self, category: Category) -> &TotalsBucket {
        match category {
            Category::Vip => &self.vip,
            Category::Butacas => &self.butacas,
            Category::Generales => &self.generales,
        }
    }

    fn bucket_mut(&mut self, category: Category) -> &mut TotalsBucket {
        match category {
            Category::Vip => &mut self.vip,
            Category::Butacas => &mut self.butacas,
            Category::Generales => &mut self.generales,
        }
    }

    pub fn record(&mut self, sale: &Sale) {
        self.bucket_mut(sale.category()).add(sale.quantity(), sale.total());
        self.overall.add(sale.quantity(), sale.total());
    }

    pub fn revert(&mut self, sale: &Sale) {
        self.bucket_mut(sale.category()).subtract(sale.quantity(), sale.total());
        self.overall.subtract(sale.quantity(), sale.total());
    }

    /// True when `overall` equals the sum of the category buckets.
    pub fn is_balanced(&self) -> bool {
        let quantity: u64 = Category::ALL.iter().map(|c| self.bucket(*c).quantity).sum();
        let amount: Decimal = Category::ALL.iter().map(|c| self.bucket(*c).amount).sum();

        self.overall.quantity == quantity && self.overall.amount == amount
    }
}
