use log::{debug, error, info, warn};

use super::sale::Sale;
use super::totals::Totals;
use super::{Category, LedgerError};
use crate::data::{self, STORAGE_KEY};
use crate::storage::{KeyValueStore, StorageError, Store};

/// Owns the recorded sales, their running totals and the store they are
/// persisted into. Every mutation is written through before it returns.
#[derive(Debug)]
pub struct Ledger {
    sales: Vec<Sale>,
    totals: Totals,
    next_id: u64,
    store: Store,
}

impl Ledger {
    /// An empty ledger. Nothing is read from or written to `store` until the
    /// first mutation.
    pub fn new(store: Store) -> Ledger {
        Ledger {
            sales: Vec::new(),
            totals: Totals::new(),
            next_id: 1,
            store,
        }
    }

    /// Restores the ledger persisted in `store`.
    ///
    /// Malformed data, including stored sales that fail validation or share
    /// an id, is logged and replaced by an empty ledger. Only a failure to
    /// read the store itself is returned.
    pub fn load(store: Store) -> Result<Ledger, StorageError> {
        let mut ledger = Ledger::new(store);

        let Some(raw) = ledger.store.get(STORAGE_KEY)? else {
            debug!("no stored sales under {}, starting empty", STORAGE_KEY);
            return Ok(ledger);
        };

        let stored = match data::decode(&raw) {
            Ok(stored) => stored,
            Err(err) => {
                error!("failed to load stored sales, starting empty, err={}", err);
                return Ok(ledger);
            },
        };

        let rebuilt = Totals::from_sales(&stored.sales);
        ledger.totals = match stored.totals {
            Some(totals) if totals == rebuilt => totals,
            Some(_) => {
                warn!("stored totals do not match stored sales, rebuilding");
                rebuilt
            },
            None => {
                warn!("stored data has no totals, rebuilding");
                rebuilt
            },
        };

        ledger.next_id = stored.next_id;
        ledger.sales = stored.sales;

        info!("loaded {} sales", ledger.sales.len());
        Ok(ledger)
    }

    /// Records a new sale and returns it.
    ///
    /// If the sale cannot be persisted it is taken back out of the ledger.
    pub fn add_sale(&mut self, client_name: &str, category: Category, quantity: u32) -> Result<Sale, LedgerError> {
        let sale = Sale::new(self.next_id, client_name, category, quantity)?;
        let next_id = self.next_id.checked_add(1).ok_or(LedgerError::IdsExhausted)?;

        self.sales.push(sale.clone());
        self.totals.record(&sale);
        self.next_id = next_id;

        if let Err(err) = self.save() {
            self.sales.pop();
            self.totals.revert(&sale);
            self.next_id = sale.id();
            return Err(err);
        }

        debug!("added sale, id={}, category={}, quantity={}", sale.id(), category, quantity);

        Ok(sale)
    }

    /// Removes the sale with the given id.
    pub fn delete_sale(&mut self, id: u64) -> Result<Sale, LedgerError> {
        let index = self
            .sales
            .iter()
            .position(|sale| sale.id() == id)
            .ok_or(LedgerError::NotFound(id))?;

        let sale = self.sales.remove(index);
        self.totals.revert(&sale);

        if let Err(err) = self.save() {
            self.totals.record(&sale);
            self.sales.insert(index, sale);
            return Err(err);
        }

        debug!("deleted sale, id={}", id);

        Ok(sale)
    }

    pub fn totals(&self) -> &Totals {
        &self.totals
    }

    /// Sales in the order they were recorded.
    pub fn sales(&self) -> &[Sale] {
        &self.sales
    }

    pub fn sale(&self, id: u64) -> Option<&Sale> {
        self.sales.iter().find(|sale| sale.id() == id)
    }

    #[cfg(test)]
    pub(crate) fn store(&self) -> &Store {
        &self.store
    }

    fn save(&mut self) -> Result<(), LedgerError> {
        let raw = data::encode(&self.sales, &self.totals, self.next_id).map_err(|err| {
            error!("failed to encode sales, err={}", err);
            LedgerError::Serialization(err)
        })?;

        self.store.set(STORAGE_KEY, &raw).map_err(|err| {
            error!("failed to save sales, err={}", err);
            LedgerError::Storage(err)
        })
    }
}
