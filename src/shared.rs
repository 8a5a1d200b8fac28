// Thread-safe handle for hosts that accept calls concurrently.
// One mutex around the whole ledger: each top-level call holds it from start to commit.

use crate::config::LedgerConfig;
use crate::ledger::{Hash, Ledger, LedgerSnapshot};
use crate::tx::{Receipt, Transaction};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct SharedLedger {
    inner: Arc<Mutex<Ledger>>,
}

impl SharedLedger {
    pub fn new(config: LedgerConfig) -> Self {
        Self::from_ledger(Ledger::new(config))
    }

    pub fn from_ledger(ledger: Ledger) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ledger)),
        }
    }

    pub fn apply(&self, tx: &Transaction) -> Receipt {
        self.inner.lock().apply(tx)
    }

    /// Apply a batch with no other caller interleaved.
    pub fn apply_batch(&self, txs: &[Transaction]) -> Vec<Receipt> {
        let mut ledger = self.inner.lock();
        txs.iter().map(|tx| ledger.apply(tx)).collect()
    }

    /// Run a read-only query against a consistent view.
    pub fn read<R>(&self, f: impl FnOnce(&Ledger) -> R) -> R {
        f(&self.inner.lock())
    }

    pub fn state_root(&self) -> Hash {
        self.read(Ledger::state_root)
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        self.read(Ledger::snapshot)
    }
}
