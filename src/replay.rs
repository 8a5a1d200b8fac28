// Deterministic replay of an ordered transaction log.
// Same config + same log => same receipts and same root after every step.

use crate::config::LedgerConfig;
use crate::ledger::{Hash, Ledger};
use crate::tx::{Receipt, Transaction};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplayStep {
    pub index: usize,
    pub tx_hash: Hash,
    pub receipt: Receipt,
    /// Root after this step (unchanged from the previous one when the receipt is an error).
    pub state_root: Hash,
}

#[derive(Debug)]
pub struct ReplayOutcome {
    pub ledger: Ledger,
    pub steps: Vec<ReplayStep>,
}

impl ReplayOutcome {
    pub fn final_root(&self) -> Hash {
        self.ledger.state_root()
    }

    pub fn rejected(&self) -> usize {
        self.steps.iter().filter(|s| !s.receipt.is_ok()).count()
    }
}

pub fn replay(config: LedgerConfig, txs: &[Transaction]) -> ReplayOutcome {
    let mut ledger = Ledger::new(config);
    let steps = apply_all(&mut ledger, txs, 0);
    let outcome = ReplayOutcome { ledger, steps };
    info!(
        applied = outcome.steps.len(),
        rejected = outcome.rejected(),
        root = %hex::encode(outcome.final_root()),
        "replay finished"
    );
    outcome
}

/// Continue an existing ledger with more calls; `first_index` numbers the steps.
pub fn apply_all(ledger: &mut Ledger, txs: &[Transaction], first_index: usize) -> Vec<ReplayStep> {
    let mut steps = Vec::with_capacity(txs.len());
    for (i, tx) in txs.iter().enumerate() {
        let receipt = ledger.apply(tx);
        let state_root = ledger.state_root();
        debug!(
            index = first_index + i,
            op = tx.call.op_name(),
            ok = receipt.is_ok(),
            "applied"
        );
        steps.push(ReplayStep {
            index: first_index + i,
            tx_hash: tx.hash(),
            receipt,
            state_root,
        });
    }
    steps
}

/// JSON document consumed by the replay binary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxLog {
    pub config: LedgerConfig,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

impl TxLog {
    pub fn from_json(s: &str) -> Result<Self, String> {
        serde_json::from_str(s).map_err(|e| format!("invalid transaction log: {}", e))
    }

    pub fn replay(&self) -> ReplayOutcome {
        replay(self.config.clone(), &self.transactions)
    }
}
