// Course ledger core: deterministic, in-memory, replayable.

pub mod auth;
pub mod config;
pub mod error;
pub mod ledger;
pub mod principal;
pub mod replay;
pub mod shared;
pub mod tx;
pub mod types;

pub use config::{LedgerConfig, LedgerPolicy, ReenrollmentPolicy};
pub use error::{ErrorKind, LedgerError};
pub use ledger::Ledger;
pub use principal::Principal;
pub use shared::SharedLedger;
pub use tx::{Call, Receipt, Transaction, Value};

// Bumped whenever the canonical encoding behind the state root changes.
pub const STATE_ENCODING_VERSION: u8 = 1;

/*
Intentionally avoids:
- async
- wall clock access
- randomness
- global mutable state
- external IO (the replay binary is the only host)
*/
