use serde::{Deserialize, Serialize};

/// Amount minted by the coinbase transaction of every block.
/// There is no halving schedule; emission is flat.
pub const COINBASE_AMOUNT: u64 = 50;

/// Consensus parameters for the ledger engine.
///
/// Passed explicitly to the batch validator instead of living in global state, so two
/// ledgers with different parameters can coexist in one process and tests stay
/// deterministic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Amount every coinbase output must mint.
    pub coinbase_amount: u64,
    /// Whether the coinbase input signature is verified against the coinbase output's
    /// owner. Off by default: the coinbase input references no UTXO, so there is no
    /// prior owner to authenticate against.
    pub verify_coinbase_signature: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            coinbase_amount: COINBASE_AMOUNT,
            verify_coinbase_signature: false,
        }
    }
}
