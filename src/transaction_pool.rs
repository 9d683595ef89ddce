use crate::{
    OutputIndex, Transaction, TransactionId, TransactionValidator, UtxoSet, ValidationError,
};
use thiserror::Error;
use tracing::{info, warn};

/// A reason the pool refused a candidate transaction. The network collaborator treats
/// any of these as "do not relay, do not crash".
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdmissionError {
    #[error("Invalid transaction: {0}")]
    Invalid(#[from] ValidationError),
    #[error("Transaction input: {input} is already referenced by pool entry: {pool_entry}")]
    ConflictsWithPool {
        input: String,
        pool_entry: String,
    },
}

/// Candidate transactions that have not yet been included in a block.
///
/// Entries are kept in insertion order for observability; the order carries no
/// semantic weight. The pool holds two invariants: every entry validates against the
/// committed ledger it was admitted under, and no two entries reference the same
/// (transaction, index) input pair.
#[derive(Debug, Clone, Default)]
pub struct TransactionPool {
    transactions: Vec<Transaction>,
}

impl TransactionPool {
    pub fn new() -> Self {
        Self {
            transactions: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Admits a candidate: it must independently validate against the committed UTXO
    /// set, and none of its inputs may already be claimed by a pool entry. Conflicts
    /// are decided by the value of the referenced (transaction, index) pair, never by
    /// the identity of the input objects.
    pub fn admit(
        &mut self,
        transaction: Transaction,
        utxo_set: &UtxoSet,
    ) -> Result<(), AdmissionError> {
        TransactionValidator::validate(&transaction, utxo_set)?;
        for input in transaction.inputs() {
            if let Some(holder) = self.entry_referencing(input.utxo_key()) {
                warn!(
                    transaction_id = %transaction.id(),
                    input = %input,
                    pool_entry = %holder.id(),
                    "input already referenced by the pool"
                );
                return Err(AdmissionError::ConflictsWithPool {
                    input: input.to_string(),
                    pool_entry: holder.id().to_string(),
                });
            }
        }
        info!(transaction_id = %transaction.id(), "admitted transaction to the pool");
        self.transactions.push(transaction);
        Ok(())
    }

    fn entry_referencing(
        &self,
        key: (TransactionId, OutputIndex),
    ) -> Option<&Transaction> {
        self.transactions.iter().find(|entry| {
            entry
                .inputs()
                .iter()
                .any(|input| input.utxo_key() == key)
        })
    }

    /// Drops every pool entry that was included in a committed block. Called by the
    /// chain collaborator after it replaces its UTXO set snapshot.
    pub fn remove_committed(&mut self, committed: &[Transaction]) {
        self.transactions
            .retain(|entry| !committed.iter().any(|tx| tx.id() == entry.id()));
    }
}
