use crate::{Address, OutputIndex, Transaction, TransactionId};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// An unspent transaction output: the atomic unit of spendable value.
///
/// Created when a transaction's output is committed, destroyed when a later input
/// consumes it. Never mutated in place; the set it lives in is replaced wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utxo {
    source_tx_id: TransactionId,
    output_index: OutputIndex,
    owner: Address,
    amount: u64,
}

impl Utxo {
    pub fn new(
        source_tx_id: TransactionId,
        output_index: OutputIndex,
        owner: Address,
        amount: u64,
    ) -> Self {
        Self {
            source_tx_id,
            output_index,
            owner,
            amount,
        }
    }

    pub fn source_tx_id(&self) -> &TransactionId {
        &self.source_tx_id
    }

    pub fn output_index(&self) -> &OutputIndex {
        &self.output_index
    }

    pub fn owner(&self) -> &Address {
        &self.owner
    }

    pub fn amount(&self) -> u64 {
        self.amount
    }
}

/// The authoritative mapping of currently spendable outputs, indexed by the id of the
/// transaction that created them and their position within it.
///
/// Snapshot semantics: validation reads a snapshot, and `apply` folds a validated batch
/// into a new set rather than mutating this one. Callers keep the previous snapshot for
/// rollback and comparison, and serialize all snapshot replacement through one writer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UtxoSet {
    utxos: HashMap<(TransactionId, OutputIndex), Utxo>,
}

impl UtxoSet {
    pub fn new() -> Self {
        Self {
            utxos: HashMap::new(),
        }
    }

    pub fn find(&self, source_tx_id: &TransactionId, output_index: &OutputIndex) -> Option<&Utxo> {
        self.utxos.get(&(*source_tx_id, *output_index))
    }

    pub fn contains(&self, source_tx_id: &TransactionId, output_index: &OutputIndex) -> bool {
        self.utxos.contains_key(&(*source_tx_id, *output_index))
    }

    /// Used to seed the set, e.g. from a genesis block or a stored snapshot.
    pub fn insert(&mut self, utxo: Utxo) {
        self.utxos
            .insert((utxo.source_tx_id, utxo.output_index), utxo);
    }

    pub fn len(&self) -> usize {
        self.utxos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.utxos.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Utxo> {
        self.utxos.values()
    }

    /// Sum of all spendable amounts. Value only ever enters through coinbase outputs,
    /// so this grows by exactly the coinbase amount per committed block.
    pub fn total_value(&self) -> u128 {
        self.utxos.values().map(|utxo| utxo.amount as u128).sum()
    }

    /// Folds a validated batch into a new set: every output of every transaction
    /// becomes a new UTXO, and every key referenced by a non-coinbase input is removed.
    ///
    /// Only called after batch validation succeeds, so a consumed key that is missing
    /// from this snapshot indicates a validation bug rather than bad input.
    pub fn apply(&self, transactions: &[Transaction]) -> UtxoSet {
        let mut consumed: HashSet<(TransactionId, OutputIndex)> = HashSet::new();
        for transaction in transactions {
            for input in transaction.inputs() {
                if !input.is_coinbase() {
                    debug_assert!(
                        self.utxos.contains_key(&input.utxo_key()),
                        "validated batch consumes unknown UTXO {}",
                        input
                    );
                    consumed.insert(input.utxo_key());
                }
            }
        }

        let mut utxos: HashMap<(TransactionId, OutputIndex), Utxo> = self
            .utxos
            .iter()
            .filter(|(key, _)| !consumed.contains(key))
            .map(|(key, utxo)| (*key, utxo.clone()))
            .collect();

        for transaction in transactions {
            for (i, output) in transaction.outputs().iter().enumerate() {
                let utxo = Utxo::new(
                    *transaction.id(),
                    OutputIndex::new(i as u32),
                    output.to().clone(),
                    output.amount(),
                );
                utxos.insert((*utxo.source_tx_id(), *utxo.output_index()), utxo);
            }
        }

        UtxoSet { utxos }
    }
}
