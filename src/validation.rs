use crate::{
    verify_signature, AddressError, LedgerConfig, OutputIndex, Transaction, TransactionId,
    UtxoSet,
};
use std::collections::HashSet;
use thiserror::Error;
use tracing::warn;

/// A typed, recoverable reason for rejecting a transaction or a block's transactions.
/// Each variant carries enough context for the caller to log and discard the offender.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Transaction: {transaction_id} does not match its recomputed id: {computed}")]
    IdMismatch {
        transaction_id: TransactionId,
        computed: TransactionId,
    },
    #[error("Transaction: {transaction_id} is malformed: {reason}")]
    MalformedTransaction {
        transaction_id: TransactionId,
        reason: String,
    },
    #[error("Transaction: {transaction_id} references unknown UTXO: {utxo_id}:{output_index}")]
    UnknownUtxo {
        transaction_id: TransactionId,
        utxo_id: TransactionId,
        output_index: OutputIndex,
    },
    #[error(
        "Transaction: {transaction_id} carries an invalid signature for UTXO: \
         {utxo_id}:{output_index}"
    )]
    BadSignature {
        transaction_id: TransactionId,
        utxo_id: TransactionId,
        output_index: OutputIndex,
    },
    #[error(
        "Transaction: {transaction_id} does not conserve value. \
         Inputs: {total_inputs} but outputs: {total_outputs}"
    )]
    ValueMismatch {
        transaction_id: TransactionId,
        total_inputs: u128,
        total_outputs: u128,
    },
    #[error("Invalid coinbase transaction: {0}")]
    InvalidCoinbase(String),
    #[error("UTXO: {utxo_id}:{output_index} is spent more than once within the block")]
    DoubleSpendWithinBlock {
        utxo_id: TransactionId,
        output_index: OutputIndex,
    },
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
}

impl From<AddressError> for ValidationError {
    fn from(e: AddressError) -> Self {
        ValidationError::InvalidAddress(e.to_string())
    }
}

/// Per-transaction structural, cryptographic and balance checks against a UTXO set
/// snapshot. The snapshot is only read, so any number of validations may run against
/// it concurrently.
pub struct TransactionValidator {}

impl TransactionValidator {
    pub fn validate(transaction: &Transaction, utxo_set: &UtxoSet) -> Result<(), ValidationError> {
        Self::validate_id_matches_content(transaction)?;
        Self::validate_has_inputs_and_outputs(transaction)?;
        Self::validate_inputs_exist_and_are_authorized(transaction, utxo_set)?;
        Self::validate_value_is_conserved(transaction, utxo_set)
    }

    fn validate_id_matches_content(transaction: &Transaction) -> Result<(), ValidationError> {
        let computed = Transaction::compute_id(transaction.inputs(), transaction.outputs());
        if &computed != transaction.id() {
            warn!(transaction_id = %transaction.id(), %computed, "transaction id mismatch");
            return Err(ValidationError::IdMismatch {
                transaction_id: *transaction.id(),
                computed,
            });
        }
        Ok(())
    }

    fn validate_has_inputs_and_outputs(transaction: &Transaction) -> Result<(), ValidationError> {
        if transaction.inputs().is_empty() {
            return Err(ValidationError::MalformedTransaction {
                transaction_id: *transaction.id(),
                reason: "transaction has no inputs".to_string(),
            });
        }
        if transaction.outputs().is_empty() {
            return Err(ValidationError::MalformedTransaction {
                transaction_id: *transaction.id(),
                reason: "transaction has no outputs".to_string(),
            });
        }
        Ok(())
    }

    /// Every input must reference a UTXO present in the snapshot, and its signature
    /// over the transaction id must verify against that UTXO's owner. An absent UTXO
    /// uniformly covers both a double-spend against committed history and a dangling
    /// reference.
    fn validate_inputs_exist_and_are_authorized(
        transaction: &Transaction,
        utxo_set: &UtxoSet,
    ) -> Result<(), ValidationError> {
        for input in transaction.inputs() {
            let utxo = match utxo_set.find(input.utxo_id(), input.output_index()) {
                Some(utxo) => utxo,
                None => {
                    warn!(
                        transaction_id = %transaction.id(),
                        input = %input,
                        "referenced UTXO not found"
                    );
                    return Err(ValidationError::UnknownUtxo {
                        transaction_id: *transaction.id(),
                        utxo_id: *input.utxo_id(),
                        output_index: *input.output_index(),
                    });
                }
            };
            if !verify_signature(transaction.id(), input.signature(), utxo.owner()) {
                warn!(
                    transaction_id = %transaction.id(),
                    input = %input,
                    owner = %utxo.owner(),
                    "invalid input signature"
                );
                return Err(ValidationError::BadSignature {
                    transaction_id: *transaction.id(),
                    utxo_id: *input.utxo_id(),
                    output_index: *input.output_index(),
                });
            }
        }
        Ok(())
    }

    /// Inputs must exactly equal outputs. No fee is extracted; a surplus is rejected,
    /// not donated. Sums are accumulated in u128 so adversarial u64 amounts cannot
    /// overflow.
    fn validate_value_is_conserved(
        transaction: &Transaction,
        utxo_set: &UtxoSet,
    ) -> Result<(), ValidationError> {
        let total_inputs: u128 = transaction
            .inputs()
            .iter()
            .filter_map(|input| utxo_set.find(input.utxo_id(), input.output_index()))
            .map(|utxo| utxo.amount() as u128)
            .sum();
        let total_outputs: u128 = transaction
            .outputs()
            .iter()
            .map(|output| output.amount() as u128)
            .sum();
        if total_inputs != total_outputs {
            warn!(
                transaction_id = %transaction.id(),
                total_inputs,
                total_outputs,
                "transaction does not conserve value"
            );
            return Err(ValidationError::ValueMismatch {
                transaction_id: *transaction.id(),
                total_inputs,
                total_outputs,
            });
        }
        Ok(())
    }
}

/// Validates an ordered batch of one coinbase plus N ordinary transactions as a unit.
/// All inputs are resolved against the same pre-block snapshot, so a transaction may
/// not spend an output created by a sibling in the same block.
pub struct BlockValidator {}

impl BlockValidator {
    pub fn validate_block_transactions(
        transactions: &[Transaction],
        utxo_set: &UtxoSet,
        block_height: u64,
        config: &LedgerConfig,
    ) -> Result<(), ValidationError> {
        let coinbase = transactions.first().ok_or_else(|| {
            ValidationError::InvalidCoinbase(
                "the first transaction in the block must be the coinbase".to_string(),
            )
        })?;
        Self::validate_coinbase(coinbase, block_height, config)?;
        Self::validate_no_duplicate_spends(&transactions[1..])?;
        for transaction in &transactions[1..] {
            TransactionValidator::validate(transaction, utxo_set)?;
        }
        Ok(())
    }

    /// The coinbase references no real UTXO: its single input encodes the block height
    /// as the output index and is never looked up. Its signature is only checked when
    /// the configured policy asks for it, against the coinbase output's owner.
    fn validate_coinbase(
        transaction: &Transaction,
        block_height: u64,
        config: &LedgerConfig,
    ) -> Result<(), ValidationError> {
        let invalid = |reason: String| {
            warn!(transaction_id = %transaction.id(), %reason, "invalid coinbase");
            Err(ValidationError::InvalidCoinbase(reason))
        };

        let computed = Transaction::compute_id(transaction.inputs(), transaction.outputs());
        if &computed != transaction.id() {
            return invalid(format!(
                "coinbase id: {} does not match its recomputed id: {}",
                transaction.id(),
                computed
            ));
        }
        let input = match transaction.inputs() {
            [input] => input,
            inputs => {
                return invalid(format!(
                    "coinbase must have exactly one input but has: {}",
                    inputs.len()
                ))
            }
        };
        if !input.is_coinbase() {
            return invalid(format!(
                "coinbase input must not reference a UTXO: {}",
                input
            ));
        }
        if u64::from(input.output_index().value()) != block_height {
            return invalid(format!(
                "coinbase input index: {} must encode the block height: {}",
                input.output_index(),
                block_height
            ));
        }
        let output = match transaction.outputs() {
            [output] => output,
            outputs => {
                return invalid(format!(
                    "coinbase must have exactly one output but has: {}",
                    outputs.len()
                ))
            }
        };
        if output.amount() != config.coinbase_amount {
            return invalid(format!(
                "coinbase amount: {} must be: {}",
                output.amount(),
                config.coinbase_amount
            ));
        }
        if config.verify_coinbase_signature
            && !verify_signature(transaction.id(), input.signature(), output.to())
        {
            return invalid("coinbase signature does not verify against its output owner".to_string());
        }
        Ok(())
    }

    /// Collects every (transaction, index) pair referenced by the ordinary
    /// transactions. The pairs are compared by value, never by the identity of the
    /// input objects: two distinct inputs with equal fields are the same spend.
    fn validate_no_duplicate_spends(
        transactions: &[Transaction],
    ) -> Result<(), ValidationError> {
        let mut seen: HashSet<(TransactionId, OutputIndex)> = HashSet::new();
        for transaction in transactions {
            for input in transaction.inputs() {
                if !seen.insert(input.utxo_key()) {
                    warn!(input = %input, "UTXO spent more than once within the block");
                    return Err(ValidationError::DoubleSpendWithinBlock {
                        utxo_id: *input.utxo_id(),
                        output_index: *input.output_index(),
                    });
                }
            }
        }
        Ok(())
    }
}
