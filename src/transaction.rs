use crate::{Address, Sha256, Signature};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

// Set all bits to 0. The coinbase input points at no real transaction.
const COINBASE_UTXO_ID: TransactionId = TransactionId(Sha256::from_raw([0; 32]));

/// A SHA-256 hash of the transaction inputs and outputs.
#[derive(Debug, Hash, Eq, PartialEq, Copy, Clone, Serialize, Deserialize)]
pub struct TransactionId(Sha256);

impl Display for TransactionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TransactionId {
    pub fn new(data: Sha256) -> Self {
        Self(data)
    }

    pub fn as_slice(&self) -> &[u8] {
        self.0.as_slice()
    }
}

/// The index of the transaction output.
///
/// The coinbase input reuses this field to encode the block height it was minted at.
#[derive(Debug, Hash, Eq, PartialEq, Copy, Clone, Serialize, Deserialize)]
pub struct OutputIndex(u32);

impl Display for OutputIndex {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl OutputIndex {
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionInput {
    // 32 bytes. A pointer to the transaction containing the UTXO to be spent.
    utxo_id: TransactionId,
    // 4 bytes. The number of the UTXO to be spent, the first one is 0.
    output_index: OutputIndex,
    // Proof that the owner of the referenced UTXO authorized this spend.
    // The signed message is the id of the spending transaction.
    signature: Signature,
}

impl Display for TransactionInput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.utxo_id, self.output_index)
    }
}

impl TransactionInput {
    pub fn new(utxo_id: TransactionId, output_index: OutputIndex, signature: Signature) -> Self {
        Self {
            utxo_id,
            output_index,
            signature,
        }
    }

    pub fn utxo_id(&self) -> &TransactionId {
        &self.utxo_id
    }

    pub fn output_index(&self) -> &OutputIndex {
        &self.output_index
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// The key the referenced UTXO is stored under.
    pub fn utxo_key(&self) -> (TransactionId, OutputIndex) {
        (self.utxo_id, self.output_index)
    }

    pub fn new_coinbase(block_height: u32) -> Self {
        Self::new_coinbase_signed(block_height, Signature::empty())
    }

    /// Coinbase input carrying a miner signature, for ledgers that enforce the strict
    /// coinbase signature policy.
    pub fn new_coinbase_signed(block_height: u32, signature: Signature) -> Self {
        Self {
            utxo_id: COINBASE_UTXO_ID,
            output_index: OutputIndex::new(block_height),
            signature,
        }
    }

    pub fn is_coinbase(&self) -> bool {
        self.utxo_id == COINBASE_UTXO_ID
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionOutput {
    to: Address,
    amount: u64,
}

impl TransactionOutput {
    pub fn new(to: Address, amount: u64) -> Self {
        Self { to, amount }
    }

    pub fn to(&self) -> &Address {
        &self.to
    }

    pub fn amount(&self) -> u64 {
        self.amount
    }
}

/// A transfer of ownership over a set of UTXOs.
///
/// A transaction is immutable once constructed. Its id is the hash of its inputs and
/// outputs, so a transaction that arrives from the network with a stale or forged id
/// fails validation when the id is recomputed. Input signatures are deliberately not
/// part of the hash preimage, which lets the wallet compute the id first and then sign
/// it for every input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    id: TransactionId,
    inputs: Vec<TransactionInput>,
    outputs: Vec<TransactionOutput>,
}

impl Transaction {
    pub fn new(inputs: Vec<TransactionInput>, outputs: Vec<TransactionOutput>) -> Self {
        let id = Self::compute_id(&inputs, &outputs);
        Self {
            id,
            inputs,
            outputs,
        }
    }

    /// Constructs a transaction without recomputing its id, e.g. one received from a
    /// peer. The validator checks the id, so a mismatch is caught there rather than
    /// silently repaired here.
    pub fn from_parts(
        id: TransactionId,
        inputs: Vec<TransactionInput>,
        outputs: Vec<TransactionOutput>,
    ) -> Self {
        Self {
            id,
            inputs,
            outputs,
        }
    }

    /// The value-creating transaction included once per block. Its single input
    /// references no UTXO and encodes the block height as the output index.
    pub fn new_coinbase(to: Address, block_height: u32, amount: u64) -> Self {
        let inputs = vec![TransactionInput::new_coinbase(block_height)];
        let outputs = vec![TransactionOutput::new(to, amount)];
        Self::new(inputs, outputs)
    }

    pub fn id(&self) -> &TransactionId {
        &self.id
    }

    pub fn inputs(&self) -> &[TransactionInput] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[TransactionOutput] {
        &self.outputs
    }

    /// Derives the content-addressed id: each input's referenced (transaction, index)
    /// pair in sequence order, then each output's (owner, amount) in sequence order,
    /// hashed with SHA-256. Order is part of the preimage, so reordering otherwise
    /// identical inputs or outputs produces a different id. That behavior is load
    /// bearing for compatibility and must not change.
    pub fn compute_id(
        inputs: &[TransactionInput],
        outputs: &[TransactionOutput],
    ) -> TransactionId {
        let mut data = String::new();
        for input in inputs {
            data.push_str(&format!("{}{}", input.utxo_id(), input.output_index()));
        }
        for output in outputs {
            data.push_str(&format!("{}{}", output.to(), output.amount()));
        }
        TransactionId(Sha256::digest(data.as_bytes()))
    }
}
