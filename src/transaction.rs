use crate::{Address, Coin, KeyPair, Sha256};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// A double SHA-256 hash of the transaction data.
#[derive(Debug, Hash, Ord, PartialOrd, Eq, PartialEq, Copy, Clone, Serialize, Deserialize)]
#[serde(transparent)]
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

/// The index of the transaction output, the first one is 0.
#[derive(Debug, Hash, Ord, PartialOrd, Eq, PartialEq, Copy, Clone, Serialize, Deserialize)]
#[serde(transparent)]
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

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct TransactionInput {
    // 32 bytes. A pointer to the transaction containing the UTXO to be spent.
    utxo_id: TransactionId,
    // 4 bytes. The number of the UTXO to be spent.
    output_index: OutputIndex,
    // Signature of the UTXO owner over the signing payload of this input.
    // Empty until the input is signed.
    #[serde(with = "hex_bytes")]
    signature: Vec<u8>,
}

impl Display for TransactionInput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.utxo_id, self.output_index)
    }
}

impl TransactionInput {
    pub fn new(utxo_id: TransactionId, output_index: OutputIndex) -> Self {
        Self::new_signed(utxo_id, output_index, vec![])
    }

    pub fn new_signed(
        utxo_id: TransactionId,
        output_index: OutputIndex,
        signature: Vec<u8>,
    ) -> Self {
        Self {
            utxo_id,
            output_index,
            signature,
        }
    }

    pub fn utxo_id(&self) -> &TransactionId {
        &self.utxo_id
    }

    pub fn output_index(&self) -> OutputIndex {
        self.output_index
    }

    pub fn signature(&self) -> &[u8] {
        &self.signature
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct TransactionOutput {
    amount: Coin,
    address: Address,
}

impl Display for TransactionOutput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.amount, self.address)
    }
}

impl TransactionOutput {
    pub fn new(amount: Coin, address: Address) -> Self {
        Self { amount, address }
    }

    pub fn amount(&self) -> Coin {
        self.amount
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    fn write_bytes(&self, data: &mut Vec<u8>) {
        data.extend_from_slice(&self.amount.value().to_le_bytes());
        data.extend_from_slice(self.address.as_bytes());
    }
}

/// An immutable transaction. The id is derived from the content at construction.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(from = "TransactionData", into = "TransactionData")]
pub struct Transaction {
    id: TransactionId,
    inputs: Vec<TransactionInput>,
    outputs: Vec<TransactionOutput>,
}

impl Transaction {
    pub fn new(inputs: Vec<TransactionInput>, outputs: Vec<TransactionOutput>) -> Self {
        let id = Self::hash_transaction_data(&inputs, &outputs);
        Self {
            id,
            inputs,
            outputs,
        }
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

    /// Returns the bytes the owner of the input at `index` must sign, or None if there is no
    /// such input.
    pub fn signing_payload(&self, index: usize) -> Option<Vec<u8>> {
        signing_payload(&self.inputs, &self.outputs, index)
    }

    fn hash_transaction_data(
        inputs: &[TransactionInput],
        outputs: &[TransactionOutput],
    ) -> TransactionId {
        // Counts and signature lengths are length-prefixed, so distinct transactions can't share
        // a preimage.
        let mut data = vec![];
        data.extend_from_slice(&(inputs.len() as u64).to_le_bytes());
        for input in inputs {
            data.extend_from_slice(input.utxo_id.as_slice());
            data.extend_from_slice(&input.output_index.value().to_le_bytes());
            data.extend_from_slice(&(input.signature.len() as u64).to_le_bytes());
            data.extend_from_slice(&input.signature);
        }
        data.extend_from_slice(&(outputs.len() as u64).to_le_bytes());
        for output in outputs {
            output.write_bytes(&mut data);
        }
        TransactionId(Sha256::double_digest(&data))
    }
}

/// The payload covers the spent output reference of one input and every output, but neither
/// the other inputs nor any signature, so each input can be signed independently.
fn signing_payload(
    inputs: &[TransactionInput],
    outputs: &[TransactionOutput],
    index: usize,
) -> Option<Vec<u8>> {
    let input = inputs.get(index)?;
    let mut data = vec![];
    data.extend_from_slice(input.utxo_id.as_slice());
    data.extend_from_slice(&input.output_index.value().to_le_bytes());
    for output in outputs {
        output.write_bytes(&mut data);
    }
    Some(data)
}

/// Assembles and signs a transaction before its id is fixed.
#[derive(Debug, Clone, Default)]
pub struct TransactionBuilder {
    inputs: Vec<TransactionInput>,
    outputs: Vec<TransactionOutput>,
}

impl TransactionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_input(&mut self, utxo_id: TransactionId, output_index: OutputIndex) -> &mut Self {
        self.inputs
            .push(TransactionInput::new(utxo_id, output_index));
        self
    }

    pub fn add_output(&mut self, amount: Coin, address: Address) -> &mut Self {
        self.outputs.push(TransactionOutput::new(amount, address));
        self
    }

    pub fn signing_payload(&self, index: usize) -> Option<Vec<u8>> {
        signing_payload(&self.inputs, &self.outputs, index)
    }

    pub fn sign_input(&mut self, index: usize, key_pair: &KeyPair) -> Result<&mut Self, String> {
        let payload = self.signing_payload(index).ok_or_else(|| {
            format!(
                "Input index: {} is out of range, the transaction has {} inputs.",
                index,
                self.inputs.len()
            )
        })?;
        self.inputs[index].signature = key_pair.sign(&payload);
        Ok(self)
    }

    pub fn build(&self) -> Transaction {
        Transaction::new(self.inputs.clone(), self.outputs.clone())
    }
}

impl From<Transaction> for TransactionBuilder {
    fn from(transaction: Transaction) -> Self {
        Self {
            inputs: transaction.inputs,
            outputs: transaction.outputs,
        }
    }
}

/// The serialized form of a transaction. The id is not stored, it's recomputed on load.
#[derive(Serialize, Deserialize)]
struct TransactionData {
    inputs: Vec<TransactionInput>,
    outputs: Vec<TransactionOutput>,
}

impl From<TransactionData> for Transaction {
    fn from(data: TransactionData) -> Self {
        Transaction::new(data.inputs, data.outputs)
    }
}

impl From<Transaction> for TransactionData {
    fn from(transaction: Transaction) -> Self {
        Self {
            inputs: transaction.inputs,
            outputs: transaction.outputs,
        }
    }
}

mod hex_bytes {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(&s).map_err(D::Error::custom)
    }
}
