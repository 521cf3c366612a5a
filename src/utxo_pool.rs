use crate::{Coin, OutputIndex, Transaction, TransactionId, TransactionOutput};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::convert::TryFrom;
use std::fmt::{Display, Formatter};

/// A reference to a transaction output: the transaction that created it and its index.
#[derive(Debug, Hash, Ord, PartialOrd, Eq, PartialEq, Copy, Clone, Serialize, Deserialize)]
pub struct Utxo {
    transaction_id: TransactionId,
    output_index: OutputIndex,
}

impl Utxo {
    pub fn new(transaction_id: TransactionId, output_index: OutputIndex) -> Self {
        Self {
            transaction_id,
            output_index,
        }
    }

    pub fn transaction_id(&self) -> &TransactionId {
        &self.transaction_id
    }

    pub fn output_index(&self) -> OutputIndex {
        self.output_index
    }
}

impl Display for Utxo {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.transaction_id, self.output_index)
    }
}

/// A pool of confirmed and unspent transaction outputs.
///
/// Cloning the pool produces an independent copy.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<UtxoEntry>", into = "Vec<UtxoEntry>")]
pub struct UtxoPool {
    utxos: HashMap<Utxo, TransactionOutput>,
}

impl UtxoPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the output, replacing any output previously stored under the same reference.
    pub fn add_utxo(&mut self, utxo: Utxo, output: TransactionOutput) {
        self.utxos.insert(utxo, output);
    }

    /// Removes the output. Removing an output that is not present is a no-op.
    pub fn remove_utxo(&mut self, utxo: &Utxo) -> Option<TransactionOutput> {
        self.utxos.remove(utxo)
    }

    pub fn get_output(&self, utxo: &Utxo) -> Option<&TransactionOutput> {
        self.utxos.get(utxo)
    }

    pub fn contains(&self, utxo: &Utxo) -> bool {
        self.utxos.contains_key(utxo)
    }

    pub fn len(&self) -> usize {
        self.utxos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.utxos.is_empty()
    }

    /// All output references in the pool, sorted.
    pub fn utxos(&self) -> Vec<Utxo> {
        let mut utxos = self.utxos.keys().copied().collect::<Vec<Utxo>>();
        utxos.sort();
        utxos
    }

    /// The total value held by the pool, or None if it doesn't fit.
    pub fn total_value(&self) -> Option<Coin> {
        Coin::checked_sum(self.utxos.values().map(TransactionOutput::amount))
    }

    /// Commits the transaction: spends all of its inputs and adds all of its outputs.
    /// The caller is responsible for validating the transaction first.
    pub fn apply(&mut self, transaction: &Transaction) {
        for input in transaction.inputs() {
            self.remove_utxo(&Utxo::new(*input.utxo_id(), input.output_index()));
        }
        for (index, output) in transaction.outputs().iter().enumerate() {
            let utxo = Utxo::new(*transaction.id(), OutputIndex::new(index as u32));
            self.add_utxo(utxo, output.clone());
        }
    }
}

/// The serialized form of a single pool entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UtxoEntry {
    pub utxo: Utxo,
    pub output: TransactionOutput,
}

impl TryFrom<Vec<UtxoEntry>> for UtxoPool {
    type Error = String;

    /// Each output reference must appear at most once in a snapshot.
    fn try_from(entries: Vec<UtxoEntry>) -> Result<Self, Self::Error> {
        let mut pool = UtxoPool::new();
        for entry in entries {
            if pool.contains(&entry.utxo) {
                return Err(format!("Duplicate UTXO in snapshot: {}", entry.utxo));
            }
            pool.add_utxo(entry.utxo, entry.output);
        }
        Ok(pool)
    }
}

impl From<UtxoPool> for Vec<UtxoEntry> {
    fn from(pool: UtxoPool) -> Self {
        let mut entries = pool
            .utxos
            .into_iter()
            .map(|(utxo, output)| UtxoEntry { utxo, output })
            .collect::<Vec<UtxoEntry>>();
        entries.sort_by(|lhs, rhs| lhs.utxo.cmp(&rhs.utxo));
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{KeyPair, Sha256, TransactionBuilder};

    fn utxo(seed: &[u8], index: u32) -> Utxo {
        Utxo::new(
            TransactionId::new(Sha256::digest(seed)),
            OutputIndex::new(index),
        )
    }

    #[test]
    fn absent_keys_are_not_present() {
        let alice = KeyPair::from_seed([1; 32]).address();
        let mut pool = UtxoPool::new();
        pool.add_utxo(utxo(b"a", 0), TransactionOutput::new(Coin::new(10), alice));

        assert!(pool.get_output(&utxo(b"a", 1)).is_none());
        assert!(pool.remove_utxo(&utxo(b"a", 0)).is_some());
        assert!(pool.remove_utxo(&utxo(b"a", 0)).is_none());
        assert!(pool.is_empty());
    }

    #[test]
    fn clone_is_independent() {
        let alice = KeyPair::from_seed([1; 32]).address();
        let mut pool = UtxoPool::new();
        pool.add_utxo(utxo(b"a", 0), TransactionOutput::new(Coin::new(10), alice));

        let mut copy = pool.clone();
        copy.remove_utxo(&utxo(b"a", 0));
        assert_eq!(pool.len(), 1);
        assert!(copy.is_empty());
    }

    #[test]
    fn apply_spends_inputs_and_adds_outputs() {
        let alice = KeyPair::from_seed([1; 32]);
        let bob = KeyPair::from_seed([2; 32]).address();
        let funding = utxo(b"funding", 0);
        let mut pool = UtxoPool::new();
        pool.add_utxo(
            funding,
            TransactionOutput::new(Coin::new(10), alice.address()),
        );

        let mut builder = TransactionBuilder::new();
        builder
            .add_input(*funding.transaction_id(), funding.output_index())
            .add_output(Coin::new(4), bob)
            .add_output(Coin::new(6), alice.address());
        let transaction = builder.build();
        pool.apply(&transaction);

        assert!(!pool.contains(&funding));
        assert_eq!(
            pool.utxos(),
            {
                let mut expected = vec![
                    Utxo::new(*transaction.id(), OutputIndex::new(0)),
                    Utxo::new(*transaction.id(), OutputIndex::new(1)),
                ];
                expected.sort();
                expected
            }
        );
        assert_eq!(pool.total_value(), Some(Coin::new(10)));
    }

    #[test]
    fn serializes_as_sorted_entries() {
        let alice = KeyPair::from_seed([1; 32]).address();
        let mut pool = UtxoPool::new();
        pool.add_utxo(utxo(b"b", 1), TransactionOutput::new(Coin::new(2), alice));
        pool.add_utxo(utxo(b"a", 0), TransactionOutput::new(Coin::new(1), alice));

        let entries: Vec<UtxoEntry> = pool.clone().into();
        let keys = entries.iter().map(|e| e.utxo).collect::<Vec<Utxo>>();
        assert_eq!(keys, pool.utxos());

        let json = serde_json::to_string(&pool).unwrap();
        assert_eq!(serde_json::from_str::<UtxoPool>(&json).unwrap(), pool);
    }

    #[test]
    fn snapshot_with_duplicate_utxo_is_rejected() {
        let alice = KeyPair::from_seed([1; 32]).address();
        let entry = UtxoEntry {
            utxo: utxo(b"a", 0),
            output: TransactionOutput::new(Coin::new(1), alice),
        };
        let json = serde_json::to_string(&vec![entry.clone(), entry.clone()]).unwrap();

        let err = serde_json::from_str::<UtxoPool>(&json).unwrap_err();
        assert!(err.to_string().contains("Duplicate UTXO"));
        assert_eq!(UtxoPool::try_from(vec![entry]).map(|p| p.len()), Ok(1));
    }
}
