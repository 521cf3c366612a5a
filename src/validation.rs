use crate::{
    Coin, Ed25519Verifier, SignatureVerifier, Transaction, TransactionOutput, Utxo, UtxoPool,
};
use std::collections::HashSet;
use tracing::debug;

/// Reasons a transaction is not admissible against a pool.
#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Transaction has no inputs")]
    NoInputs,

    #[error("Input {index} spends {utxo}, which is not in the pool")]
    InputNotFound { index: usize, utxo: Utxo },

    #[error("Input {index} is not signed by the owner of {utxo}")]
    InvalidSignature { index: usize, utxo: Utxo },

    #[error("Input {index} spends {utxo}, which an earlier input already spends")]
    DoubleSpend { index: usize, utxo: Utxo },

    #[error("Output {index} has a negative amount: {amount}")]
    NegativeOutput { index: usize, amount: Coin },

    #[error("Outputs total {outputs} but inputs only total {inputs}")]
    InsufficientInputs { inputs: Coin, outputs: Coin },

    #[error("Transaction amounts overflow")]
    AmountOverflow,
}

// Responsible for deciding whether a single transaction may be committed on top of a pool.
// It never mutates the pool.
#[derive(Debug, Default, Clone)]
pub struct TransactionValidator<V = Ed25519Verifier> {
    verifier: V,
}

impl<V: SignatureVerifier> TransactionValidator<V> {
    pub fn new(verifier: V) -> Self {
        Self { verifier }
    }

    pub fn is_valid(&self, transaction: &Transaction, pool: &UtxoPool) -> bool {
        self.validate(transaction, pool).is_ok()
    }

    /// Validates the transaction against the pool and returns its fee, i.e. the amount by which
    /// the inputs exceed the outputs.
    pub fn validate(
        &self,
        transaction: &Transaction,
        pool: &UtxoPool,
    ) -> Result<Coin, ValidationError> {
        let result = self.validate_all(transaction, pool);
        if let Err(e) = &result {
            debug!(transaction = %transaction.id(), reason = %e, "transaction rejected");
        }
        result
    }

    fn validate_all(
        &self,
        transaction: &Transaction,
        pool: &UtxoPool,
    ) -> Result<Coin, ValidationError> {
        if transaction.inputs().is_empty() {
            return Err(ValidationError::NoInputs);
        }
        let inputs = self.validate_inputs(transaction, pool)?;
        let outputs = Self::validate_outputs(transaction)?;
        Self::validate_value_conservation(inputs, outputs)
    }

    /// Checks that every input spends a distinct, unspent output it is authorized to spend.
    /// Returns the total value of the spent outputs.
    fn validate_inputs(
        &self,
        transaction: &Transaction,
        pool: &UtxoPool,
    ) -> Result<Coin, ValidationError> {
        let mut spent = HashSet::new();
        let mut total = Coin::zero();
        for (index, input) in transaction.inputs().iter().enumerate() {
            let utxo = Utxo::new(*input.utxo_id(), input.output_index());
            if !spent.insert(utxo) {
                return Err(ValidationError::DoubleSpend { index, utxo });
            }
            let output = pool
                .get_output(&utxo)
                .ok_or(ValidationError::InputNotFound { index, utxo })?;
            if !self.is_authorized(transaction, index, output) {
                return Err(ValidationError::InvalidSignature { index, utxo });
            }
            total = total
                .checked_add(output.amount())
                .ok_or(ValidationError::AmountOverflow)?;
        }
        Ok(total)
    }

    fn is_authorized(
        &self,
        transaction: &Transaction,
        index: usize,
        spent: &TransactionOutput,
    ) -> bool {
        match transaction.signing_payload(index) {
            Some(payload) => self.verifier.verify_signature(
                spent.address(),
                &payload,
                transaction.inputs()[index].signature(),
            ),
            None => false,
        }
    }

    /// Checks that no output is negative. Returns the total value of the outputs.
    fn validate_outputs(transaction: &Transaction) -> Result<Coin, ValidationError> {
        let mut total = Coin::zero();
        for (index, output) in transaction.outputs().iter().enumerate() {
            if output.amount().is_negative() {
                return Err(ValidationError::NegativeOutput {
                    index,
                    amount: output.amount(),
                });
            }
            total = total
                .checked_add(output.amount())
                .ok_or(ValidationError::AmountOverflow)?;
        }
        Ok(total)
    }

    fn validate_value_conservation(inputs: Coin, outputs: Coin) -> Result<Coin, ValidationError> {
        if inputs < outputs {
            return Err(ValidationError::InsufficientInputs { inputs, outputs });
        }
        inputs
            .checked_sub(outputs)
            .ok_or(ValidationError::AmountOverflow)
    }
}
