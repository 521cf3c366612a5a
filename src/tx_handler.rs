use crate::{
    Coin, Ed25519Verifier, SignatureVerifier, Transaction, TransactionValidator, UtxoPool,
    ValidationError,
};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use tracing::{debug, info};

/// The order in which candidates are tried within a pass.
/// Among transactions spending the same output, the first valid one tried wins.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TieBreak {
    /// Candidates are tried in the order the caller presented them.
    Presentation,
    /// Candidates are tried in ascending order of their transaction id, which makes the outcome
    /// independent of the presentation order.
    TransactionId,
}

impl Default for TieBreak {
    fn default() -> Self {
        Self::Presentation
    }
}

impl FromStr for TieBreak {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "presentation" => Ok(Self::Presentation),
            "id" | "transaction_id" => Ok(Self::TransactionId),
            unknown => Err(format!("Unknown TieBreak: {}", unknown)),
        }
    }
}

#[derive(Debug, Default, Copy, Clone)]
pub struct HandlerParams {
    pub tie_break: TieBreak,
}

/// The outcome of a single epoch.
#[derive(Debug, Clone)]
pub struct EpochReport {
    /// Accepted transactions, in the order they were committed.
    pub accepted: Vec<Transaction>,
    /// Transactions that were still invalid at the fixed point, with the reason from their last
    /// attempt.
    pub dropped: Vec<(Transaction, ValidationError)>,
    /// Number of passes over the pending transactions.
    pub passes: usize,
    /// Total fees of the accepted transactions.
    pub fees: Coin,
}

impl Display for EpochReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "accepted: {}, dropped: {}, passes: {}, fees: {}",
            self.accepted.len(),
            self.dropped.len(),
            self.passes,
            self.fees
        )
    }
}

/// Owns the ledger's pool of unspent outputs and commits batches of transactions on top of it.
pub struct TxHandler<V = Ed25519Verifier> {
    pool: UtxoPool,
    validator: TransactionValidator<V>,
    params: HandlerParams,
}

impl TxHandler<Ed25519Verifier> {
    /// Creates a handler over a copy of the given pool. Later commits don't affect the caller's
    /// pool.
    pub fn new(utxo_pool: &UtxoPool) -> Self {
        Self::with_verifier(utxo_pool, Ed25519Verifier)
    }
}

impl<V: SignatureVerifier> TxHandler<V> {
    pub fn with_verifier(utxo_pool: &UtxoPool, verifier: V) -> Self {
        Self {
            pool: utxo_pool.clone(),
            validator: TransactionValidator::new(verifier),
            params: HandlerParams::default(),
        }
    }

    pub fn with_params(mut self, params: HandlerParams) -> Self {
        self.params = params;
        self
    }

    pub fn pool(&self) -> &UtxoPool {
        &self.pool
    }

    pub fn into_pool(self) -> UtxoPool {
        self.pool
    }

    pub fn is_valid(&self, transaction: &Transaction) -> bool {
        self.validator.is_valid(transaction, &self.pool)
    }

    pub fn validate(&self, transaction: &Transaction) -> Result<Coin, ValidationError> {
        self.validator.validate(transaction, &self.pool)
    }

    /// Commits a maximal mutually valid subset of the candidates and returns the committed
    /// transactions in the order they were accepted.
    pub fn process_epoch(&mut self, candidates: &[Transaction]) -> Vec<Transaction> {
        self.process_epoch_with_report(candidates).accepted
    }

    /// Repeatedly tries the pending candidates against the live pool, committing each valid one
    /// immediately, until a pass accepts nothing.
    ///
    /// A transaction spending an output of another candidate becomes valid in the pass after
    /// its parent is committed. A transaction conflicting with a committed one fails because
    /// the output it spends is gone.
    /// Every pass except the last one accepts at least one transaction, so there are at most as
    /// many passes as candidates.
    pub fn process_epoch_with_report(&mut self, candidates: &[Transaction]) -> EpochReport {
        let mut pending = self.order_candidates(candidates);
        let mut accepted = vec![];
        let mut rejections: Vec<ValidationError> = vec![];
        let mut fees = Coin::zero();
        let mut passes = 0;

        while !pending.is_empty() {
            passes += 1;
            let mut still_pending = vec![];
            rejections.clear();
            let accepted_before = accepted.len();

            for transaction in pending {
                match self.validator.validate(transaction, &self.pool) {
                    Ok(fee) => {
                        self.pool.apply(transaction);
                        fees = fees.saturating_add(fee);
                        debug!(
                            transaction = %transaction.id(),
                            pass = passes,
                            %fee,
                            "transaction accepted"
                        );
                        accepted.push(transaction.clone());
                    }
                    Err(e) => {
                        still_pending.push(transaction);
                        rejections.push(e);
                    }
                }
            }

            pending = still_pending;
            let accepted_in_pass = accepted.len() - accepted_before;
            debug!(
                pass = passes,
                accepted = accepted_in_pass,
                pending = pending.len(),
                "pass finished"
            );
            if accepted_in_pass == 0 {
                break;
            }
        }
        debug_assert!(passes <= candidates.len());

        let dropped = pending
            .into_iter()
            .cloned()
            .zip(rejections.into_iter())
            .collect::<Vec<(Transaction, ValidationError)>>();
        let report = EpochReport {
            accepted,
            dropped,
            passes,
            fees,
        };
        info!(candidates = candidates.len(), %report, "epoch processed");
        report
    }

    fn order_candidates<'a>(&self, candidates: &'a [Transaction]) -> Vec<&'a Transaction> {
        let mut ordered = candidates.iter().collect::<Vec<&Transaction>>();
        match self.params.tie_break {
            TieBreak::Presentation => {}
            // Stable, so duplicates keep their relative order.
            TieBreak::TransactionId => ordered.sort_by_key(|transaction| *transaction.id()),
        }
        ordered
    }
}
