use super::amount::{AmountError, Coin};

/// Everything the engine can refuse. Rejections are plain values; nothing
/// in the engine panics on malformed input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("ledger is frozen; block production is disabled")]
    ChainImmutable,

    #[error("amount {amount} exceeds the current release cap of {cap}")]
    ReleaseCapExceeded { amount: Coin, cap: Coin },

    #[error("releasing {amount} would push circulating supply past the total of {total}")]
    SupplyCapExceeded { amount: Coin, total: Coin },

    /// The chain tip moved between `prepare_block` and `commit_block`.
    /// Callers retry from a fresh snapshot.
    #[error("chain tip moved during block production")]
    StaleTip,

    #[error("proof-of-work gave up after {0} nonce attempts")]
    PowBudgetExhausted(u64),

    #[error(transparent)]
    InvalidAmount(#[from] AmountError),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
