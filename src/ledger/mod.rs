pub mod amount;
pub mod block;
pub mod consensus;
pub mod error;
pub mod model;
pub mod stake;
pub mod supply;

pub use amount::Coin;
pub use block::Block;
pub use error::LedgerError;
pub use model::{Candidate, Ledger, LedgerConfig};

/// Default Proof-of-Work difficulty (number of leading zeros).
pub const DEFAULT_DIFFICULTY: u32 = 2;

/// Difficulty ceiling for the dev API (avoid long waits).
pub const MAX_DIFFICULTY: u32 = 6;

/// Hard cap on coins that will ever circulate.
pub const DEFAULT_TOTAL_SUPPLY: Coin = Coin::from_whole(20_100_001);

/// Allocation already circulating at genesis.
pub const DEFAULT_RESERVED_SUPPLY: Coin = Coin::from_whole(100_001);

/// Per-period release ceiling before any halving.
pub const DEFAULT_RELEASE_CAP: Coin = Coin::from_whole(550);

/// Release cap halves every two years of wall-clock time.
pub const DEFAULT_HALVING_INTERVAL_SECS: i64 = 2 * 365 * 24 * 60 * 60;

/// Fiat units per coin (1.1, fixed-point).
pub const DEFAULT_COIN_VALUE_IN_FIAT: Coin = Coin::from_raw(110_000);

/// Blocks from the tip (inclusive) before a transaction counts as confirmed.
pub const DEFAULT_CONFIRMATION_THRESHOLD: usize = 5;

/// Nonce attempts before a Proof-of-Work search gives up.
pub const DEFAULT_POW_NONCE_BUDGET: u64 = 1 << 32;
