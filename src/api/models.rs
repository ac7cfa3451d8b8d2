use serde::{Deserialize, Serialize};
use std::sync::Mutex;

use crate::ledger::{Block, Coin, Ledger, LedgerConfig};

/// Shared application state with the in-memory ledger engine.
pub struct AppState {
    pub ledger: Mutex<Ledger>,
}

impl AppState {
    pub fn new(config: LedgerConfig) -> Self {
        Self {
            ledger: Mutex::new(Ledger::new(config)),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(LedgerConfig::default())
    }
}

/* ---------- Chain API Models ---------- */

#[derive(Serialize)]
pub struct ChainResponse<'a> {
    pub length: usize,
    pub difficulty: u32,
    pub chain: &'a [Block],
}

#[derive(Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    pub length: usize,
}

#[derive(Deserialize)]
pub struct AddBlockRequest {
    pub transactions: Vec<String>,
    /// Decimal string, e.g. "12.5" (never a binary float).
    pub amount: Coin,
    #[serde(default)]
    pub contract_ref: Option<String>,
}

#[derive(Serialize)]
pub struct BlockSummary {
    pub index: u64,
    pub hash: String,
    pub nonce: u64,
    pub producer: Option<String>,
    pub timestamp: i64,
}

#[derive(Serialize)]
pub struct DifficultyResponse {
    pub difficulty: u32,
}

#[derive(Deserialize)]
pub struct SetDifficultyRequest {
    pub difficulty: u32,
}

/* ---------- Conversion API Models ---------- */

#[derive(Deserialize)]
pub struct ConvertRequest {
    pub amount: Coin,
}

#[derive(Serialize)]
pub struct ConvertResponse {
    pub amount: Coin,
    pub fiat_value: Coin,
}

/* ---------- Staking API Models ---------- */

#[derive(Deserialize)]
pub struct StakeRequest {
    pub identity: String,
    pub stake: Coin,
}

#[derive(Serialize)]
pub struct StakeResponse {
    pub identity: String,
    pub total_stake: Coin,
}

#[derive(Serialize)]
pub struct StakerEntry {
    pub identity: String,
    pub stake: Coin,
}

#[derive(Serialize)]
pub struct StakersResponse {
    pub count: usize,
    pub stakers: Vec<StakerEntry>,
}

/* ---------- Supply API Models ---------- */

#[derive(Serialize)]
pub struct SupplyResponse {
    pub height: usize,
    pub frozen: bool,
    pub difficulty: u32,
    pub total_supply: Coin,
    pub current_supply: Coin,
    pub daily_release_cap: Coin,
    pub last_halving_time: i64,
    pub stakers: usize,
}

/* ---------- Confirmation API Models ---------- */

#[derive(Deserialize)]
pub struct ConfirmationRequest {
    pub transaction: String,
}

#[derive(Serialize)]
pub struct ConfirmationResponse {
    pub transaction: String,
    pub confirmed: bool,
}
