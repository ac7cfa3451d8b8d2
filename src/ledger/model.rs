use chrono::Utc;
use rand::Rng;

use super::amount::{AmountError, Coin};
use super::block::{Block, GENESIS_PREVIOUS_HASH};
use super::consensus::{self, Branch};
use super::error::{LedgerError, Result};
use super::stake::StakerRegistry;
use super::supply::SupplyPolicy;

/// Construction-time knobs for a [`Ledger`]. Defaults mirror the shipped
/// monetary policy; `main.rs` overrides them from the environment.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    pub difficulty: u32,
    pub frozen: bool,
    pub total_supply: Coin,
    pub reserved_supply: Coin,
    pub daily_release_cap: Coin,
    pub halving_interval_secs: i64,
    pub coin_value_in_fiat: Coin,
    pub confirmation_threshold: usize,
    pub pow_nonce_budget: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        use super::{
            DEFAULT_COIN_VALUE_IN_FIAT, DEFAULT_CONFIRMATION_THRESHOLD, DEFAULT_DIFFICULTY,
            DEFAULT_HALVING_INTERVAL_SECS, DEFAULT_POW_NONCE_BUDGET, DEFAULT_RELEASE_CAP,
            DEFAULT_RESERVED_SUPPLY, DEFAULT_TOTAL_SUPPLY,
        };
        Self {
            difficulty: DEFAULT_DIFFICULTY,
            frozen: false,
            total_supply: DEFAULT_TOTAL_SUPPLY,
            reserved_supply: DEFAULT_RESERVED_SUPPLY,
            daily_release_cap: DEFAULT_RELEASE_CAP,
            halving_interval_secs: DEFAULT_HALVING_INTERVAL_SECS,
            coin_value_in_fiat: DEFAULT_COIN_VALUE_IN_FIAT,
            confirmation_threshold: DEFAULT_CONFIRMATION_THRESHOLD,
            pow_nonce_budget: DEFAULT_POW_NONCE_BUDGET,
        }
    }
}

/// A block candidate coming out of [`Ledger::prepare_block`].
///
/// Stake-produced candidates are already final; work candidates still need
/// the nonce search, which callers run WITHOUT holding the ledger lock and
/// then hand back to [`Ledger::commit_block`].
pub enum Candidate {
    Sealed(Block),
    Unsealed {
        block: Block,
        difficulty: u32,
        budget: u64,
    },
}

/// Single-node append-only ledger with hybrid PoW/PoS block production.
#[derive(Debug)]
pub struct Ledger {
    chain: Vec<Block>,
    difficulty: u32,
    frozen: bool,
    supply: SupplyPolicy,
    stakers: StakerRegistry,
    coin_value_in_fiat: Coin,
    confirmation_threshold: usize,
    pow_nonce_budget: u64,
}

impl Ledger {
    /// Initialize a new ledger with a genesis block.
    pub fn new(config: LedgerConfig) -> Self {
        let now = Utc::now().timestamp();
        Self {
            chain: vec![Block::genesis()],
            difficulty: config.difficulty,
            frozen: config.frozen,
            supply: SupplyPolicy::new(
                config.total_supply,
                config.reserved_supply,
                config.daily_release_cap,
                config.halving_interval_secs,
                now,
            ),
            stakers: StakerRegistry::new(),
            coin_value_in_fiat: config.coin_value_in_fiat,
            confirmation_threshold: config.confirmation_threshold,
            pow_nonce_budget: config.pow_nonce_budget,
        }
    }

    /// Return the last block in the chain.
    pub fn last_block(&self) -> &Block {
        self.chain
            .last()
            .expect("ledger always holds at least the genesis block")
    }

    /// Read-only view of the whole chain.
    pub fn blocks(&self) -> &[Block] {
        &self.chain
    }

    pub fn height(&self) -> usize {
        self.chain.len()
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    pub fn set_difficulty(&mut self, difficulty: u32) {
        // Affects future blocks only.
        self.difficulty = difficulty;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn supply(&self) -> &SupplyPolicy {
        &self.supply
    }

    pub fn stakers(&self) -> &StakerRegistry {
        &self.stakers
    }

    /// Register (or top up) a staker. Additive on repeat calls.
    pub fn add_staker(&mut self, identity: &str, stake: Coin) {
        self.stakers.add_stake(identity, stake);
    }

    /// Stage a block candidate at the current tip: gate on the frozen flag,
    /// run the supply policy, then let the consensus draw decide whether
    /// the candidate still needs a Proof-of-Work seal.
    pub fn prepare_block(
        &mut self,
        transactions: Vec<String>,
        amount: Coin,
        contract_ref: Option<String>,
        rng: &mut impl Rng,
    ) -> Result<Candidate> {
        if self.frozen {
            return Err(LedgerError::ChainImmutable);
        }

        let now = Utc::now().timestamp();
        self.supply.authorize(amount, now)?;

        let parent = self.last_block();
        let index = parent.index + 1;
        let previous_hash = parent.hash.clone();
        // Wall clock may step backwards; block timestamps must not.
        let timestamp = now.max(parent.timestamp);

        Ok(match consensus::choose_branch(rng) {
            Branch::Work => Candidate::Unsealed {
                block: Block::new(index, previous_hash, timestamp, transactions, None, contract_ref),
                difficulty: self.difficulty,
                budget: self.pow_nonce_budget,
            },
            Branch::Stake => {
                let producer = consensus::pick_producer(&self.stakers, rng);
                Candidate::Sealed(Block::new(
                    index,
                    previous_hash,
                    timestamp,
                    transactions,
                    producer,
                    contract_ref,
                ))
            }
        })
    }

    /// Append a sealed candidate. Re-checks the frozen gate, the tip and
    /// the supply policy, since any of them may have moved while the seal
    /// ran outside the lock; only then does the release count.
    pub fn commit_block(&mut self, block: Block, amount: Coin) -> Result<&Block> {
        if self.frozen {
            return Err(LedgerError::ChainImmutable);
        }
        let tip = self.last_block();
        if block.previous_hash != tip.hash || block.index != tip.index + 1 {
            return Err(LedgerError::StaleTip);
        }
        debug_assert!(block.is_valid());

        let now = Utc::now().timestamp();
        self.supply.authorize(amount, now)?;
        self.supply.release(amount);
        self.chain.push(block);
        Ok(self.last_block())
    }

    /// Produce and append a block in one call. Convenience path for
    /// single-threaded callers; the HTTP layer uses the split form so the
    /// nonce search never runs under its lock.
    pub fn add_block_with_rng(
        &mut self,
        transactions: Vec<String>,
        amount: Coin,
        contract_ref: Option<String>,
        rng: &mut impl Rng,
    ) -> Result<&Block> {
        let block = match self.prepare_block(transactions, amount, contract_ref, rng)? {
            Candidate::Sealed(block) => block,
            Candidate::Unsealed {
                mut block,
                difficulty,
                budget,
            } => {
                consensus::mine(&mut block, difficulty, budget)?;
                block
            }
        };
        self.commit_block(block, amount)
    }

    pub fn add_block(
        &mut self,
        transactions: Vec<String>,
        amount: Coin,
        contract_ref: Option<String>,
    ) -> Result<&Block> {
        let mut rng = rand::thread_rng();
        self.add_block_with_rng(transactions, amount, contract_ref, &mut rng)
    }

    /// Validate the entire chain: genesis shape, stored hashes against
    /// recomputation, and parent linkage. A whole-chain verdict; difficulty
    /// is deliberately not re-checked (stake-produced blocks carry none).
    pub fn validate_chain(&self) -> bool {
        let Some(genesis) = self.chain.first() else {
            return false;
        };
        if genesis.index != 0
            || genesis.previous_hash != GENESIS_PREVIOUS_HASH
            || !genesis.is_valid()
        {
            return false;
        }

        for i in 1..self.chain.len() {
            let current = &self.chain[i];
            let prev = &self.chain[i - 1];
            if current.previous_hash != prev.hash {
                return false;
            }
            if current.index != prev.index + 1 {
                return false;
            }
            if !current.is_valid() {
                return false;
            }
        }

        true
    }

    /// A transaction is confirmed once its most recent containing block
    /// sits at least `confirmation_threshold` blocks from the tip,
    /// tip inclusive.
    pub fn is_transaction_confirmed(&self, tx: &str) -> bool {
        for (scanned, block) in self.chain.iter().rev().enumerate() {
            if block.transactions.iter().any(|t| t == tx) {
                return scanned + 1 >= self.confirmation_threshold;
            }
        }
        false
    }

    /// Coin -> fiat conversion at the configured rate, two-decimal result.
    pub fn convert(&self, amount: Coin) -> Result<Coin> {
        amount
            .checked_mul_rounded(self.coin_value_in_fiat, 2)
            .ok_or(LedgerError::InvalidAmount(AmountError::Overflow))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn config() -> LedgerConfig {
        LedgerConfig {
            difficulty: 1,
            frozen: false,
            total_supply: "100".parse().unwrap(),
            reserved_supply: "10".parse().unwrap(),
            daily_release_cap: "50".parse().unwrap(),
            confirmation_threshold: 3,
            coin_value_in_fiat: "1.1".parse().unwrap(),
            ..LedgerConfig::default()
        }
    }

    fn add(ledger: &mut Ledger, rng: &mut StdRng, tx: &str, amount: &str) {
        ledger
            .add_block_with_rng(vec![tx.to_string()], amount.parse().unwrap(), None, rng)
            .unwrap();
    }

    #[test]
    fn genesis_only_chain_is_valid() {
        let ledger = Ledger::new(config());
        assert_eq!(ledger.height(), 1);
        assert!(ledger.validate_chain());
    }

    #[test]
    fn sequential_blocks_link_up() {
        let mut ledger = Ledger::new(config());
        let mut rng = StdRng::seed_from_u64(3);
        add(&mut ledger, &mut rng, "a->b:1", "1");
        add(&mut ledger, &mut rng, "b->c:2", "2");

        assert_eq!(ledger.height(), 3);
        let indices: Vec<u64> = ledger.blocks().iter().map(|b| b.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        for i in 1..ledger.height() {
            assert_eq!(ledger.blocks()[i].previous_hash, ledger.blocks()[i - 1].hash);
        }
        assert!(ledger.validate_chain());
    }

    #[test]
    fn frozen_ledger_refuses_blocks() {
        let mut ledger = Ledger::new(LedgerConfig {
            frozen: true,
            ..config()
        });
        let err = ledger
            .add_block(vec!["a->b:1".into()], "1".parse().unwrap(), None)
            .unwrap_err();
        assert_eq!(err, LedgerError::ChainImmutable);
        assert_eq!(ledger.height(), 1);
    }

    #[test]
    fn release_cap_rejection_leaves_ledger_untouched() {
        let mut ledger = Ledger::new(config());
        let err = ledger
            .add_block(vec!["a->b:60".into()], "60".parse().unwrap(), None)
            .unwrap_err();
        assert!(matches!(err, LedgerError::ReleaseCapExceeded { .. }));
        assert_eq!(ledger.height(), 1);
        assert_eq!(ledger.supply().current_supply(), "10".parse().unwrap());
    }

    #[test]
    fn supply_cap_rejection_leaves_ledger_untouched() {
        let mut ledger = Ledger::new(LedgerConfig {
            daily_release_cap: "95".parse().unwrap(),
            ..config()
        });
        // 10 reserved + 95 requested = 105 > 100 total.
        let err = ledger
            .add_block(vec!["a->b:95".into()], "95".parse().unwrap(), None)
            .unwrap_err();
        assert!(matches!(err, LedgerError::SupplyCapExceeded { .. }));
        assert_eq!(ledger.height(), 1);
        assert_eq!(ledger.supply().current_supply(), "10".parse().unwrap());
    }

    #[test]
    fn accepted_block_grows_supply() {
        let mut ledger = Ledger::new(config());
        ledger
            .add_block(vec!["a->b:5".into()], "5".parse().unwrap(), None)
            .unwrap();
        assert_eq!(ledger.supply().current_supply(), "15".parse().unwrap());
        assert_eq!(ledger.height(), 2);
    }

    #[test]
    fn tampered_block_fails_validation() {
        let mut ledger = Ledger::new(config());
        let mut rng = StdRng::seed_from_u64(11);
        add(&mut ledger, &mut rng, "a->b:1", "1");
        add(&mut ledger, &mut rng, "b->c:2", "2");
        assert!(ledger.validate_chain());

        ledger.chain[1].transactions.push("forged".into());
        assert!(!ledger.validate_chain());
    }

    #[test]
    fn broken_linkage_fails_validation() {
        let mut ledger = Ledger::new(config());
        let mut rng = StdRng::seed_from_u64(12);
        add(&mut ledger, &mut rng, "a->b:1", "1");
        add(&mut ledger, &mut rng, "b->c:2", "2");

        ledger.chain[2].previous_hash = "0".repeat(64);
        assert!(!ledger.validate_chain());
    }

    #[test]
    fn stale_candidate_is_rejected_on_commit() {
        let mut ledger = Ledger::new(config());
        let mut rng = StdRng::seed_from_u64(21);

        let candidate = ledger
            .prepare_block(vec!["a->b:1".into()], "1".parse().unwrap(), None, &mut rng)
            .unwrap();
        let block = match candidate {
            Candidate::Sealed(b) => b,
            Candidate::Unsealed {
                mut block,
                difficulty,
                budget,
            } => {
                consensus::mine(&mut block, difficulty, budget).unwrap();
                block
            }
        };

        // Tip moves while the candidate was being sealed.
        add(&mut ledger, &mut rng, "b->c:2", "2");

        assert_eq!(
            ledger.commit_block(block, "1".parse().unwrap()).unwrap_err(),
            LedgerError::StaleTip
        );
    }

    #[test]
    fn confirmation_requires_depth() {
        let mut ledger = Ledger::new(config());
        let mut rng = StdRng::seed_from_u64(5);
        add(&mut ledger, &mut rng, "watched-tx", "1");
        // Depth 1 of 3: not confirmed yet.
        assert!(!ledger.is_transaction_confirmed("watched-tx"));

        add(&mut ledger, &mut rng, "filler-1", "1");
        assert!(!ledger.is_transaction_confirmed("watched-tx"));

        add(&mut ledger, &mut rng, "filler-2", "1");
        assert!(ledger.is_transaction_confirmed("watched-tx"));

        assert!(!ledger.is_transaction_confirmed("never-seen"));
    }

    #[test]
    fn staking_through_the_ledger_is_additive() {
        let mut ledger = Ledger::new(config());
        ledger.add_staker("alice", "10".parse().unwrap());
        ledger.add_staker("alice", "5".parse().unwrap());
        assert_eq!(ledger.stakers().stake_of("alice"), "15".parse().unwrap());
    }

    #[test]
    fn converts_at_the_configured_rate() {
        let ledger = Ledger::new(config());
        let fiat = ledger.convert("5".parse().unwrap()).unwrap();
        assert_eq!(fiat, "5.5".parse().unwrap());
    }
}
