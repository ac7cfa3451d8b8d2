use rand::Rng;

use super::block::Block;
use super::error::LedgerError;
use super::stake::StakerRegistry;

/// Which production path a block takes. Drawn uniformly per attempt; the
/// coin flip is a policy knob, not a Sybil-resistance mechanism.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branch {
    Work,
    Stake,
}

pub fn choose_branch(rng: &mut impl Rng) -> Branch {
    if rng.gen_bool(0.5) {
        Branch::Work
    } else {
        Branch::Stake
    }
}

/// Proof-of-Work search: bump the nonce and rehash until the digest starts
/// with `difficulty` zeros. Bounded by `budget` attempts so a misconfigured
/// difficulty stalls with an error instead of spinning forever.
pub fn mine(block: &mut Block, difficulty: u32, budget: u64) -> Result<(), LedgerError> {
    let mut attempts: u64 = 0;
    loop {
        block.hash = block.compute_hash();
        if block.meets_difficulty(difficulty) {
            return Ok(());
        }
        if attempts >= budget {
            return Err(LedgerError::PowBudgetExhausted(budget));
        }
        attempts += 1;
        block.nonce = block.nonce.wrapping_add(1);
    }
}

/// Proof-of-Stake selection: one weighted draw from the registry. An empty
/// (or all-zero) registry produces a block without a producer identity.
pub fn pick_producer(stakers: &StakerRegistry, rng: &mut impl Rng) -> Option<String> {
    stakers.pick_weighted(rng).map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn candidate() -> Block {
        Block::new(
            1,
            "prev".into(),
            1_700_000_000,
            vec!["alice->bob:5".into()],
            None,
            None,
        )
    }

    #[test]
    fn mining_produces_leading_zeros() {
        let mut b = candidate();
        mine(&mut b, 2, u64::MAX).unwrap();
        assert!(b.hash.starts_with("00"));
        assert!(b.meets_difficulty(2));
        assert!(b.is_valid());
    }

    #[test]
    fn exhausted_budget_is_an_error() {
        let mut b = candidate();
        let err = mine(&mut b, 6, 10).unwrap_err();
        assert_eq!(err, LedgerError::PowBudgetExhausted(10));
    }

    #[test]
    fn zero_difficulty_accepts_first_hash() {
        let mut b = candidate();
        mine(&mut b, 0, 0).unwrap();
        assert_eq!(b.nonce, 0);
    }

    #[test]
    fn branch_draw_is_reproducible_under_a_seed() {
        let mut a = StdRng::seed_from_u64(99);
        let mut b = StdRng::seed_from_u64(99);
        for _ in 0..32 {
            assert_eq!(choose_branch(&mut a), choose_branch(&mut b));
        }
    }
}
