use std::collections::BTreeMap;

use rand::Rng;

use super::amount::Coin;

/// Identity -> stake weight registry for proof-of-stake selection.
///
/// Entries are created on first stake, grow additively on repeat stake and
/// are never removed. A `BTreeMap` keeps iteration order stable so the
/// weighted draw is reproducible under a seeded RNG.
#[derive(Debug, Default)]
pub struct StakerRegistry {
    stakes: BTreeMap<String, Coin>,
}

impl StakerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `amount` of stake for `identity`, adding to any existing
    /// stake.
    pub fn add_stake(&mut self, identity: &str, amount: Coin) {
        let entry = self.stakes.entry(identity.to_string()).or_insert(Coin::ZERO);
        *entry = entry.saturating_add(amount);
    }

    pub fn stake_of(&self, identity: &str) -> Coin {
        self.stakes.get(identity).copied().unwrap_or(Coin::ZERO)
    }

    pub fn total_stake(&self) -> Coin {
        self.stakes
            .values()
            .fold(Coin::ZERO, |acc, s| acc.saturating_add(*s))
    }

    pub fn len(&self) -> usize {
        self.stakes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stakes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Coin)> {
        self.stakes.iter().map(|(id, s)| (id.as_str(), *s))
    }

    /// Draw one identity with probability proportional to its stake via a
    /// cumulative-weight walk. Returns `None` when the registry is empty
    /// or holds only zero-weight entries.
    pub fn pick_weighted(&self, rng: &mut impl Rng) -> Option<&str> {
        let total = self.total_stake();
        if total.is_zero() {
            return None;
        }

        let target = rng.gen_range(0..total.raw());
        let mut cumulative: u128 = 0;
        for (identity, stake) in self.stakes.iter() {
            cumulative = cumulative.saturating_add(stake.raw());
            if target < cumulative {
                return Some(identity);
            }
        }

        // Unreachable while total > 0; keep the last entry as a fallback.
        self.stakes.keys().next_back().map(|s| s.as_str())
    }
}
