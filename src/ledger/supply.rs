use super::amount::Coin;
use super::error::LedgerError;

/// Monetary policy: fixed total supply, a per-period release cap and a
/// wall-clock halving schedule for that cap.
///
/// `current_supply` starts at the reserved allocation and only ever grows.
#[derive(Debug, Clone)]
pub struct SupplyPolicy {
    total_supply: Coin,
    current_supply: Coin,
    daily_release_cap: Coin,
    halving_interval_secs: i64,
    last_halving_time: i64,
}

impl SupplyPolicy {
    pub fn new(
        total_supply: Coin,
        reserved_supply: Coin,
        daily_release_cap: Coin,
        halving_interval_secs: i64,
        now: i64,
    ) -> Self {
        Self {
            total_supply,
            current_supply: reserved_supply,
            daily_release_cap,
            halving_interval_secs,
            last_halving_time: now,
        }
    }

    /// Check whether `amount` may be released at `now`, applying any due
    /// halvings first. Leaves `current_supply` untouched; pair with
    /// [`SupplyPolicy::release`] once the block made it onto the chain.
    pub fn authorize(&mut self, amount: Coin, now: i64) -> Result<(), LedgerError> {
        self.apply_halving(now);

        if amount > self.daily_release_cap {
            return Err(LedgerError::ReleaseCapExceeded {
                amount,
                cap: self.daily_release_cap,
            });
        }

        let next = self
            .current_supply
            .checked_add(amount)
            .ok_or(LedgerError::SupplyCapExceeded {
                amount,
                total: self.total_supply,
            })?;
        if next > self.total_supply {
            return Err(LedgerError::SupplyCapExceeded {
                amount,
                total: self.total_supply,
            });
        }

        Ok(())
    }

    /// Record a released amount. Callers must have authorized it first.
    pub fn release(&mut self, amount: Coin) {
        self.current_supply = self.current_supply.saturating_add(amount);
    }

    /// Halve the release cap once per fully elapsed interval. Catches up on
    /// every missed interval in one call and keeps the remainder, so idle
    /// periods cannot under-halve the schedule.
    fn apply_halving(&mut self, now: i64) {
        let elapsed = now - self.last_halving_time;
        if elapsed < self.halving_interval_secs || self.halving_interval_secs <= 0 {
            return;
        }
        let steps = elapsed / self.halving_interval_secs;
        for _ in 0..steps {
            self.daily_release_cap = self.daily_release_cap.halved();
        }
        self.last_halving_time += steps * self.halving_interval_secs;
    }

    pub fn total_supply(&self) -> Coin {
        self.total_supply
    }

    pub fn current_supply(&self) -> Coin {
        self.current_supply
    }

    pub fn daily_release_cap(&self) -> Coin {
        self.daily_release_cap
    }

    pub fn last_halving_time(&self) -> i64 {
        self.last_halving_time
    }
}
