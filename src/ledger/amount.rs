use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};

/// Fractional digits carried by every monetary quantity.
pub const DECIMALS: u32 = 5;

/// Raw units per whole coin.
pub const SCALE: u128 = 10u128.pow(DECIMALS);

/// A coin amount in fixed-point representation (5 fractional digits).
///
/// Stored as raw `u128` units so monetary math never touches binary
/// floating point. Negative amounts are unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Coin(u128);

impl Coin {
    pub const ZERO: Self = Self(0);

    pub const fn from_raw(raw: u128) -> Self {
        Self(raw)
    }

    /// Whole-coin constructor (no fractional part).
    pub const fn from_whole(whole: u64) -> Self {
        Self(whole as u128 * SCALE)
    }

    pub const fn raw(&self) -> u128 {
        self.0
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Integer halving of the raw value; the odd unit truncates away.
    pub const fn halved(self) -> Self {
        Self(self.0 / 2)
    }

    /// Fixed-point multiply by `rate`, rounded half-up to `dp` fractional
    /// digits (`dp <= DECIMALS`). Used for coin -> fiat conversion.
    pub fn checked_mul_rounded(self, rate: Coin, dp: u32) -> Option<Self> {
        debug_assert!(dp <= DECIMALS);
        // Full-precision product sits at 2 * DECIMALS fractional digits.
        let product = self.0.checked_mul(rate.0)?;
        let quantum = 10u128.pow(2 * DECIMALS - dp);
        let units = product.checked_add(quantum / 2)? / quantum;
        units
            .checked_mul(10u128.pow(DECIMALS - dp))
            .map(Self)
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / SCALE;
        let frac = self.0 % SCALE;
        if frac == 0 {
            write!(f, "{whole}")
        } else {
            let frac = format!("{frac:05}");
            write!(f, "{whole}.{}", frac.trim_end_matches('0'))
        }
    }
}

impl FromStr for Coin {
    type Err = AmountError;

    /// Parse a non-negative decimal string such as `"550"` or `"12.00001"`.
    /// More than [`DECIMALS`] fractional digits is a hard rejection, not a
    /// silent rounding.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('.');
        let whole_str = parts.next().unwrap_or_default();
        let frac_str = parts.next();
        if parts.next().is_some() {
            return Err(AmountError::InvalidFormat);
        }

        let whole: u128 = whole_str.parse().map_err(|_| AmountError::InvalidFormat)?;

        let frac = match frac_str {
            None | Some("") => 0,
            Some(frac_str) => {
                if frac_str.len() > DECIMALS as usize {
                    return Err(AmountError::TooManyDecimals);
                }
                let padded = format!("{frac_str:0<width$}", width = DECIMALS as usize);
                padded.parse::<u128>().map_err(|_| AmountError::InvalidFormat)?
            }
        };

        whole
            .checked_mul(SCALE)
            .and_then(|w| w.checked_add(frac))
            .map(Self)
            .ok_or(AmountError::Overflow)
    }
}

// Amounts travel as decimal strings on the wire so callers never hand us a
// binary float.
impl Serialize for Coin {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Coin {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// Amount parsing/arithmetic rejections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("invalid amount format")]
    InvalidFormat,
    #[error("too many decimal places (max {DECIMALS})")]
    TooManyDecimals,
    #[error("amount overflow")]
    Overflow,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_whole_and_fractional() {
        assert_eq!("550".parse::<Coin>().unwrap(), Coin::from_whole(550));
        assert_eq!("1.5".parse::<Coin>().unwrap(), Coin::from_raw(150_000));
        assert_eq!("0.00001".parse::<Coin>().unwrap(), Coin::from_raw(1));
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!("-5".parse::<Coin>(), Err(AmountError::InvalidFormat));
        assert_eq!("abc".parse::<Coin>(), Err(AmountError::InvalidFormat));
        assert_eq!("1.2.3".parse::<Coin>(), Err(AmountError::InvalidFormat));
        assert_eq!(
            "1.000001".parse::<Coin>(),
            Err(AmountError::TooManyDecimals)
        );
    }

    #[test]
    fn display_round_trips() {
        for s in ["0", "550", "1.5", "20100001", "0.00001"] {
            let coin: Coin = s.parse().unwrap();
            assert_eq!(coin.to_string(), s);
        }
    }

    #[test]
    fn fiat_conversion_rounds_to_two_decimals() {
        let rate: Coin = "1.1".parse().unwrap();
        let five: Coin = "5".parse().unwrap();
        assert_eq!(
            five.checked_mul_rounded(rate, 2).unwrap(),
            "5.5".parse().unwrap()
        );

        // 0.005 * 1.1 = 0.0055 -> 0.01 half-up at two decimals.
        let tiny: Coin = "0.005".parse().unwrap();
        assert_eq!(
            tiny.checked_mul_rounded(rate, 2).unwrap(),
            "0.01".parse().unwrap()
        );
    }

    #[test]
    fn halving_truncates_odd_unit() {
        assert_eq!(Coin::from_raw(3).halved(), Coin::from_raw(1));
        assert_eq!(
            Coin::from_whole(550).halved(),
            Coin::from_whole(275)
        );
    }

    #[test]
    fn checked_add_detects_overflow() {
        assert!(Coin::from_raw(u128::MAX).checked_add(Coin::from_raw(1)).is_none());
        assert_eq!(
            Coin::from_whole(1).checked_add(Coin::from_whole(2)),
            Some(Coin::from_whole(3))
        );
    }
}
