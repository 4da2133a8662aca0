//! Fixed-point decimal untuk exchange rate dan commission.
//!
//! ## Representation
//!
//! `Decimal(raw)` bernilai `raw / 10^12`. Semua operasi memakai integer
//! arithmetic dengan truncation ke arah nol (floor untuk nilai non-negatif).
//! Tidak ada floating point di jalur consensus.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

pub const DECIMAL_PLACES: u32 = 12;
pub const DECIMAL_SCALE: u128 = 10u128.pow(DECIMAL_PLACES);

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Decimal(u128);

/// `floor(a * b / c)` without intermediate overflow where the result fits.
/// Returns `None` for `c == 0` or when the result exceeds `u128`.
pub fn mul_div_floor(a: u128, b: u128, c: u128) -> Option<u128> {
    if c == 0 {
        return None;
    }
    if let Some(p) = a.checked_mul(b) {
        return Some(p / c);
    }
    // a*b/c = (a/c)*b + (a%c)*b/c
    let (q, r) = (a / c, a % c);
    let hi = q.checked_mul(b)?;
    let lo = match r.checked_mul(b) {
        Some(p) => p / c,
        None => {
            let (qb, rb) = (b / c, b % c);
            r.checked_mul(qb)?.checked_add(r.checked_mul(rb)? / c)?
        }
    };
    hi.checked_add(lo)
}

impl Decimal {
    pub const ZERO: Decimal = Decimal(0);
    pub const ONE: Decimal = Decimal(DECIMAL_SCALE);

    pub const fn from_raw(raw: u128) -> Self { Decimal(raw) }
    pub const fn raw(&self) -> u128 { self.0 }

    pub fn from_integer(v: u128) -> Option<Self> {
        v.checked_mul(DECIMAL_SCALE).map(Decimal)
    }

    /// `num / den`, truncated. `None` if `den == 0` or on overflow.
    pub fn from_ratio(num: u128, den: u128) -> Option<Self> {
        mul_div_floor(num, DECIMAL_SCALE, den).map(Decimal)
    }

    pub fn is_zero(&self) -> bool { self.0 == 0 }

    pub fn checked_add(self, rhs: Decimal) -> Option<Decimal> {
        self.0.checked_add(rhs.0).map(Decimal)
    }

    pub fn saturating_sub(self, rhs: Decimal) -> Decimal {
        Decimal(self.0.saturating_sub(rhs.0))
    }

    pub fn abs_diff(self, rhs: Decimal) -> Decimal {
        Decimal(self.0.abs_diff(rhs.0))
    }

    /// `floor(amount * self)`.
    pub fn mul_floor(&self, amount: u128) -> Option<u128> {
        mul_div_floor(amount, self.0, DECIMAL_SCALE)
    }

    /// `floor(amount / self)`. `None` for a zero rate.
    pub fn div_floor(&self, amount: u128) -> Option<u128> {
        mul_div_floor(amount, DECIMAL_SCALE, self.0)
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let int = self.0 / DECIMAL_SCALE;
        let frac = self.0 % DECIMAL_SCALE;
        if frac == 0 {
            return write!(f, "{}", int);
        }
        let digits = format!("{:012}", frac);
        write!(f, "{}.{}", int, digits.trim_end_matches('0'))
    }
}

impl fmt::Debug for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Decimal({})", self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDecimalError(pub String);

impl fmt::Display for ParseDecimalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid decimal: {}", self.0)
    }
}

impl std::error::Error for ParseDecimalError {}

impl FromStr for Decimal {
    type Err = ParseDecimalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || ParseDecimalError(s.to_string());
        let (int_part, frac_part) = match s.split_once('.') {
            Some((i, f)) => (i, f),
            None => (s, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(bad());
        }
        let all_digits = |p: &str| p.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(int_part) || !all_digits(frac_part) || frac_part.len() > DECIMAL_PLACES as usize {
            return Err(bad());
        }
        if s.contains('.') && frac_part.is_empty() {
            return Err(bad());
        }

        let int: u128 = if int_part.is_empty() { 0 } else { int_part.parse().map_err(|_| bad())? };
        let mut frac: u128 = if frac_part.is_empty() { 0 } else { frac_part.parse().map_err(|_| bad())? };
        frac *= 10u128.pow(DECIMAL_PLACES - frac_part.len() as u32);

        int.checked_mul(DECIMAL_SCALE)
            .and_then(|v| v.checked_add(frac))
            .map(Decimal)
            .ok_or_else(bad)
    }
}

impl Serialize for Decimal {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where S: Serializer {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Decimal {
    fn deserialize<D>(deserializer: D) -> Result<Decimal, D::Error>
    where D: Deserializer<'de> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display() {
        let d: Decimal = "0.05".parse().expect("parse");
        assert_eq!(d.raw(), 50_000_000_000);
        assert_eq!(d.to_string(), "0.05");
        assert_eq!("1".parse::<Decimal>().expect("one"), Decimal::ONE);
        assert_eq!(".5".parse::<Decimal>().expect("half").to_string(), "0.5");
        assert_eq!(Decimal::ZERO.to_string(), "0");
    }

    #[test]
    fn parse_rejects_garbage() {
        for bad in ["", ".", "1.", "-1", "0.1234567890123", "abc", "1.2.3", "1e3"] {
            assert!(bad.parse::<Decimal>().is_err(), "{bad} should fail");
        }
    }

    #[test]
    fn ratio_truncates() {
        let third = Decimal::from_ratio(1, 3).expect("ratio");
        assert_eq!(third.raw(), 333_333_333_333);
        assert!(Decimal::from_ratio(1, 0).is_none());
    }

    #[test]
    fn mul_and_div_floor() {
        let rate = Decimal::from_ratio(3, 2).expect("rate");
        assert_eq!(rate.mul_floor(3), Some(4));
        assert_eq!(rate.div_floor(2), Some(1));
        assert_eq!(Decimal::ZERO.div_floor(10), None);
    }

    #[test]
    fn mul_div_handles_large_operands() {
        let big = u128::MAX / 2;
        assert_eq!(mul_div_floor(big, 10, 10), Some(big));
        assert_eq!(mul_div_floor(big, 4, 1), None);
        assert_eq!(mul_div_floor(7, 3, 0), None);
        assert_eq!(mul_div_floor(10, big, big), Some(10));
    }
}
