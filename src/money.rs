use anyhow::{bail, Context, Result};
use itertools::Itertools;
use std::{
    fmt::{Display, Formatter},
    ops::{Add, AddAssign, Mul},
    str::FromStr,
};

pub const CURRENCY: &str = "NGN";

/// An amount of naira, held in kobo.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd)]
pub struct Money(u64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub fn from_kobo(kobo: u64) -> Money {
        Money(kobo)
    }

    /// Saturates at the largest representable amount.
    pub fn from_naira(naira: u64) -> Money {
        Money(naira.saturating_mul(100))
    }

    pub fn kobo(&self) -> u64 {
        self.0
    }

    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    pub fn checked_sub(self, other: Money) -> Option<Money> {
        self.0.checked_sub(other.0).map(Money)
    }

    pub fn checked_mul(self, quantity: u32) -> Option<Money> {
        self.0.checked_mul(quantity as u64).map(Money)
    }

    /// Plain decimal form used in data files, e.g. `10000.50`.
    pub fn to_plain(&self) -> String {
        format!("{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl FromStr for Money {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (whole, frac) = match s.split_once('.') {
            Some((whole, frac)) => (whole, frac),
            None => (s, ""),
        };
        if whole.is_empty() || !whole.chars().all(|c| c.is_ascii_digit()) {
            bail!("not an amount: {:?}", s)
        }
        if frac.len() > 2 || !frac.chars().all(|c| c.is_ascii_digit()) {
            bail!("not an amount: {:?}", s)
        }
        let naira: u64 = whole
            .parse()
            .with_context(|| format!("amount out of range: {:?}", s))?;
        let kobo = match frac.len() {
            0 => 0,
            1 => frac.parse::<u64>()? * 10,
            _ => frac.parse::<u64>()?,
        };
        naira
            .checked_mul(100)
            .and_then(|k| k.checked_add(kobo))
            .map(Money)
            .with_context(|| format!("amount out of range: {:?}", s))
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let digits = (self.0 / 100).to_string();
        let first = digits.len() % 3;
        let mut groups = vec![];
        if first > 0 {
            groups.push(&digits[..first]);
        }
        for i in (first..digits.len()).step_by(3) {
            groups.push(&digits[i..i + 3]);
        }
        write!(f, "{} {}.{:02}", CURRENCY, groups.iter().join(","), self.0 % 100)
    }
}

// The operators saturate; callers that must not lose precision use the
// checked_* methods.
impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        *self = *self + rhs;
    }
}

impl Mul<u32> for Money {
    type Output = Money;

    fn mul(self, rhs: u32) -> Money {
        Money(self.0.saturating_mul(rhs as u64))
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, m| acc + m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("0", 0)]
    #[case("10000", 1_000_000)]
    #[case("10000.0", 1_000_000)]
    #[case(" 10000.5 ", 1_000_050)]
    #[case("12.34", 1234)]
    fn parses_decimal_amounts(#[case] text: &str, #[case] kobo: u64) {
        assert_eq!(text.parse::<Money>().unwrap(), Money::from_kobo(kobo));
    }

    #[rstest]
    #[case("")]
    #[case("-5")]
    #[case("1.234")]
    #[case("abc")]
    #[case(".5")]
    #[case("1e3")]
    fn rejects_malformed_amounts(#[case] text: &str) {
        assert!(text.parse::<Money>().is_err());
    }

    #[rstest]
    #[case(0, "NGN 0.00")]
    #[case(99, "NGN 0.99")]
    #[case(100_000, "NGN 1,000.00")]
    #[case(1_000_000, "NGN 10,000.00")]
    #[case(123_456_789, "NGN 1,234,567.89")]
    fn displays_with_thousands_separators(#[case] kobo: u64, #[case] shown: &str) {
        assert_eq!(Money::from_kobo(kobo).to_string(), shown);
    }

    #[test]
    fn plain_form_parses_back() {
        let m = Money::from_kobo(1_000_050);
        assert_eq!(m.to_plain(), "10000.50");
        assert_eq!(m.to_plain().parse::<Money>().unwrap(), m);
    }

    #[test]
    fn arithmetic() {
        let price = Money::from_naira(250);
        assert_eq!(price * 3, Money::from_naira(750));
        assert_eq!(vec![price, price].into_iter().sum::<Money>(), Money::from_naira(500));
        assert_eq!(Money::from_naira(1).checked_sub(Money::from_naira(2)), None);
    }

    #[test]
    fn large_amounts_do_not_wrap() {
        let yacht: Money = "100000000000000000".parse().unwrap();
        assert_eq!(yacht.checked_mul(2), None);
        assert_eq!(yacht.checked_add(yacht), None);
        assert_eq!(yacht * 2, Money::from_kobo(u64::MAX));
        assert_eq!(yacht + yacht, Money::from_kobo(u64::MAX));
        assert_eq!(Money::from_naira(u64::MAX), Money::from_kobo(u64::MAX));
        assert_eq!(yacht.checked_mul(1), Some(yacht));
    }
}
