use anyhow::bail;
use serde_with::DeserializeFromStr;

use std::{
    fmt::{Debug, Display},
    str::FromStr,
};

/// Represents an amount of money in USD currency.
///
/// The amount is stored internally as an integer number of cents, so sums and
/// products are exact. Arithmetic is checked: an amount too large to hold
/// gives `None` rather than wrapping or panicking. The [`Display`]
/// implementation formats it as dollars to 2 decimal places with a leading
/// `$`, for example `$13.50` or `-$2.00`.
/// Width and alignment flags are honoured, so `{:>10}` right-aligns the
/// whole string.
#[derive(Clone, Copy, Default, DeserializeFromStr, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Usd(i64);

impl Usd {
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    #[must_use]
    pub fn cents(self) -> i64 {
        self.0
    }

    #[must_use]
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    /// Returns the price of `qty` units at this amount each.
    #[must_use]
    pub fn checked_mul(self, qty: i64) -> Option<Self> {
        self.0.checked_mul(qty).map(Self)
    }

    /// Adds up `amounts`, or returns `None` if the total overflows.
    #[must_use]
    pub fn checked_sum(amounts: impl IntoIterator<Item = Self>) -> Option<Self> {
        amounts
            .into_iter()
            .try_fold(Self::default(), Self::checked_add)
    }
}

impl Debug for Usd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

impl Display for Usd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let cents = self.0.unsigned_abs();
        f.pad(&format!("{sign}${}.{:02}", cents / 100, cents % 100))
    }
}

/// Parses amounts such as `5`, `3.5`, `$1,204.99` or `-2.00`.
///
/// More than two decimal places is an error rather than a silent rounding.
impl FromStr for Usd {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (negative, rest) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let digits = rest.strip_prefix('$').unwrap_or(rest).replace(',', "");
        let (dollars, cents) = digits.split_once('.').unwrap_or((digits.as_str(), ""));
        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if (dollars.is_empty() && cents.is_empty()) || !all_digits(dollars) || !all_digits(cents) {
            bail!("{s:?} is not a currency amount");
        }
        if cents.len() > 2 {
            bail!("{s:?} has more than two decimal places");
        }
        let dollars: i64 = if dollars.is_empty() { 0 } else { dollars.parse()? };
        let cents: i64 = format!("{cents:0<2}").parse()?;
        let Some(amount) = dollars.checked_mul(100).and_then(|d| d.checked_add(cents)) else {
            bail!("{s:?} is too large");
        };
        Ok(Self(if negative { -amount } else { amount }))
    }
}
