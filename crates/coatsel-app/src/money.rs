// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::fmt;

/// Accepted spellings of a vendor price in a catalog file.
pub const PRICE_FORMATS: &str = "write dollars as a string like \"100.00\" or \"$1,234.56\"";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceProblem {
    Empty,
    Negative,
    NotDollars,
    TooManyDecimals,
    TooLarge,
    UnquotedDecimal,
}

impl fmt::Display for PriceProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Empty => "no amount given",
            Self::Negative => "prices cannot be negative",
            Self::NotDollars => "not a dollar amount",
            Self::TooManyDecimals => "more than two decimal places",
            Self::TooLarge => "amount is too large",
            Self::UnquotedDecimal => "decimal prices must be quoted",
        })
    }
}

/// A vendor price that could not be turned into cents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceError {
    pub vendor: String,
    pub raw: String,
    pub problem: PriceProblem,
}

impl PriceError {
    pub fn new(vendor: &str, raw: impl Into<String>, problem: PriceProblem) -> Self {
        Self {
            vendor: vendor.to_owned(),
            raw: raw.into(),
            problem,
        }
    }
}

impl fmt::Display for PriceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "vendor {:?} has price {:?}: {} -- {PRICE_FORMATS}",
            self.vendor, self.raw, self.problem
        )
    }
}

impl std::error::Error for PriceError {}

/// Parses `vendor`'s price, e.g. `100`, `95.5` or `$1,234.56`, into cents.
/// Commas may group the dollar digits; at most two decimals are allowed.
pub fn parse_price_cents(vendor: &str, raw: &str) -> Result<i64, PriceError> {
    let fail = |problem| PriceError::new(vendor, raw, problem);

    let amount = raw.trim();
    let amount = amount.strip_prefix('$').unwrap_or(amount);
    if amount.starts_with('-') {
        return Err(fail(PriceProblem::Negative));
    }
    if amount.is_empty() {
        return Err(fail(PriceProblem::Empty));
    }

    let (dollars, decimals) = amount.split_once('.').unwrap_or((amount, ""));
    let dollars = dollars.replace(',', "");
    let all_digits = |text: &str| text.bytes().all(|byte| byte.is_ascii_digit());
    if !all_digits(&dollars) || !all_digits(decimals) || (dollars.is_empty() && decimals.is_empty())
    {
        return Err(fail(PriceProblem::NotDollars));
    }
    if decimals.len() > 2 {
        return Err(fail(PriceProblem::TooManyDecimals));
    }

    let whole = if dollars.is_empty() {
        0
    } else {
        dollars
            .parse::<i64>()
            .map_err(|_| fail(PriceProblem::TooLarge))?
    };
    // "5" means fifty cents, so pad on the right before parsing.
    let fraction = format!("{decimals:0<2}")
        .parse::<i64>()
        .map_err(|_| fail(PriceProblem::NotDollars))?;

    whole
        .checked_mul(100)
        .and_then(|cents| cents.checked_add(fraction))
        .ok_or_else(|| fail(PriceProblem::TooLarge))
}

/// Display form used in the form: `$1,234.56`.
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let magnitude = cents.unsigned_abs();
    let dollars = (magnitude / 100).to_string();

    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (position, digit) in dollars.chars().enumerate() {
        if position > 0 && (dollars.len() - position) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    format!("{sign}${grouped}.{:02}", magnitude % 100)
}

/// Catalog-file form: `1234.56`, readable back by [`parse_price_cents`].
pub fn format_price(cents: i64) -> String {
    format!("{}.{:02}", cents / 100, cents % 100)
}
