// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};

use crate::{Catalog, CoatingSystem, Selection};

/// Values computed from the catalog and the current selection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Derived {
    pub coatings: Vec<String>,
    pub total_cents: i64,
    pub complete: bool,
}

pub fn evaluate(catalog: &Catalog, selection: &Selection) -> Derived {
    let system = match (&selection.company, &selection.system) {
        (Some(company), Some(system)) => catalog.system(company, system),
        _ => None,
    };
    let coatings = coatings_for(selection.company.as_deref().unwrap_or(""), system);
    let total_cents = total_price(catalog, &selection.vendors);
    // Without a system both lists are empty; that is not a complete form.
    let complete = system.is_some() && is_complete(&selection.vendors, &coatings);
    Derived {
        coatings,
        total_cents,
        complete,
    }
}

/// Labels of the coatings `system` requires, `"{company} Coating {k}"` for
/// `k` in `1..=coating_count`.
pub fn coatings_for(company: &str, system: Option<&CoatingSystem>) -> Vec<String> {
    let Some(system) = system else {
        return Vec::new();
    };
    (1..=system.coating_count)
        .map(|index| format!("{company} Coating {index}"))
        .collect()
}

/// Reads the coating count encoded in the last character of a system name.
pub fn coating_count_from_name(name: &str) -> Result<u8> {
    let last = name
        .chars()
        .last()
        .ok_or_else(|| anyhow!("system name is empty; cannot derive a coating count"))?;
    let digit = last.to_digit(10).ok_or_else(|| {
        anyhow!(
            "system {name:?} does not end in a digit -- set `coatings = <N>` for this system explicitly"
        )
    })?;
    u8::try_from(digit).map_err(|_| anyhow!("coating count {digit} out of range"))
}

/// Unit price of `vendor`, or zero when the catalog does not list it.
pub fn price_of(catalog: &Catalog, vendor: &str) -> i64 {
    catalog
        .vendor(vendor)
        .map(|vendor| vendor.price_cents)
        .unwrap_or(0)
}

pub fn total_price(catalog: &Catalog, vendors: &[Option<String>]) -> i64 {
    vendors
        .iter()
        .flatten()
        .map(|vendor| price_of(catalog, vendor))
        .fold(0i64, i64::saturating_add)
}

pub fn is_complete(vendors: &[Option<String>], coatings: &[String]) -> bool {
    vendors.len() == coatings.len() && vendors.iter().all(Option::is_some)
}
