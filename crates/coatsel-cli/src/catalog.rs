// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use coatsel_app::{
    Catalog, CoatingSystem, Company, PriceError, PriceProblem, Vendor, coating_count_from_name,
    format_price, parse_price_cents,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
struct CatalogFile {
    #[serde(default)]
    companies: Vec<CompanyEntry>,
    #[serde(default)]
    vendors: Vec<VendorEntry>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
struct CompanyEntry {
    name: String,
    #[serde(default)]
    systems: Vec<SystemEntry>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
struct SystemEntry {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    coatings: Option<u8>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
struct VendorEntry {
    name: String,
    price: PriceValue,
}

/// Prices are written as dollar strings; bare integers are whole dollars.
/// Bare decimals are read only to reject them with a useful message.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
enum PriceValue {
    Text(String),
    Dollars(i64),
    Decimal(f64),
}

impl PriceValue {
    fn cents(&self, vendor: &str) -> Result<i64, PriceError> {
        match self {
            Self::Text(raw) => parse_price_cents(vendor, raw),
            Self::Dollars(dollars) if *dollars < 0 => Err(PriceError::new(
                vendor,
                dollars.to_string(),
                PriceProblem::Negative,
            )),
            Self::Dollars(dollars) => dollars.checked_mul(100).ok_or_else(|| {
                PriceError::new(vendor, dollars.to_string(), PriceProblem::TooLarge)
            }),
            Self::Decimal(value) => Err(PriceError::new(
                vendor,
                value.to_string(),
                PriceProblem::UnquotedDecimal,
            )),
        }
    }
}

pub fn load_catalog(path: &Path) -> Result<Catalog> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read catalog file {}", path.display()))?;
    let catalog = parse_catalog(&raw)
        .with_context(|| format!("load catalog {}", path.display()))?;
    info!(
        path = %path.display(),
        companies = catalog.company_records().len(),
        vendors = catalog.vendors().len(),
        "catalog loaded"
    );
    Ok(catalog)
}

pub fn parse_catalog(raw: &str) -> Result<Catalog> {
    let file: CatalogFile = toml::from_str(raw).context("parse TOML catalog")?;

    let mut companies = Vec::with_capacity(file.companies.len());
    for company in file.companies {
        let mut systems = Vec::with_capacity(company.systems.len());
        for system in company.systems {
            let coating_count = match system.coatings {
                Some(count) => count,
                None => {
                    let count = coating_count_from_name(&system.name)
                        .with_context(|| format!("company {:?}", company.name))?;
                    debug!(system = %system.name, count, "coating count taken from name");
                    count
                }
            };
            systems.push(CoatingSystem::new(system.name, coating_count));
        }
        companies.push(Company::new(company.name, systems));
    }

    let vendors = file
        .vendors
        .into_iter()
        .map(|vendor| {
            let cents = vendor.price.cents(&vendor.name)?;
            Ok(Vendor::new(vendor.name, cents))
        })
        .collect::<Result<Vec<_>>>()?;

    Catalog::new(companies, vendors)
}

/// Renders `catalog` in the catalog-file format, with explicit coating counts.
pub fn render_catalog(catalog: &Catalog) -> Result<String> {
    let file = CatalogFile {
        companies: catalog
            .company_records()
            .iter()
            .map(|company| CompanyEntry {
                name: company.name.clone(),
                systems: company
                    .systems
                    .iter()
                    .map(|system| SystemEntry {
                        name: system.name.clone(),
                        coatings: Some(system.coating_count),
                    })
                    .collect(),
            })
            .collect(),
        vendors: catalog
            .vendors()
            .iter()
            .map(|vendor| VendorEntry {
                name: vendor.name.clone(),
                price: PriceValue::Text(format_price(vendor.price_cents)),
            })
            .collect(),
    };
    toml::to_string(&file).context("render catalog as TOML")
}

#[cfg(test)]
mod tests {
    use super::{load_catalog, parse_catalog, render_catalog};
    use anyhow::Result;
    use coatsel_app::Catalog;
    use coatsel_testkit::{CatalogFaker, catalog_toml, reference_catalog, temp_catalog_file};

    #[test]
    fn explicit_counts_are_honored() -> Result<()> {
        let catalog = parse_catalog(
            "[[companies]]\nname = \"Acme\"\nsystems = [{ name = \"Acme Primer\", coatings = 4 }]\n\n[[vendors]]\nname = \"Vendor A\"\nprice = \"100.00\"\n",
        )?;
        let system = catalog.system("Acme", "Acme Primer").expect("system");
        assert_eq!(system.coating_count, 4);
        Ok(())
    }

    #[test]
    fn missing_counts_come_from_trailing_digit() -> Result<()> {
        let catalog = parse_catalog(
            "[[companies]]\nname = \"Acme\"\nsystems = [{ name = \"Acme System 3\" }, { name = \"Acme System 1\" }]\n",
        )?;
        assert_eq!(catalog.system("Acme", "Acme System 3").map(|s| s.coating_count), Some(3));
        assert_eq!(catalog.system("Acme", "Acme System 1").map(|s| s.coating_count), Some(1));
        assert!(catalog.vendors().is_empty());
        Ok(())
    }

    #[test]
    fn non_digit_name_without_count_is_rejected() {
        let error = parse_catalog(
            "[[companies]]\nname = \"Acme\"\nsystems = [{ name = \"Acme Deluxe\" }]\n",
        )
        .expect_err("non-digit system should fail");
        let message = format!("{error:#}");
        assert!(message.contains("does not end in a digit"), "{message}");
        assert!(message.contains("Acme"), "{message}");
    }

    #[test]
    fn duplicate_system_across_companies_is_rejected() {
        let error = parse_catalog(
            "[[companies]]\nname = \"Acme\"\nsystems = [{ name = \"Shared 2\" }]\n\n[[companies]]\nname = \"Bloomers\"\nsystems = [{ name = \"Shared 2\" }]\n",
        )
        .expect_err("shared system should fail");
        assert!(error.to_string().contains("exactly one company"));
    }

    #[test]
    fn duplicate_vendor_is_rejected() {
        let error = parse_catalog(
            "[[vendors]]\nname = \"Vendor A\"\nprice = \"1\"\n\n[[vendors]]\nname = \"Vendor A\"\nprice = \"2\"\n",
        )
        .expect_err("duplicate vendor should fail");
        assert!(error.to_string().contains("duplicate vendor"));
    }

    #[test]
    fn price_strings_and_whole_dollars_parse() -> Result<()> {
        let catalog = parse_catalog(
            "[[vendors]]\nname = \"Formatted\"\nprice = \"$1,234.56\"\n\n[[vendors]]\nname = \"Short\"\nprice = \"95.5\"\n\n[[vendors]]\nname = \"Whole\"\nprice = 110\n",
        )?;
        assert_eq!(catalog.vendor("Formatted").map(|v| v.price_cents), Some(123_456));
        assert_eq!(catalog.vendor("Short").map(|v| v.price_cents), Some(9_550));
        assert_eq!(catalog.vendor("Whole").map(|v| v.price_cents), Some(11_000));
        Ok(())
    }

    #[test]
    fn bad_price_names_the_vendor() {
        let error = parse_catalog("[[vendors]]\nname = \"Vendor Z\"\nprice = \"12.345\"\n")
            .expect_err("three decimals should fail");
        let message = error.to_string();
        assert!(message.contains("Vendor Z"), "{message}");
        assert!(message.contains("more than two decimal places"), "{message}");
    }

    #[test]
    fn unquoted_decimal_price_names_the_vendor() {
        let error = parse_catalog("[[vendors]]\nname = \"Vendor Q\"\nprice = 95.5\n")
            .expect_err("bare decimal should fail");
        let message = error.to_string();
        assert!(message.contains("\"Vendor Q\""), "{message}");
        assert!(message.contains("\"95.5\""), "{message}");
        assert!(message.contains("decimal prices must be quoted"), "{message}");
        assert!(message.contains("\"100.00\""), "{message}");
    }

    #[test]
    fn negative_whole_dollars_are_rejected() {
        let error = parse_catalog("[[vendors]]\nname = \"Vendor Z\"\nprice = -5\n")
            .expect_err("negative price should fail");
        assert!(error.to_string().contains("cannot be negative"));
    }

    #[test]
    fn malformed_toml_is_reported() {
        let error = parse_catalog("[[companies]\n").expect_err("malformed catalog should fail");
        assert!(error.to_string().contains("parse TOML catalog"));
    }

    #[test]
    fn generated_catalog_files_load() -> Result<()> {
        for seed in 1_u64..=8_u64 {
            let expected = CatalogFaker::new(seed).catalog()?;
            let (_dir, path) = temp_catalog_file(&catalog_toml(&expected))?;
            assert_eq!(load_catalog(&path)?, expected);
        }
        Ok(())
    }

    #[test]
    fn missing_file_error_names_the_path() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("absent.toml");
        let error = load_catalog(&path).expect_err("missing file should fail");
        assert!(error.to_string().contains("absent.toml"));
        Ok(())
    }

    #[test]
    fn rendered_builtin_catalog_reloads() -> Result<()> {
        let rendered = render_catalog(&reference_catalog())?;
        assert!(rendered.contains("Acme System 2"));
        assert!(rendered.contains("\"95.00\""));
        let reloaded: Catalog = parse_catalog(&rendered)?;
        assert_eq!(reloaded, reference_catalog());
        Ok(())
    }
}
