// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoatingSystem {
    pub name: String,
    pub coating_count: u8,
}

impl CoatingSystem {
    pub fn new(name: impl Into<String>, coating_count: u8) -> Self {
        Self {
            name: name.into(),
            coating_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub name: String,
    pub systems: Vec<CoatingSystem>,
}

impl Company {
    pub fn new(name: impl Into<String>, systems: Vec<CoatingSystem>) -> Self {
        Self {
            name: name.into(),
            systems,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vendor {
    pub name: String,
    pub price_cents: i64,
}

impl Vendor {
    pub fn new(name: impl Into<String>, price_cents: i64) -> Self {
        Self {
            name: name.into(),
            price_cents,
        }
    }
}

/// Reference data the form selects from. Validated on construction and
/// immutable afterwards; declaration order is preserved everywhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Catalog {
    companies: Vec<Company>,
    vendors: Vec<Vendor>,
}

impl Catalog {
    pub fn new(companies: Vec<Company>, vendors: Vec<Vendor>) -> Result<Self> {
        let mut company_names = BTreeSet::new();
        let mut system_names = BTreeSet::new();
        for company in &companies {
            if company.name.trim().is_empty() {
                bail!("company name is required -- every [[companies]] entry needs a name");
            }
            if !company_names.insert(company.name.as_str()) {
                bail!("duplicate company {:?} -- company names must be unique", company.name);
            }
            for system in &company.systems {
                if system.name.trim().is_empty() {
                    bail!("system name is required under company {:?}", company.name);
                }
                if !system_names.insert(system.name.as_str()) {
                    bail!(
                        "duplicate system {:?} -- every system belongs to exactly one company",
                        system.name
                    );
                }
            }
        }

        let mut vendor_names = BTreeSet::new();
        for vendor in &vendors {
            if vendor.name.trim().is_empty() {
                bail!("vendor name is required -- every [[vendors]] entry needs a name");
            }
            if !vendor_names.insert(vendor.name.as_str()) {
                bail!("duplicate vendor {:?} -- vendor names must be unique", vendor.name);
            }
            if vendor.price_cents < 0 {
                bail!("vendor {:?} price cannot be negative", vendor.name);
            }
        }

        Ok(Self { companies, vendors })
    }

    pub fn builtin() -> Self {
        let companies = ["Acme", "Bloomers", "Constantine"]
            .into_iter()
            .map(|company| {
                let systems = (1..=3u8)
                    .map(|count| CoatingSystem::new(format!("{company} System {count}"), count))
                    .collect();
                Company::new(company, systems)
            })
            .collect();
        let vendors = vec![
            Vendor::new("Vendor A", 10_000),
            Vendor::new("Vendor B", 12_000),
            Vendor::new("Vendor C", 9_500),
            Vendor::new("Vendor D", 11_000),
        ];
        Self { companies, vendors }
    }

    pub fn companies(&self) -> Vec<&str> {
        self.companies
            .iter()
            .map(|company| company.name.as_str())
            .collect()
    }

    pub fn company(&self, name: &str) -> Option<&Company> {
        self.companies.iter().find(|company| company.name == name)
    }

    pub fn company_records(&self) -> &[Company] {
        &self.companies
    }

    /// Systems declared under `company`; empty for an unknown company.
    pub fn systems_of(&self, company: &str) -> Vec<&str> {
        self.company(company)
            .map(|company| {
                company
                    .systems
                    .iter()
                    .map(|system| system.name.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn system(&self, company: &str, system: &str) -> Option<&CoatingSystem> {
        self.company(company)?
            .systems
            .iter()
            .find(|candidate| candidate.name == system)
    }

    pub fn vendors(&self) -> &[Vendor] {
        &self.vendors
    }

    pub fn vendor(&self, name: &str) -> Option<&Vendor> {
        self.vendors.iter().find(|vendor| vendor.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoatingAssignment {
    pub coating: String,
    pub vendor: String,
    pub price_cents: i64,
}

/// Snapshot of a complete selection, handed to whatever runs after `Next`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedOrder {
    pub company: String,
    pub system: String,
    pub assignments: Vec<CoatingAssignment>,
    pub total_cents: i64,
}

#[cfg(test)]
mod tests {
    use super::{Catalog, CoatingSystem, Company, Vendor};

    #[test]
    fn builtin_catalog_keeps_declared_order() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.companies(), vec!["Acme", "Bloomers", "Constantine"]);
        assert_eq!(
            catalog.systems_of("Bloomers"),
            vec!["Bloomers System 1", "Bloomers System 2", "Bloomers System 3"]
        );
        let vendors = catalog
            .vendors()
            .iter()
            .map(|vendor| (vendor.name.as_str(), vendor.price_cents))
            .collect::<Vec<_>>();
        assert_eq!(
            vendors,
            vec![
                ("Vendor A", 10_000),
                ("Vendor B", 12_000),
                ("Vendor C", 9_500),
                ("Vendor D", 11_000),
            ]
        );
    }

    #[test]
    fn builtin_coating_counts_match_trailing_digit() {
        let catalog = Catalog::builtin();
        for company in catalog.company_records() {
            for system in &company.systems {
                let digit = system
                    .name
                    .chars()
                    .last()
                    .and_then(|ch| ch.to_digit(10))
                    .expect("builtin names end in a digit");
                assert_eq!(u32::from(system.coating_count), digit, "{}", system.name);
            }
        }
    }

    #[test]
    fn builtin_catalog_passes_validation() {
        let builtin = Catalog::builtin();
        let rebuilt = Catalog::new(
            builtin.company_records().to_vec(),
            builtin.vendors().to_vec(),
        )
        .expect("builtin catalog is valid");
        assert_eq!(rebuilt, builtin);
    }

    #[test]
    fn unknown_company_has_no_systems() {
        assert!(Catalog::builtin().systems_of("Nobody").is_empty());
    }

    #[test]
    fn system_lookup_is_scoped_to_company() {
        let catalog = Catalog::builtin();
        assert!(catalog.system("Acme", "Acme System 2").is_some());
        assert!(catalog.system("Bloomers", "Acme System 2").is_none());
    }

    #[test]
    fn system_shared_between_companies_is_rejected() {
        let error = Catalog::new(
            vec![
                Company::new("Acme", vec![CoatingSystem::new("Shared 1", 1)]),
                Company::new("Bloomers", vec![CoatingSystem::new("Shared 1", 1)]),
            ],
            Vec::new(),
        )
        .expect_err("shared system should fail");
        assert!(error.to_string().contains("exactly one company"));
    }

    #[test]
    fn duplicate_company_is_rejected() {
        let error = Catalog::new(
            vec![Company::new("Acme", Vec::new()), Company::new("Acme", Vec::new())],
            Vec::new(),
        )
        .expect_err("duplicate company should fail");
        assert!(error.to_string().contains("duplicate company"));
    }

    #[test]
    fn duplicate_and_negative_vendors_are_rejected() {
        let duplicate = Catalog::new(
            Vec::new(),
            vec![Vendor::new("Vendor A", 1), Vendor::new("Vendor A", 2)],
        )
        .expect_err("duplicate vendor should fail");
        assert!(duplicate.to_string().contains("duplicate vendor"));

        let negative = Catalog::new(Vec::new(), vec![Vendor::new("Vendor A", -1)])
            .expect_err("negative price should fail");
        assert!(negative.to_string().contains("cannot be negative"));
    }

    #[test]
    fn blank_names_are_rejected() {
        assert!(Catalog::new(vec![Company::new(" ", Vec::new())], Vec::new()).is_err());
        assert!(
            Catalog::new(
                vec![Company::new("Acme", vec![CoatingSystem::new("", 1)])],
                Vec::new()
            )
            .is_err()
        );
        assert!(Catalog::new(Vec::new(), vec![Vendor::new("", 1)]).is_err());
    }
}
