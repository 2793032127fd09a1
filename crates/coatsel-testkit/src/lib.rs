// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use coatsel_app::{Catalog, CoatingSystem, Company, Vendor, format_price};
use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

const COMPANY_ADJECTIVES: [&str; 12] = [
    "Premier",
    "Central",
    "Reliable",
    "Bright",
    "Quality",
    "Summit",
    "Eagle",
    "Heritage",
    "Greenleaf",
    "Harbor",
    "Hartley",
    "Apex",
];
const COMPANY_NOUNS: [&str; 8] = [
    "Coatings",
    "Finishes",
    "Industrial",
    "Marine",
    "Surfaces",
    "Polymers",
    "Protective",
    "Works",
];
const VENDOR_NAMES: [&str; 10] = [
    "Armorline",
    "BlueRidge Supply",
    "Coastal Paint",
    "Duraseal",
    "Everbond",
    "Fairway Distributors",
    "Granite State",
    "Hightide",
    "Ironclad",
    "Juniper",
];
const SYSTEM_LETTERS: [char; 6] = ['A', 'B', 'C', 'D', 'E', 'F'];

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }
}

/// Builds deterministic, valid catalogs for tests. Every generated system name
/// ends in the digit of its coating count, like the built-in catalog.
#[derive(Debug, Clone)]
pub struct CatalogFaker {
    rng: DeterministicRng,
}

impl CatalogFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
        }
    }

    pub fn int_n(&mut self, n: usize) -> usize {
        self.rng.int_n(n)
    }

    pub fn catalog(&mut self) -> Result<Catalog> {
        let company_count = 1 + self.rng.int_n(5);
        let mut names = BTreeSet::new();
        let mut companies = Vec::with_capacity(company_count);
        while companies.len() < company_count {
            let name = format!(
                "{} {}",
                self.pick(&COMPANY_ADJECTIVES),
                self.pick(&COMPANY_NOUNS)
            );
            if !names.insert(name.clone()) {
                continue;
            }
            companies.push(self.company(&name));
        }

        let vendor_count = 1 + self.rng.int_n(VENDOR_NAMES.len());
        let vendors = VENDOR_NAMES[..vendor_count]
            .iter()
            .map(|name| self.vendor(name))
            .collect();

        Catalog::new(companies, vendors).context("generated catalog should validate")
    }

    pub fn company(&mut self, name: &str) -> Company {
        let system_count = 1 + self.rng.int_n(SYSTEM_LETTERS.len());
        let systems = SYSTEM_LETTERS[..system_count]
            .iter()
            .map(|letter| {
                let coating_count = 1 + self.rng.int_n(9) as u8;
                CoatingSystem::new(format!("{name} System {letter}{coating_count}"), coating_count)
            })
            .collect();
        Company::new(name, systems)
    }

    pub fn vendor(&mut self, name: &str) -> Vendor {
        let dollars = 25 + self.rng.int_n(476) as i64;
        let cents = if self.rng.int_n(2) == 0 {
            0
        } else {
            self.rng.int_n(100) as i64
        };
        Vendor::new(name, dollars * 100 + cents)
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }
}

pub fn reference_catalog() -> Catalog {
    Catalog::builtin()
}

/// Renders `catalog` in the catalog-file format with explicit coating counts.
pub fn catalog_toml(catalog: &Catalog) -> String {
    let mut out = String::new();
    for company in catalog.company_records() {
        let _ = writeln!(out, "[[companies]]");
        let _ = writeln!(out, "name = {:?}", company.name);
        let systems = company
            .systems
            .iter()
            .map(|system| {
                format!(
                    "{{ name = {:?}, coatings = {} }}",
                    system.name, system.coating_count
                )
            })
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(out, "systems = [{systems}]");
        let _ = writeln!(out);
    }
    for vendor in catalog.vendors() {
        let _ = writeln!(out, "[[vendors]]");
        let _ = writeln!(out, "name = {:?}", vendor.name);
        let _ = writeln!(out, "price = \"{}\"", format_price(vendor.price_cents));
        let _ = writeln!(out);
    }
    out
}

pub fn write_file(dir: &Path, name: &str, contents: &str) -> Result<PathBuf> {
    let path = dir.join(name);
    std::fs::write(&path, contents).with_context(|| format!("write {}", path.display()))?;
    Ok(path)
}

pub fn temp_catalog_file(contents: &str) -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let path = write_file(dir.path(), "catalog.toml", contents)?;
    Ok((dir, path))
}

#[cfg(test)]
mod tests {
    use super::{CatalogFaker, catalog_toml, reference_catalog};
    use std::collections::BTreeSet;

    #[test]
    fn new_deterministic_seed() {
        let left = CatalogFaker::new(42).catalog().expect("catalog");
        let right = CatalogFaker::new(42).catalog().expect("catalog");
        assert_eq!(left, right);
    }

    #[test]
    fn generated_system_names_end_in_their_count() {
        for seed in 0_u64..20_u64 {
            let catalog = CatalogFaker::new(seed).catalog().expect("catalog");
            for company in catalog.company_records() {
                for system in &company.systems {
                    let last = system.name.chars().last().and_then(|ch| ch.to_digit(10));
                    assert_eq!(last, Some(u32::from(system.coating_count)));
                }
            }
        }
    }

    #[test]
    fn variety_across_seeds() {
        let mut names = BTreeSet::new();
        for seed in 0_u64..20_u64 {
            let catalog = CatalogFaker::new(seed).catalog().expect("catalog");
            names.extend(catalog.companies().into_iter().map(str::to_owned));
        }
        assert!(names.len() >= 10, "got {}", names.len());
    }

    #[test]
    fn catalog_toml_lists_every_record() {
        let rendered = catalog_toml(&reference_catalog());
        assert_eq!(rendered.matches("[[companies]]").count(), 3);
        assert_eq!(rendered.matches("[[vendors]]").count(), 4);
        assert!(rendered.contains("{ name = \"Acme System 2\", coatings = 2 }"));
        assert!(rendered.contains("price = \"95.00\""));
    }

    #[test]
    fn int_n() {
        let mut faker = CatalogFaker::new(42);
        for _ in 0..100 {
            assert!(faker.int_n(5) < 5);
        }
    }
}
