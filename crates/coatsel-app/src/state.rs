// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use tracing::{debug, info};

use crate::{Catalog, CoatingAssignment, CompletedOrder, Derived, evaluate, price_of};

/// Selection fields in dependency order. Setting a field invalidates every
/// field after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SelectionField {
    Company,
    System,
    Vendors,
}

impl SelectionField {
    pub const CHAIN: [Self; 3] = [Self::Company, Self::System, Self::Vendors];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Company => "company",
            Self::System => "system",
            Self::Vendors => "vendors",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selection {
    pub company: Option<String>,
    pub system: Option<String>,
    pub vendors: Vec<Option<String>>,
}

impl Selection {
    fn is_set(&self, field: SelectionField) -> bool {
        match field {
            SelectionField::Company => self.company.is_some(),
            SelectionField::System => self.system.is_some(),
            SelectionField::Vendors => !self.vendors.is_empty(),
        }
    }

    fn clear(&mut self, field: SelectionField) {
        match field {
            SelectionField::Company => self.company = None,
            SelectionField::System => self.system = None,
            SelectionField::Vendors => self.vendors.clear(),
        }
    }

    /// Clears every field downstream of `field` and reports the ones that held
    /// a value.
    fn invalidate_after(&mut self, field: SelectionField) -> Vec<SelectionField> {
        let mut cleared = Vec::new();
        for downstream in SelectionField::CHAIN
            .into_iter()
            .filter(|candidate| *candidate > field)
        {
            if self.is_set(downstream) {
                cleared.push(downstream);
            }
            self.clear(downstream);
        }
        cleared
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormState {
    pub selection: Selection,
    pub status_line: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormCommand {
    ChangeCompany(Option<String>),
    ChangeSystem(Option<String>),
    ChooseVendor {
        index: usize,
        vendor: Option<String>,
    },
    RequestNext,
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    CompanyChanged(Option<String>),
    SystemChanged(Option<String>),
    VendorChosen {
        index: usize,
        vendor: Option<String>,
    },
    Invalidated(SelectionField),
    NextRequested(CompletedOrder),
    Rejected(String),
    StatusUpdated(String),
    StatusCleared,
}

impl FormState {
    pub fn derived(&self, catalog: &Catalog) -> Derived {
        evaluate(catalog, &self.selection)
    }

    pub fn is_complete(&self, catalog: &Catalog) -> bool {
        self.derived(catalog).complete
    }

    pub fn completed_order(&self, catalog: &Catalog) -> Option<CompletedOrder> {
        let derived = self.derived(catalog);
        if !derived.complete {
            return None;
        }
        let company = self.selection.company.clone()?;
        let system = self.selection.system.clone()?;
        let assignments = derived
            .coatings
            .into_iter()
            .zip(self.selection.vendors.iter().flatten())
            .map(|(coating, vendor)| CoatingAssignment {
                coating,
                vendor: vendor.clone(),
                price_cents: price_of(catalog, vendor),
            })
            .collect();
        Some(CompletedOrder {
            company,
            system,
            assignments,
            total_cents: derived.total_cents,
        })
    }

    pub fn dispatch(&mut self, catalog: &Catalog, command: FormCommand) -> Vec<FormEvent> {
        debug!(?command, "dispatch");
        match command {
            FormCommand::ChangeCompany(company) => self.change_company(catalog, company),
            FormCommand::ChangeSystem(system) => self.change_system(catalog, system),
            FormCommand::ChooseVendor { index, vendor } => {
                self.choose_vendor(catalog, index, vendor)
            }
            FormCommand::RequestNext => match self.completed_order(catalog) {
                Some(order) => {
                    info!(
                        company = %order.company,
                        system = %order.system,
                        total_cents = order.total_cents,
                        "next requested"
                    );
                    vec![FormEvent::NextRequested(order)]
                }
                // The control is disabled while incomplete; nothing to report.
                None => Vec::new(),
            },
            FormCommand::SetStatus(message) => vec![self.set_status(message)],
            FormCommand::ClearStatus => {
                self.status_line = None;
                vec![FormEvent::StatusCleared]
            }
        }
    }

    fn change_company(&mut self, catalog: &Catalog, company: Option<String>) -> Vec<FormEvent> {
        let company = non_empty(company);
        if let Some(name) = &company
            && catalog.company(name).is_none()
        {
            return self.reject(format!("unknown company {name:?}"));
        }
        if company == self.selection.company {
            return Vec::new();
        }

        self.selection.company = company.clone();
        let mut events = vec![FormEvent::CompanyChanged(company)];
        events.extend(
            self.selection
                .invalidate_after(SelectionField::Company)
                .into_iter()
                .map(FormEvent::Invalidated),
        );
        events
    }

    fn change_system(&mut self, catalog: &Catalog, system: Option<String>) -> Vec<FormEvent> {
        let Some(company) = self.selection.company.clone() else {
            return self.reject("choose a company before a system".to_owned());
        };
        let system = non_empty(system);
        if let Some(name) = &system
            && catalog.system(&company, name).is_none()
        {
            return self.reject(format!("system {name:?} does not belong to {company:?}"));
        }
        if system == self.selection.system {
            return Vec::new();
        }

        self.selection.system = system.clone();
        let mut events = vec![FormEvent::SystemChanged(system)];
        events.extend(
            self.selection
                .invalidate_after(SelectionField::System)
                .into_iter()
                .map(FormEvent::Invalidated),
        );
        events
    }

    fn choose_vendor(
        &mut self,
        catalog: &Catalog,
        index: usize,
        vendor: Option<String>,
    ) -> Vec<FormEvent> {
        let coating_count = self.derived(catalog).coatings.len();
        if index >= coating_count {
            return self.reject(format!(
                "coating {} out of range; the selected system needs {coating_count}",
                index + 1
            ));
        }

        let vendor = non_empty(vendor);
        if let Some(name) = &vendor
            && catalog.vendor(name).is_none()
        {
            debug!(vendor = %name, "vendor not in catalog; priced at zero");
        }
        if self.selection.vendors.len() <= index {
            self.selection.vendors.resize(index + 1, None);
        }
        self.selection.vendors[index] = vendor.clone();
        vec![FormEvent::VendorChosen { index, vendor }]
    }

    fn reject(&mut self, reason: String) -> Vec<FormEvent> {
        debug!(%reason, "command rejected");
        vec![
            FormEvent::Rejected(reason.clone()),
            self.set_status(reason),
        ]
    }

    fn set_status(&mut self, message: String) -> FormEvent {
        self.status_line = Some(message.clone());
        FormEvent::StatusUpdated(message)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}
