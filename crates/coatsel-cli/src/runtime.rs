// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use coatsel_app::CompletedOrder;
use coatsel_tui::{FormRuntime, NextStep};
use tracing::info;

/// Keeps the order handed over by `Next` and closes the form.
#[derive(Debug, Default)]
pub struct CliRuntime {
    order: Option<CompletedOrder>,
}

impl CliRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_order(self) -> Option<CompletedOrder> {
        self.order
    }
}

impl FormRuntime for CliRuntime {
    fn proceed(&mut self, order: &CompletedOrder) -> Result<NextStep> {
        info!(
            company = %order.company,
            system = %order.system,
            coatings = order.assignments.len(),
            total_cents = order.total_cents,
            "order completed"
        );
        self.order = Some(order.clone());
        Ok(NextStep::Exit)
    }
}

pub fn order_json(order: &CompletedOrder) -> Result<String> {
    serde_json::to_string_pretty(order).context("encode completed order as JSON")
}
