// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod derivation;
pub mod model;
pub mod money;
pub mod state;

pub use derivation::*;
pub use model::*;
pub use money::*;
pub use state::*;
