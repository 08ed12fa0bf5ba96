// SPDX-FileCopyrightText: 2026 Botbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered TOML configuration for the botbridge pipeline.
//!
//! Loading is split from validation: [`loader`] produces a [`model::BridgeConfig`]
//! from the XDG hierarchy plus env overrides, and [`validation`] checks
//! cross-references (bots -> platforms/datasources/actions) in a single pass.

pub mod loader;
pub mod model;
pub mod validation;

pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::BridgeConfig;

/// Load from the standard hierarchy and validate, collecting every problem.
#[allow(clippy::result_large_err)]
pub fn load_and_validate() -> Result<BridgeConfig, Vec<String>> {
    let config = load_config().map_err(|e| vec![e.to_string()])?;
    let errors = validation::validate(&config);
    if errors.is_empty() {
        Ok(config)
    } else {
        Err(errors)
    }
}

/// Print validation diagnostics to stderr, one per line.
pub fn render_errors(errors: &[String]) {
    for error in errors {
        eprintln!("botbridge: config error: {error}");
    }
}
