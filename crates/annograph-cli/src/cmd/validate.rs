use std::fs;

use anyhow::{Context, Result};
use serde::Serialize;

use annograph_core::loadspec::validate_value;
use annograph_core::AnnographError;

use crate::output;

#[derive(Debug, Serialize)]
struct ValidateOut {
    valid: bool,
    errors: Vec<String>,
}

pub fn run(spec_path: &str) -> Result<()> {
    let text = fs::read_to_string(spec_path).with_context(|| format!("reading {spec_path}"))?;
    let value: serde_json::Value =
        serde_json::from_str(&text).with_context(|| format!("parsing {spec_path}"))?;

    match validate_value(&value) {
        Ok(()) => {
            if output::is_json() {
                output::print(&ValidateOut { valid: true, errors: Vec::new() })?;
            } else {
                output::line(&format!("{spec_path}: ok"));
            }
            Ok(())
        }
        Err(err) => {
            let errors = match &err {
                AnnographError::SpecShape { report } => {
                    report.lines().map(str::to_string).collect()
                }
                other => vec![other.to_string()],
            };
            if output::is_json() {
                output::print(&ValidateOut { valid: false, errors })?;
            }
            Err(anyhow::Error::new(err).context(format!("{spec_path} failed validation")))
        }
    }
}
