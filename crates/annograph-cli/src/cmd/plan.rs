use std::fs;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::debug;

use annograph_core::prelude::*;

use crate::output;

#[derive(Debug, Serialize)]
struct PlanOut {
    spec: String,
    #[serde(flatten)]
    plan: LoadPlan,
}

pub fn run(specs: &[String], data_dir: &str) -> Result<()> {
    let locations = DataLocations::under_root(data_dir);
    let mut planner = LoadPlanner::builtin(locations)?;

    let mut outputs = Vec::new();
    for path in specs {
        let text = fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
        let spec = LoadSpec::from_json_str(&text).with_context(|| format!("validating {path}"))?;
        let plan = planner.request(&spec).with_context(|| format!("resolving {path}"))?;
        debug!(
            spec = path.as_str(),
            clear = plan.clear.len(),
            keep = plan.keep.len(),
            load = plan.load.len(),
            "planned request"
        );
        outputs.push(PlanOut { spec: path.clone(), plan });
    }

    if output::is_json() {
        output::print(&outputs)?;
        return Ok(());
    }

    for out in &outputs {
        output::heading(&out.spec)?;
        print_section("clear", &out.plan.clear);
        print_section("keep", &out.plan.keep);
        print_section("load", &out.plan.load);
    }
    Ok(())
}

fn print_section(label: &str, keys: &[ItemKey]) {
    output::line(&format!("  {label} ({})", keys.len()));
    for key in keys {
        output::line(&format!("    {:<24} {}", key.to_string(), key.describe()));
    }
}
