use anyhow::{anyhow, Result};
use serde::Serialize;

use annograph_core::prelude::*;

use crate::output;

#[derive(Debug, Serialize)]
struct CatalogRow {
    key: String,
    value_type: ValueType,
    default: &'static str,
    description: String,
}

pub fn run(origin: Option<&str>, group: Option<&str>) -> Result<()> {
    let catalog = ItemCatalog::builtin()?;
    let origin = origin.map(parse_origin).transpose()?;
    let group = group.map(parse_group).transpose()?;

    let mut rows = Vec::new();
    for key in catalog.query(origin, group) {
        let entry = catalog.lookup(key)?;
        rows.push(CatalogRow {
            key: key.to_string(),
            value_type: entry.value_type,
            default: default_label(&entry.default),
            description: key.describe(),
        });
    }

    if output::is_json() {
        output::print(&rows)?;
        return Ok(());
    }

    output::heading(&format!("{} catalog items", rows.len()))?;
    for row in &rows {
        output::line(&format!(
            "{:<24} {:<6} {:<13} {}",
            row.key,
            row.value_type.as_str(),
            row.default,
            row.description,
        ));
    }
    Ok(())
}

fn parse_origin(s: &str) -> Result<Origin> {
    match s {
        "main" => Ok(Origin::Main),
        "annox" => Ok(Origin::Annox),
        "derived" => Ok(Origin::Derived),
        _ => Err(anyhow!("unknown origin {s}; expected main, annox, or derived")),
    }
}

fn parse_group(s: &str) -> Result<Group> {
    match s {
        "primary" => Ok(Group::Primary),
        "graph" => Ok(Group::Graph),
        "xmlid" => Ok(Group::XmlId),
        "feature" => Ok(Group::Feature),
        "connectivity" => Ok(Group::Connectivity),
        "temp" => Ok(Group::Temp),
        _ => Err(anyhow!(
            "unknown group {s}; expected primary, graph, xmlid, feature, connectivity, or temp"
        )),
    }
}

fn default_label(requirement: &Requirement) -> &'static str {
    match requirement {
        Requirement::Off => "off",
        Requirement::On => "on",
        Requirement::Selected(_) => "per-component",
    }
}
