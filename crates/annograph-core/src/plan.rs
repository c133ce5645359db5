//! Differential load planning.
//!
//! A [`LoadPlanner`] owns the catalog, the data locations, and the
//! resolution that is currently active for its session. Every request is
//! resolved afresh and compared against the active resolution; the
//! comparison partitions all keys into items to clear, items to keep, and
//! items to load. An item whose identity and parameters have not changed
//! between two successive requests is never reloaded.
//!
//! Ordering is deterministic: `clear` follows the previous resolution's
//! order, `keep` and `load` follow the new resolution's (catalog) order.

use serde::Serialize;

use crate::catalog::ItemCatalog;
use crate::env::DataLocations;
use crate::errors::AnnographResult;
use crate::key::ItemKey;
use crate::loadspec::LoadSpec;
use crate::resolve::{resolve_requests, Requirements, Resolution};

/// The clear/keep/load partition produced by comparing two resolutions.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadPlan {
    /// Previously loaded items to discard: absent from the new resolution
    /// or resolved with different parameters.
    pub clear: Vec<ItemKey>,
    /// Items resolved identically in both resolutions; nothing to do.
    pub keep: Vec<ItemKey>,
    /// New or changed items to read from storage. Transient and
    /// derived-only items never appear here.
    pub load: Vec<ItemKey>,
}

/// Partition keys by comparing the previous resolution with the new one.
pub fn diff(previous: &Resolution, next: &Resolution) -> LoadPlan {
    let mut plan = LoadPlan::default();

    for (key, info) in previous {
        if next.get(key) != Some(info) {
            plan.clear.push(key.clone());
        }
    }

    for (key, info) in next {
        if previous.get(key) == Some(info) {
            plan.keep.push(key.clone());
        } else if info.is_loadable() {
            plan.load.push(key.clone());
        }
    }

    plan
}

/// The per-session request engine.
///
/// Holds the previously resolved mapping as process state across calls;
/// each successful request replaces it wholesale. A failed request leaves
/// the active resolution untouched. One planner serves one session;
/// callers needing parallel sessions create one planner each.
pub struct LoadPlanner {
    catalog: ItemCatalog,
    locations: DataLocations,
    active: Resolution,
}

impl LoadPlanner {
    /// A planner over an explicit catalog.
    pub fn new(catalog: ItemCatalog, locations: DataLocations) -> Self {
        Self { catalog, locations, active: Resolution::new() }
    }

    /// A planner over the built-in catalog.
    pub fn builtin(locations: DataLocations) -> AnnographResult<Self> {
        Ok(Self::new(ItemCatalog::builtin()?, locations))
    }

    pub fn catalog(&self) -> &ItemCatalog {
        &self.catalog
    }

    /// The currently active resolution.
    pub fn active(&self) -> &Resolution {
        &self.active
    }

    /// Resolve a load spec and plan the difference against the active
    /// resolution. On success the new resolution becomes the active one.
    pub fn request(&mut self, spec: &LoadSpec) -> AnnographResult<LoadPlan> {
        let mut requirements = Requirements::from_catalog(&self.catalog);
        requirements.apply(spec);
        self.request_requirements(&requirements)
    }

    /// As [`request`](Self::request), but from an explicit requirement
    /// mapping.
    pub fn request_requirements(
        &mut self,
        requirements: &Requirements,
    ) -> AnnographResult<LoadPlan> {
        let next = resolve_requests(&self.catalog, requirements, &self.locations)?;
        let plan = diff(&self.active, &next);
        self.active = next;
        Ok(plan)
    }

    /// Validate a raw JSON document, then resolve and plan it.
    pub fn request_value(&mut self, value: &serde_json::Value) -> AnnographResult<LoadPlan> {
        let spec = LoadSpec::from_value(value)?;
        self.request(&spec)
    }

    /// Drop the active resolution, as if no request had been made yet.
    pub fn reset(&mut self) {
        self.active = Resolution::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Requirement, ValueType};
    use crate::resolve::ResolvedItem;
    use serde_json::json;

    fn planner() -> LoadPlanner {
        LoadPlanner::builtin(DataLocations::under_root("/work")).unwrap()
    }

    fn names(keys: &[ItemKey]) -> Vec<String> {
        keys.iter().map(ItemKey::to_string).collect()
    }

    #[test]
    fn first_request_loads_everything_loadable() {
        let mut p = planner();
        let plan = p.request(&LoadSpec::default()).unwrap();
        assert!(plan.clear.is_empty());
        assert!(plan.keep.is_empty());
        // The graph family is on by default.
        assert_eq!(plan.load.len(), 6);
        assert!(names(&plan.load).contains(&"mG00(node_sort)".to_string()));
    }

    #[test]
    fn identical_request_keeps_everything() {
        let mut p = planner();
        let spec = LoadSpec::from_value(&json!({
            "primary": true,
            "features": { "ft": { "node": ["text"] } }
        }))
        .unwrap();
        let first = p.request(&spec).unwrap();
        let second = p.request(&spec).unwrap();
        assert!(second.clear.is_empty());
        assert!(second.load.is_empty());
        assert_eq!(names(&second.keep), names(&first.load));
    }

    #[test]
    fn dropping_a_requirement_clears_its_items() {
        let mut p = planner();
        let with_primary = LoadSpec::from_value(&json!({ "primary": true })).unwrap();
        p.request(&with_primary).unwrap();

        let without = LoadSpec::default();
        let plan = p.request(&without).unwrap();
        assert!(names(&plan.clear).contains(&"mP00(primary_data)".to_string()));
        assert!(plan.load.is_empty());
        assert_eq!(plan.keep.len(), 6);
    }

    #[test]
    fn changed_location_reloads() {
        let catalog = ItemCatalog::builtin().unwrap();
        let mut p = LoadPlanner::new(catalog, DataLocations::under_root("/work"));
        p.request(&LoadSpec::default()).unwrap();

        // Same request against relocated data: parameters differ, so every
        // item is cleared and loaded again.
        let catalog = ItemCatalog::builtin().unwrap();
        let mut moved = LoadPlanner::new(catalog, DataLocations::under_root("/other"));
        moved.active = p.active.clone();
        let plan = moved.request(&LoadSpec::default()).unwrap();
        assert_eq!(plan.clear.len(), 6);
        assert_eq!(plan.load.len(), 6);
        assert!(plan.keep.is_empty());
    }

    #[test]
    fn failed_request_leaves_state_intact() {
        let locations = DataLocations::new().with_dir(crate::key::Origin::Main, "/work/main");
        let mut p = LoadPlanner::builtin(locations).unwrap();
        let plan = p.request(&LoadSpec::default()).unwrap();
        assert_eq!(plan.load.len(), 6);
        let active_before: Vec<String> = p.active().keys().map(ItemKey::to_string).collect();

        // Features need the annox directory, which is not configured.
        let spec = LoadSpec::from_value(&json!({
            "features": { "ft": { "node": ["text"] } }
        }))
        .unwrap();
        assert!(p.request(&spec).is_err());
        let active_after: Vec<String> = p.active().keys().map(ItemKey::to_string).collect();
        assert_eq!(active_after, active_before);
    }

    #[test]
    fn diff_orders_follow_source_mappings() {
        let mut old = Resolution::new();
        let mut new = Resolution::new();
        let stored = |name: &str| ResolvedItem::Stored {
            persistent: true,
            location: "/work/main".into(),
            file_name: name.to_string(),
            value_type: ValueType::Array,
            derived_only: false,
        };
        let a: ItemKey = "mG00(edges_from)".parse().unwrap();
        let b: ItemKey = "mG00(edges_to)".parse().unwrap();
        let c: ItemKey = "mG00(node_sort)".parse().unwrap();
        old.insert(b.clone(), stored("b"));
        old.insert(a.clone(), stored("a"));
        new.insert(c.clone(), stored("c"));

        let plan = diff(&old, &new);
        assert_eq!(names(&plan.clear), vec!["mG00(edges_to)", "mG00(edges_from)"]);
        assert_eq!(names(&plan.load), vec!["mG00(node_sort)"]);
    }

    #[test]
    fn explicit_requirements_drive_the_planner() {
        let mut p = planner();
        let mut reqs = Requirements::from_catalog(p.catalog());
        reqs.set(&"mG00".parse().unwrap(), Requirement::Off);
        reqs.select(&"mXnf".parse().unwrap(), Vec::new());
        let plan = p.request_requirements(&reqs).unwrap();
        // Selecting the empty component tuple emits the bare identifier map.
        assert_eq!(names(&plan.load), vec!["mXnf"]);
    }
}
