//! Request resolution: from requirements to a flat, ordered resolution.
//!
//! A [`Requirements`] mapping assigns a [`Requirement`] to each minimal
//! key. It starts as a fresh copy of the catalog defaults and is then
//! overlaid with the user's load spec. [`resolve_requests`] expands the
//! active requirements, catalog entry by catalog entry, into an ordered
//! mapping from fully qualified key to [`ResolvedItem`] — the storage
//! location, physical file name, and value-type parameters the loader
//! needs.
//!
//! Resolution is a pure function of (catalog, requirements, locations);
//! nothing here touches disk.

use std::path::PathBuf;

use indexmap::IndexMap;

use crate::catalog::{ItemCatalog, Requirement, ValueType};
use crate::env::DataLocations;
use crate::errors::AnnographResult;
use crate::key::{Direction, Group, ItemKey, Kind, Origin};
use crate::loadspec::LoadSpec;

/// Storage and type parameters for one fully qualified key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedItem {
    /// Group `Temp`: working data with no storage presence. Never subject
    /// to location-based (re)loading.
    Transient,
    /// A storable item.
    Stored {
        /// False exactly for the feature and connectivity groups; these
        /// may legitimately be absent on disk and get recomputed instead.
        persistent: bool,
        /// Compiled-data directory for the item's origin.
        location: PathBuf,
        /// Physical file name inside `location`.
        file_name: String,
        /// Decoding strategy tag.
        value_type: ValueType,
        /// True exactly for derived-origin items; their values come from
        /// the external preparer, not from storage.
        derived_only: bool,
    },
}

impl ResolvedItem {
    /// True when this item can be read from storage by the loader.
    pub fn is_loadable(&self) -> bool {
        matches!(self, Self::Stored { derived_only: false, .. })
    }
}

/// The ordered mapping from fully qualified key to resolution parameters.
pub type Resolution = IndexMap<ItemKey, ResolvedItem>;

/// Requirement per minimal key, in catalog order.
#[derive(Debug, Clone)]
pub struct Requirements {
    slots: IndexMap<String, Requirement>,
}

impl Requirements {
    /// Fresh defaults for the full catalog.
    ///
    /// Structural defaults are copied entry by entry, so overlaying one
    /// session's requirements can never leak selections into another
    /// session or back into the catalog.
    pub fn from_catalog(catalog: &ItemCatalog) -> Self {
        let mut slots = IndexMap::new();
        for (key, entry) in catalog.iter() {
            slots.insert(key.minimal().to_string(), entry.default.clone());
        }
        Self { slots }
    }

    /// The requirement for a minimal key, if present.
    pub fn get(&self, minimal: &ItemKey) -> Option<&Requirement> {
        self.slots.get(&minimal.to_string())
    }

    /// Replace the requirement for a key's minimal-key slot.
    pub fn set(&mut self, key: &ItemKey, requirement: Requirement) {
        self.slots.insert(key.minimal().to_string(), requirement);
    }

    /// Append one component tuple to a key's selection list.
    pub fn select(&mut self, key: &ItemKey, components: Vec<String>) {
        let slot = self
            .slots
            .entry(key.minimal().to_string())
            .or_insert_with(Requirement::fill_in);
        match slot {
            Requirement::Selected(selections) => selections.push(components),
            _ => *slot = Requirement::Selected(vec![components]),
        }
    }

    /// Overlay a validated load spec onto these requirements.
    ///
    /// - `primary` switches on the whole primary-data family;
    /// - `xmlids` switches on the forward and backward identifier maps for
    ///   the requested kinds;
    /// - feature names select `(namespace, name)` component tuples in both
    ///   the main and the annox feature families; edge features also
    ///   select the corresponding connectivity maps in both directions,
    ///   since connectivity is materialized per edge feature;
    /// - a non-empty `prepare` section admits the derived graph items into
    ///   the resolution, so the planner can track what the external
    ///   preparer will produce.
    pub fn apply(&mut self, spec: &LoadSpec) {
        use crate::key::Direction::{Backward, Forward};
        use crate::key::Kind::{Edge, Node};

        let min = ItemKey::minimal_key;

        if spec.primary {
            self.set(&min(Origin::Main, Group::Primary, Kind::None, Direction::None), Requirement::On);
        }

        if spec.xmlids.node {
            self.set(&min(Origin::Main, Group::XmlId, Node, Forward), Requirement::On);
            self.set(&min(Origin::Main, Group::XmlId, Node, Backward), Requirement::On);
        }
        if spec.xmlids.edge {
            self.set(&min(Origin::Main, Group::XmlId, Edge, Forward), Requirement::On);
            self.set(&min(Origin::Main, Group::XmlId, Edge, Backward), Requirement::On);
        }

        for family in &spec.features {
            for name in &family.node {
                let components = vec![family.namespace.clone(), name.clone()];
                for origin in [Origin::Main, Origin::Annox] {
                    self.select(
                        &min(origin, Group::Feature, Node, Direction::None),
                        components.clone(),
                    );
                }
            }
            for name in &family.edge {
                let components = vec![family.namespace.clone(), name.clone()];
                for origin in [Origin::Main, Origin::Annox] {
                    self.select(
                        &min(origin, Group::Feature, Edge, Direction::None),
                        components.clone(),
                    );
                    for direction in [Forward, Backward] {
                        self.select(
                            &min(origin, Group::Connectivity, Kind::None, direction),
                            components.clone(),
                        );
                    }
                }
            }
        }

        if !spec.prepare.is_empty() {
            self.set(&min(Origin::Derived, Group::Graph, Kind::None, Direction::None), Requirement::On);
        }
    }

    /// Iterate (minimal key, requirement) in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Requirement)> {
        self.slots.iter().map(|(k, r)| (k.as_str(), r))
    }
}

/// Resolve one key's storage and type parameters.
///
/// Catalog lookup falls back to the minimal key for keys composed from
/// user-selected components. Group `Temp` resolves to the transient
/// marker.
pub fn resolve_item(
    catalog: &ItemCatalog,
    locations: &DataLocations,
    key: &ItemKey,
) -> AnnographResult<ResolvedItem> {
    let entry = catalog.lookup(key)?;
    if key.group() == Group::Temp {
        return Ok(ResolvedItem::Transient);
    }
    let location = locations.compiled_dir(key.origin())?.to_path_buf();
    Ok(ResolvedItem::Stored {
        persistent: !matches!(key.group(), Group::Feature | Group::Connectivity),
        location,
        file_name: key.storage_name(),
        value_type: entry.value_type,
        derived_only: key.origin() == Origin::Derived,
    })
}

/// Expand requirements into the flat, ordered resolution.
///
/// Iterates the catalog in template order. A template key whose minimal
/// key is required `On` is emitted as-is; `Selected` emits one fully
/// qualified key per component tuple, in selection order; `Off` or absent
/// emits nothing.
pub fn resolve_requests(
    catalog: &ItemCatalog,
    requirements: &Requirements,
    locations: &DataLocations,
) -> AnnographResult<Resolution> {
    let mut resolution = Resolution::new();
    for (template, _) in catalog.iter() {
        match requirements.get(&template.minimal()) {
            None | Some(Requirement::Off) => {}
            Some(Requirement::On) => {
                let info = resolve_item(catalog, locations, template)?;
                resolution.insert(template.clone(), info);
            }
            Some(Requirement::Selected(selections)) => {
                for components in selections {
                    let full = template.with_components(components.clone())?;
                    let info = resolve_item(catalog, locations, &full)?;
                    resolution.insert(full, info);
                }
            }
        }
    }
    Ok(resolution)
}
