//! The item catalog: the fixed, ordered registry of all known data items.
//!
//! The catalog is built once from a template table and is immutable
//! afterwards. Each row maps a template key (a minimal key, possibly
//! carrying built-in components) to a default requirement and a value-type
//! tag. Template order is preserved; resolution and reporting iterate the
//! catalog in this order so output is deterministic.
//!
//! A catalog is owned by the engine instance that uses it. There is no
//! process-global catalog, so concurrent sessions can never alias each
//! other's state.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::errors::{AnnographError, AnnographResult};
use crate::key::{Group, ItemKey, Origin};

/// Physical value shape of a compiled data item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    /// A numeric array.
    Array,
    /// A keyed mapping.
    Map,
    /// A single text blob.
    Text,
}

impl ValueType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Array => "array",
            Self::Map => "map",
            Self::Text => "text",
        }
    }
}

/// Whether, and how, a data item is wanted.
///
/// `Selected` carries an ordered sequence of component tuples; the empty
/// sequence is the catalog placeholder meaning "fill in with user-selected
/// components" and emits nothing until filled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    Off,
    On,
    Selected(Vec<Vec<String>>),
}

impl Requirement {
    /// Placeholder for items that are requested per component tuple.
    pub fn fill_in() -> Self {
        Self::Selected(Vec::new())
    }

    /// True when this requirement can emit at least one item.
    pub fn is_active(&self) -> bool {
        match self {
            Self::Off => false,
            Self::On => true,
            Self::Selected(sels) => !sels.is_empty(),
        }
    }
}

/// Default requirement and value type for one template key.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub default: Requirement,
    pub value_type: ValueType,
}

/// The ordered, immutable registry of every known data item.
pub struct ItemCatalog {
    entries: Vec<(ItemKey, CatalogEntry)>,
    index: BTreeMap<String, usize>,
}

/// Template rows for the built-in catalog.
///
/// The raw key is the 4-character prefix followed by space-separated
/// built-in components; construction normalizes it into a canonical
/// [`ItemKey`]. The item names here are also the on-disk artifact names and
/// must not change.
fn builtin_rows() -> Vec<(&'static str, Requirement, ValueType)> {
    use self::Requirement::{Off, On};
    use self::ValueType::{Array, Map, Text};
    vec![
        ("mP00 node_anchor", Off, Array),
        ("mP00 node_anchor_items", Off, Array),
        ("mG00 node_anchor_min", On, Array),
        ("mG00 node_anchor_max", On, Array),
        ("mP00 node_events", Off, Array),
        ("mP00 node_events_items", Off, Array),
        ("mP00 node_events_k", Off, Array),
        ("mP00 node_events_n", Off, Array),
        ("mG00 node_sort", On, Array),
        ("mG00 node_sort_inv", On, Map),
        ("mG00 edges_from", On, Array),
        ("mG00 edges_to", On, Array),
        ("mP00 primary_data", Off, Text),
        ("mXnf", Requirement::fill_in(), Map),
        ("mXef", Requirement::fill_in(), Map),
        ("mXnb", Requirement::fill_in(), Map),
        ("mXeb", Requirement::fill_in(), Map),
        ("mFn0", Requirement::fill_in(), Map),
        ("mFe0", Requirement::fill_in(), Map),
        ("mC0f", Requirement::fill_in(), Map),
        ("mC0b", Requirement::fill_in(), Map),
        ("aFn0", Requirement::fill_in(), Map),
        ("aFe0", Requirement::fill_in(), Map),
        ("aC0f", Requirement::fill_in(), Map),
        ("aC0b", Requirement::fill_in(), Map),
        ("zG00 node_sort", Off, Array),
        ("zG00 node_sort_inv", Off, Map),
    ]
}

impl ItemCatalog {
    /// Build the built-in catalog of the annotation compiler.
    pub fn builtin() -> AnnographResult<Self> {
        Self::from_rows(builtin_rows())
    }

    /// Build a catalog from raw template rows.
    ///
    /// Each raw key is a 4-character prefix optionally followed by
    /// space-separated components.
    pub fn from_rows<I>(rows: I) -> AnnographResult<Self>
    where
        I: IntoIterator<Item = (&'static str, Requirement, ValueType)>,
    {
        let mut entries = Vec::new();
        let mut index = BTreeMap::new();
        for (raw, default, value_type) in rows {
            let mut tokens = raw.split_whitespace();
            let prefix = tokens.next().ok_or_else(|| {
                AnnographError::key_format("catalog template row has an empty key")
            })?;
            let minimal: ItemKey = prefix.parse()?;
            let key = minimal.with_components(tokens.map(str::to_string).collect())?;
            index.insert(key.to_string(), entries.len());
            entries.push((key, CatalogEntry { default, value_type }));
        }
        Ok(Self { entries, index })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in template order.
    pub fn iter(&self) -> impl Iterator<Item = (&ItemKey, &CatalogEntry)> {
        self.entries.iter().map(|(k, e)| (k, e))
    }

    /// Exact lookup by key.
    pub fn get(&self, key: &ItemKey) -> Option<&CatalogEntry> {
        self.index.get(&key.to_string()).map(|&i| &self.entries[i].1)
    }

    /// Lookup by key, falling back to the minimal key.
    ///
    /// A key absent from the catalog but whose minimal-key prefix is
    /// present inherits that prefix's default requirement and value type.
    /// A miss on both is fatal.
    pub fn lookup(&self, key: &ItemKey) -> AnnographResult<&CatalogEntry> {
        if let Some(entry) = self.get(key) {
            return Ok(entry);
        }
        self.get(&key.minimal())
            .ok_or_else(|| AnnographError::unknown_key(key.to_string()))
    }

    /// Filter catalog keys by optional origin/group predicates, preserving
    /// catalog order.
    pub fn query(&self, origin: Option<Origin>, group: Option<Group>) -> Vec<&ItemKey> {
        self.entries
            .iter()
            .map(|(k, _)| k)
            .filter(|k| origin.map_or(true, |o| k.origin() == o))
            .filter(|k| group.map_or(true, |g| k.group() == g))
            .collect()
    }
}
