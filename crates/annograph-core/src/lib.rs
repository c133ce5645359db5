//! annograph-core
//!
//! Core primitives for annograph:
//! - Structured data-item keys and their compact legacy string codec
//! - The ordered item catalog built from a fixed template table
//! - Load-spec validation with aggregated violation reports
//! - Request resolution: requirements -> fully qualified keys -> storage
//!   parameters
//! - Differential load planning (clear / keep / load) across successive
//!   requests
//!
//! The crate performs no filesystem, network, or environment I/O. Callers
//! inject the per-origin data locations explicitly and own one engine
//! instance per analysis session; all operations are deterministic,
//! synchronous, in-memory transformations over ordered mappings.

pub mod catalog;
pub mod env;
pub mod errors;
pub mod key;
pub mod loadspec;
pub mod plan;
pub mod resolve;

pub use crate::errors::{AnnographError, AnnographResult};

/// Convenience re-exports.
pub mod prelude {
    pub use crate::catalog::{CatalogEntry, ItemCatalog, Requirement, ValueType};
    pub use crate::env::DataLocations;
    pub use crate::key::{api_name, split_key, Direction, Group, ItemKey, Kind, Origin};
    pub use crate::loadspec::{LoadSpec, NamespaceFeatures, XmlIdRequest};
    pub use crate::plan::{diff, LoadPlan, LoadPlanner};
    pub use crate::resolve::{
        resolve_item, resolve_requests, Requirements, ResolvedItem, Resolution,
    };
    pub use crate::{AnnographError, AnnographResult};
}
