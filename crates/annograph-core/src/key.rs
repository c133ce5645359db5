//! Data-item keys and their legacy string codec.
//!
//! Every compiled data item is identified by a structured key with five
//! fields: origin, group, kind, direction, and an ordered component list.
//! The key serializes to a compact legacy string that is also used to name
//! artifacts on disk, so its external form must remain stable:
//!
//! ```text
//! origin group kind direction ( components )
//! ```
//!
//! i.e. a fixed 4-character prefix followed by a parenthesized,
//! comma-joined component list. The suffix is omitted when the component
//! list is empty; parsing accepts an explicit empty `()` as well and maps
//! both spellings to the same key.
//!
//! Components may not contain the separator character or parentheses.
//! Construction rejects them instead of escaping, so serialize → parse is
//! an exact round trip and string equality of serialized keys coincides
//! with structural equality.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::errors::{AnnographError, AnnographResult};

/// Separator between components in the serialized form.
pub const COMPONENT_SEP: char = ',';

/// Which data source produced an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Origin {
    /// The primary corpus.
    Main,
    /// An auxiliary annotation overlay.
    Annox,
    /// Computed outside this engine by an auxiliary preparer.
    Derived,
}

impl Origin {
    /// One-character code used in the serialized key form.
    pub fn code(self) -> char {
        match self {
            Self::Main => 'm',
            Self::Annox => 'a',
            Self::Derived => 'z',
        }
    }

    /// Parse a one-character code.
    pub fn from_code(c: char) -> Option<Self> {
        match c {
            'm' => Some(Self::Main),
            'a' => Some(Self::Annox),
            'z' => Some(Self::Derived),
            _ => None,
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Annox => "annox",
            Self::Derived => "derived",
        }
    }
}

/// Structural category of a data item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Group {
    /// Raw primary text and offsets.
    Primary,
    /// Graph topology: regions, node order, edge tables.
    Graph,
    /// XML-identifier maps.
    XmlId,
    /// Annotation features.
    Feature,
    /// Connectivity maps.
    Connectivity,
    /// Transient working data during compilation.
    Temp,
}

impl Group {
    pub fn code(self) -> char {
        match self {
            Self::Primary => 'P',
            Self::Graph => 'G',
            Self::XmlId => 'X',
            Self::Feature => 'F',
            Self::Connectivity => 'C',
            Self::Temp => 'T',
        }
    }

    pub fn from_code(c: char) -> Option<Self> {
        match c {
            'P' => Some(Self::Primary),
            'G' => Some(Self::Graph),
            'X' => Some(Self::XmlId),
            'F' => Some(Self::Feature),
            'C' => Some(Self::Connectivity),
            'T' => Some(Self::Temp),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Graph => "graph",
            Self::XmlId => "xmlid",
            Self::Feature => "feature",
            Self::Connectivity => "connectivity",
            Self::Temp => "temp",
        }
    }
}

/// Whether an item is indexed by node, by edge, or is kind-agnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Kind {
    Node,
    Edge,
    None,
}

impl Kind {
    pub fn code(self) -> char {
        match self {
            Self::Node => 'n',
            Self::Edge => 'e',
            Self::None => '0',
        }
    }

    pub fn from_code(c: char) -> Option<Self> {
        match c {
            'n' => Some(Self::Node),
            'e' => Some(Self::Edge),
            '0' => Some(Self::None),
            _ => None,
        }
    }
}

/// Traversal or mapping direction, where meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Direction {
    Forward,
    Backward,
    None,
}

impl Direction {
    pub fn code(self) -> char {
        match self {
            Self::Forward => 'f',
            Self::Backward => 'b',
            Self::None => '0',
        }
    }

    pub fn from_code(c: char) -> Option<Self> {
        match c {
            'f' => Some(Self::Forward),
            'b' => Some(Self::Backward),
            '0' => Some(Self::None),
            _ => None,
        }
    }
}

/// A structured data-item identifier.
///
/// A key with an empty component list is a *minimal* key and identifies a
/// whole family of items; a non-empty component list makes it a *fully
/// qualified* key naming one specific item.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemKey {
    origin: Origin,
    group: Group,
    kind: Kind,
    direction: Direction,
    components: Vec<String>,
}

impl ItemKey {
    /// Construct a key, validating every component.
    pub fn new(
        origin: Origin,
        group: Group,
        kind: Kind,
        direction: Direction,
        components: Vec<String>,
    ) -> AnnographResult<Self> {
        for c in &components {
            validate_component(c)?;
        }
        Ok(Self { origin, group, kind, direction, components })
    }

    /// Construct a minimal key (no components). Infallible.
    pub fn minimal_key(origin: Origin, group: Group, kind: Kind, direction: Direction) -> Self {
        Self { origin, group, kind, direction, components: Vec::new() }
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn group(&self) -> Group {
        self.group
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn components(&self) -> &[String] {
        &self.components
    }

    pub fn is_minimal(&self) -> bool {
        self.components.is_empty()
    }

    /// The key with its components dropped.
    pub fn minimal(&self) -> ItemKey {
        Self::minimal_key(self.origin, self.group, self.kind, self.direction)
    }

    /// Compose a fully qualified key from this key's prefix and the given
    /// components.
    pub fn with_components(&self, components: Vec<String>) -> AnnographResult<ItemKey> {
        ItemKey::new(self.origin, self.group, self.kind, self.direction, components)
    }

    /// Map a derived-origin key to its authoritative main-origin
    /// counterpart; identity for all other origins.
    pub fn source_key(&self) -> ItemKey {
        match self.origin {
            Origin::Derived => ItemKey { origin: Origin::Main, ..self.clone() },
            _ => self.clone(),
        }
    }

    /// Physical file name for this item's artifact.
    ///
    /// The storage-name scheme drops the origin (the origin selects the
    /// directory instead) and always carries the parenthesized list.
    pub fn storage_name(&self) -> String {
        format!(
            "{}{}{}({})",
            self.group.code(),
            self.kind.code(),
            self.direction.code(),
            self.components.join(","),
        )
    }

    /// Underscore-joined human-facing identifier for the component list.
    pub fn api_name(&self) -> String {
        api_name(&self.components)
    }

    /// Human-readable rendition of this key for messages and listings.
    pub fn describe(&self) -> String {
        let mut out = format!("{}: {}", self.origin.label(), self.group.code());
        if !self.components.is_empty() {
            out.push('.');
            out.push_str(&self.api_name());
        }
        match self.kind {
            Kind::Node => out.push_str(" [node]"),
            Kind::Edge => out.push_str(" [edge]"),
            Kind::None => {}
        }
        match self.direction {
            Direction::Forward => out.push_str(" ->"),
            Direction::Backward => out.push_str(" <-"),
            Direction::None => {}
        }
        out
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}{}",
            self.origin.code(),
            self.group.code(),
            self.kind.code(),
            self.direction.code(),
        )?;
        if !self.components.is_empty() {
            write!(f, "({})", self.components.join(","))?;
        }
        Ok(())
    }
}

impl Serialize for ItemKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl FromStr for ItemKey {
    type Err = AnnographError;

    /// Full decomposition of a serialized key.
    ///
    /// Fails on a prefix shorter than 4 characters, unknown code
    /// characters, an unterminated component list, or trailing garbage.
    fn from_str(s: &str) -> AnnographResult<Self> {
        let (prefix, suffix) = split_key(s);
        let codes: Vec<char> = prefix.chars().collect();
        if codes.len() != 4 {
            return Err(AnnographError::key_format(format!(
                "key {s:?} must start with a 4-character prefix"
            )));
        }

        let origin = Origin::from_code(codes[0]).ok_or_else(|| {
            AnnographError::key_format(format!("key {s:?} has unknown origin code {:?}", codes[0]))
        })?;
        let group = Group::from_code(codes[1]).ok_or_else(|| {
            AnnographError::key_format(format!("key {s:?} has unknown group code {:?}", codes[1]))
        })?;
        let kind = Kind::from_code(codes[2]).ok_or_else(|| {
            AnnographError::key_format(format!("key {s:?} has unknown kind code {:?}", codes[2]))
        })?;
        let direction = Direction::from_code(codes[3]).ok_or_else(|| {
            AnnographError::key_format(format!(
                "key {s:?} has unknown direction code {:?}",
                codes[3]
            ))
        })?;

        let components = parse_components(s, suffix)?;
        ItemKey::new(origin, group, kind, direction, components)
    }
}

/// Split a serialized key at the first `(` into its minimal part and the
/// parenthesized suffix. Keys without a suffix yield an empty second half.
pub fn split_key(key: &str) -> (&str, &str) {
    match key.find('(') {
        Some(pos) => (&key[..pos], &key[pos..]),
        None => (key, ""),
    }
}

/// Underscore-joined human-facing identifier for a component list.
pub fn api_name(components: &[String]) -> String {
    components.join("_")
}

fn parse_components(key: &str, suffix: &str) -> AnnographResult<Vec<String>> {
    if suffix.is_empty() {
        return Ok(Vec::new());
    }
    let inner = suffix
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or_else(|| {
            AnnographError::key_format(format!("key {key:?} has an unterminated component list"))
        })?;
    if inner.contains('(') || inner.contains(')') {
        return Err(AnnographError::key_format(format!(
            "key {key:?} has a nested parenthesis in its component list"
        )));
    }
    if inner.is_empty() {
        return Ok(Vec::new());
    }
    let components: Vec<String> = inner.split(COMPONENT_SEP).map(str::to_string).collect();
    for c in &components {
        if c.is_empty() {
            return Err(AnnographError::key_format(format!(
                "key {key:?} has an empty component"
            )));
        }
    }
    Ok(components)
}

fn validate_component(component: &str) -> AnnographResult<()> {
    if component.is_empty() {
        return Err(AnnographError::key_format("components must not be empty"));
    }
    if component.contains(COMPONENT_SEP) || component.contains('(') || component.contains(')') {
        return Err(AnnographError::key_format(format!(
            "component {component:?} contains a reserved character"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use proptest::prelude::*;

    fn key(s: &str) -> ItemKey {
        s.parse().unwrap()
    }

    #[test]
    fn serialize_minimal_key_is_bare() {
        let k = ItemKey::minimal_key(Origin::Main, Group::XmlId, Kind::Node, Direction::Forward);
        assert_eq!(k.to_string(), "mXnf");
    }

    #[test]
    fn serialize_qualified_key_has_suffix() {
        let k = ItemKey::new(
            Origin::Main,
            Group::Graph,
            Kind::None,
            Direction::None,
            vec!["node_sort".to_string()],
        )
        .unwrap();
        assert_eq!(k.to_string(), "mG00(node_sort)");
    }

    #[test]
    fn parse_round_trips() {
        for s in ["mG00(node_sort)", "mXnf", "aFn0(ft,text)", "zG00(node_sort_inv)"] {
            assert_eq!(key(s).to_string(), s);
        }
    }

    #[test]
    fn parse_accepts_explicit_empty_suffix() {
        assert_eq!(key("mXnf()"), key("mXnf"));
        assert_eq!(key("mXnf()").to_string(), "mXnf");
    }

    #[test]
    fn parse_rejects_short_prefix() {
        assert_matches!("mG0".parse::<ItemKey>(), Err(AnnographError::KeyFormat(_)));
    }

    #[test]
    fn parse_rejects_unknown_codes() {
        assert_matches!("qG00".parse::<ItemKey>(), Err(AnnographError::KeyFormat(_)));
        assert_matches!("mQ00".parse::<ItemKey>(), Err(AnnographError::KeyFormat(_)));
        assert_matches!("mGx0".parse::<ItemKey>(), Err(AnnographError::KeyFormat(_)));
        assert_matches!("mG0x".parse::<ItemKey>(), Err(AnnographError::KeyFormat(_)));
    }

    #[test]
    fn parse_rejects_unterminated_components() {
        assert_matches!("mG00(node_sort".parse::<ItemKey>(), Err(AnnographError::KeyFormat(_)));
    }

    #[test]
    fn parse_rejects_empty_component() {
        assert_matches!("mFn0(ft,)".parse::<ItemKey>(), Err(AnnographError::KeyFormat(_)));
    }

    #[test]
    fn construction_rejects_separator_in_component() {
        let r = ItemKey::new(
            Origin::Main,
            Group::Feature,
            Kind::Node,
            Direction::None,
            vec!["a,b".to_string()],
        );
        assert_matches!(r, Err(AnnographError::KeyFormat(_)));
    }

    #[test]
    fn split_key_halves() {
        assert_eq!(split_key("mG00(node_sort)"), ("mG00", "(node_sort)"));
        assert_eq!(split_key("mXnf"), ("mXnf", ""));
    }

    #[test]
    fn source_key_maps_derived_to_main() {
        assert_eq!(key("zG00(node_sort)").source_key(), key("mG00(node_sort)"));
        assert_eq!(key("aFn0(ft,text)").source_key(), key("aFn0(ft,text)"));
    }

    #[test]
    fn storage_name_drops_origin() {
        assert_eq!(key("mG00(node_sort)").storage_name(), "G00(node_sort)");
        assert_eq!(key("mXnf").storage_name(), "Xnf()");
    }

    #[test]
    fn api_name_joins_components() {
        assert_eq!(key("mFn0(ft,text)").api_name(), "ft_text");
    }

    #[test]
    fn describe_is_readable() {
        assert_eq!(key("mFn0(ft,text)").describe(), "main: F.ft_text [node]");
        assert_eq!(key("aC0b(ft,mother)").describe(), "annox: C.ft_mother <-");
        assert_eq!(key("zG00(node_sort)").describe(), "derived: G.node_sort");
    }

    fn origin_strategy() -> impl Strategy<Value = Origin> {
        prop_oneof![Just(Origin::Main), Just(Origin::Annox), Just(Origin::Derived)]
    }

    fn group_strategy() -> impl Strategy<Value = Group> {
        prop_oneof![
            Just(Group::Primary),
            Just(Group::Graph),
            Just(Group::XmlId),
            Just(Group::Feature),
            Just(Group::Connectivity),
            Just(Group::Temp),
        ]
    }

    fn kind_strategy() -> impl Strategy<Value = Kind> {
        prop_oneof![Just(Kind::Node), Just(Kind::Edge), Just(Kind::None)]
    }

    fn direction_strategy() -> impl Strategy<Value = Direction> {
        prop_oneof![Just(Direction::Forward), Just(Direction::Backward), Just(Direction::None)]
    }

    proptest! {
        #[test]
        fn round_trip_any_valid_key(
            origin in origin_strategy(),
            group in group_strategy(),
            kind in kind_strategy(),
            direction in direction_strategy(),
            components in proptest::collection::vec("[a-z][a-z0-9_]{0,11}", 0..4),
        ) {
            let key = ItemKey::new(origin, group, kind, direction, components).unwrap();
            let reparsed: ItemKey = key.to_string().parse().unwrap();
            prop_assert_eq!(reparsed, key);
        }
    }
}
