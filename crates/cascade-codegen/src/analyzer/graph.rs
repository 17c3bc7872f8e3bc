//! Semantic type graph consulted by the classifier.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::declaration::{TypeDeclaration, TUPLE};

/// Shape of a resolved type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    Primitive,
    Enum,
    /// Value aggregate with owned, copy-out semantics.
    Struct,
    Tuple,
    Text,
    /// Shared reference type.
    Class,
    /// One-argument sequence abstraction.
    SequenceAbstraction,
    /// Two-argument key/value abstraction.
    MapAbstraction,
}

impl TypeKind {
    /// Kinds whose properties carry no nested instrumentation.
    pub fn is_value(self) -> bool {
        matches!(
            self,
            Self::Primitive | Self::Enum | Self::Struct | Self::Tuple | Self::Text
        )
    }
}

/// A notification or tracking trait a type may implement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    PropertyChanging,
    PropertyChanged,
    CollectionChanged,
    ChangeTracking,
}

/// Set of capabilities found on a type and its ancestors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CapabilitySet {
    pub property_changing: bool,
    pub property_changed: bool,
    pub collection_changed: bool,
    pub change_tracking: bool,
}

impl CapabilitySet {
    pub fn all() -> Self {
        Self {
            property_changing: true,
            property_changed: true,
            collection_changed: true,
            change_tracking: true,
        }
    }

    pub fn insert(&mut self, capability: Capability) {
        match capability {
            Capability::PropertyChanging => self.property_changing = true,
            Capability::PropertyChanged => self.property_changed = true,
            Capability::CollectionChanged => self.collection_changed = true,
            Capability::ChangeTracking => self.change_tracking = true,
        }
    }

    pub fn contains(&self, capability: Capability) -> bool {
        match capability {
            Capability::PropertyChanging => self.property_changing,
            Capability::PropertyChanged => self.property_changed,
            Capability::CollectionChanged => self.collection_changed,
            Capability::ChangeTracking => self.change_tracking,
        }
    }
}

/// Resolved information about one named type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeInfo {
    pub kind: TypeKind,
    /// Carries the change-tracking marker.
    #[serde(default)]
    pub tracked: bool,
    #[serde(default)]
    pub base: Option<String>,
    /// Capabilities implemented directly, not counting ancestors.
    #[serde(default)]
    pub capabilities: Vec<Capability>,
    #[serde(default)]
    pub sealed: bool,
}

impl TypeInfo {
    pub fn new(kind: TypeKind) -> Self {
        Self {
            kind,
            tracked: false,
            base: None,
            capabilities: Vec::new(),
            sealed: false,
        }
    }

    /// Unknown reference type: Object kind with no capabilities.
    pub fn opaque() -> Self {
        Self::new(TypeKind::Class)
    }

    pub fn with_capabilities(mut self, capabilities: &[Capability]) -> Self {
        self.capabilities = capabilities.to_vec();
        self
    }

    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into());
        self
    }
}

const PRIMITIVES: &[&str] = &[
    "bool", "char", "i8", "i16", "i32", "i64", "i128", "isize", "u8", "u16", "u32", "u64",
    "u128", "usize", "f32", "f64", "()",
];

const TEXT: &[&str] = &["String", "str"];

const VALUE_AGGREGATES: &[&str] = &[
    "Option", "Vec", "HashMap", "BTreeMap", "HashSet", "BTreeSet", "Box",
];

const SEQUENCES: &[&str] = &["List", "Collection", "Iterable"];

const MAPS: &[&str] = &["Map"];

/// Named types known to one generation pass.
#[derive(Debug, Clone)]
pub struct TypeGraph {
    types: IndexMap<String, TypeInfo>,
}

impl TypeGraph {
    /// Empty graph with no built-ins.
    pub fn empty() -> Self {
        Self {
            types: IndexMap::new(),
        }
    }

    /// Graph seeded with Rust primitives, text, std value aggregates and
    /// the sequence/map abstractions.
    pub fn with_builtins() -> Self {
        let mut graph = Self::empty();
        let groups: [(&[&str], TypeKind); 5] = [
            (PRIMITIVES, TypeKind::Primitive),
            (TEXT, TypeKind::Text),
            (VALUE_AGGREGATES, TypeKind::Struct),
            (SEQUENCES, TypeKind::SequenceAbstraction),
            (MAPS, TypeKind::MapAbstraction),
        ];
        for (names, kind) in groups {
            for name in names {
                graph.insert(*name, TypeInfo::new(kind));
            }
        }
        graph.insert(TUPLE, TypeInfo::new(TypeKind::Tuple));
        graph
    }

    pub fn insert(&mut self, name: impl Into<String>, info: TypeInfo) {
        self.types.insert(name.into(), info);
    }

    /// Register a declaration as a tracked class.
    pub fn register_tracked(&mut self, decl: &TypeDeclaration) {
        let mut info = TypeInfo::new(TypeKind::Class).with_capabilities(&[
            Capability::PropertyChanging,
            Capability::PropertyChanged,
            Capability::CollectionChanged,
            Capability::ChangeTracking,
        ]);
        info.tracked = true;
        info.base = decl.base.clone();
        info.sealed = decl.sealed;
        self.insert(decl.name.clone(), info);
    }

    pub fn get(&self, name: &str) -> Option<&TypeInfo> {
        self.types
            .get(name)
            .or_else(|| self.types.get(name.rsplit("::").next()?))
    }

    /// Resolve `name`, falling back to an opaque class.
    pub fn resolve(&self, name: &str) -> TypeInfo {
        self.get(name).cloned().unwrap_or_else(TypeInfo::opaque)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Capabilities of `name` and its ancestors.
    ///
    /// Stops early once every capability is found. Cycles in the base
    /// chain terminate the walk.
    pub fn capabilities(&self, name: &str) -> CapabilitySet {
        let mut found = CapabilitySet::default();
        self.walk_ancestors(name, |info| {
            for capability in &info.capabilities {
                found.insert(*capability);
            }
            found == CapabilitySet::all()
        });
        found
    }

    /// Whether `name` itself carries the tracking marker.
    ///
    /// Ancestors are not consulted. A type inherits tracking only from a
    /// tracked direct base, never through an untracked one.
    pub fn is_tracked(&self, name: &str) -> bool {
        self.get(name).is_some_and(|info| info.tracked)
    }

    /// Visit `name` then each base in turn until `visit` returns `true`.
    fn walk_ancestors(&self, name: &str, mut visit: impl FnMut(&TypeInfo) -> bool) {
        let mut seen = HashSet::new();
        let mut current = Some(name.to_string());

        while let Some(name) = current.take() {
            if !seen.insert(name.clone()) {
                tracing::debug!(%name, "cycle in base chain");
                break;
            }
            let Some(info) = self.get(&name) else {
                break;
            };
            if visit(info) {
                break;
            }
            current = info.base.clone();
        }
    }
}

impl Default for TypeGraph {
    fn default() -> Self {
        Self::with_builtins()
    }
}
