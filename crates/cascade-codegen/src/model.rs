//! Classification output consumed by the synthesizer.
//!
//! Both models are built once per declaration, held for one pass and then
//! dropped. They carry no identity beyond the names they describe.

use serde::{Deserialize, Serialize};

use crate::declaration::{Accessibility, TypeRef};

/// Classified view of one tracked type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeModel {
    /// Type name.
    pub name: String,
    /// Enclosing namespace, if any.
    pub namespace: Option<String>,
    /// Enclosing type names, outermost first.
    pub containers: Vec<String>,
    /// Cannot be used as a base.
    pub sealed: bool,
    /// Value-semantics equality.
    pub record: bool,
    /// Declared base type.
    pub base: Option<String>,
    /// An ancestor already implements the tracking protocol.
    pub inherits_tracking: bool,
    /// The property-changing surface already exists on an ancestor.
    pub has_property_changing: bool,
    /// The property-changed surface already exists on an ancestor.
    pub has_property_changed: bool,
    /// The collection-changed surface already exists on an ancestor.
    pub has_collection_changed: bool,
    /// Properties in declaration order.
    pub properties: Vec<PropertyModel>,
    /// Documentation comment.
    pub doc: Option<String>,
}

impl TypeModel {
    /// Whether this type mints its own tracker rather than sharing its base's.
    pub fn defines_tracking(&self) -> bool {
        !self.inherits_tracking
    }

    /// Properties whose values are accepted recursively.
    pub fn tracked_properties(&self) -> impl Iterator<Item = &PropertyModel> {
        self.properties
            .iter()
            .filter(|p| p.participates_in_change_tracking)
    }

    /// Properties that must be constructor parameters.
    pub fn required_properties(&self) -> impl Iterator<Item = &PropertyModel> {
        self.properties.iter().filter(|p| p.required)
    }
}

/// Classified view of one property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyModel {
    pub name: String,
    /// Declared type.
    pub ty: TypeRef,
    pub kind: PropertyKind,
    pub accessibility: Accessibility,
    /// Getter accessibility, never wider than `accessibility`.
    pub get_accessibility: Accessibility,
    /// Setter accessibility; `None` when no public setter exists.
    pub set_accessibility: Option<Accessibility>,
    pub required: bool,
    pub init_only: bool,
    pub is_virtual: bool,
    pub is_override: bool,
    pub is_sealed: bool,
    pub notifies_changing: bool,
    pub notifies_changed: bool,
    pub notifies_collection_changed: bool,
    pub participates_in_change_tracking: bool,
    /// Carries a construction-time value that needs lazy wiring.
    pub has_default_initializer: bool,
    /// Tracked element type the wrapper subscribes to. Elements are held
    /// as `Rc<observed_element>`.
    pub observed_element: Option<TypeRef>,
    /// Construction-time expression.
    pub initializer: Option<String>,
    pub doc: Option<String>,
}

impl PropertyModel {
    /// Any notification surface to subscribe to.
    pub fn has_notifications(&self) -> bool {
        self.notifies_changing || self.notifies_changed || self.notifies_collection_changed
    }

    /// Any capability at all, notification or tracking.
    pub fn has_capabilities(&self) -> bool {
        self.has_notifications() || self.participates_in_change_tracking
    }
}

/// How a property is stored and instrumented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PropertyKind {
    /// Stored by value, equality-gated notification only.
    Value,
    /// Shared reference compared by identity.
    Object,
    /// Sequence, always wrapped in a tracking list.
    Collection { element: TypeRef },
    /// Key/value map, always wrapped in a tracking map.
    Dictionary { key: TypeRef, element: TypeRef },
}

impl PropertyKind {
    pub fn is_value(&self) -> bool {
        matches!(self, Self::Value)
    }

    /// Collection or Dictionary.
    pub fn is_wrapped(&self) -> bool {
        matches!(self, Self::Collection { .. } | Self::Dictionary { .. })
    }
}
