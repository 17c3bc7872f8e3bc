//! Sequence and map abstractions plus their tracking wrappers.
//!
//! Generated types store collection-typed properties behind the object-safe
//! [`List`] and [`Map`] traits. Any implementation may be assigned; the
//! setter wraps it into a [`TrackingList`] / [`TrackingMap`], which raise
//! collection-changed notifications and carry their own dirty bit. Wrappers
//! built with an element selector also observe their tracked elements.

mod elements;
mod list;
mod map;

pub use elements::{tracked_element, SelectTracked};
pub use list::{List, TrackingList};
pub use map::{Map, TrackingMap};

/// Property name raised alongside every structural change.
pub const LEN_PROPERTY: &str = "len";
