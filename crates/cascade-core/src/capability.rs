//! Capability traits a tracked type may expose.
//!
//! Generated types implement every trait here. Hand-written types may
//! implement any subset; the generator wires up exactly the subset a
//! property's declared type exposes.

use crate::event::{CollectionChangedArgs, Event, PropertyChangedArgs, PropertyChangingArgs};

/// Raises a notification before a property changes.
pub trait NotifyPropertyChanging {
    fn property_changing(&self) -> &Event<PropertyChangingArgs>;
}

/// Raises a notification after a property changed.
pub trait NotifyPropertyChanged {
    fn property_changed(&self) -> &Event<PropertyChangedArgs>;
}

/// Raises a notification after the structure of a collection changed.
pub trait NotifyCollectionChanged {
    fn collection_changed(&self) -> &Event<CollectionChangedArgs>;
}

/// Dirty-state query and reset.
pub trait ChangeTracking {
    /// Whether anything observable changed since the last accept.
    fn is_changed(&self) -> bool;

    /// Clear the dirty state, recursively through tracked children.
    fn accept_changes(&self);
}

/// Change tracking that distinguishes own edits from descendant edits.
///
/// `is_changed()` must equal `is_own_changed() || is_cascaded_changed()`.
pub trait CascadingChangeTracking: ChangeTracking {
    fn is_own_changed(&self) -> bool;

    fn is_cascaded_changed(&self) -> bool;
}

/// Full capability set of a tracking collection.
///
/// Used by collection wrappers that hand their tracking surface out as a
/// single trait object.
pub trait Tracked: NotifyPropertyChanged + NotifyCollectionChanged + ChangeTracking {}

impl<T> Tracked for T where T: NotifyPropertyChanged + NotifyCollectionChanged + ChangeTracking + ?Sized {}
