//! Cascade Core
//!
//! Runtime protocol linked by code that `cascade-codegen` generates. It
//! provides:
//! - Notification events with RAII subscriptions
//! - The capability traits a tracked type exposes
//! - Per-instance dirty state with child-to-parent forwarding
//! - List and map abstractions with tracking wrappers
//!
//! Everything here is single-threaded: a tracked instance has one writer.

pub mod capability;
pub mod collections;
pub mod error;
pub mod event;
pub mod tracker;

pub use capability::{
    CascadingChangeTracking, ChangeTracking, NotifyCollectionChanged, NotifyPropertyChanged,
    NotifyPropertyChanging, Tracked,
};
pub use collections::{
    tracked_element, List, Map, SelectTracked, TrackingList, TrackingMap, LEN_PROPERTY,
};
pub use error::CollectionError;
pub use event::{
    CollectionAction, CollectionChangedArgs, Event, PropertyChangedArgs, PropertyChangingArgs,
    SenderId, Subscription,
};
pub use tracker::{same_ref, Tracker, TrackerBuilder, Wiring};
