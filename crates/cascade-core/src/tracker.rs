//! Per-instance change-tracking state.
//!
//! A [`Tracker`] holds the two dirty bits and the three notification events
//! of one tracked instance. Generated types keep it behind an `Rc` so that
//! forwarding handlers installed on children can reach back to the parent
//! through a `Weak` without keeping it alive.
//!
//! # Dirty bits
//!
//! - `own_changed` is set when this instance raises a changed notification
//!   for one of its own properties.
//! - `cascaded_changed` is set when a forwarded notification arrives from a
//!   child, or when a newly attached child is already dirty.

use std::cell::Cell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::capability::{
    ChangeTracking, NotifyCollectionChanged, NotifyPropertyChanged, NotifyPropertyChanging,
};
use crate::event::{
    CollectionChangedArgs, Event, PropertyChangedArgs, PropertyChangingArgs, SenderId,
    Subscription,
};

/// Dirty bits and event surface of one tracked instance.
pub struct Tracker {
    own_changed: Cell<bool>,
    cascaded_changed: Cell<bool>,
    property_changing: Event<PropertyChangingArgs>,
    property_changed: Event<PropertyChangedArgs>,
    collection_changed: Event<CollectionChangedArgs>,
}

impl Tracker {
    /// Tracker with fresh events for all three notifications.
    pub fn new() -> Rc<Self> {
        Self::builder().build()
    }

    /// Start building a tracker that may reuse events an instance already exposes.
    pub fn builder() -> TrackerBuilder {
        TrackerBuilder::default()
    }

    /// Identity used as the sender of this instance's own notifications.
    pub fn sender(&self) -> SenderId {
        SenderId::of(self)
    }

    pub fn property_changing(&self) -> &Event<PropertyChangingArgs> {
        &self.property_changing
    }

    pub fn property_changed(&self) -> &Event<PropertyChangedArgs> {
        &self.property_changed
    }

    pub fn collection_changed(&self) -> &Event<CollectionChangedArgs> {
        &self.collection_changed
    }

    /// `own_changed || cascaded_changed`.
    pub fn is_changed(&self) -> bool {
        self.own_changed.get() || self.cascaded_changed.get()
    }

    pub fn is_own_changed(&self) -> bool {
        self.own_changed.get()
    }

    pub fn is_cascaded_changed(&self) -> bool {
        self.cascaded_changed.get()
    }

    pub fn clear_own_changed(&self) {
        self.own_changed.set(false);
    }

    pub fn clear_cascaded_changed(&self) {
        self.cascaded_changed.set(false);
    }

    /// Raise a changing notification for one of this instance's properties.
    pub fn on_property_changing(&self, property_name: &'static str) {
        self.property_changing
            .raise(self.sender(), &PropertyChangingArgs::new(property_name));
    }

    /// Mark this instance dirty and raise a changed notification for `property_name`.
    pub fn on_property_changed(&self, property_name: &'static str) {
        self.own_changed.set(true);
        self.property_changed
            .raise(self.sender(), &PropertyChangedArgs::new(property_name));
    }

    /// Mark this instance dirty and raise a collection-changed notification.
    pub fn on_collection_changed(&self, args: CollectionChangedArgs) {
        self.own_changed.set(true);
        self.collection_changed.raise(self.sender(), &args);
    }

    /// Re-raise a child's changing notification. Does not touch the dirty bits.
    pub fn relay_property_changing(&self, sender: SenderId, args: &PropertyChangingArgs) {
        self.property_changing.raise(sender, args);
    }

    pub fn relay_property_changed(&self, sender: SenderId, args: &PropertyChangedArgs) {
        tracing::trace!(property = args.property_name, "relaying child property change");
        self.cascaded_changed.set(true);
        self.property_changed.raise(sender, args);
    }

    pub fn relay_collection_changed(&self, sender: SenderId, args: &CollectionChangedArgs) {
        tracing::trace!(action = ?args.action, "relaying child collection change");
        self.cascaded_changed.set(true);
        self.collection_changed.raise(sender, args);
    }

    /// Install a handler on `source` that relays its changing notifications through `self`.
    #[must_use = "the forwarding handler is detached when the subscription is dropped"]
    pub fn forward_property_changing<S>(self: &Rc<Self>, source: &S) -> Subscription
    where
        S: NotifyPropertyChanging + ?Sized,
    {
        let parent = Rc::downgrade(self);
        source.property_changing().subscribe(move |sender, args| {
            if let Some(parent) = Weak::upgrade(&parent) {
                parent.relay_property_changing(sender, args);
            }
        })
    }

    /// Install a handler on `source` that relays its changed notifications through `self`.
    #[must_use = "the forwarding handler is detached when the subscription is dropped"]
    pub fn forward_property_changed<S>(self: &Rc<Self>, source: &S) -> Subscription
    where
        S: NotifyPropertyChanged + ?Sized,
    {
        let parent = Rc::downgrade(self);
        source.property_changed().subscribe(move |sender, args| {
            if let Some(parent) = Weak::upgrade(&parent) {
                parent.relay_property_changed(sender, args);
            }
        })
    }

    /// Install a handler on `source` that relays its collection notifications through `self`.
    #[must_use = "the forwarding handler is detached when the subscription is dropped"]
    pub fn forward_collection_changed<S>(self: &Rc<Self>, source: &S) -> Subscription
    where
        S: NotifyCollectionChanged + ?Sized,
    {
        let parent = Rc::downgrade(self);
        source.collection_changed().subscribe(move |sender, args| {
            if let Some(parent) = Weak::upgrade(&parent) {
                parent.relay_collection_changed(sender, args);
            }
        })
    }

    /// Fold a freshly attached child's dirty state into `cascaded_changed`.
    pub fn absorb<S>(&self, child: &S)
    where
        S: ChangeTracking + ?Sized,
    {
        if child.is_changed() {
            self.cascaded_changed.set(true);
        }
    }
}

impl fmt::Debug for Tracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracker")
            .field("own_changed", &self.own_changed.get())
            .field("cascaded_changed", &self.cascaded_changed.get())
            .finish_non_exhaustive()
    }
}

/// Builder for a [`Tracker`].
///
/// Each event left unset is created fresh. Passing a handle to an event an
/// instance already exposes makes the tracker raise through that event
/// instead of declaring a second one.
#[derive(Debug, Default)]
pub struct TrackerBuilder {
    property_changing: Option<Event<PropertyChangingArgs>>,
    property_changed: Option<Event<PropertyChangedArgs>>,
    collection_changed: Option<Event<CollectionChangedArgs>>,
}

impl TrackerBuilder {
    pub fn property_changing(mut self, event: Event<PropertyChangingArgs>) -> Self {
        self.property_changing = Some(event);
        self
    }

    pub fn property_changed(mut self, event: Event<PropertyChangedArgs>) -> Self {
        self.property_changed = Some(event);
        self
    }

    pub fn collection_changed(mut self, event: Event<CollectionChangedArgs>) -> Self {
        self.collection_changed = Some(event);
        self
    }

    pub fn build(self) -> Rc<Tracker> {
        Rc::new(Tracker {
            own_changed: Cell::new(false),
            cascaded_changed: Cell::new(false),
            property_changing: self.property_changing.unwrap_or_default(),
            property_changed: self.property_changed.unwrap_or_default(),
            collection_changed: self.collection_changed.unwrap_or_default(),
        })
    }
}

/// Forwarding subscriptions installed on the value currently held by one property.
///
/// Dropping the wiring detaches every handler it holds.
#[derive(Debug, Default)]
pub struct Wiring {
    changing: Option<Subscription>,
    changed: Option<Subscription>,
    collection_changed: Option<Subscription>,
}

impl Wiring {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach_property_changing(&mut self, subscription: Subscription) {
        self.changing = Some(subscription);
    }

    pub fn attach_property_changed(&mut self, subscription: Subscription) {
        self.changed = Some(subscription);
    }

    pub fn attach_collection_changed(&mut self, subscription: Subscription) {
        self.collection_changed = Some(subscription);
    }

    /// Returns `true` if a handler was attached.
    pub fn detach_property_changing(&mut self) -> bool {
        self.changing.take().map(Subscription::detach).is_some()
    }

    /// Returns `true` if a handler was attached.
    pub fn detach_property_changed(&mut self) -> bool {
        self.changed.take().map(Subscription::detach).is_some()
    }

    /// Returns `true` if a handler was attached.
    pub fn detach_collection_changed(&mut self) -> bool {
        self.collection_changed
            .take()
            .map(Subscription::detach)
            .is_some()
    }

    pub fn detach_all(&mut self) {
        self.detach_property_changing();
        self.detach_property_changed();
        self.detach_collection_changed();
    }

    /// Number of handlers currently held.
    pub fn len(&self) -> usize {
        [&self.changing, &self.changed, &self.collection_changed]
            .into_iter()
            .filter(|slot| slot.is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Reference identity over optional shared pointers.
///
/// Only the data address is compared, so two fat pointers to the same value
/// with different vtables still count as the same reference.
pub fn same_ref<T: ?Sized>(a: Option<&Rc<T>>, b: Option<&Rc<T>>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => std::ptr::eq(
            Rc::as_ptr(a) as *const (),
            Rc::as_ptr(b) as *const (),
        ),
        _ => false,
    }
}
