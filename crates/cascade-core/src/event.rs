//! Notification events and RAII subscriptions.
//!
//! An [`Event`] is a cheap, cloneable handle to a shared handler list. Handlers
//! are invoked in registration order on a snapshot of the list, so a handler
//! may subscribe or detach other handlers while an event is being raised.
//!
//! Every call to [`Event::subscribe`] yields a [`Subscription`] guard. Dropping
//! the guard detaches the handler; a guard outliving its event is inert.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

/// Identity of the instance that raised a notification.
///
/// Forwarding handlers re-raise a child's notification with the child's
/// sender preserved, so consumers can tell where a change originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SenderId(usize);

impl SenderId {
    /// Identity of the value behind `value`.
    pub fn of<T: ?Sized>(value: &T) -> Self {
        Self(value as *const T as *const () as usize)
    }
}

/// Raised before a property takes its new value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PropertyChangingArgs {
    /// Name of the property about to change.
    pub property_name: &'static str,
}

impl PropertyChangingArgs {
    /// Create args for `property_name`.
    pub fn new(property_name: &'static str) -> Self {
        Self { property_name }
    }
}

/// Raised after a property took its new value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PropertyChangedArgs {
    /// Name of the property that changed.
    pub property_name: &'static str,
}

impl PropertyChangedArgs {
    /// Create args for `property_name`.
    pub fn new(property_name: &'static str) -> Self {
        Self { property_name }
    }
}

/// Kind of structural change applied to a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CollectionAction {
    Add,
    Remove,
    Replace,
    Reset,
}

/// Raised after a collection changed structurally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CollectionChangedArgs {
    /// What happened.
    pub action: CollectionAction,
    /// Position of the affected entry, when there is one.
    pub index: Option<usize>,
}

impl CollectionChangedArgs {
    pub fn added(index: usize) -> Self {
        Self {
            action: CollectionAction::Add,
            index: Some(index),
        }
    }

    pub fn removed(index: usize) -> Self {
        Self {
            action: CollectionAction::Remove,
            index: Some(index),
        }
    }

    pub fn replaced(index: usize) -> Self {
        Self {
            action: CollectionAction::Replace,
            index: Some(index),
        }
    }

    pub fn reset() -> Self {
        Self {
            action: CollectionAction::Reset,
            index: None,
        }
    }
}

type Handler<A> = Rc<dyn Fn(SenderId, &A)>;

struct Handlers<A> {
    entries: RefCell<Vec<(u64, Handler<A>)>>,
    next_id: Cell<u64>,
}

/// Type-erased detach hook so one [`Subscription`] type serves every event.
trait Detach {
    fn detach(&self, id: u64);
}

impl<A> Detach for Handlers<A> {
    fn detach(&self, id: u64) {
        self.entries.borrow_mut().retain(|(entry, _)| *entry != id);
    }
}

/// A notification surface carrying args of type `A`.
pub struct Event<A> {
    handlers: Rc<Handlers<A>>,
}

impl<A: 'static> Event<A> {
    /// Create an event with no subscribers.
    pub fn new() -> Self {
        Self {
            handlers: Rc::new(Handlers {
                entries: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
            }),
        }
    }

    /// Attach `handler`. It stays attached for as long as the returned guard lives.
    #[must_use = "dropping the subscription detaches the handler immediately"]
    pub fn subscribe(&self, handler: impl Fn(SenderId, &A) + 'static) -> Subscription {
        let id = self.handlers.next_id.get();
        self.handlers.next_id.set(id + 1);
        self.handlers
            .entries
            .borrow_mut()
            .push((id, Rc::new(handler)));

        let source: Weak<dyn Detach> = Rc::downgrade(&self.handlers) as Weak<dyn Detach>;
        Subscription {
            source: Some(source),
            id,
        }
    }

    /// Invoke every attached handler with `sender` and `args`.
    pub fn raise(&self, sender: SenderId, args: &A) {
        // Snapshot so handlers can (un)subscribe while we iterate.
        let snapshot: Vec<Handler<A>> = self
            .handlers
            .entries
            .borrow()
            .iter()
            .map(|(_, handler)| Rc::clone(handler))
            .collect();

        for handler in snapshot {
            handler(sender, args);
        }
    }

    /// Number of currently attached handlers.
    pub fn subscriber_count(&self) -> usize {
        self.handlers.entries.borrow().len()
    }

    /// Whether two handles refer to the same handler list.
    pub fn same_event(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.handlers, &other.handlers)
    }
}

impl<A: 'static> Default for Event<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> Clone for Event<A> {
    fn clone(&self) -> Self {
        Self {
            handlers: Rc::clone(&self.handlers),
        }
    }
}

impl<A> fmt::Debug for Event<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("subscribers", &self.handlers.entries.borrow().len())
            .finish()
    }
}

/// RAII guard for an attached handler.
///
/// # Invariants
///
/// 1. Dropping the guard detaches the handler before the next raise.
/// 2. Detaching twice, or after the event is gone, is a no-op.
pub struct Subscription {
    source: Option<Weak<dyn Detach>>,
    id: u64,
}

impl Subscription {
    /// Detach now instead of at drop.
    pub fn detach(mut self) {
        self.release();
    }

    /// Whether the handler is still attached to a live event.
    pub fn is_active(&self) -> bool {
        self.source
            .as_ref()
            .is_some_and(|source| source.strong_count() > 0)
    }

    fn release(&mut self) {
        if let Some(source) = self.source.take().and_then(|weak| weak.upgrade()) {
            source.detach(self.id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}
