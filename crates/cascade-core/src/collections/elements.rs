use std::cell::RefCell;
use std::rc::Rc;

use crate::capability::Tracked;
use crate::tracker::{Tracker, Wiring};

/// Picks the tracking surface of an element, if it has one.
pub type SelectTracked<T> = fn(&T) -> Option<&dyn Tracked>;

/// Selector for elements held as `Rc<X>` where `X` is tracked.
pub fn tracked_element<X: Tracked + 'static>(element: &Rc<X>) -> Option<&dyn Tracked> {
    Some(&**element)
}

/// Forwarding installed on the elements of a tracking wrapper.
///
/// Entries stay parallel to the wrapper's storage. An element with no
/// tracking surface gets an empty [`Wiring`].
pub(crate) struct ElementWiring<T> {
    select: SelectTracked<T>,
    entries: RefCell<Vec<Wiring>>,
}

impl<T> ElementWiring<T> {
    pub(crate) fn new(select: SelectTracked<T>) -> Self {
        Self {
            select,
            entries: RefCell::new(Vec::new()),
        }
    }

    /// Wire every element of a freshly built wrapper, in order.
    pub(crate) fn attach_all<'a>(&self, tracker: &Rc<Tracker>, elements: impl Iterator<Item = &'a T>)
    where
        T: 'a,
    {
        let wired: Vec<Wiring> = elements.map(|element| self.wire(tracker, element)).collect();
        *self.entries.borrow_mut() = wired;
    }

    pub(crate) fn insert(&self, tracker: &Rc<Tracker>, index: usize, element: &T) {
        let wiring = self.wire(tracker, element);
        let mut entries = self.entries.borrow_mut();
        let index = index.min(entries.len());
        entries.insert(index, wiring);
    }

    /// Swap the wiring at `index`; the previous element is detached.
    pub(crate) fn replace(&self, tracker: &Rc<Tracker>, index: usize, element: &T) {
        let wiring = self.wire(tracker, element);
        if let Some(slot) = self.entries.borrow_mut().get_mut(index) {
            *slot = wiring;
        }
    }

    pub(crate) fn remove(&self, index: usize) {
        let mut entries = self.entries.borrow_mut();
        if index < entries.len() {
            entries.remove(index);
        }
    }

    pub(crate) fn clear(&self) {
        self.entries.borrow_mut().clear();
    }

    pub(crate) fn accept<'a>(&self, elements: impl Iterator<Item = &'a T>)
    where
        T: 'a,
    {
        for element in elements {
            if let Some(tracked) = (self.select)(element) {
                tracked.accept_changes();
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn attached(&self) -> usize {
        self.entries.borrow().iter().map(Wiring::len).sum()
    }

    fn wire(&self, tracker: &Rc<Tracker>, element: &T) -> Wiring {
        let mut wiring = Wiring::new();
        if let Some(tracked) = (self.select)(element) {
            wiring.attach_property_changed(tracker.forward_property_changed(tracked));
            wiring.attach_collection_changed(tracker.forward_collection_changed(tracked));
            tracker.absorb(tracked);
        }
        wiring
    }
}
