use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::elements::{ElementWiring, SelectTracked};
use super::LEN_PROPERTY;
use crate::capability::{
    CascadingChangeTracking, ChangeTracking, NotifyCollectionChanged, NotifyPropertyChanged,
    NotifyPropertyChanging, Tracked,
};
use crate::error::CollectionError;
use crate::event::{CollectionChangedArgs, Event, PropertyChangedArgs, PropertyChangingArgs};
use crate::tracker::Tracker;

/// Object-safe sequence abstraction.
///
/// All operations take `&self`; implementations use interior mutability.
pub trait List<T> {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clone of the element at `index`.
    fn get(&self, index: usize) -> Option<T>;

    fn push(&self, value: T);

    fn insert(&self, index: usize, value: T) -> Result<(), CollectionError>;

    /// Replace the element at `index`, returning the previous one.
    fn set(&self, index: usize, value: T) -> Result<T, CollectionError>;

    fn remove(&self, index: usize) -> Result<T, CollectionError>;

    fn clear(&self);

    /// Snapshot of the current contents.
    fn to_vec(&self) -> Vec<T>;

    /// Tracking surface, if this list raises notifications.
    fn as_tracked(&self) -> Option<&dyn Tracked> {
        None
    }
}

fn check_index(index: usize, len: usize) -> Result<(), CollectionError> {
    if index < len {
        Ok(())
    } else {
        Err(CollectionError::IndexOutOfRange { index, len })
    }
}

impl<T: Clone> List<T> for RefCell<Vec<T>> {
    fn len(&self) -> usize {
        self.borrow().len()
    }

    fn get(&self, index: usize) -> Option<T> {
        self.borrow().get(index).cloned()
    }

    fn push(&self, value: T) {
        self.borrow_mut().push(value);
    }

    fn insert(&self, index: usize, value: T) -> Result<(), CollectionError> {
        let mut items = self.borrow_mut();
        if index > items.len() {
            return Err(CollectionError::IndexOutOfRange {
                index,
                len: items.len(),
            });
        }
        items.insert(index, value);
        Ok(())
    }

    fn set(&self, index: usize, value: T) -> Result<T, CollectionError> {
        let mut items = self.borrow_mut();
        check_index(index, items.len())?;
        Ok(std::mem::replace(&mut items[index], value))
    }

    fn remove(&self, index: usize) -> Result<T, CollectionError> {
        let mut items = self.borrow_mut();
        check_index(index, items.len())?;
        Ok(items.remove(index))
    }

    fn clear(&self) {
        self.borrow_mut().clear();
    }

    fn to_vec(&self) -> Vec<T> {
        self.borrow().clone()
    }
}

/// A list that raises a notification for every structural change.
///
/// Each mutation marks the list dirty, raises `property_changed("len")` and
/// then `collection_changed`.
///
/// A list built with [`TrackingList::observing`] also forwards the
/// notifications of its tracked elements. An element change then marks the
/// list cascaded-dirty, and accepting the list accepts those elements.
pub struct TrackingList<T> {
    items: RefCell<Vec<T>>,
    tracker: Rc<Tracker>,
    elements: Option<ElementWiring<T>>,
}

impl<T: Clone> TrackingList<T> {
    pub fn new() -> Self {
        Self::from_vec(Vec::new())
    }

    pub fn from_vec(items: Vec<T>) -> Self {
        Self {
            items: RefCell::new(items),
            tracker: Tracker::new(),
            elements: None,
        }
    }

    /// Wrap a snapshot of `source`. The new list starts clean.
    pub fn from_list<L: List<T> + ?Sized>(source: &L) -> Self {
        Self::from_vec(source.to_vec())
    }

    /// A list that observes every element `select` finds a tracking surface on.
    ///
    /// Elements that are already dirty make the list cascaded-dirty.
    pub fn observing(items: Vec<T>, select: SelectTracked<T>) -> Self {
        let elements = ElementWiring::new(select);
        let tracker = Tracker::new();
        elements.attach_all(&tracker, items.iter());
        Self {
            items: RefCell::new(items),
            tracker,
            elements: Some(elements),
        }
    }

    /// [`TrackingList::observing`] over a snapshot of `source`.
    pub fn from_list_observing<L: List<T> + ?Sized>(source: &L, select: SelectTracked<T>) -> Self {
        Self::observing(source.to_vec(), select)
    }

    fn changed(&self, args: CollectionChangedArgs) {
        self.tracker.on_property_changed(LEN_PROPERTY);
        self.tracker.on_collection_changed(args);
    }

    fn wire_inserted(&self, index: usize) {
        if let Some(elements) = &self.elements {
            if let Some(item) = self.items.borrow().get(index) {
                elements.insert(&self.tracker, index, item);
            }
        }
    }
}

impl<T: Clone> Default for TrackingList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> From<Vec<T>> for TrackingList<T> {
    fn from(items: Vec<T>) -> Self {
        Self::from_vec(items)
    }
}

impl<T: Clone> List<T> for TrackingList<T> {
    fn len(&self) -> usize {
        self.items.borrow().len()
    }

    fn get(&self, index: usize) -> Option<T> {
        self.items.borrow().get(index).cloned()
    }

    fn push(&self, value: T) {
        let index = {
            let mut items = self.items.borrow_mut();
            items.push(value);
            items.len() - 1
        };
        self.wire_inserted(index);
        self.changed(CollectionChangedArgs::added(index));
    }

    fn insert(&self, index: usize, value: T) -> Result<(), CollectionError> {
        List::insert(&self.items, index, value)?;
        self.wire_inserted(index);
        self.changed(CollectionChangedArgs::added(index));
        Ok(())
    }

    fn set(&self, index: usize, value: T) -> Result<T, CollectionError> {
        let previous = List::set(&self.items, index, value)?;
        if let Some(elements) = &self.elements {
            if let Some(item) = self.items.borrow().get(index) {
                elements.replace(&self.tracker, index, item);
            }
        }
        self.tracker
            .on_collection_changed(CollectionChangedArgs::replaced(index));
        Ok(previous)
    }

    fn remove(&self, index: usize) -> Result<T, CollectionError> {
        let removed = List::remove(&self.items, index)?;
        if let Some(elements) = &self.elements {
            elements.remove(index);
        }
        self.changed(CollectionChangedArgs::removed(index));
        Ok(removed)
    }

    fn clear(&self) {
        if self.items.borrow().is_empty() {
            return;
        }
        self.items.borrow_mut().clear();
        if let Some(elements) = &self.elements {
            elements.clear();
        }
        self.changed(CollectionChangedArgs::reset());
    }

    fn to_vec(&self) -> Vec<T> {
        self.items.borrow().clone()
    }

    fn as_tracked(&self) -> Option<&dyn Tracked> {
        Some(self)
    }
}

impl<T> NotifyPropertyChanging for TrackingList<T> {
    fn property_changing(&self) -> &Event<PropertyChangingArgs> {
        self.tracker.property_changing()
    }
}

impl<T> NotifyPropertyChanged for TrackingList<T> {
    fn property_changed(&self) -> &Event<PropertyChangedArgs> {
        self.tracker.property_changed()
    }
}

impl<T> NotifyCollectionChanged for TrackingList<T> {
    fn collection_changed(&self) -> &Event<CollectionChangedArgs> {
        self.tracker.collection_changed()
    }
}

impl<T> ChangeTracking for TrackingList<T> {
    fn is_changed(&self) -> bool {
        self.tracker.is_changed()
    }

    fn accept_changes(&self) {
        if self.tracker.is_cascaded_changed() {
            if let Some(elements) = &self.elements {
                elements.accept(self.items.borrow().iter());
            }
            self.tracker.clear_cascaded_changed();
        }
        self.tracker.clear_own_changed();
    }
}

impl<T> CascadingChangeTracking for TrackingList<T> {
    fn is_own_changed(&self) -> bool {
        self.tracker.is_own_changed()
    }

    fn is_cascaded_changed(&self) -> bool {
        self.tracker.is_cascaded_changed()
    }
}

impl<T: fmt::Debug> fmt::Debug for TrackingList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackingList")
            .field("items", &self.items.borrow())
            .field("changed", &self.tracker.is_changed())
            .finish()
    }
}
