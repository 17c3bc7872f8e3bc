use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::rc::Rc;

use indexmap::IndexMap;

use super::elements::{ElementWiring, SelectTracked};
use super::LEN_PROPERTY;
use crate::capability::{
    CascadingChangeTracking, ChangeTracking, NotifyCollectionChanged, NotifyPropertyChanged,
    NotifyPropertyChanging, Tracked,
};
use crate::event::{CollectionChangedArgs, Event, PropertyChangedArgs, PropertyChangingArgs};
use crate::tracker::Tracker;

/// Object-safe key/value abstraction.
pub trait Map<K, V> {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get(&self, key: &K) -> Option<V>;

    /// Insert or replace, returning the previous value.
    fn insert(&self, key: K, value: V) -> Option<V>;

    fn remove(&self, key: &K) -> Option<V>;

    fn contains_key(&self, key: &K) -> bool;

    fn keys(&self) -> Vec<K>;

    fn clear(&self);

    /// Snapshot of the current entries.
    fn to_vec(&self) -> Vec<(K, V)>;

    /// Tracking surface, if this map raises notifications.
    fn as_tracked(&self) -> Option<&dyn Tracked> {
        None
    }
}

impl<K, V> Map<K, V> for RefCell<IndexMap<K, V>>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    fn len(&self) -> usize {
        self.borrow().len()
    }

    fn get(&self, key: &K) -> Option<V> {
        self.borrow().get(key).cloned()
    }

    fn insert(&self, key: K, value: V) -> Option<V> {
        self.borrow_mut().insert(key, value)
    }

    fn remove(&self, key: &K) -> Option<V> {
        self.borrow_mut().shift_remove(key)
    }

    fn contains_key(&self, key: &K) -> bool {
        self.borrow().contains_key(key)
    }

    fn keys(&self) -> Vec<K> {
        self.borrow().keys().cloned().collect()
    }

    fn clear(&self) {
        self.borrow_mut().clear();
    }

    fn to_vec(&self) -> Vec<(K, V)> {
        self.borrow()
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}

impl<K, V> Map<K, V> for RefCell<HashMap<K, V>>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    fn len(&self) -> usize {
        self.borrow().len()
    }

    fn get(&self, key: &K) -> Option<V> {
        self.borrow().get(key).cloned()
    }

    fn insert(&self, key: K, value: V) -> Option<V> {
        self.borrow_mut().insert(key, value)
    }

    fn remove(&self, key: &K) -> Option<V> {
        self.borrow_mut().remove(key)
    }

    fn contains_key(&self, key: &K) -> bool {
        self.borrow().contains_key(key)
    }

    fn keys(&self) -> Vec<K> {
        self.borrow().keys().cloned().collect()
    }

    fn clear(&self) {
        self.borrow_mut().clear();
    }

    fn to_vec(&self) -> Vec<(K, V)> {
        self.borrow()
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}

/// An insertion-ordered map that raises a notification for every structural change.
///
/// Index positions reported in [`CollectionChangedArgs`] are insertion
/// positions. Removal shifts later entries down to keep those positions dense.
///
/// Built with [`TrackingMap::observing`], the map also forwards the
/// notifications of its tracked values.
pub struct TrackingMap<K, V> {
    entries: RefCell<IndexMap<K, V>>,
    tracker: Rc<Tracker>,
    values: Option<ElementWiring<V>>,
}

impl<K, V> TrackingMap<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        Self::from_entries(IndexMap::new())
    }

    pub fn from_entries(entries: IndexMap<K, V>) -> Self {
        Self {
            entries: RefCell::new(entries),
            tracker: Tracker::new(),
            values: None,
        }
    }

    /// Wrap a snapshot of `source`. The new map starts clean.
    pub fn from_map<M: Map<K, V> + ?Sized>(source: &M) -> Self {
        Self::from_entries(source.to_vec().into_iter().collect())
    }

    /// A map that observes every value `select` finds a tracking surface on.
    pub fn observing(entries: IndexMap<K, V>, select: SelectTracked<V>) -> Self {
        let values = ElementWiring::new(select);
        let tracker = Tracker::new();
        values.attach_all(&tracker, entries.values());
        Self {
            entries: RefCell::new(entries),
            tracker,
            values: Some(values),
        }
    }

    /// [`TrackingMap::observing`] over a snapshot of `source`.
    pub fn from_map_observing<M: Map<K, V> + ?Sized>(source: &M, select: SelectTracked<V>) -> Self {
        Self::observing(source.to_vec().into_iter().collect(), select)
    }
}

impl<K, V> Default for TrackingMap<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Map<K, V> for TrackingMap<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    fn get(&self, key: &K) -> Option<V> {
        self.entries.borrow().get(key).cloned()
    }

    fn insert(&self, key: K, value: V) -> Option<V> {
        let (index, previous) = self.entries.borrow_mut().insert_full(key, value);
        if let Some(values) = &self.values {
            if let Some((_, stored)) = self.entries.borrow().get_index(index) {
                if previous.is_some() {
                    values.replace(&self.tracker, index, stored);
                } else {
                    values.insert(&self.tracker, index, stored);
                }
            }
        }
        match previous {
            Some(previous) => {
                self.tracker
                    .on_collection_changed(CollectionChangedArgs::replaced(index));
                Some(previous)
            }
            None => {
                self.tracker.on_property_changed(LEN_PROPERTY);
                self.tracker
                    .on_collection_changed(CollectionChangedArgs::added(index));
                None
            }
        }
    }

    fn remove(&self, key: &K) -> Option<V> {
        let (index, _, value) = self.entries.borrow_mut().shift_remove_full(key)?;
        if let Some(values) = &self.values {
            values.remove(index);
        }
        self.tracker.on_property_changed(LEN_PROPERTY);
        self.tracker
            .on_collection_changed(CollectionChangedArgs::removed(index));
        Some(value)
    }

    fn contains_key(&self, key: &K) -> bool {
        self.entries.borrow().contains_key(key)
    }

    fn keys(&self) -> Vec<K> {
        self.entries.borrow().keys().cloned().collect()
    }

    fn clear(&self) {
        if self.entries.borrow().is_empty() {
            return;
        }
        self.entries.borrow_mut().clear();
        if let Some(values) = &self.values {
            values.clear();
        }
        self.tracker.on_property_changed(LEN_PROPERTY);
        self.tracker
            .on_collection_changed(CollectionChangedArgs::reset());
    }

    fn to_vec(&self) -> Vec<(K, V)> {
        self.entries
            .borrow()
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    fn as_tracked(&self) -> Option<&dyn Tracked> {
        Some(self)
    }
}

impl<K, V> NotifyPropertyChanging for TrackingMap<K, V> {
    fn property_changing(&self) -> &Event<PropertyChangingArgs> {
        self.tracker.property_changing()
    }
}

impl<K, V> NotifyPropertyChanged for TrackingMap<K, V> {
    fn property_changed(&self) -> &Event<PropertyChangedArgs> {
        self.tracker.property_changed()
    }
}

impl<K, V> NotifyCollectionChanged for TrackingMap<K, V> {
    fn collection_changed(&self) -> &Event<CollectionChangedArgs> {
        self.tracker.collection_changed()
    }
}

impl<K, V> ChangeTracking for TrackingMap<K, V> {
    fn is_changed(&self) -> bool {
        self.tracker.is_changed()
    }

    fn accept_changes(&self) {
        if self.tracker.is_cascaded_changed() {
            if let Some(values) = &self.values {
                values.accept(self.entries.borrow().values());
            }
            self.tracker.clear_cascaded_changed();
        }
        self.tracker.clear_own_changed();
    }
}

impl<K, V> CascadingChangeTracking for TrackingMap<K, V> {
    fn is_own_changed(&self) -> bool {
        self.tracker.is_own_changed()
    }

    fn is_cascaded_changed(&self) -> bool {
        self.tracker.is_cascaded_changed()
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for TrackingMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackingMap")
            .field("entries", &self.entries.borrow())
            .field("changed", &self.tracker.is_changed())
            .finish()
    }
}
