mod common;

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use cascade_core::{
    same_ref, CascadingChangeTracking, ChangeTracking, CollectionChangedArgs, List, Map,
    NotifyCollectionChanged, NotifyPropertyChanged,
};
use cascade_fixtures::{house_prices, shared_numbers, Basket, Catalog, Defaults};
use common::{names, record_changed, record_collection};

fn raw_list(items: Vec<i32>) -> Rc<dyn List<i32>> {
    Rc::new(RefCell::new(items))
}

fn raw_map(entries: &[(&str, f64)]) -> Rc<dyn Map<String, f64>> {
    let map: HashMap<String, f64> = entries
        .iter()
        .map(|(key, value)| (key.to_string(), *value))
        .collect();
    Rc::new(RefCell::new(map))
}

#[test]
fn test_plain_list_is_wrapped_on_assignment() {
    let basket = Basket::new();
    let raw = raw_list(vec![1, 2]);

    basket.set_items(Some(Rc::clone(&raw)));

    let items = basket.items().unwrap();
    assert!(!same_ref(Some(&items), Some(&raw)));
    assert!(items.as_tracked().is_some());
    assert_eq!(items.to_vec(), vec![1, 2]);

    basket.accept_changes();
    items.push(3);

    assert!(basket.is_cascaded_changed());
    assert!(!basket.is_own_changed());
    assert_eq!(raw.len(), 2);
}

#[test]
fn test_list_notifications_are_forwarded() {
    let basket = Basket::new();
    basket.set_items(Some(raw_list(Vec::new())));
    let items = basket.items().unwrap();

    let changed = record_changed(basket.property_changed());
    let collection = record_collection(basket.collection_changed());
    items.push(10);
    items.set(0, 11).unwrap();
    items.remove(0).unwrap();

    assert_eq!(names(&changed), vec!["len", "len"]);
    assert_eq!(
        names(&collection),
        vec![
            CollectionChangedArgs::added(0),
            CollectionChangedArgs::replaced(0),
            CollectionChangedArgs::removed(0),
        ]
    );
    let basket_sender = basket.__tracker().sender();
    assert!(collection
        .seen()
        .iter()
        .all(|(sender, _)| *sender != basket_sender));
}

#[test]
fn test_accept_clears_wrapped_list() {
    let basket = Basket::new();
    basket.set_items(Some(raw_list(Vec::new())));
    let items = basket.items().unwrap();
    items.push(1);
    assert!(items.as_tracked().unwrap().is_changed());

    basket.accept_changes();

    assert!(!basket.is_changed());
    assert!(!items.as_tracked().unwrap().is_changed());
}

#[test]
fn test_replaced_wrapper_is_detached() {
    let basket = Basket::new();
    basket.set_items(Some(raw_list(vec![1])));
    let first = basket.items().unwrap();
    assert_eq!(first.as_tracked().unwrap().property_changed().subscriber_count(), 1);

    basket.set_items(Some(raw_list(vec![2])));
    basket.accept_changes();

    let tracked = first.as_tracked().unwrap();
    assert_eq!(tracked.property_changed().subscriber_count(), 0);
    assert_eq!(tracked.collection_changed().subscriber_count(), 0);
    first.push(5);
    assert!(!basket.is_changed());
}

#[test]
fn test_assigning_a_wrapper_wraps_again() {
    let source = Basket::new();
    source.set_items(Some(raw_list(vec![4])));
    let wrapped = source.items().unwrap();

    let target = Basket::new();
    target.set_items(Some(Rc::clone(&wrapped)));

    let stored = target.items().unwrap();
    assert!(!same_ref(Some(&stored), Some(&wrapped)));
    assert_eq!(stored.to_vec(), vec![4]);
}

#[test]
fn test_plain_map_is_wrapped_on_assignment() {
    let catalog = Catalog::new();
    catalog.set_prices(Some(raw_map(&[("tea", 2.5)])));
    catalog.accept_changes();

    let prices = catalog.prices().unwrap();
    assert!(prices.as_tracked().is_some());
    assert_eq!(prices.get(&"tea".to_string()), Some(2.5));

    let collection = record_collection(catalog.collection_changed());
    prices.insert("coffee".to_string(), 3.0);

    assert!(catalog.is_cascaded_changed());
    assert_eq!(names(&collection), vec![CollectionChangedArgs::added(1)]);
}

#[test]
fn test_initialized_child_wires_on_first_read() {
    let defaults = Defaults::new();
    assert!(!defaults.is_changed());

    let leaf = defaults.leaf().unwrap();
    assert_eq!(leaf.property_changed().subscriber_count(), 1);
    defaults.leaf();
    assert_eq!(leaf.property_changed().subscriber_count(), 1);

    leaf.set_value(2);
    assert!(defaults.is_cascaded_changed());
    assert!(!defaults.is_own_changed());
}

#[test]
fn test_initializer_list_is_wrapped_on_first_read() {
    let defaults = Defaults::new();

    assert_eq!(defaults.count(), 7);
    let items = defaults.items().unwrap();
    assert_eq!(items.to_vec(), vec![1, 2, 3]);
    assert!(items.as_tracked().is_some());
    assert!(!same_ref(Some(&items), Some(&shared_numbers())));
    assert!(same_ref(Some(&items), defaults.items().as_ref()));
    assert!(!defaults.is_changed());

    items.push(9);

    assert!(defaults.is_cascaded_changed());
    assert!(!defaults.is_own_changed());
    assert_eq!(shared_numbers().len(), 3);

    defaults.accept_changes();
    assert!(!items.as_tracked().unwrap().is_changed());
}

#[test]
fn test_equal_unwrapped_list_is_wrapped_silently() {
    let defaults = Defaults::new();
    let raw = shared_numbers();
    let changed = record_changed(defaults.property_changed());

    defaults.set_items(Some(Rc::clone(&raw)));

    let stored = defaults.items().unwrap();
    assert!(stored.as_tracked().is_some());
    assert!(!same_ref(Some(&stored), Some(&raw)));
    assert_eq!(stored.to_vec(), vec![1, 2, 3]);
    assert_eq!(changed.len(), 0);
    assert!(!defaults.is_changed());

    stored.push(4);
    assert!(defaults.is_cascaded_changed());
}

#[test]
fn test_initializer_map_is_wrapped_on_first_read() {
    let catalog = Catalog::new();

    let prices = catalog.prices().unwrap();
    assert!(prices.as_tracked().is_some());
    assert!(!same_ref(Some(&prices), Some(&house_prices())));
    assert_eq!(prices.get(&"tea".to_string()), Some(2.5));

    prices.remove(&"tea".to_string());

    assert!(catalog.is_cascaded_changed());
    assert!(!catalog.is_own_changed());
    assert_eq!(house_prices().len(), 1);
}

#[test]
fn test_equal_unwrapped_map_is_wrapped_silently() {
    let catalog = Catalog::new();
    let raw = house_prices();
    let changed = record_changed(catalog.property_changed());
    let collection = record_collection(catalog.collection_changed());

    catalog.set_prices(Some(Rc::clone(&raw)));

    let stored = catalog.prices().unwrap();
    assert!(stored.as_tracked().is_some());
    assert!(!same_ref(Some(&stored), Some(&raw)));
    assert_eq!(stored.get(&"tea".to_string()), Some(2.5));
    assert_eq!(changed.len(), 0);
    assert_eq!(collection.len(), 0);
    assert!(!catalog.is_changed());

    stored.insert("milk".to_string(), 1.0);

    assert!(catalog.is_cascaded_changed());
    assert_eq!(names(&collection), vec![CollectionChangedArgs::added(1)]);
    assert_eq!(raw.len(), 1);
}

#[test]
fn test_replaced_or_cleared_map_is_detached() {
    let catalog = Catalog::new();
    let first = catalog.prices().unwrap();
    assert_eq!(first.as_tracked().unwrap().property_changed().subscriber_count(), 1);

    catalog.set_prices(Some(raw_map(&[("tea", 3.0)])));

    let tracked = first.as_tracked().unwrap();
    assert_eq!(tracked.property_changed().subscriber_count(), 0);
    assert_eq!(tracked.collection_changed().subscriber_count(), 0);

    let second = catalog.prices().unwrap();
    assert_eq!(second.as_tracked().unwrap().collection_changed().subscriber_count(), 1);
    catalog.set_prices(None);

    assert!(catalog.prices().is_none());
    let tracked = second.as_tracked().unwrap();
    assert_eq!(tracked.property_changed().subscriber_count(), 0);
    assert_eq!(tracked.collection_changed().subscriber_count(), 0);

    catalog.accept_changes();
    first.insert("coffee".to_string(), 3.0);
    second.insert("coffee".to_string(), 3.0);
    assert!(!catalog.is_changed());
}

#[test]
fn test_setter_replaces_initialized_child_without_lazy_wiring() {
    let defaults = Defaults::new();
    let replacement = Rc::new(cascade_fixtures::Leaf::new());

    defaults.set_leaf(Some(Rc::clone(&replacement)));
    defaults.accept_changes();
    defaults.leaf();

    assert_eq!(replacement.property_changed().subscriber_count(), 1);
    replacement.set_value(1);
    assert!(defaults.is_cascaded_changed());
}
