use std::cell::RefCell;
use std::rc::Rc;

use cascade_core::{
    CascadingChangeTracking, ChangeTracking, List, Map, NotifyCollectionChanged, NotifyPropertyChanged,
    NotifyPropertyChanging,
};
use cascade_fixtures::{Basket, Branch, Catalog, Leaf};
use proptest::prelude::*;

fn subscriptions(leaf: &Leaf) -> [usize; 3] {
    [
        leaf.property_changing().subscriber_count(),
        leaf.property_changed().subscriber_count(),
        leaf.collection_changed().subscriber_count(),
    ]
}

proptest! {
    /// Only the currently held child keeps forwarding handlers.
    #[test]
    fn test_object_subscription_balance(picks in prop::collection::vec(prop::option::of(0usize..4), 1..24)) {
        let pool: Vec<Rc<Leaf>> = (0..4).map(|_| Rc::new(Leaf::new())).collect();
        let branch = Branch::new();

        for pick in &picks {
            branch.set_leaf(pick.map(|index| Rc::clone(&pool[index])));
        }

        let held = picks.last().copied().flatten();
        for (index, leaf) in pool.iter().enumerate() {
            let expected = if held == Some(index) { [1, 1, 1] } else { [0, 0, 0] };
            prop_assert_eq!(subscriptions(leaf), expected);
        }

        branch.accept_changes();
        for leaf in &pool {
            leaf.set_value(leaf.value() + 1);
        }
        prop_assert_eq!(branch.is_cascaded_changed(), held.is_some());
    }

    /// Every stored collection is wrapped, and only the latest wrapper is observed.
    #[test]
    fn test_collection_wrapping_invariant(lists in prop::collection::vec(prop::collection::vec(any::<i32>(), 0..6), 1..12)) {
        let basket = Basket::new();
        let mut wrappers = Vec::new();

        for items in lists {
            let raw: Rc<dyn List<i32>> = Rc::new(RefCell::new(items.clone()));
            basket.set_items(Some(raw));

            let stored = basket.items().unwrap();
            prop_assert!(stored.as_tracked().is_some());
            prop_assert_eq!(stored.to_vec(), items);
            wrappers.push(stored);
        }

        let (latest, earlier) = wrappers.split_last().unwrap();
        for wrapper in earlier {
            let tracked = wrapper.as_tracked().unwrap();
            prop_assert_eq!(tracked.property_changed().subscriber_count(), 0);
            prop_assert_eq!(tracked.collection_changed().subscriber_count(), 0);
        }
        let tracked = latest.as_tracked().unwrap();
        prop_assert_eq!(tracked.property_changed().subscriber_count(), 1);
        prop_assert_eq!(tracked.collection_changed().subscriber_count(), 1);
    }

    /// Map assignments keep the same invariant, including clearing to `None`.
    #[test]
    fn test_map_wrapping_invariant(
        assignments in prop::collection::vec(
            prop::option::of(prop::collection::hash_map("[a-z]{1,4}", 0.0f64..100.0, 0..4)),
            1..12,
        )
    ) {
        let catalog = Catalog::new();
        let mut wrappers = Vec::new();

        for entries in &assignments {
            match entries {
                Some(entries) => {
                    let raw: Rc<dyn Map<String, f64>> = Rc::new(RefCell::new(entries.clone()));
                    catalog.set_prices(Some(raw));

                    let stored = catalog.prices().unwrap();
                    prop_assert!(stored.as_tracked().is_some());
                    prop_assert_eq!(stored.len(), entries.len());
                    wrappers.push(stored);
                }
                None => {
                    catalog.set_prices(None);
                    prop_assert!(catalog.prices().is_none());
                }
            }
        }

        let held = matches!(assignments.last(), Some(Some(_)));
        for (position, wrapper) in wrappers.iter().enumerate() {
            let expected = usize::from(held && position + 1 == wrappers.len());
            let tracked = wrapper.as_tracked().unwrap();
            prop_assert_eq!(tracked.property_changed().subscriber_count(), expected);
            prop_assert_eq!(tracked.collection_changed().subscriber_count(), expected);
        }
    }
}
