//! Fixture types for cascading change tracking.
//!
//! Every type declared in `tracked.json` is generated by `build.rs` and
//! included below. The hand-written types in this file stand in for
//! third-party classes: they expose some of the notification traits but
//! carry no generated code.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use cascade_core::{
    ChangeTracking, Event, List, Map, NotifyPropertyChanged, NotifyPropertyChanging,
    PropertyChangedArgs, PropertyChangingArgs, SenderId, Tracker,
};

include!(concat!(env!("OUT_DIR"), "/cascade_generated.rs"));

thread_local! {
    static SHARED_NUMBERS: Rc<dyn List<i32>> = Rc::new(RefCell::new(vec![1, 2, 3]));
    static HOUSE_PRICES: Rc<dyn Map<String, f64>> =
        Rc::new(RefCell::new(HashMap::from([("tea".to_string(), 2.5)])));
}

/// Raw list every `Defaults` on this thread starts from.
pub fn shared_numbers() -> Rc<dyn List<i32>> {
    SHARED_NUMBERS.with(Rc::clone)
}

/// Raw map every `Catalog` on this thread starts from.
pub fn house_prices() -> Rc<dyn Map<String, f64>> {
    HOUSE_PRICES.with(Rc::clone)
}

/// Plain value type used as a property.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Color {
    #[default]
    Black,
    Red,
    Green,
}

/// Reference type with no notification surface.
#[derive(Debug, Default)]
pub struct Handle;

/// Hand-written base that already raises changing and changed notifications.
#[derive(Debug, Default)]
pub struct ObservableBase {
    title: RefCell<String>,
    property_changing: Event<PropertyChangingArgs>,
    property_changed: Event<PropertyChangedArgs>,
}

impl ObservableBase {
    pub fn title(&self) -> String {
        self.title.borrow().clone()
    }

    pub fn set_title(&self, title: impl Into<String>) {
        let title = title.into();
        if *self.title.borrow() == title {
            return;
        }
        let sender = SenderId::of(self);
        self.property_changing
            .raise(sender, &PropertyChangingArgs::new("title"));
        *self.title.borrow_mut() = title;
        self.property_changed
            .raise(sender, &PropertyChangedArgs::new("title"));
    }
}

impl NotifyPropertyChanging for ObservableBase {
    fn property_changing(&self) -> &Event<PropertyChangingArgs> {
        &self.property_changing
    }
}

impl NotifyPropertyChanged for ObservableBase {
    fn property_changed(&self) -> &Event<PropertyChangedArgs> {
        &self.property_changed
    }
}

/// Hand-written child exposing changed notifications and change tracking only.
#[derive(Debug)]
pub struct Sensor {
    reading: Cell<f64>,
    tracker: Rc<Tracker>,
}

impl Sensor {
    pub fn new() -> Self {
        Self {
            reading: Cell::new(0.0),
            tracker: Tracker::new(),
        }
    }

    pub fn reading(&self) -> f64 {
        self.reading.get()
    }

    pub fn set_reading(&self, reading: f64) {
        if self.reading.get() != reading {
            self.reading.set(reading);
            self.tracker.on_property_changed("reading");
        }
    }

    /// Sender this sensor raises its notifications with.
    pub fn sender(&self) -> SenderId {
        self.tracker.sender()
    }
}

impl Default for Sensor {
    fn default() -> Self {
        Self::new()
    }
}

impl NotifyPropertyChanged for Sensor {
    fn property_changed(&self) -> &Event<PropertyChangedArgs> {
        self.tracker.property_changed()
    }
}

impl ChangeTracking for Sensor {
    fn is_changed(&self) -> bool {
        self.tracker.is_changed()
    }

    fn accept_changes(&self) {
        self.tracker.clear_own_changed();
    }
}
