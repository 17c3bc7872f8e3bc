#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use cascade_core::{
    CollectionChangedArgs, Event, PropertyChangedArgs, PropertyChangingArgs, SenderId,
    Subscription,
};

/// Notifications captured from one event, in arrival order.
pub struct Recorder<T> {
    seen: Rc<RefCell<Vec<(SenderId, T)>>>,
    _subscription: Subscription,
}

impl<T: Clone> Recorder<T> {
    pub fn seen(&self) -> Vec<(SenderId, T)> {
        self.seen.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.seen.borrow().len()
    }

    pub fn clear(&self) {
        self.seen.borrow_mut().clear();
    }
}

pub fn record_changed(event: &Event<PropertyChangedArgs>) -> Recorder<&'static str> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let subscription = event.subscribe(move |sender, args: &PropertyChangedArgs| {
        sink.borrow_mut().push((sender, args.property_name));
    });
    Recorder {
        seen,
        _subscription: subscription,
    }
}

pub fn record_changing(event: &Event<PropertyChangingArgs>) -> Recorder<&'static str> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let subscription = event.subscribe(move |sender, args: &PropertyChangingArgs| {
        sink.borrow_mut().push((sender, args.property_name));
    });
    Recorder {
        seen,
        _subscription: subscription,
    }
}

pub fn record_collection(event: &Event<CollectionChangedArgs>) -> Recorder<CollectionChangedArgs> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let subscription = event.subscribe(move |sender, args: &CollectionChangedArgs| {
        sink.borrow_mut().push((sender, *args));
    });
    Recorder {
        seen,
        _subscription: subscription,
    }
}

pub fn names<T: Clone>(recorder: &Recorder<T>) -> Vec<T> {
    recorder.seen().into_iter().map(|(_, value)| value).collect()
}
