//! Typed change notifications.
//!
//! Listeners run synchronously, in subscription order, on the thread that
//! mutated the editor. A listener may drop its own or any other
//! subscription while an event is being delivered; the change takes effect
//! from the next event.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use serde::Serialize;

use instavid_project_model::ElementId;

use crate::playback::PlaybackState;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EditorEvent {
    /// The element list changed (add, update, remove, reorder, undo, redo).
    ElementsChanged,
    SelectionChanged { selected: Option<ElementId> },
    PlaybackChanged { state: PlaybackState },
    TimeChanged { time: f64 },
    DurationChanged { duration: f64 },
    ExportProgress { percent: f64, status: String },
}

type Listener = Rc<RefCell<dyn FnMut(&EditorEvent)>>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(u64, Listener)>,
}

/// Single-threaded publish/subscribe hub. Clones share listeners.
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Rc<RefCell<Listeners>>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener`. It stays registered until the returned
    /// [`Subscription`] is dropped or unsubscribed.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe(&self, listener: impl FnMut(&EditorEvent) + 'static) -> Subscription {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.entries.push((id, Rc::new(RefCell::new(listener))));
        Subscription {
            id,
            bus: Rc::downgrade(&self.inner),
        }
    }

    pub fn emit(&self, event: &EditorEvent) {
        // snapshot so listeners can (un)subscribe during delivery
        let listeners: Vec<Listener> = self
            .inner
            .borrow()
            .entries
            .iter()
            .map(|(_, l)| Rc::clone(l))
            .collect();
        tracing::trace!(event = ?event, listeners = listeners.len(), "Emitting editor event");
        for listener in listeners {
            match listener.try_borrow_mut() {
                Ok(mut callback) => (*callback)(event),
                Err(_) => tracing::warn!(event = ?event, "Skipping listener re-entered during its own delivery"),
            }
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner.borrow().entries.len()
    }
}

/// Keeps a listener registered. Unsubscribes on drop.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    bus: Weak<RefCell<Listeners>>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        // Drop does the work.
    }

    fn detach(&mut self) {
        if let Some(bus) = self.bus.upgrade() {
            bus.borrow_mut().entries.retain(|(id, _)| *id != self.id);
        }
        self.bus = Weak::new();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.detach();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder(bus: &EventBus) -> (Rc<RefCell<Vec<EditorEvent>>>, Subscription) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let sub = bus.subscribe(move |e| sink.borrow_mut().push(e.clone()));
        (seen, sub)
    }

    #[test]
    fn test_listeners_receive_in_order() {
        let bus = EventBus::new();
        let (seen, _sub) = recorder(&bus);
        bus.emit(&EditorEvent::ElementsChanged);
        bus.emit(&EditorEvent::TimeChanged { time: 1.5 });
        assert_eq!(
            *seen.borrow(),
            vec![EditorEvent::ElementsChanged, EditorEvent::TimeChanged { time: 1.5 }]
        );
    }

    #[test]
    fn test_drop_unsubscribes() {
        let bus = EventBus::new();
        let (seen, sub) = recorder(&bus);
        assert_eq!(bus.listener_count(), 1);
        drop(sub);
        assert_eq!(bus.listener_count(), 0);
        bus.emit(&EditorEvent::ElementsChanged);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_explicit_unsubscribe() {
        let bus = EventBus::new();
        let (seen, sub) = recorder(&bus);
        let (other, _keep) = recorder(&bus);
        sub.unsubscribe();
        bus.emit(&EditorEvent::DurationChanged { duration: 12.0 });
        assert!(seen.borrow().is_empty());
        assert_eq!(other.borrow().len(), 1);
    }

    #[test]
    fn test_subscription_outliving_bus_is_harmless() {
        let bus = EventBus::new();
        let (_seen, sub) = recorder(&bus);
        drop(bus);
        drop(sub);
    }

    #[test]
    fn test_listener_can_unsubscribe_during_delivery() {
        let bus = EventBus::new();
        let slot: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
        let count = Rc::new(RefCell::new(0));
        let (slot2, count2) = (Rc::clone(&slot), Rc::clone(&count));
        let sub = bus.subscribe(move |_| {
            *count2.borrow_mut() += 1;
            slot2.borrow_mut().take();
        });
        *slot.borrow_mut() = Some(sub);

        bus.emit(&EditorEvent::ElementsChanged);
        bus.emit(&EditorEvent::ElementsChanged);
        assert_eq!(*count.borrow(), 1);
        assert_eq!(bus.listener_count(), 0);
    }
}
