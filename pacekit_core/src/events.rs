//! Change notification for edit sessions.
//!
//! Business logic mutates plain owned state and then publishes an event;
//! whoever renders that state subscribes here.

use crate::block::{BlockId, BlockType};
use crate::workout::WorkoutId;
use std::fmt;

/// Something that changed in a builder session
#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    NameChanged(String),
    BlockAdded { id: BlockId, block_type: BlockType },
    BlockRemoved { id: BlockId },
    BlockMoved { id: BlockId, from: usize, to: usize },
    BlockEdited { id: BlockId },
    RestAttached { work_id: BlockId, rest_id: BlockId },
    WorkoutSaved { id: WorkoutId },
}

/// Handle returned by `subscribe`, used to unsubscribe
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(usize);

type Observer<E> = Box<dyn FnMut(&E)>;

/// Ordered list of observers for one event type
pub struct Notifier<E> {
    next_id: usize,
    observers: Vec<(SubscriptionId, Observer<E>)>,
}

impl<E> Default for Notifier<E> {
    fn default() -> Self {
        Self {
            next_id: 0,
            observers: Vec::new(),
        }
    }
}

impl<E> Notifier<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, observer: impl FnMut(&E) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Returns false if the subscription was already gone
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sub, _)| *sub != id);
        self.observers.len() != before
    }

    pub fn notify(&mut self, event: &E) {
        for (_, observer) in self.observers.iter_mut() {
            observer(event);
        }
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl<E> fmt::Debug for Notifier<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_notify_in_subscription_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut notifier = Notifier::new();

        let first = Rc::clone(&seen);
        notifier.subscribe(move |e: &SessionEvent| first.borrow_mut().push(("first", e.clone())));
        let second = Rc::clone(&seen);
        notifier.subscribe(move |e: &SessionEvent| second.borrow_mut().push(("second", e.clone())));
        assert_eq!(notifier.len(), 2);

        notifier.notify(&SessionEvent::BlockRemoved { id: 1001 });

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].0, "first");
        assert_eq!(seen[1].1, SessionEvent::BlockRemoved { id: 1001 });
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let count = Rc::new(RefCell::new(0));
        let mut notifier = Notifier::new();

        let counter = Rc::clone(&count);
        let id = notifier.subscribe(move |_: &SessionEvent| *counter.borrow_mut() += 1);

        notifier.notify(&SessionEvent::NameChanged("Hills".into()));
        assert!(notifier.unsubscribe(id));
        assert!(!notifier.unsubscribe(id));
        notifier.notify(&SessionEvent::NameChanged("Hills 2".into()));

        assert_eq!(*count.borrow(), 1);
        assert!(notifier.is_empty());
    }
}
