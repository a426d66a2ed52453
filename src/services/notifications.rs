//! Process-wide notification channel.
//!
//! Observers subscribe with a closure and get every notification posted
//! while they stay subscribed. Posting is re-entrant: an observer may
//! subscribe, unsubscribe or post from inside its callback.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// Identifies one text view across the shared services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ViewId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextViewNotification {
    DidBeginEditing,
    DidChange,
    DidEndEditing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub name: TextViewNotification,
    pub sender: ViewId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Box<dyn FnMut(&Notification)>;

#[derive(Default)]
struct Inner {
    next_id: u64,
    observers: Vec<(SubscriptionId, Observer)>,
    /// Unsubscribed while a post was running
    removed: HashSet<SubscriptionId>,
    posted: usize,
}

#[derive(Clone, Default)]
pub struct NotificationCenter {
    inner: Rc<RefCell<Inner>>,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, observer: impl FnMut(&Notification) + 'static) -> SubscriptionId {
        let mut inner = self.inner.borrow_mut();
        inner.next_id += 1;
        let id = SubscriptionId(inner.next_id);
        inner.observers.push((id, Box::new(observer)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        let mut inner = self.inner.borrow_mut();
        let before = inner.observers.len();
        inner.observers.retain(|(oid, _)| *oid != id);
        if inner.observers.len() == before {
            inner.removed.insert(id);
        }
    }

    pub fn post(&self, notification: Notification) {
        // Take the observers out so callbacks can borrow the center again
        let mut observers = {
            let mut inner = self.inner.borrow_mut();
            inner.posted += 1;
            std::mem::take(&mut inner.observers)
        };
        tracing::trace!(?notification, observers = observers.len(), "posting notification");

        for (id, observer) in observers.iter_mut() {
            if self.inner.borrow().removed.contains(id) {
                continue;
            }
            observer(&notification);
        }

        let mut inner = self.inner.borrow_mut();
        let removed = std::mem::take(&mut inner.removed);
        observers.retain(|(id, _)| !removed.contains(id));
        observers.append(&mut inner.observers);
        inner.observers = observers;
    }

    pub fn observer_count(&self) -> usize {
        self.inner.borrow().observers.len()
    }

    /// Total notifications posted so far
    pub fn posted_count(&self) -> usize {
        self.inner.borrow().posted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(name: TextViewNotification) -> Notification {
        Notification {
            name,
            sender: ViewId(1),
        }
    }

    #[test]
    fn test_subscribers_receive_until_unsubscribed() {
        let center = NotificationCenter::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let id = center.subscribe(move |n| sink.borrow_mut().push(n.name));

        center.post(note(TextViewNotification::DidChange));
        center.unsubscribe(id);
        center.post(note(TextViewNotification::DidEndEditing));

        assert_eq!(*seen.borrow(), vec![TextViewNotification::DidChange]);
        assert_eq!(center.posted_count(), 2);
        assert_eq!(center.observer_count(), 0);
    }

    #[test]
    fn test_unsubscribe_from_inside_callback() {
        let center = NotificationCenter::new();
        let count = Rc::new(RefCell::new(0));
        let id_cell: Rc<RefCell<Option<SubscriptionId>>> = Rc::new(RefCell::new(None));

        let c = center.clone();
        let counter = count.clone();
        let own_id = id_cell.clone();
        let id = center.subscribe(move |_| {
            *counter.borrow_mut() += 1;
            if let Some(id) = *own_id.borrow() {
                c.unsubscribe(id);
            }
        });
        *id_cell.borrow_mut() = Some(id);

        center.post(note(TextViewNotification::DidChange));
        center.post(note(TextViewNotification::DidChange));
        assert_eq!(*count.borrow(), 1);
    }
}
