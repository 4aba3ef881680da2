//! Tween notifications
//!
//! Observers subscribe to a tween's [`TweenEvent`]s and are called after
//! each resolution, once property writes and actions are done.

use crate::timeline::Tween;
use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use std::rc::Rc;

new_key_type! {
    /// Handle to a subscribed listener
    pub struct ListenerId;
}

/// Notification kinds
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TweenEvent {
    /// The position changed
    Change,
    /// A non-looping tween reached its end
    Complete,
}

/// Listener callback
pub type Listener = Rc<dyn Fn(&Tween)>;

type ListenerList = SmallVec<[Listener; 2]>;

/// Per-tween listener table
#[derive(Default)]
pub struct EventDispatcher {
    ids: SlotMap<ListenerId, TweenEvent>,
    handlers: FxHashMap<TweenEvent, SmallVec<[(ListenerId, Listener); 2]>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for `event`
    pub fn subscribe<F>(&mut self, event: TweenEvent, listener: F) -> ListenerId
    where
        F: Fn(&Tween) + 'static,
    {
        let id = self.ids.insert(event);
        self.handlers
            .entry(event)
            .or_default()
            .push((id, Rc::new(listener)));
        id
    }

    /// Remove a listener. Returns false if it was not subscribed.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let Some(event) = self.ids.remove(id) else {
            return false;
        };
        if let Some(list) = self.handlers.get_mut(&event) {
            list.retain(|(listener_id, _)| *listener_id != id);
        }
        true
    }

    /// Listeners for `event` in subscription order.
    ///
    /// Cloned out so they can run without holding the tween's state.
    pub fn listeners(&self, event: TweenEvent) -> ListenerList {
        self.handlers
            .get(&event)
            .map(|list| list.iter().map(|(_, l)| Rc::clone(l)).collect())
            .unwrap_or_default()
    }

    pub fn has_listeners(&self, event: TweenEvent) -> bool {
        self.handlers
            .get(&event)
            .is_some_and(|list| !list.is_empty())
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscribe_and_unsubscribe() {
        let mut events = EventDispatcher::new();
        let a = events.subscribe(TweenEvent::Change, |_| {});
        let b = events.subscribe(TweenEvent::Change, |_| {});
        let c = events.subscribe(TweenEvent::Complete, |_| {});

        assert_eq!(events.len(), 3);
        assert_eq!(events.listeners(TweenEvent::Change).len(), 2);

        assert!(events.unsubscribe(a));
        assert!(!events.unsubscribe(a));
        assert_eq!(events.listeners(TweenEvent::Change).len(), 1);
        assert!(events.has_listeners(TweenEvent::Change));

        assert!(events.unsubscribe(b));
        assert!(events.unsubscribe(c));
        assert!(!events.has_listeners(TweenEvent::Change));
        assert!(events.is_empty());
    }
}
