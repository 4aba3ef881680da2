//! Tween targets
//!
//! A [`Target`] is a shared, mutable property bag. Tweens only keep a
//! [`WeakTarget`] back-reference: they read and write the target's
//! properties but never extend its lifetime.

use crate::value::{Props, Value};
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// Identity of a target, used by the registry's per-target side-table
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TargetKey(usize);

/// Shared handle to an animated object
#[derive(Clone, Default)]
pub struct Target {
    props: Rc<RefCell<Props>>,
}

impl Target {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a target pre-populated with `props`
    pub fn with_props(props: impl Into<Props>) -> Self {
        Self {
            props: Rc::new(RefCell::new(props.into())),
        }
    }

    /// Current value of a property, if the target has it
    pub fn get(&self, name: &str) -> Option<Value> {
        self.props.borrow().get(name).cloned()
    }

    /// Current numeric value of a property
    pub fn number(&self, name: &str) -> Option<f64> {
        self.props.borrow().get(name).and_then(Value::as_number)
    }

    pub fn set(&self, name: impl Into<String>, value: impl Into<Value>) {
        self.props.borrow_mut().insert(name, value);
    }

    /// Assign every property of `props` onto the target
    pub fn assign(&self, props: &Props) {
        self.props.borrow_mut().extend_from(props);
    }

    /// Snapshot of all properties
    pub fn props(&self) -> Props {
        self.props.borrow().clone()
    }

    pub fn key(&self) -> TargetKey {
        TargetKey(Rc::as_ptr(&self.props) as *const () as usize)
    }

    pub fn downgrade(&self) -> WeakTarget {
        WeakTarget {
            props: Rc::downgrade(&self.props),
        }
    }

    /// Whether both handles refer to the same object
    pub fn ptr_eq(&self, other: &Target) -> bool {
        Rc::ptr_eq(&self.props, &other.props)
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Target").field(&*self.props.borrow()).finish()
    }
}

/// Non-owning back-reference to a [`Target`]
#[derive(Clone, Debug)]
pub struct WeakTarget {
    props: Weak<RefCell<Props>>,
}

impl WeakTarget {
    pub fn upgrade(&self) -> Option<Target> {
        self.props.upgrade().map(|props| Target { props })
    }

    // The allocation outlives the value while any weak handle exists, so
    // the address stays a stable identity for as long as this handle lives.
    pub fn key(&self) -> TargetKey {
        TargetKey(self.props.as_ptr() as *const () as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_identity() {
        let a = Target::new();
        let b = Target::new();
        assert_eq!(a.key(), a.clone().key());
        assert_eq!(a.key(), a.downgrade().key());
        assert_ne!(a.key(), b.key());
    }

    #[test]
    fn test_weak_target_does_not_keep_alive() {
        let target = Target::with_props([("x", 1.0)]);
        let weak = target.downgrade();
        assert_eq!(weak.upgrade().and_then(|t| t.number("x")), Some(1.0));

        drop(target);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn test_assign_overwrites() {
        let target = Target::with_props([("x", 1.0), ("y", 2.0)]);
        target.assign(&Props::from([("y", 5.0), ("z", 6.0)]));
        assert_eq!(target.number("x"), Some(1.0));
        assert_eq!(target.number("y"), Some(5.0));
        assert_eq!(target.number("z"), Some(6.0));
    }
}
