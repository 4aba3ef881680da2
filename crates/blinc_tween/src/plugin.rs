//! Property plugins
//!
//! Plugins intercept individual property names. For every name they are
//! installed on, a plugin may:
//!
//! - **init**: decide the starting value the first time a tween references
//!   the property (e.g. split a composite value into components)
//! - **step**: observe each newly queued value and inject synthetic
//!   companion properties into the queue
//! - **evaluate**: replace the interpolated value, or veto the write
//!
//! Plugins run in ascending priority order; equal priorities keep their
//! installation order.

use crate::error::Result;
use crate::timeline::Tween;
use crate::value::{Props, Value};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::rc::Rc;

/// Plugins installed on a single property, in run order
pub type PluginList = SmallVec<[Rc<dyn TweenPlugin>; 2]>;

/// Outcome of a plugin's evaluate hook
#[derive(Clone, Debug, PartialEq)]
pub enum Evaluation {
    /// Write this value (possibly replaced by later plugins)
    Assign(Value),
    /// Do not write the property to the target for this resolution
    Ignore,
}

/// Resolution details handed to [`TweenPlugin::evaluate`]
#[derive(Clone, Copy, Debug)]
pub struct EvaluateContext<'a> {
    /// Property snapshot at the start of the active step
    pub start: &'a Props,
    /// Property snapshot at the end of the active step
    pub end: &'a Props,
    /// Eased ratio within the step
    pub ratio: f64,
    /// The active step is a wait (same snapshot on both sides)
    pub is_wait: bool,
    /// Terminal resolution against the final queued properties
    pub is_end: bool,
}

/// A property interceptor
///
/// Every hook has a pass-through default, so a plugin only implements
/// the hooks it needs.
pub trait TweenPlugin {
    /// Lower runs first
    fn priority(&self) -> i32 {
        0
    }

    /// Called the first time `tween` references `name`, with the target's
    /// current value. Returns the value interpolation should start from.
    fn init(&self, tween: &Tween, name: &str, value: Option<Value>) -> Result<Option<Value>> {
        let _ = (tween, name);
        Ok(value)
    }

    /// Called when `next` is queued for `name`. Properties written into
    /// `inject` are queued as if the caller had supplied them.
    fn step(
        &self,
        tween: &Tween,
        name: &str,
        previous: Option<&Value>,
        next: &Value,
        inject: &mut Props,
    ) -> Result<()> {
        let _ = (tween, name, previous, next, inject);
        Ok(())
    }

    /// Called with the computed value of `name` on every resolution
    fn evaluate(
        &self,
        tween: &Tween,
        name: &str,
        value: Value,
        cx: &EvaluateContext<'_>,
    ) -> Result<Evaluation> {
        let _ = (tween, name, cx);
        Ok(Evaluation::Assign(value))
    }
}

/// Priority-ordered plugin lists keyed by property name
#[derive(Default)]
pub struct PluginRegistry {
    by_property: FxHashMap<String, PluginList>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `plugin` on each of `properties`
    pub fn install(&mut self, plugin: Rc<dyn TweenPlugin>, properties: &[&str]) {
        let priority = plugin.priority();
        for name in properties {
            let list = self.by_property.entry((*name).to_owned()).or_default();
            let index = list
                .iter()
                .position(|p| priority < p.priority())
                .unwrap_or(list.len());
            list.insert(index, Rc::clone(&plugin));
        }
    }

    /// Plugins for `name`, in run order
    pub fn for_property(&self, name: &str) -> PluginList {
        self.by_property.get(name).cloned().unwrap_or_default()
    }

    pub fn has_plugins(&self, name: &str) -> bool {
        self.by_property
            .get(name)
            .is_some_and(|list| !list.is_empty())
    }

    /// Number of property names with at least one plugin
    pub fn property_count(&self) -> usize {
        self.by_property.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Tagged {
        priority: i32,
    }

    impl TweenPlugin for Tagged {
        fn priority(&self) -> i32 {
            self.priority
        }
    }

    fn priorities(list: &PluginList) -> Vec<i32> {
        list.iter().map(|p| p.priority()).collect()
    }

    #[test]
    fn test_priority_order() {
        let mut registry = PluginRegistry::new();
        registry.install(Rc::new(Tagged { priority: 5 }), &["x"]);
        registry.install(Rc::new(Tagged { priority: -1 }), &["x"]);
        registry.install(Rc::new(Tagged { priority: 2 }), &["x"]);

        assert_eq!(priorities(&registry.for_property("x")), vec![-1, 2, 5]);
    }

    #[test]
    fn test_ties_keep_install_order() {
        let first: Rc<dyn TweenPlugin> = Rc::new(Tagged { priority: 0 });
        let second: Rc<dyn TweenPlugin> = Rc::new(Tagged { priority: 0 });

        let mut registry = PluginRegistry::new();
        registry.install(Rc::clone(&first), &["x"]);
        registry.install(Rc::clone(&second), &["x"]);

        let list = registry.for_property("x");
        assert!(Rc::ptr_eq(&list[0], &first));
        assert!(Rc::ptr_eq(&list[1], &second));
    }

    #[test]
    fn test_install_on_many_properties() {
        let mut registry = PluginRegistry::new();
        registry.install(Rc::new(Tagged { priority: 0 }), &["x", "y"]);

        assert!(registry.has_plugins("x"));
        assert!(registry.has_plugins("y"));
        assert!(!registry.has_plugins("z"));
        assert!(registry.for_property("z").is_empty());
        assert_eq!(registry.property_count(), 2);
    }
}
