//! Tween registry
//!
//! Tracks every active (unpaused) tween and advances them once per frame.
//! The registry is an explicit service: create one, hand it to whatever
//! builds tweens, and drive it from the frame clock:
//!
//! ```ignore
//! let registry = TweenRegistry::new();
//! let tween = registry.get(Some(&sprite), TweenOptions::new())?;
//! tween.to([("x", 100.0)], 1000.0)?;
//!
//! // once per frame
//! registry.tick(frame_delta_ms, clock_paused)?;
//! ```
//!
//! Tweens keep a weak handle back to their registry so pausing and
//! resuming them updates the active set. Once the registry is dropped
//! those updates become no-ops.

use crate::action::ActionsMode;
use crate::config::TweenOptions;
use crate::error::Result;
use crate::plugin::{PluginList, PluginRegistry, TweenPlugin};
use crate::target::{Target, TargetKey};
use crate::timeline::Tween;
use crate::value::Props;
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Default)]
struct RegistryState {
    /// Active tweens in registration order
    active: Vec<Tween>,
    /// Active tweens per target
    counts: FxHashMap<TargetKey, usize>,
}

/// Shared registry state; tweens hold a weak reference to it
#[derive(Default)]
pub(crate) struct RegistryInner {
    state: RefCell<RegistryState>,
    plugins: RefCell<PluginRegistry>,
}

impl RegistryInner {
    pub(crate) fn register(&self, tween: &Tween) {
        let key = tween.target_key();
        let mut state = self.state.borrow_mut();
        if let Some(key) = key {
            *state.counts.entry(key).or_default() += 1;
        }
        state.active.push(tween.clone());
        tracing::debug!("TweenRegistry: registered tween ({} active)", state.active.len());
    }

    pub(crate) fn deregister(&self, tween: &Tween) {
        let key = tween.target_key();
        let removed = {
            let mut guard = self.state.borrow_mut();
            let state = &mut *guard;
            if let Some(key) = key {
                if let Some(count) = state.counts.get_mut(&key) {
                    *count = count.saturating_sub(1);
                    if *count == 0 {
                        state.counts.remove(&key);
                    }
                }
            }
            let removed = state
                .active
                .iter()
                .position(|t| t.ptr_eq(tween))
                .map(|index| state.active.remove(index));
            tracing::debug!(
                "TweenRegistry: deregistered tween ({} active)",
                state.active.len()
            );
            removed
        };
        // released outside the borrow: dropping a tween may run arbitrary drops
        drop(removed);
    }

    pub(crate) fn plugins_for(&self, name: &str) -> PluginList {
        self.plugins.borrow().for_property(name)
    }
}

/// The registry of active tweens
///
/// Holds the active set, the per-target activity counts, and the installed
/// plugins. Everything runs on the thread that owns the registry.
#[derive(Default)]
pub struct TweenRegistry {
    inner: Rc<RegistryInner>,
}

impl TweenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tween for `target`.
    ///
    /// Unless `options.paused` is set the tween is registered right away.
    /// `options.override_existing` first removes the target's active
    /// tweens; `options.position` seeks immediately without firing actions.
    pub fn get(&self, target: Option<&Target>, options: TweenOptions) -> Result<Tween> {
        self.get_with_plugin_data(target, options, Props::new())
    }

    /// Like [`get`](Self::get), with data for plugins to read back through
    /// [`Tween::plugin_data`]
    pub fn get_with_plugin_data(
        &self,
        target: Option<&Target>,
        options: TweenOptions,
        plugin_data: Props,
    ) -> Result<Tween> {
        if options.override_existing {
            if let Some(target) = target {
                self.remove_tweens(target);
            }
        }

        let tween = Tween::new(Rc::downgrade(&self.inner), target, &options, plugin_data);
        if !options.paused {
            self.inner.register(&tween);
        }
        if let Some(position) = options.position {
            tween.set_position(position, ActionsMode::None)?;
        }
        Ok(tween)
    }

    /// Advance every active tween by one frame.
    ///
    /// Tick-based tweens move by exactly 1, the rest by `delta`. While
    /// `paused` is set only tweens that ignore the global pause move.
    /// Tweens run newest first over a snapshot of the active set, so
    /// tweens created during the tick wait for the next one. The first
    /// fault stops the tick.
    pub fn tick(&self, delta: f64, paused: bool) -> Result<()> {
        let snapshot = self.inner.state.borrow().active.clone();
        for tween in snapshot.iter().rev() {
            if (paused && !tween.ignores_global_pause()) || tween.is_paused() {
                continue;
            }
            let step = if tween.uses_ticks() { 1.0 } else { delta };
            tween.tick(step)?;
        }
        Ok(())
    }

    /// Pause and evict every active tween driving `target`
    pub fn remove_tweens(&self, target: &Target) {
        let key = target.key();
        let removed: Vec<Tween> = {
            let mut guard = self.inner.state.borrow_mut();
            let state = &mut *guard;
            if state.counts.get(&key).copied().unwrap_or(0) == 0 {
                return;
            }

            let mut removed = Vec::new();
            state.active.retain(|tween| {
                if tween.target_key() == Some(key) {
                    removed.push(tween.clone());
                    false
                } else {
                    true
                }
            });
            state.counts.remove(&key);
            removed
        };

        for tween in &removed {
            tween.mark_paused();
        }
        tracing::debug!("TweenRegistry: removed {} tweens for target", removed.len());
    }

    /// Pause and evict every active tween
    pub fn remove_all_tweens(&self) {
        let removed = {
            let mut state = self.inner.state.borrow_mut();
            state.counts.clear();
            std::mem::take(&mut state.active)
        };
        for tween in &removed {
            tween.mark_paused();
        }
        tracing::debug!("TweenRegistry: removed all {} tweens", removed.len());
    }

    /// Whether `target` (or, with `None`, anything) has active tweens
    pub fn has_active_tweens(&self, target: Option<&Target>) -> bool {
        match target {
            Some(target) => self.active_count(target) > 0,
            None => !self.inner.state.borrow().active.is_empty(),
        }
    }

    /// Number of active tweens driving `target`
    pub fn active_count(&self, target: &Target) -> usize {
        self.inner
            .state
            .borrow()
            .counts
            .get(&target.key())
            .copied()
            .unwrap_or(0)
    }

    /// Number of active tweens
    pub fn len(&self) -> usize {
        self.inner.state.borrow().active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the active tweens in registration order
    pub fn active_tweens(&self) -> Vec<Tween> {
        self.inner.state.borrow().active.clone()
    }

    /// Install `plugin` on each of `properties`, ordered by its priority
    pub fn install_plugin(&self, plugin: Rc<dyn TweenPlugin>, properties: &[&str]) {
        tracing::debug!(
            "TweenRegistry: installing plugin (priority {}) on {:?}",
            plugin.priority(),
            properties
        );
        self.inner.plugins.borrow_mut().install(plugin, properties);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TweenError;
    use std::cell::{Cell, RefCell};

    #[test]
    fn test_get_registers_unless_paused() {
        let registry = TweenRegistry::new();
        let target = Target::new();

        let active = registry.get(Some(&target), TweenOptions::new()).unwrap();
        let paused = registry
            .get(Some(&target), TweenOptions::new().paused())
            .unwrap();

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.active_count(&target), 1);
        assert!(!active.is_paused());
        assert!(paused.is_paused());
    }

    #[test]
    fn test_pause_resume_is_idempotent() {
        let registry = TweenRegistry::new();
        let target = Target::new();
        let tween = registry.get(Some(&target), TweenOptions::new()).unwrap();

        tween.set_paused(false);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.active_count(&target), 1);

        tween.set_paused(true).set_paused(true);
        assert_eq!(registry.len(), 0);
        assert_eq!(registry.active_count(&target), 0);
        assert!(!registry.has_active_tweens(Some(&target)));

        tween.set_paused(false);
        assert_eq!(registry.active_count(&target), 1);
    }

    #[test]
    fn test_tick_advances_by_delta_or_ticks() {
        let registry = TweenRegistry::new();
        let target = Target::with_props([("x", 0.0), ("y", 0.0)]);

        let timed = registry.get(Some(&target), TweenOptions::new()).unwrap();
        timed.to([("x", 100.0)], 100.0).unwrap();
        let ticked = registry
            .get(Some(&target), TweenOptions::new().use_ticks())
            .unwrap();
        ticked.to([("y", 10.0)], 10.0).unwrap();

        registry.tick(25.0, false).unwrap();
        registry.tick(25.0, false).unwrap();

        assert_eq!(target.number("x"), Some(50.0));
        assert_eq!(target.number("y"), Some(2.0));
    }

    #[test]
    fn test_global_pause() {
        let registry = TweenRegistry::new();
        let target = Target::with_props([("x", 0.0), ("y", 0.0)]);

        let normal = registry.get(Some(&target), TweenOptions::new()).unwrap();
        normal.to([("x", 100.0)], 100.0).unwrap();
        let stubborn = registry
            .get(Some(&target), TweenOptions::new().ignore_global_pause())
            .unwrap();
        stubborn.to([("y", 100.0)], 100.0).unwrap();

        registry.tick(10.0, true).unwrap();
        assert_eq!(target.number("x"), Some(0.0));
        assert_eq!(target.number("y"), Some(10.0));
    }

    #[test]
    fn test_tick_runs_newest_first() {
        let registry = TweenRegistry::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        for id in 0..3 {
            let log = Rc::clone(&order);
            let tween = registry.get(None, TweenOptions::new()).unwrap();
            tween.wait(100.0);
            tween.subscribe(crate::TweenEvent::Change, move |_| log.borrow_mut().push(id));
        }

        registry.tick(10.0, false).unwrap();
        assert_eq!(*order.borrow(), vec![2, 1, 0]);
    }

    #[test]
    fn test_tweens_created_mid_tick_wait_for_next_tick() {
        let registry = Rc::new(TweenRegistry::new());
        let spawned = Rc::new(Cell::new(0));

        let parent = registry.get(None, TweenOptions::new()).unwrap();
        let reg = Rc::clone(&registry);
        let count = Rc::clone(&spawned);
        parent.wait(5.0).call(move |_| {
            let child = reg.get(None, TweenOptions::new())?;
            child.wait(100.0);
            let count = Rc::clone(&count);
            child.subscribe(crate::TweenEvent::Change, move |_| count.set(count.get() + 1));
            Ok(())
        });

        registry.tick(10.0, false).unwrap();
        assert_eq!(spawned.get(), 0);
        assert_eq!(registry.len(), 1);

        registry.tick(10.0, false).unwrap();
        assert_eq!(spawned.get(), 1);
    }

    #[test]
    fn test_remove_tweens() {
        let registry = TweenRegistry::new();
        let a = Target::new();
        let b = Target::new();
        let untouched = Target::new();

        registry.remove_tweens(&untouched);
        assert_eq!(registry.len(), 0);

        let a1 = registry.get(Some(&a), TweenOptions::new()).unwrap();
        let _a2 = registry.get(Some(&a), TweenOptions::new()).unwrap();
        let b1 = registry.get(Some(&b), TweenOptions::new()).unwrap();

        registry.remove_tweens(&a);
        assert_eq!(registry.active_count(&a), 0);
        assert_eq!(registry.active_count(&b), 1);
        assert_eq!(registry.len(), 1);
        assert!(a1.is_paused());
        assert!(!b1.is_paused());
        assert!(registry.active_tweens()[0].ptr_eq(&b1));
    }

    #[test]
    fn test_override_option() {
        let registry = TweenRegistry::new();
        let target = Target::new();
        let first = registry.get(Some(&target), TweenOptions::new()).unwrap();
        let second = registry
            .get(Some(&target), TweenOptions::new().override_existing())
            .unwrap();

        assert!(first.is_paused());
        assert!(!second.is_paused());
        assert_eq!(registry.active_count(&target), 1);
    }

    #[test]
    fn test_position_option_fires_no_actions() {
        let registry = TweenRegistry::new();
        let fired = Rc::new(Cell::new(false));
        let flag = Rc::clone(&fired);
        let tween = registry
            .get(None, TweenOptions::new().paused().position(0.0))
            .unwrap();
        assert_eq!(tween.position(), Some(0.0));

        tween.call(move |_| {
            flag.set(true);
            Ok(())
        });
        tween.set_position(0.0, ActionsMode::Loop).unwrap();
        assert!(!fired.get());
    }

    #[test]
    fn test_fault_stops_tick() {
        let registry = TweenRegistry::new();
        let target = Target::with_props([("x", 0.0)]);

        let survivor = registry.get(Some(&target), TweenOptions::new()).unwrap();
        survivor.to([("x", 100.0)], 100.0).unwrap();
        let failing = registry.get(None, TweenOptions::new()).unwrap();
        failing
            .wait(5.0)
            .call(|_| Err(TweenError::action("boom")))
            .wait(100.0);

        let err = registry.tick(10.0, false).unwrap_err();
        assert!(matches!(err, TweenError::Action(_)));
        // newest first: the failing tween ran before the survivor
        assert_eq!(target.number("x"), Some(0.0));
    }

    #[test]
    fn test_remove_all_and_dropped_registry() {
        let registry = TweenRegistry::new();
        let target = Target::new();
        let tween = registry.get(Some(&target), TweenOptions::new()).unwrap();

        registry.remove_all_tweens();
        assert!(registry.is_empty());
        assert!(!registry.has_active_tweens(None));
        assert!(tween.is_paused());

        drop(registry);
        tween.set_paused(false);
        assert!(!tween.is_paused());
    }
}
