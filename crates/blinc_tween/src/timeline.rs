//! Tween timelines
//!
//! A [`Tween`] is an ordered program of interpolation steps and discrete
//! actions against one target. Moving its playhead with
//! [`Tween::set_position`] writes the interpolated properties onto the
//! target, fires the actions the move crossed, and notifies observers.
//!
//! `Tween` is a cheap shared handle. Actions and plugins receive the handle
//! and may pause, resume, or reposition tweens (including the one that is
//! resolving), so no internal borrow is held while user code runs.

use crate::action::{self, Action, ActionsMode};
use crate::config::{ChangeCallback, TweenOptions};
use crate::error::{Result, TweenError};
use crate::events::{EventDispatcher, ListenerId, TweenEvent};
use crate::plugin::{Evaluation, PluginList};
use crate::scheduler::RegistryInner;
use crate::step::{self, Segment, Step};
use crate::target::{Target, TargetKey, WeakTarget};
use crate::value::{Props, Value};
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

pub(crate) struct TweenState {
    pub(crate) target: Option<WeakTarget>,
    pub(crate) steps: Vec<Step>,
    pub(crate) actions: Vec<Rc<Action>>,
    /// Sum of all step durations
    pub(crate) duration: f64,
    position: Option<f64>,
    /// Last normalized position, -1 before the first resolution
    prev_pos: f64,
    /// Last requested position before wrapping, used by `tick`
    prev_position: f64,
    step_position: f64,
    paused: bool,
    looping: bool,
    ignore_global_pause: bool,
    use_ticks: bool,
    /// Values queued by the latest builder call
    pub(crate) queued: Props,
    /// Values captured the first time each property was referenced
    pub(crate) initial: Props,
    plugin_data: Props,
    on_change: Option<ChangeCallback>,
    events: EventDispatcher,
}

pub(crate) struct TweenInner {
    pub(crate) state: RefCell<TweenState>,
    registry: Weak<RegistryInner>,
}

/// Shared handle to a tween timeline
#[derive(Clone)]
pub struct Tween {
    pub(crate) inner: Rc<TweenInner>,
}

/// Non-owning handle to a [`Tween`]
#[derive(Clone)]
pub struct WeakTween {
    inner: Weak<TweenInner>,
}

impl WeakTween {
    pub fn upgrade(&self) -> Option<Tween> {
        self.inner.upgrade().map(|inner| Tween { inner })
    }
}

impl Tween {
    pub(crate) fn new(
        registry: Weak<RegistryInner>,
        target: Option<&Target>,
        options: &TweenOptions,
        plugin_data: Props,
    ) -> Self {
        let state = TweenState {
            target: target.map(Target::downgrade),
            steps: Vec::new(),
            actions: Vec::new(),
            duration: 0.0,
            position: None,
            prev_pos: -1.0,
            prev_position: 0.0,
            step_position: 0.0,
            paused: options.paused,
            looping: options.looping,
            ignore_global_pause: options.ignore_global_pause,
            use_ticks: options.use_ticks,
            queued: Props::new(),
            initial: Props::new(),
            plugin_data,
            on_change: options.on_change.clone(),
            events: EventDispatcher::new(),
        };
        Self {
            inner: Rc::new(TweenInner {
                state: RefCell::new(state),
                registry,
            }),
        }
    }

    /// Move the playhead to `value` and resolve properties and actions.
    ///
    /// Negative and NaN positions clamp to 0. Past the end, looping tweens
    /// wrap and other tweens clamp to their duration; an infinite position
    /// lands on 0 when looping and on the end otherwise. Returns true when
    /// this left the tween at its terminal, non-looping end; such a tween
    /// pauses itself. Repeating the current position is a no-op.
    ///
    /// Plugin and action faults abort the rest of the resolution: writes
    /// already made stay on the target.
    pub fn set_position(&self, value: f64, mode: ActionsMode) -> Result<bool> {
        let value = if value.is_nan() || value < 0.0 {
            0.0
        } else {
            value
        };

        let (end, segment, fired) = {
            let mut guard = self.inner.state.borrow_mut();
            let state = &mut *guard;

            let value = match value.is_infinite() {
                true if state.looping && state.duration > 0.0 => 0.0,
                true => state.duration,
                false => value,
            };
            let mut t = value;
            let mut end = false;
            if t >= state.duration {
                if state.looping && state.duration > 0.0 {
                    t %= state.duration;
                } else {
                    t = state.duration;
                    end = true;
                }
            }
            if t == state.prev_pos {
                return Ok(end);
            }

            let previous = state.prev_pos;
            // recorded before any action runs, so actions see the new position
            state.position = Some(t);
            state.prev_pos = t;
            state.prev_position = value;

            let segment = if state.target.is_none() {
                None
            } else if end {
                Some(Segment::terminal(Rc::new(state.queued.clone())))
            } else if let Some(step) = step::active_step(&state.steps, t) {
                state.step_position = t - step.t;
                Some(Segment::within(step, t))
            } else {
                None
            };

            let fired = action::plan(
                &state.actions,
                mode,
                state.use_ticks,
                previous,
                t,
                state.duration,
            );
            tracing::trace!(
                "Tween: position {} -> {} (end={}, actions={})",
                previous,
                t,
                end,
                fired.len()
            );
            (end, segment, fired)
        };

        if let Some(segment) = segment {
            self.apply(&segment)?;
        }
        for action in &fired {
            action.fire(self)?;
        }
        if end {
            tracing::debug!("Tween: reached end at {}", value);
            self.set_paused(true);
        }

        self.notify_change();
        if end {
            self.dispatch(TweenEvent::Complete);
        }
        Ok(end)
    }

    /// Advance by `delta` from the last requested position, unless paused
    pub fn tick(&self, delta: f64) -> Result<()> {
        let (paused, from) = {
            let state = self.inner.state.borrow();
            (state.paused, state.prev_position)
        };
        if paused {
            return Ok(());
        }
        self.set_position(from + delta, ActionsMode::Loop)?;
        Ok(())
    }

    /// Pause or resume. Paused tweens leave the registry's active set.
    pub fn set_paused(&self, paused: bool) -> &Self {
        {
            let mut state = self.inner.state.borrow_mut();
            if state.paused == paused {
                return self;
            }
            state.paused = paused;
        }
        if let Some(registry) = self.inner.registry.upgrade() {
            if paused {
                registry.deregister(self);
            } else {
                registry.register(self);
            }
        }
        self
    }

    /// Flag as paused without touching the registry
    pub(crate) fn mark_paused(&self) {
        self.inner.state.borrow_mut().paused = true;
    }

    /// Tweens can not be duplicated: a copy would share the target and
    /// the action callbacks of the original.
    pub fn duplicate(&self) -> Result<Tween> {
        Err(TweenError::DuplicateUnsupported)
    }

    /// Subscribe to a notification
    pub fn subscribe<F>(&self, event: TweenEvent, listener: F) -> ListenerId
    where
        F: Fn(&Tween) + 'static,
    {
        self.inner
            .state
            .borrow_mut()
            .events
            .subscribe(event, listener)
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.inner.state.borrow_mut().events.unsubscribe(id)
    }

    /// Replace the `on_change` callback given in the options
    pub fn set_on_change<F>(&self, callback: F)
    where
        F: Fn(&Tween) + 'static,
    {
        self.inner.state.borrow_mut().on_change = Some(Rc::new(callback));
    }

    pub fn clear_on_change(&self) {
        self.inner.state.borrow_mut().on_change = None;
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// The animated object, if it is still alive
    pub fn target(&self) -> Option<Target> {
        self.inner
            .state
            .borrow()
            .target
            .as_ref()
            .and_then(WeakTarget::upgrade)
    }

    pub(crate) fn target_key(&self) -> Option<TargetKey> {
        self.inner.state.borrow().target.as_ref().map(WeakTarget::key)
    }

    /// Total duration of all steps
    pub fn duration(&self) -> f64 {
        self.inner.state.borrow().duration
    }

    /// Current normalized position; `None` before the first resolution
    pub fn position(&self) -> Option<f64> {
        self.inner.state.borrow().position
    }

    /// Offset of the playhead inside the step it last resolved in
    pub fn step_position(&self) -> f64 {
        self.inner.state.borrow().step_position
    }

    pub fn is_paused(&self) -> bool {
        self.inner.state.borrow().paused
    }

    pub fn is_looping(&self) -> bool {
        self.inner.state.borrow().looping
    }

    pub fn set_looping(&self, looping: bool) -> &Self {
        self.inner.state.borrow_mut().looping = looping;
        self
    }

    pub fn ignores_global_pause(&self) -> bool {
        self.inner.state.borrow().ignore_global_pause
    }

    pub fn set_ignore_global_pause(&self, ignore: bool) -> &Self {
        self.inner.state.borrow_mut().ignore_global_pause = ignore;
        self
    }

    pub fn uses_ticks(&self) -> bool {
        self.inner.state.borrow().use_ticks
    }

    pub fn step_count(&self) -> usize {
        self.inner.state.borrow().steps.len()
    }

    pub fn action_count(&self) -> usize {
        self.inner.state.borrow().actions.len()
    }

    /// Plugin-specific data supplied at construction
    pub fn plugin_data(&self, key: &str) -> Option<Value> {
        self.inner.state.borrow().plugin_data.get(key).cloned()
    }

    /// Value `name` is queued to reach by the latest builder call
    pub fn queued_value(&self, name: &str) -> Option<Value> {
        self.inner.state.borrow().queued.get(name).cloned()
    }

    /// Value captured when `name` was first referenced
    pub fn initial_value(&self, name: &str) -> Option<Value> {
        self.inner.state.borrow().initial.get(name).cloned()
    }

    pub fn downgrade(&self) -> WeakTween {
        WeakTween {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Whether both handles refer to the same tween
    pub fn ptr_eq(&self, other: &Tween) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    // ========================================================================
    // Internals
    // ========================================================================

    pub(crate) fn plugins_for(&self, name: &str) -> PluginList {
        self.inner
            .registry
            .upgrade()
            .map(|registry| registry.plugins_for(name))
            .unwrap_or_default()
    }

    /// Write every tracked property's value at `segment` onto the target
    fn apply(&self, segment: &Segment) -> Result<()> {
        let Some(target) = self.target() else {
            return Ok(());
        };
        let initial_values = self.inner.state.borrow().initial.clone();
        let cx = segment.context();

        for (name, initial) in initial_values.iter() {
            let mut value = segment.value_of(name, initial);
            let mut ignore = false;
            for plugin in self.plugins_for(name) {
                match plugin.evaluate(self, name, value.clone(), &cx)? {
                    Evaluation::Assign(v) => value = v,
                    Evaluation::Ignore => ignore = true,
                }
            }
            if !ignore {
                target.set(name, value);
            }
        }
        Ok(())
    }

    fn notify_change(&self) {
        let callback = self.inner.state.borrow().on_change.clone();
        if let Some(callback) = callback {
            callback(self);
        }
        self.dispatch(TweenEvent::Change);
    }

    fn dispatch(&self, event: TweenEvent) {
        let listeners = self.inner.state.borrow().events.listeners(event);
        for listener in listeners {
            listener(self);
        }
    }
}

impl fmt::Debug for Tween {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("Tween")
            .field("duration", &state.duration)
            .field("position", &state.position)
            .field("paused", &state.paused)
            .field("looping", &state.looping)
            .field("steps", &state.steps.len())
            .field("actions", &state.actions.len())
            .finish()
    }
}
