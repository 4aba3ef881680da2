//! Timeline construction
//!
//! Builder calls append to a tween's program and return the same handle,
//! so a timeline reads as one chain:
//!
//! ```ignore
//! tween
//!     .wait(500.0)
//!     .to([("alpha", 0.0)], 1000.0)?
//!     .call(|cx| {
//!         tracing::info!("faded out at {:?}", cx.tween().position());
//!         Ok(())
//!     });
//! ```
//!
//! Steps and actions are stamped with the tween's duration at the moment
//! they are appended; that offset never changes afterwards.

use crate::action::{Action, ActionContext, ActionKind};
use crate::easing::Easing;
use crate::error::Result;
use crate::step::Step;
use crate::target::Target;
use crate::timeline::Tween;
use crate::value::{Props, Value};
use std::rc::Rc;

impl Tween {
    /// Hold the queued properties for `duration`. Non-positive durations
    /// are ignored.
    pub fn wait(&self, duration: f64) -> &Self {
        if duration.is_nan() || duration <= 0.0 {
            return self;
        }
        let snapshot = Rc::new(self.inner.state.borrow().queued.clone());
        self.add_step(duration, Easing::Linear, Rc::clone(&snapshot), snapshot);
        self
    }

    /// Interpolate linearly to `props` over `duration`
    pub fn to(&self, props: impl Into<Props>, duration: f64) -> Result<&Self> {
        self.to_with_ease(props, duration, Easing::Linear)
    }

    /// Interpolate to `props` over `duration` with `easing`.
    ///
    /// Negative or NaN durations count as 0: the values are queued
    /// immediately at the current offset and no step is added.
    pub fn to_with_ease(
        &self,
        props: impl Into<Props>,
        duration: f64,
        easing: Easing,
    ) -> Result<&Self> {
        let duration = if duration.is_nan() || duration < 0.0 {
            0.0
        } else {
            duration
        };
        let start = Rc::new(self.inner.state.borrow().queued.clone());
        self.queue_props(props.into())?;
        let end = Rc::new(self.inner.state.borrow().queued.clone());
        self.add_step(duration, easing, start, end);
        Ok(self)
    }

    /// Run `callback` at the current offset, scoped to the tween's target
    pub fn call<F>(&self, callback: F) -> &Self
    where
        F: Fn(&ActionContext<'_>) -> Result<()> + 'static,
    {
        self.call_with(callback, Vec::new(), None)
    }

    /// Run `callback` at the current offset with recorded `args`, scoped
    /// to `scope` instead of the tween's target when given
    pub fn call_with<F>(&self, callback: F, args: Vec<Value>, scope: Option<&Target>) -> &Self
    where
        F: Fn(&ActionContext<'_>) -> Result<()> + 'static,
    {
        self.add_action(ActionKind::Call {
            callback: Rc::new(callback),
            args,
            scope: scope.map(Target::downgrade),
        })
    }

    /// Assign `props` onto the tween's target at the current offset
    pub fn set(&self, props: impl Into<Props>) -> &Self {
        self.add_action(ActionKind::Set {
            props: props.into(),
            target: None,
        })
    }

    /// Assign `props` onto `target` at the current offset
    pub fn set_on(&self, props: impl Into<Props>, target: &Target) -> &Self {
        self.add_action(ActionKind::Set {
            props: props.into(),
            target: Some(target.downgrade()),
        })
    }

    /// Resume `other` at the current offset
    pub fn play(&self, other: &Tween) -> &Self {
        self.add_action(ActionKind::SetPaused {
            tween: other.downgrade(),
            paused: false,
        })
    }

    /// Pause `other` (which may be this tween) at the current offset
    pub fn pause(&self, other: &Tween) -> &Self {
        self.add_action(ActionKind::SetPaused {
            tween: other.downgrade(),
            paused: true,
        })
    }

    /// Merge `props` into the queued values.
    ///
    /// A property seen for the first time has its initial value captured
    /// from the target and run through the plugins' init hooks. Every
    /// plugin on the property then sees the queued change through its step
    /// hook; anything a plugin injects is queued afterwards the same way.
    fn queue_props(&self, props: Props) -> Result<()> {
        let mut injected: Option<Props> = None;

        for (name, value) in props {
            let plugins = self.plugins_for(&name);
            let tracked = self.inner.state.borrow().initial.contains(&name);

            let previous = if tracked {
                self.inner.state.borrow().queued.get(&name).cloned()
            } else {
                let mut current = self.target().and_then(|target| target.get(&name));
                for plugin in &plugins {
                    current = plugin.init(self, &name, current)?;
                }
                self.inner
                    .state
                    .borrow_mut()
                    .initial
                    .insert(name.clone(), current.clone().unwrap_or_default());
                current
            };

            if !plugins.is_empty() {
                let buffer = injected.get_or_insert_with(Props::new);
                for plugin in &plugins {
                    plugin.step(self, &name, previous.as_ref(), &value, buffer)?;
                }
            }

            self.inner.state.borrow_mut().queued.insert(name, value);
        }

        match injected {
            Some(more) if !more.is_empty() => self.queue_props(more),
            _ => Ok(()),
        }
    }

    fn add_step(&self, duration: f64, easing: Easing, p0: Rc<Props>, p1: Rc<Props>) {
        if duration > 0.0 {
            let mut state = self.inner.state.borrow_mut();
            let t = state.duration;
            state.steps.push(Step {
                t,
                d: duration,
                easing,
                p0,
                p1,
            });
            state.duration += duration;
        }
    }

    fn add_action(&self, kind: ActionKind) -> &Self {
        {
            let mut state = self.inner.state.borrow_mut();
            let t = state.duration;
            state.actions.push(Rc::new(Action { t, kind }));
        }
        self
    }
}
