//! Interpolation steps
//!
//! A step spans `[t, t + d)` on the timeline and moves the queued
//! properties from its start snapshot to its end snapshot. Steps are
//! immutable once appended.

use crate::easing::Easing;
use crate::plugin::EvaluateContext;
use crate::value::{Props, Value};
use std::rc::Rc;

/// One interpolation segment of a tween
#[derive(Clone, Debug)]
pub(crate) struct Step {
    /// Timeline offset the step starts at
    pub t: f64,
    /// Duration, always > 0
    pub d: f64,
    pub easing: Easing,
    pub p0: Rc<Props>,
    pub p1: Rc<Props>,
}

impl Step {
    /// Waits share one snapshot for both ends
    pub fn is_wait(&self) -> bool {
        Rc::ptr_eq(&self.p0, &self.p1)
    }
}

/// The last step starting at or before `position`
pub(crate) fn active_step(steps: &[Step], position: f64) -> Option<&Step> {
    let index = steps.partition_point(|step| step.t <= position);
    index.checked_sub(1).map(|i| &steps[i])
}

/// Snapshots and ratio a single resolution interpolates with
#[derive(Clone, Debug)]
pub(crate) struct Segment {
    pub start: Rc<Props>,
    pub end: Rc<Props>,
    pub ratio: f64,
    pub is_wait: bool,
    pub is_end: bool,
}

impl Segment {
    /// Position inside `step`, with the step's easing applied
    pub fn within(step: &Step, position: f64) -> Self {
        let raw = ((position - step.t) / step.d).clamp(0.0, 1.0);
        Self {
            start: Rc::clone(&step.p0),
            end: Rc::clone(&step.p1),
            ratio: step.easing.apply(raw),
            is_wait: step.is_wait(),
            is_end: false,
        }
    }

    /// Terminal resolution straight against the final queued properties.
    /// Covers a trailing zero-length segment that has no step.
    pub fn terminal(queued: Rc<Props>) -> Self {
        Self {
            start: Rc::clone(&queued),
            end: queued,
            ratio: 1.0,
            is_wait: false,
            is_end: true,
        }
    }

    /// Value of `name` at this segment's ratio
    pub fn value_of(&self, name: &str, initial: &Value) -> Value {
        interpolate(
            initial,
            self.start.get(name),
            self.end.get(name),
            self.ratio,
        )
    }

    pub fn context(&self) -> EvaluateContext<'_> {
        EvaluateContext {
            start: &self.start,
            end: &self.end,
            ratio: self.ratio,
            is_wait: self.is_wait,
            is_end: self.is_end,
        }
    }
}

/// Interpolate one property between two snapshot entries.
///
/// A missing start falls back to the initial value, a missing end to the
/// start. Equal ends, ratios of exactly 0 or 1, and non-numeric values
/// snap to an endpoint instead of interpolating.
pub(crate) fn interpolate(
    initial: &Value,
    start: Option<&Value>,
    end: Option<&Value>,
    ratio: f64,
) -> Value {
    let v0 = start.filter(|v| !v.is_null()).unwrap_or(initial);
    let v1 = end.filter(|v| !v.is_null()).unwrap_or(v0);
    let endpoint = if ratio == 1.0 { v1 } else { v0 };

    if v0 == v1 || ratio == 0.0 || ratio == 1.0 {
        return endpoint.clone();
    }
    v0.lerp(v1, ratio).unwrap_or_else(|| endpoint.clone())
}
