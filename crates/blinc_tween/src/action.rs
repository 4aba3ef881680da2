//! Discrete timeline actions
//!
//! Actions sit at a fixed offset on the timeline and fire whenever a
//! position change crosses that offset. Which offsets count as crossed
//! depends on the [`ActionsMode`] and on whether the tween runs on ticks.

use crate::error::Result;
use crate::target::{Target, WeakTarget};
use crate::timeline::{Tween, WeakTween};
use crate::value::{Props, Value};
use std::rc::Rc;

/// Which actions fire when the position changes
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ActionsMode {
    /// Fire nothing
    None,
    /// Fire crossed actions; a backward jump replays the loop tail, then the head
    #[default]
    Loop,
    /// Fire crossed actions in the direction of travel
    Reverse,
}

/// Callback run by [`Tween::call`]
pub type ActionFn = Rc<dyn Fn(&ActionContext<'_>) -> Result<()>>;

/// What an action callback is invoked with
pub struct ActionContext<'a> {
    tween: &'a Tween,
    args: &'a [Value],
    scope: Option<Target>,
}

impl<'a> ActionContext<'a> {
    /// The tween that fired the action
    pub fn tween(&self) -> &'a Tween {
        self.tween
    }

    /// Arguments recorded when the action was queued
    pub fn args(&self) -> &'a [Value] {
        self.args
    }

    /// Object the action runs against; the tween's target unless overridden
    pub fn scope(&self) -> Option<&Target> {
        self.scope.as_ref()
    }
}

pub(crate) enum ActionKind {
    Call {
        callback: ActionFn,
        args: Vec<Value>,
        scope: Option<WeakTarget>,
    },
    /// Plain assignment, no interpolation
    Set {
        props: Props,
        target: Option<WeakTarget>,
    },
    SetPaused { tween: WeakTween, paused: bool },
}

pub(crate) struct Action {
    /// Timeline offset, fixed when queued
    pub t: f64,
    pub kind: ActionKind,
}

impl Action {
    pub fn fire(&self, tween: &Tween) -> Result<()> {
        match &self.kind {
            ActionKind::Call {
                callback,
                args,
                scope,
            } => {
                let scope = match scope {
                    Some(scope) => scope.upgrade(),
                    None => tween.target(),
                };
                callback(&ActionContext {
                    tween,
                    args: args.as_slice(),
                    scope,
                })
            }
            ActionKind::Set { props, target } => {
                let target = match target {
                    Some(target) => target.upgrade(),
                    None => tween.target(),
                };
                if let Some(target) = target {
                    target.assign(props);
                }
                Ok(())
            }
            ActionKind::SetPaused { tween, paused } => {
                if let Some(tween) = tween.upgrade() {
                    tween.set_paused(*paused);
                }
                Ok(())
            }
        }
    }
}

/// Actions to fire for a move from `previous` to `current`, in firing order
pub(crate) fn plan(
    actions: &[Rc<Action>],
    mode: ActionsMode,
    use_ticks: bool,
    previous: f64,
    current: f64,
    duration: f64,
) -> Vec<Rc<Action>> {
    let mut fired = Vec::new();
    if mode == ActionsMode::None || actions.is_empty() {
        return fired;
    }

    if use_ticks {
        // tick playback never skips a tick: only the landing offset counts
        crossed(actions, current, current, false, &mut fired);
    } else if mode == ActionsMode::Loop && current < previous {
        if previous != duration {
            crossed(actions, previous, duration, false, &mut fired);
        }
        crossed(actions, 0.0, current, true, &mut fired);
    } else {
        crossed(actions, previous, current, false, &mut fired);
    }
    fired
}

/// Collect actions in `(start, end]`, walking backward when `start > end`.
/// `include_start` also admits an action sitting exactly on `start`.
fn crossed(
    actions: &[Rc<Action>],
    start: f64,
    end: f64,
    include_start: bool,
    out: &mut Vec<Rc<Action>>,
) {
    let backward = start > end;
    let (lo, hi) = if backward { (end, start) } else { (start, end) };
    let hit = |t: f64| t == hi || (t > lo && t < hi) || (include_start && t == start);

    if backward {
        out.extend(actions.iter().rev().filter(|a| hit(a.t)).cloned());
    } else {
        out.extend(actions.iter().filter(|a| hit(a.t)).cloned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(offsets: &[f64]) -> Vec<Rc<Action>> {
        offsets
            .iter()
            .map(|&t| {
                Rc::new(Action {
                    t,
                    kind: ActionKind::Set {
                        props: Props::new(),
                        target: None,
                    },
                })
            })
            .collect()
    }

    fn offsets(fired: &[Rc<Action>]) -> Vec<f64> {
        fired.iter().map(|a| a.t).collect()
    }

    #[test]
    fn test_forward_is_half_open() {
        let actions = at(&[0.0, 100.0, 200.0, 300.0]);
        let fired = plan(&actions, ActionsMode::Loop, false, 100.0, 300.0, 300.0);
        assert_eq!(offsets(&fired), vec![200.0, 300.0]);
    }

    #[test]
    fn test_first_resolution_fires_offset_zero() {
        let actions = at(&[0.0, 50.0]);
        let fired = plan(&actions, ActionsMode::Loop, false, -1.0, 0.0, 100.0);
        assert_eq!(offsets(&fired), vec![0.0]);
    }

    #[test]
    fn test_none_mode_fires_nothing() {
        let actions = at(&[0.0, 50.0]);
        assert!(plan(&actions, ActionsMode::None, false, -1.0, 100.0, 100.0).is_empty());
    }

    #[test]
    fn test_loop_wrap_replays_tail_then_head() {
        let actions = at(&[0.0, 50.0, 80.0, 100.0]);
        let fired = plan(&actions, ActionsMode::Loop, false, 70.0, 20.0, 100.0);
        assert_eq!(offsets(&fired), vec![80.0, 100.0, 0.0]);
    }

    #[test]
    fn test_loop_wrap_from_end_skips_tail() {
        let actions = at(&[0.0, 100.0]);
        let fired = plan(&actions, ActionsMode::Loop, false, 100.0, 10.0, 100.0);
        assert_eq!(offsets(&fired), vec![0.0]);
    }

    #[test]
    fn test_reverse_mode_fires_descending() {
        let actions = at(&[10.0, 20.0, 30.0, 40.0]);
        let fired = plan(&actions, ActionsMode::Reverse, false, 40.0, 10.0, 40.0);
        assert_eq!(offsets(&fired), vec![40.0, 30.0, 20.0]);
    }

    #[test]
    fn test_ticks_only_fire_landing_offset() {
        let actions = at(&[1.0, 2.0, 3.0]);
        let fired = plan(&actions, ActionsMode::Loop, true, 0.0, 2.0, 3.0);
        assert_eq!(offsets(&fired), vec![2.0]);
    }
}
