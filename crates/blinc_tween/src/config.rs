//! Tween construction options
//!
//! Options can be built fluently or loaded from TOML:
//!
//! ```ignore
//! let options = TweenOptions::from_toml("loop = true\nposition = 250.0")?;
//! let tween = registry.get(Some(&target), options)?;
//! ```

use crate::error::Result;
use crate::timeline::Tween;
use serde::Deserialize;
use std::fmt;
use std::rc::Rc;

/// Callback invoked after every position change
pub type ChangeCallback = Rc<dyn Fn(&Tween)>;

/// Options recognized by [`TweenRegistry::get`](crate::TweenRegistry::get)
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct TweenOptions {
    /// Measure time in ticks (one per registry tick) instead of milliseconds
    pub use_ticks: bool,
    /// Keep playing while the registry tick reports a global pause
    pub ignore_global_pause: bool,
    /// Wrap around at the end instead of stopping
    #[serde(rename = "loop")]
    pub looping: bool,
    /// Remove the target's existing tweens first
    #[serde(rename = "override")]
    pub override_existing: bool,
    /// Start paused (and unregistered)
    pub paused: bool,
    /// Seek here right away, without firing actions
    pub position: Option<f64>,
    #[serde(skip)]
    pub on_change: Option<ChangeCallback>,
}

impl TweenOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse options from a TOML table
    pub fn from_toml(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    pub fn use_ticks(mut self) -> Self {
        self.use_ticks = true;
        self
    }

    pub fn ignore_global_pause(mut self) -> Self {
        self.ignore_global_pause = true;
        self
    }

    pub fn looping(mut self) -> Self {
        self.looping = true;
        self
    }

    pub fn override_existing(mut self) -> Self {
        self.override_existing = true;
        self
    }

    pub fn paused(mut self) -> Self {
        self.paused = true;
        self
    }

    pub fn position(mut self, position: f64) -> Self {
        self.position = Some(position);
        self
    }

    pub fn on_change<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Tween) + 'static,
    {
        self.on_change = Some(Rc::new(callback));
        self
    }
}

impl fmt::Debug for TweenOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TweenOptions")
            .field("use_ticks", &self.use_ticks)
            .field("ignore_global_pause", &self.ignore_global_pause)
            .field("looping", &self.looping)
            .field("override_existing", &self.override_existing)
            .field("paused", &self.paused)
            .field("position", &self.position)
            .field("on_change", &self.on_change.is_some())
            .finish()
    }
}
