//! Blinc Tween Engine
//!
//! Declarative property timelines for dynamic objects.
//!
//! # Features
//!
//! - **Timelines**: Chain waits, interpolations and callbacks on one target
//! - **Seeking**: Jump to any position, forwards or backwards, with actions
//!   replayed according to an [`ActionsMode`]
//! - **Plugins**: Per-property hooks that can rewrite, inject, or suppress
//!   interpolated values
//! - **Registry**: One frame tick advances every active tween, with a
//!   global pause and tick-based timing
//!
//! # Example
//!
//! ```ignore
//! use blinc_tween::{Target, TweenOptions, TweenRegistry};
//!
//! let registry = TweenRegistry::new();
//! let sprite = Target::with_props([("x", 0.0), ("alpha", 1.0)]);
//!
//! registry
//!     .get(Some(&sprite), TweenOptions::new())?
//!     .to([("x", 100.0)], 1000.0)?
//!     .wait(500.0)
//!     .to([("alpha", 0.0)], 250.0)?
//!     .call(|_| Ok(()));
//!
//! registry.tick(16.0, false)?;
//! ```

pub mod action;
mod builder;
pub mod config;
pub mod easing;
pub mod error;
pub mod events;
pub mod plugin;
pub mod scheduler;
mod step;
pub mod target;
pub mod timeline;
pub mod value;

pub use action::{ActionContext, ActionFn, ActionsMode};
pub use config::{ChangeCallback, TweenOptions};
pub use easing::Easing;
pub use error::{Result, TweenError};
pub use events::{EventDispatcher, ListenerId, TweenEvent};
pub use plugin::{EvaluateContext, Evaluation, PluginList, PluginRegistry, TweenPlugin};
pub use scheduler::TweenRegistry;
pub use target::{Target, TargetKey, WeakTarget};
pub use timeline::{Tween, WeakTween};
pub use value::{Props, Value};
