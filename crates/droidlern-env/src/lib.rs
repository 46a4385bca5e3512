#![warn(clippy::unwrap_used, clippy::expect_used)]

//! An Android device as a reinforcement-learning environment.
//!
//! [`AndroidEnv`] turns [`Action`](droidlern_core::Action)s into controller
//! calls, builds observations from a screenshot and a UI-hierarchy dump, and
//! scores each step from the device log. [`DiscreteWrapper`] lets an agent act
//! on an `m × n` grid instead of raw pixels.

pub mod config;
pub mod discrete;
pub mod env;
pub mod error;
pub mod reward;
pub mod sampler;

pub use config::{EnvConfig, GridConfig, ResetStep};
pub use discrete::DiscreteWrapper;
pub use env::{dispatch, AndroidEnv, ResetCmd};
pub use error::{BoundsError, EnvError, Result};
pub use reward::{ConstantReward, KeywordReward};
