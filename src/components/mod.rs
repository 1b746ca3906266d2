//! # Components
//!
//! This module contains the components that agents are assembled from.
//!
//! ## Exploration
//!
//! The [`LinearDecay`] schedule maps the global interaction count to a noise
//! multiplier, and the [`Noise`] processes ([`OuNoise`], [`GaussianNoise`])
//! produce the raw perturbations added to a deterministic policy's actions.
//!
//! ## Spaces
//!
//! The [`ActionSpace`] enum tags the supported action-space kinds so that
//! agents can validate the kind once at construction instead of branching on
//! every call.
//!
//! ## Replay Buffer
//!
//! The [`ReplayBuffer`] struct implements a uniform replay memory, which is
//! used by off-policy algorithms such as [`crate::agents::DDPG`].
//!
//! ## Models
//!
//! The [`ModelSet`] registry names the function approximators an agent is
//! built from, and a [`NetworkPair`] couples each online network with its
//! slowly tracking target copy.

mod exploration;
mod lr_schedule;
mod models;
mod noise;
mod replay_buffer;
mod spaces;

pub use exploration::LinearDecay;
pub use lr_schedule::{
    LrScheduleConfig,
    LrScheduler,
};
pub use models::{
    HeadActivation,
    MlpConfig,
    ModelSet,
    NetworkPair,
};
pub use noise::{
    GaussianNoise,
    Noise,
    NoiseConfig,
    OuNoise,
};
pub use replay_buffer::{
    ReplayBuffer,
    TransitionBatch,
};
pub use spaces::ActionSpace;

use thiserror::Error;

/// Errors raised while validating an agent's configuration.
///
/// All of these are fatal at construction time: an agent is never handed out
/// in a half-validated state.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no model named `{0}` was supplied")]
    MissingModel(String),

    #[error("model `{target}` does not mirror `{online}` ({target_dims:?} vs {online_dims:?})")]
    TargetMismatch {
        online: String,
        target: String,
        online_dims: Vec<usize>,
        target_dims: Vec<usize>,
    },

    #[error("model `{model}` maps {got_in} -> {got_out} values, expected {want_in} -> {want_out}")]
    WrongModelShape {
        model: String,
        want_in: usize,
        want_out: usize,
        got_in: usize,
        got_out: usize,
    },

    #[error("model `{0}` needs at least an input and an output layer")]
    TooFewLayers(String),

    #[error("{agent} supports Box action spaces only, got {kind}")]
    UnsupportedActionSpace {
        agent: &'static str,
        kind: &'static str,
    },

    #[error("invalid value for `{name}`: {reason}")]
    InvalidHyperparameter {
        name: &'static str,
        reason: String,
    },

    #[error("inconsistent action bounds: {0}")]
    InvalidBounds(String),
}
