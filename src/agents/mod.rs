mod ddpg;
mod configs;

pub use configs::{
    ActorCriticConfig,
    AlgorithmConfig,
    DDPGConfig,
    ExplorationConfig,
    OffPolicyConfig,
};
pub use ddpg::DDPG;

pub use crate::components::ConfigError;

use {
    crate::components::{
        ActionSpace,
        ReplayBuffer,
    },
    anyhow::Result,
    candle_core::{
        Device,
        Tensor,
    },
    std::fmt::Display,
};

/// The execution mode of an agent is either training or testing.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Train,
    Test,
}

impl Display for RunMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunMode::Train => write!(f, "Train"),
            RunMode::Test => write!(f, "Test"),
        }
    }
}

pub trait Algorithm {
    type Config;

    fn config(&self) -> &Self::Config;
    fn from_config(
        device: &Device,
        config: &Self::Config,
        size_state: usize,
        action_space: &ActionSpace,
    ) -> Result<Box<Self>>;

    fn actions(
        &mut self,
        state: &Tensor,
    ) -> Result<Tensor>;

    fn train(&mut self) -> Result<()>;

    fn run_mode(&self) -> RunMode;
    fn set_run_mode(&mut self, mode: RunMode);
}

pub trait OffPolicyAlgorithm: Algorithm {
    fn remember(
        &mut self,
        state: &Tensor,
        action: &Tensor,
        reward: &Tensor,
        next_state: &Tensor,
        terminated: bool,
        truncated: bool,
    ) -> Result<()>;

    fn replay_buffer(&self) -> &ReplayBuffer;
}
