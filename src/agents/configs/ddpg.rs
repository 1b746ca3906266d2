use {
    super::{
        ActorCriticConfig,
        AlgorithmConfig,
        OffPolicyConfig,
    },
    crate::components::{
        ConfigError,
        LrScheduleConfig,
        ModelSet,
        NoiseConfig,
    },
    serde::{
        Deserialize,
        Serialize,
    },
};

/// Which noise process to sample per action and how its scale decays over
/// the first `timesteps` environment interactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplorationConfig {
    pub noise: NoiseConfig,
    pub initial_scale: f64,
    pub final_scale: f64,
    pub timesteps: usize,
}
impl Default for ExplorationConfig {
    fn default() -> Self {
        Self {
            noise: NoiseConfig::OrnsteinUhlenbeck {
                mu: 0.0,
                theta: 0.15,
                sigma: 0.2,
            },
            initial_scale: 1.0,
            final_scale: 1e-3,
            timesteps: 10_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DDPGConfig {
    // The learning rates for the Actor and Critic networks
    pub actor_learning_rate: f64,
    pub critic_learning_rate: f64,
    // The impact of the q value of the next state on the current state's q value.
    pub discount_factor: f64,
    // The weight for tracking the target networks toward the online ones.
    pub polyak: f64,
    // The function approximators, under their registry names.
    pub models: ModelSet,
    // The capacity of the replay buffer used for sampling training data.
    pub replay_buffer_capacity: usize,
    // The training batch size for each gradient step.
    pub batch_size: usize,
    // Gradient steps per update invocation, each on a freshly sampled batch.
    pub gradient_steps: usize,
    // The total number of episodes.
    pub max_episodes: usize,
    // The number of update invocations after one episode finishes.
    pub training_iterations: usize,
    // Number of uniform random actions at the very beginning of training.
    pub random_timesteps: usize,
    // Interactions to collect before the first gradient step.
    pub learning_starts: usize,
    // Exploration noise and its decay schedule.
    pub exploration: ExplorationConfig,
    // Optional learning-rate schedule, applied to both optimizers.
    pub learning_rate_scheduler: Option<LrScheduleConfig>,
}
impl DDPGConfig {
    pub fn pendulum() -> Self {
        Self {
            actor_learning_rate: 1e-4,
            critic_learning_rate: 1e-3,
            discount_factor: 0.99,
            polyak: 0.005,
            models: ModelSet::actor_critic(3, 1, 400, 300),
            replay_buffer_capacity: 100_000,
            batch_size: 64,
            gradient_steps: 1,
            max_episodes: 30,
            training_iterations: 200,
            random_timesteps: 0,
            learning_starts: 0,
            exploration: ExplorationConfig {
                noise: NoiseConfig::OrnsteinUhlenbeck {
                    mu: 0.0,
                    theta: 0.15,
                    sigma: 0.1,
                },
                initial_scale: 1.0,
                final_scale: 1e-3,
                timesteps: 5_000,
            },
            learning_rate_scheduler: None,
        }
    }

    /// Reject hyperparameters the update cycle cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::InvalidHyperparameter {
                name: "batch_size",
                reason: "must be at least one".into(),
            });
        }
        if self.gradient_steps == 0 {
            return Err(ConfigError::InvalidHyperparameter {
                name: "gradient_steps",
                reason: "must be at least one".into(),
            });
        }
        if !(0.0..=1.0).contains(&self.discount_factor) {
            return Err(ConfigError::InvalidHyperparameter {
                name: "discount_factor",
                reason: format!("got {}, must lie in [0, 1]", self.discount_factor),
            });
        }
        if !(self.polyak > 0.0 && self.polyak <= 1.0) {
            return Err(ConfigError::InvalidHyperparameter {
                name: "polyak",
                reason: format!("got {}, must lie in (0, 1]", self.polyak),
            });
        }
        if self.actor_learning_rate <= 0.0 || self.critic_learning_rate <= 0.0 {
            return Err(ConfigError::InvalidHyperparameter {
                name: "learning_rate",
                reason: "learning rates must be positive".into(),
            });
        }
        Ok(())
    }
}


impl AlgorithmConfig for DDPGConfig {
    fn max_episodes(&self) -> usize {
        self.max_episodes
    }
    fn training_iterations(&self) -> usize {
        self.training_iterations
    }
    fn random_timesteps(&self) -> usize {
        self.random_timesteps
    }
}

impl ActorCriticConfig for DDPGConfig {
    fn actor_lr(&self) -> f64 {
        self.actor_learning_rate
    }
    fn critic_lr(&self) -> f64 {
        self.critic_learning_rate
    }
    fn discount_factor(&self) -> f64 {
        self.discount_factor
    }
    fn polyak(&self) -> f64 {
        self.polyak
    }
}

impl OffPolicyConfig for DDPGConfig {
    fn replay_buffer_capacity(&self) -> usize {
        self.replay_buffer_capacity
    }
    fn batch_size(&self) -> usize {
        self.batch_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pendulum_preset_is_valid() {
        assert!(DDPGConfig::pendulum().validate().is_ok());
    }

    #[test]
    fn test_validation_bounds() {
        let mut config = DDPGConfig::pendulum();
        config.batch_size = 0;
        assert!(config.validate().is_err());

        let mut config = DDPGConfig::pendulum();
        config.gradient_steps = 0;
        assert!(config.validate().is_err());

        let mut config = DDPGConfig::pendulum();
        config.discount_factor = 1.5;
        assert!(config.validate().is_err());

        let mut config = DDPGConfig::pendulum();
        config.polyak = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_roundtrips_through_ron() {
        let config = DDPGConfig::pendulum();
        let text = ron::ser::to_string(&config).unwrap();
        let back: DDPGConfig = ron::de::from_str(&text).unwrap();
        assert_eq!(back, config);
    }
}
