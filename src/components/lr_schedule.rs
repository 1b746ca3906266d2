use {
    super::ConfigError,
    candle_nn::{
        AdamW,
        Optimizer,
    },
    serde::{
        Deserialize,
        Serialize,
    },
};

/// Shape of a learning-rate schedule, advanced once per gradient step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LrScheduleConfig {
    /// Multiply the rate by `gamma` after every `step_size` gradient steps.
    Step {
        step_size: usize,
        gamma: f64,
    },
    /// Multiply the rate by `gamma` after every gradient step.
    Exponential {
        gamma: f64,
    },
}

/// A schedule bound to one optimizer's initial learning rate.
#[derive(Debug, Clone)]
pub struct LrScheduler {
    config: LrScheduleConfig,
    initial_lr: f64,
    steps: usize,
}
impl LrScheduler {
    pub fn new(
        config: LrScheduleConfig,
        initial_lr: f64,
    ) -> Result<Self, ConfigError> {
        match config {
            LrScheduleConfig::Step { step_size, gamma } => {
                if step_size == 0 {
                    return Err(ConfigError::InvalidHyperparameter {
                        name: "learning_rate_scheduler.step_size",
                        reason: "must be greater than zero".into(),
                    });
                }
                if gamma <= 0.0 {
                    return Err(ConfigError::InvalidHyperparameter {
                        name: "learning_rate_scheduler.gamma",
                        reason: format!("got {gamma}, must be positive"),
                    });
                }
            }
            LrScheduleConfig::Exponential { gamma } => {
                if gamma <= 0.0 {
                    return Err(ConfigError::InvalidHyperparameter {
                        name: "learning_rate_scheduler.gamma",
                        reason: format!("got {gamma}, must be positive"),
                    });
                }
            }
        }
        Ok(Self {
            config,
            initial_lr,
            steps: 0,
        })
    }

    /// The learning rate after the recorded number of gradient steps.
    pub fn rate(&self) -> f64 {
        match self.config {
            LrScheduleConfig::Step { step_size, gamma } => {
                self.initial_lr * gamma.powi((self.steps / step_size) as i32)
            }
            LrScheduleConfig::Exponential { gamma } => {
                self.initial_lr * gamma.powi(self.steps as i32)
            }
        }
    }

    /// Record one gradient step and push the updated rate into the optimizer.
    pub fn advance(
        &mut self,
        optimizer: &mut AdamW,
    ) {
        self.steps += 1;
        optimizer.set_learning_rate(self.rate());
    }
}
