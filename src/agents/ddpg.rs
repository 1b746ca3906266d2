use {
    super::{
        configs::DDPGConfig,
        Algorithm,
        ConfigError,
        OffPolicyAlgorithm,
        RunMode,
    },
    crate::components::{
        ActionSpace,
        LinearDecay,
        LrScheduler,
        NetworkPair,
        Noise,
        ReplayBuffer,
        TransitionBatch,
    },
    anyhow::Result,
    candle_core::{
        Device,
        Tensor,
    },
    candle_nn::{
        AdamW,
        Optimizer,
        ParamsAdamW,
    },
    rand::thread_rng,
    tracing::debug,
};

/// The one-step bootstrapped regression target `r + gamma * (1 - d) * Q'`.
///
/// Terminal transitions keep only their immediate reward: the `(1 - d)`
/// factor zeroes the bootstrapped term, so the target critic's output never
/// reaches `y` for them.
fn bootstrapped_target(
    rewards: &Tensor,
    dones: &Tensor,
    next_q: &Tensor,
    discount_factor: f64,
) -> candle_core::Result<Tensor> {
    let not_done = dones.affine(-1.0, 1.0)?;
    rewards + (discount_factor * (not_done * next_q)?)?
}

fn critic_loss(
    q: &Tensor,
    target: &Tensor,
) -> candle_core::Result<Tensor> {
    (q - target)?.sqr()?.mean_all()
}

/// Deep Deterministic Policy Gradient.
///
/// An off-policy actor-critic algorithm for bounded continuous action
/// spaces: a deterministic policy is trained by ascending the online critic,
/// the critic by regression onto a target computed from slowly tracking
/// copies of both networks.
#[allow(clippy::upper_case_acronyms)]
pub struct DDPG {
    config: DDPGConfig,

    actor: NetworkPair,
    actor_optim: AdamW,
    critic: NetworkPair,
    critic_optim: AdamW,

    actor_schedule: Option<LrScheduler>,
    critic_schedule: Option<LrScheduler>,

    replay_buffer: ReplayBuffer,
    noise: Noise,
    decay: LinearDecay,

    space: ActionSpace,
    low: Tensor,
    high: Tensor,

    // One counter per agent instance, bumped exactly once per action
    // selection.
    timestep: usize,
    run_mode: RunMode,
    device: Device,
}

impl std::fmt::Debug for DDPG {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DDPG").finish_non_exhaustive()
    }
}

impl DDPG {
    /// The number of action selections made so far.
    pub fn timestep(&self) -> usize {
        self.timestep
    }

    pub fn actor(&self) -> &NetworkPair {
        &self.actor
    }

    pub fn critic(&self) -> &NetworkPair {
        &self.critic
    }

    fn critic_step(
        &mut self,
        batch: &TransitionBatch,
    ) -> Result<f64> {
        // The target is computed from the slow copies and detached: it acts
        // as a fixed constant in the regression below.
        let target = {
            let next_actions = self.actor.target_forward(&batch.next_states)?;
            let next_q = self
                .critic
                .target_forward(&Tensor::cat(&[&next_actions, &batch.next_states], 1)?)?;
            bootstrapped_target(
                &batch.rewards,
                &batch.dones,
                &next_q,
                self.config.discount_factor,
            )?
            .detach()
        };

        // Score the stored actions, not freshly sampled ones.
        let q = self
            .critic
            .forward(&Tensor::cat(&[&batch.actions, &batch.states], 1)?)?;
        let loss = critic_loss(&q, &target)?;
        self.critic_optim.backward_step(&loss)?;

        Ok(loss.to_scalar::<f64>()?)
    }

    fn actor_step(
        &mut self,
        batch: &TransitionBatch,
    ) -> Result<f64> {
        // Fresh, gradient-tracked actions; the online critic only scores
        // them here, its parameters belong to the critic optimizer.
        let actions = self.actor.forward(&batch.states)?;
        let q = self
            .critic
            .forward(&Tensor::cat(&[&actions, &batch.states], 1)?)?;
        let loss = q.mean_all()?.neg()?;
        self.actor_optim.backward_step(&loss)?;

        Ok(loss.to_scalar::<f64>()?)
    }
}

impl Algorithm for DDPG {
    type Config = DDPGConfig;

    fn config(&self) -> &DDPGConfig {
        &self.config
    }

    fn from_config(
        device: &Device,
        config: &DDPGConfig,
        size_state: usize,
        action_space: &ActionSpace,
    ) -> Result<Box<Self>> {
        config.validate()?;
        action_space.validate()?;
        if !matches!(action_space, ActionSpace::Box { .. }) {
            return Err(ConfigError::UnsupportedActionSpace {
                agent: "DDPG",
                kind: action_space.kind(),
            }
            .into());
        }
        let size_action = action_space.dim();
        let (low, high) = action_space.bound_tensors(device)?;

        let policy_model = config.models.get("policy")?;
        let target_policy_model = config.models.get("target_policy")?;
        let critic_model = config.models.get("critic")?;
        let target_critic_model = config.models.get("target_critic")?;

        policy_model.check_io("policy", size_state, size_action)?;
        critic_model.check_io("critic", size_state + size_action, 1)?;

        let actor = NetworkPair::new(
            policy_model,
            target_policy_model,
            "policy",
            "target_policy",
            device,
        )?;
        let critic = NetworkPair::new(
            critic_model,
            target_critic_model,
            "critic",
            "target_critic",
            device,
        )?;

        let actor_optim = AdamW::new(
            actor.trainable_vars(),
            ParamsAdamW {
                lr: config.actor_learning_rate,
                ..Default::default()
            },
        )?;
        let critic_optim = AdamW::new(
            critic.trainable_vars(),
            ParamsAdamW {
                lr: config.critic_learning_rate,
                ..Default::default()
            },
        )?;

        let (actor_schedule, critic_schedule) = match config.learning_rate_scheduler {
            Some(schedule) => (
                Some(LrScheduler::new(schedule, config.actor_learning_rate)?),
                Some(LrScheduler::new(schedule, config.critic_learning_rate)?),
            ),
            None => (None, None),
        };

        let noise = config.exploration.noise.build(size_action, device)?;
        let decay = LinearDecay::new(
            config.exploration.timesteps,
            config.exploration.initial_scale,
            config.exploration.final_scale,
        )?;

        Ok(Box::new(Self {
            config: config.clone(),
            actor,
            actor_optim,
            critic,
            critic_optim,
            actor_schedule,
            critic_schedule,
            replay_buffer: ReplayBuffer::new(config.replay_buffer_capacity),
            noise,
            decay,
            space: action_space.clone(),
            low,
            high,
            timestep: 0,
            run_mode: RunMode::Train,
            device: device.clone(),
        }))
    }

    fn actions(
        &mut self,
        state: &Tensor,
    ) -> Result<Tensor> {
        let t = self.timestep;
        self.timestep += 1;

        // Warmup window: uniform draws from the bounds, the policy is not
        // consulted at all.
        if self.run_mode == RunMode::Train && t < self.config.random_timesteps {
            let sampled = self.space.sample(&mut thread_rng());
            return Ok(Tensor::new(sampled, &self.device)?);
        }

        // Candle assumes a batch dimension, so when we don't have one we need
        // to pretend we do by un- and resqueezing the state tensor.
        let actions = self
            .actor
            .forward(&state.detach().unsqueeze(0)?)?
            .squeeze(0)?;

        let actions = if let RunMode::Train = self.run_mode {
            let scale = self.decay.scale(t);
            (actions + (self.noise.sample()? * scale)?)?
        } else {
            actions
        };

        // Whatever the noise did, the environment only ever sees actions
        // inside the closed bounds.
        Ok(actions
            .broadcast_maximum(&self.low)?
            .broadcast_minimum(&self.high)?)
    }

    fn train(&mut self) -> Result<()> {
        if self.timestep < self.config.learning_starts {
            return Ok(());
        }

        for _ in 0..self.config.gradient_steps {
            let batch = match self.replay_buffer.random_batch(self.config.batch_size)? {
                Some(batch) => batch,
                // Not enough experience yet; skipping is not an error.
                None => return Ok(()),
            };

            let critic_loss = self.critic_step(&batch)?;
            let actor_loss = self.actor_step(&batch)?;

            // Smoothing strictly follows both optimizer steps within the
            // same gradient-step iteration.
            self.critic.smooth(self.config.polyak)?;
            self.actor.smooth(self.config.polyak)?;

            if let Some(schedule) = &mut self.critic_schedule {
                schedule.advance(&mut self.critic_optim);
            }
            if let Some(schedule) = &mut self.actor_schedule {
                schedule.advance(&mut self.actor_optim);
            }

            debug!("critic loss: {critic_loss:.6}, actor loss: {actor_loss:.6}");
        }
        Ok(())
    }

    fn run_mode(&self) -> RunMode {
        self.run_mode
    }

    fn set_run_mode(&mut self, mode: RunMode) {
        self.run_mode = mode;
    }
}

impl OffPolicyAlgorithm for DDPG {
    fn remember(
        &mut self,
        state: &Tensor,
        action: &Tensor,
        reward: &Tensor,
        next_state: &Tensor,
        terminated: bool,
        _truncated: bool,
    ) -> Result<()> {
        // Truncation ends the episode in the engine but does not cut
        // bootstrapping, so only true terminals are stored as done.
        let done = Tensor::new(vec![if terminated { 1.0f64 } else { 0.0 }], &self.device)?;
        self.replay_buffer
            .push(state, action, reward, next_state, &done);
        Ok(())
    }

    fn replay_buffer(&self) -> &ReplayBuffer {
        &self.replay_buffer
    }
}
