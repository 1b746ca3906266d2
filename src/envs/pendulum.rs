use {
    super::{
        Environment,
        Step,
        TensorConvertible,
        VectorConvertible,
    },
    crate::components::ActionSpace,
    anyhow::Result,
    candle_core::{
        Device,
        Tensor,
    },
    rand::{
        rngs::StdRng,
        Rng,
        SeedableRng,
    },
    serde::{
        Deserialize,
        Serialize,
    },
    std::f64::consts::PI,
};

/// Classic torque-limited pendulum swing-up.
///
/// The pendulum starts at a random angle and the agent applies a bounded
/// torque at the pivot to swing it upright and hold it there. The
/// observation is `[cos(angle), sin(angle), angular velocity]` so the angle
/// never wraps discontinuously, and the reward penalizes the angle from
/// vertical, the angular velocity and the applied torque. Episodes never
/// terminate, they only time out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendulumConfig {
    pub gravity: f64,
    pub mass: f64,
    pub length: f64,
    pub timestep: f64,
    pub max_speed: f64,
    pub max_torque: f64,
    pub timelimit: usize,
    pub seed: u64,
}
impl Default for PendulumConfig {
    fn default() -> Self {
        Self {
            gravity: 10.0,
            mass: 1.0,
            length: 1.0,
            timestep: 0.05,
            max_speed: 8.0,
            max_torque: 2.0,
            timelimit: 200,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PendulumAction {
    // Torque applied at the pivot of the pendulum
    pub torque: f64,
}
impl VectorConvertible for PendulumAction {
    fn from_vec(value: Vec<f64>) -> Self {
        Self { torque: value[0] }
    }
    fn to_vec(value: Self) -> Vec<f64> {
        vec![value.torque]
    }
}

#[derive(Debug, Clone)]
pub struct PendulumObservation {
    // The (x, y) coordinates of the free end of the pendulum
    pub x: f64,
    pub y: f64,
    // The angular velocity of the pendulum
    pub velocity: f64,
}
impl VectorConvertible for PendulumObservation {
    fn from_vec(value: Vec<f64>) -> Self {
        Self {
            x: value[0],
            y: value[1],
            velocity: value[2],
        }
    }
    fn to_vec(value: Self) -> Vec<f64> {
        vec![value.x, value.y, value.velocity]
    }
}
impl TensorConvertible for PendulumObservation {
    fn from_tensor(value: Tensor) -> Self {
        Self::from_vec(value.to_vec1::<f64>().unwrap())
    }
    fn to_tensor(
        value: Self,
        device: &Device,
    ) -> candle_core::Result<Tensor> {
        Tensor::new(Self::to_vec(value), device)
    }
}

fn angle_normalize(x: f64) -> f64 {
    ((x + PI).rem_euclid(2.0 * PI)) - PI
}

pub struct PendulumEnv {
    config: PendulumConfig,
    rng: StdRng,
    angle: f64,
    velocity: f64,
    steps: usize,
}
impl PendulumEnv {
    fn observation(&self) -> PendulumObservation {
        PendulumObservation {
            x: self.angle.cos(),
            y: self.angle.sin(),
            velocity: self.velocity,
        }
    }
}

impl Environment for PendulumEnv {
    type Config = PendulumConfig;
    type Action = PendulumAction;
    type Observation = PendulumObservation;

    fn config(&self) -> &PendulumConfig {
        &self.config
    }

    fn new(config: PendulumConfig) -> Result<Box<Self>> {
        let rng = StdRng::seed_from_u64(config.seed);
        Ok(Box::new(Self {
            config,
            rng,
            // Hanging straight down, at rest, until the first reset.
            angle: PI,
            velocity: 0.0,
            steps: 0,
        }))
    }

    fn reset(
        &mut self,
        seed: u64,
    ) -> Result<PendulumObservation> {
        self.rng = StdRng::seed_from_u64(seed);
        self.angle = self.rng.gen_range(-PI..=PI);
        self.velocity = self.rng.gen_range(-1.0..=1.0);
        self.steps = 0;
        Ok(self.observation())
    }

    fn step(
        &mut self,
        action: PendulumAction,
    ) -> Result<Step<PendulumObservation, PendulumAction>> {
        let PendulumConfig {
            gravity,
            mass,
            length,
            timestep,
            max_speed,
            max_torque,
            ..
        } = self.config;
        let torque = action.torque.clamp(-max_torque, max_torque);

        let acceleration = 3.0 * gravity / (2.0 * length) * self.angle.sin()
            + 3.0 / (mass * length * length) * torque;
        self.velocity = (self.velocity + acceleration * timestep).clamp(-max_speed, max_speed);
        self.angle = angle_normalize(self.angle + self.velocity * timestep);

        let angle = self.angle;
        let reward = -(angle * angle
            + 0.1 * self.velocity * self.velocity
            + 0.001 * torque * torque);

        self.steps += 1;
        Ok(Step {
            observation: self.observation(),
            action: PendulumAction { torque },
            reward,
            terminated: false,
            truncated: self.steps >= self.config.timelimit,
        })
    }

    fn action_space(&self) -> ActionSpace {
        ActionSpace::Box {
            low: vec![-self.config.max_torque],
            high: vec![self.config.max_torque],
        }
    }

    fn observation_space(&self) -> Vec<usize> {
        vec![3]
    }

    fn current_observation(&self) -> PendulumObservation {
        self.observation()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_is_reproducible() -> Result<()> {
        let mut env = *PendulumEnv::new(Default::default())?;

        let first = env.reset(7)?;
        let second = env.reset(7)?;
        assert_eq!(
            PendulumObservation::to_vec(first),
            PendulumObservation::to_vec(second),
        );
        Ok(())
    }

    #[test]
    fn test_observation_stays_on_the_unit_circle() -> Result<()> {
        let mut env = *PendulumEnv::new(Default::default())?;
        env.reset(3)?;

        for _ in 0..50 {
            let step = env.step(PendulumAction { torque: 5.0 })?;
            let norm = step.observation.x.powi(2) + step.observation.y.powi(2);
            assert!((norm - 1.0).abs() < 1e-9);
            assert!(step.observation.velocity.abs() <= env.config.max_speed);
        }
        Ok(())
    }

    #[test]
    fn test_torque_is_clamped() -> Result<()> {
        let mut env = *PendulumEnv::new(Default::default())?;
        env.reset(0)?;

        let step = env.step(PendulumAction { torque: 100.0 })?;
        assert_eq!(step.action.torque, env.config.max_torque);
        Ok(())
    }

    #[test]
    fn test_reward_is_best_upright() -> Result<()> {
        let mut env = *PendulumEnv::new(Default::default())?;
        env.reset(0)?;

        env.angle = 0.0;
        env.velocity = 0.0;
        let upright = env.step(PendulumAction { torque: 0.0 })?.reward;

        env.angle = PI;
        env.velocity = 0.0;
        let hanging = env.step(PendulumAction { torque: 0.0 })?.reward;

        assert!(upright > hanging);
        Ok(())
    }

    #[test]
    fn test_episode_times_out() -> Result<()> {
        let mut env = *PendulumEnv::new(PendulumConfig {
            timelimit: 5,
            ..Default::default()
        })?;
        env.reset(0)?;

        for i in 1..=5 {
            let step = env.step(PendulumAction { torque: 0.0 })?;
            assert!(!step.terminated);
            assert_eq!(step.truncated, i == 5);
        }
        Ok(())
    }
}
