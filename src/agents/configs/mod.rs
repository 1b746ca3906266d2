mod ddpg;

pub use ddpg::{
    DDPGConfig,
    ExplorationConfig,
};


pub trait AlgorithmConfig {
    fn max_episodes(&self) -> usize;
    fn training_iterations(&self) -> usize;
    fn random_timesteps(&self) -> usize;
}
pub trait ActorCriticConfig: AlgorithmConfig {
    fn actor_lr(&self) -> f64;
    fn critic_lr(&self) -> f64;
    fn discount_factor(&self) -> f64;
    fn polyak(&self) -> f64;
}
pub trait OffPolicyConfig: AlgorithmConfig {
    fn replay_buffer_capacity(&self) -> usize;
    fn batch_size(&self) -> usize;
}
