pub mod logging;

pub mod envs;
pub mod components;
pub mod agents;

pub mod cli;
pub mod engine;
