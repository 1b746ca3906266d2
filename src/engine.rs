use {
    crate::{
        agents::{
            Algorithm,
            AlgorithmConfig,
            OffPolicyAlgorithm,
            RunMode,
        },
        envs::{
            Environment,
            TensorConvertible,
            VectorConvertible,
        },
    },
    anyhow::{
        anyhow,
        Result,
    },
    candle_core::{
        Device,
        Tensor,
    },
    polars::prelude::{
        DataFrame,
        NamedFrom,
        ParquetWriter,
        Series,
    },
    rand::{
        thread_rng,
        Rng,
    },
    serde::Serialize,
    std::{
        fs::{
            create_dir_all,
            File,
        },
        io::Write,
        path::Path,
    },
    tracing::info,
};


/// Run `n_runs` independent training runs and collect the results.
///
/// Every run gets a freshly constructed agent. The algorithm and environment
/// configs are written next to the data as RON files; an already populated
/// output directory is refused rather than overwritten.
pub fn run_n<Alg, Env, Obs, Act>(
    path: &dyn AsRef<Path>,
    n_runs: usize,
    env: &mut Env,
    config: Alg::Config,
    device: &Device,
) -> Result<()>
where
    Alg: Algorithm + OffPolicyAlgorithm,
    Alg::Config: Clone + Serialize + AlgorithmConfig,
    Env: Environment<Action = Act, Observation = Obs>,
    Env::Config: Serialize,
    Obs: TensorConvertible,
    Act: VectorConvertible,
{
    let path = Path::new("data/").join(path);

    if path.join("config_algorithm.ron").try_exists()? {
        Err(anyhow!(concat!(
            "Algorithm config already exists in this directory!\n",
            "I am assuming I would be overwriting existing data!",
        )))?
    }

    create_dir_all(path.as_path())?;

    File::create(path.join("config_algorithm.ron"))?.write_all(
        ron::ser::to_string_pretty(
            &config,
            ron::ser::PrettyConfig::default(),
        )?.as_bytes()
    )?;

    File::create(path.join("config_environment.ron"))?.write_all(
        ron::ser::to_string_pretty(
            &env.config(),
            ron::ser::PrettyConfig::default(),
        )?.as_bytes()
    )?;

    for n in 0..n_runs {
        info!("Collecting data, run {n}/{n_runs}");
        let mut agent = *Alg::from_config(
            device,
            &config,
            env.observation_space().iter().product::<usize>(),
            &env.action_space(),
        )?;
        let mc_returns = train(
            env,
            &mut agent,
            config.clone(),
            device,
        )?;

        let mut df = DataFrame::new(vec![
            Series::new(
                &format!("run_{n}_total_rewards"),
                &mc_returns,
            ),
        ])?;

        ParquetWriter::new(
            File::create(path.join(format!("run_{n}_data.parquet")))?
        ).finish(&mut df)?;
    }
    Ok(())
}

/// The episode loop: act, step, remember, and update after every episode.
///
/// Returns the undiscounted return of every episode.
pub fn train<Alg, Env, Obs, Act>(
    env: &mut Env,
    agent: &mut Alg,
    config: Alg::Config,
    device: &Device,
) -> Result<Vec<f64>>
where
    Alg: Algorithm + OffPolicyAlgorithm,
    Alg::Config: AlgorithmConfig,
    Env: Environment<Action = Act, Observation = Obs>,
    Obs: TensorConvertible,
    Act: VectorConvertible,
{
    let mut mc_returns = Vec::new();
    let mut rng = thread_rng();

    for episode in 0..config.max_episodes() {
        let mut total_reward = 0.0;
        env.reset(rng.gen::<u64>())?;

        loop {
            let observation = env.current_observation();
            let state = <Obs>::to_tensor(observation, device)?;

            let action = agent.actions(&state)?;
            let step = env.step(<Act>::from_vec(action.to_vec1::<f64>()?))?;
            total_reward += step.reward;

            agent.remember(
                &state,
                &action,
                &Tensor::new(vec![step.reward], device)?,
                &<Obs>::to_tensor(step.observation, device)?,
                step.terminated,
                step.truncated,
            )?;

            if step.terminated || step.truncated {
                break;
            }
        }

        info!("episode {episode} with total reward of {total_reward}");
        mc_returns.push(total_reward);

        if let RunMode::Train = agent.run_mode() {
            for _ in 0..config.training_iterations() {
                agent.train()?;
            }
        }
    }
    Ok(mc_returns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        agents::{
            DDPG,
            DDPGConfig,
        },
        components::ModelSet,
        envs::{
            PendulumConfig,
            PendulumEnv,
        },
    };

    #[test]
    fn test_train_runs_end_to_end() -> Result<()> {
        let device = Device::Cpu;
        let mut env = *PendulumEnv::new(PendulumConfig {
            timelimit: 30,
            ..Default::default()
        })?;

        let mut config = DDPGConfig::pendulum();
        config.models = ModelSet::actor_critic(3, 1, 8, 8);
        config.max_episodes = 2;
        config.training_iterations = 2;
        config.batch_size = 8;
        let mut agent = *DDPG::from_config(&device, &config, 3, &env.action_space())?;

        let mc_returns = train(&mut env, &mut agent, config, &device)?;

        assert_eq!(mc_returns.len(), 2);
        assert_eq!(agent.timestep(), 60);
        assert_eq!(agent.replay_buffer().len(), 60);
        Ok(())
    }
}
