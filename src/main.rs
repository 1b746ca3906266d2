use {
    anyhow::Result,
    candle_core::Device,
    clap::Parser,
    ddpg_rl::{
        agents::{
            DDPG,
            DDPGConfig,
        },
        cli::{
            Args,
            Env,
        },
        engine::run_n,
        envs::{
            Environment,
            PendulumEnv,
        },
        logging::setup_logging,
    },
};

fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(level) = args.log.level() {
        setup_logging(&"debug.log", Some(level), Some(level))?;
    }

    let device = Device::Cpu;
    match args.env {
        Env::Pendulum => {
            let mut env = *PendulumEnv::new(Default::default())?;
            let config = DDPGConfig::pendulum();

            run_n::<DDPG, _, _, _>(
                &args.output.unwrap_or_else(|| args.env.name().to_owned()),
                args.runs,
                &mut env,
                config,
                &device,
            )?;
        }
    }
    Ok(())
}
