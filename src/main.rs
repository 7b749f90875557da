mod backend;
mod checkpoint;
mod config;
mod distributions;
mod env;
mod envs;
mod loss;
mod metrics;
mod network;
mod progress;
mod returns;
mod rollout;
mod stats;
mod trainer;

use anyhow::Result;
use clap::Parser;

use crate::backend::{backend_name, init_device, TrainingBackend};
use crate::config::{CliArgs, Config};
use crate::env::Environment;
use crate::trainer::{Trainer, TrainingOutcome};

fn main() -> Result<()> {
    let args = CliArgs::parse();
    let config = Config::load(&args)?;
    config.validate()?;

    println!("burn-actor-critic v{}", env!("CARGO_PKG_VERSION"));
    println!("Environment: {}", config.env);
    println!("Backend: {}", backend_name());
    println!("Seed: {}", config.seed);
    if let Some(run_dir) = &config.run_dir {
        println!("Run dir: {}", run_dir.display());
    }

    let env_name = config.env.clone();
    let outcome = dispatch_env!(env_name, train::<E>(config)?);

    println!("\n{}", outcome.summary());
    Ok(())
}

fn train<E: Environment>(config: Config) -> Result<TrainingOutcome> {
    let device = init_device();
    let mut trainer: Trainer<TrainingBackend, E> = Trainer::new(config, device);
    let (_model, outcome) = trainer.run()?;
    Ok(outcome)
}
