//! Training driver: one episode, one gradient step, until solved or out of budget

use anyhow::{Context, Result};
use burn::module::AutodiffModule;
use burn::optim::{AdamConfig, GradientsParams, Optimizer};
use burn::prelude::*;
use burn::tensor::backend::AutodiffBackend;
use burn::tensor::ElementConversion;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs;

use crate::checkpoint::{self, CheckpointMetadata};
use crate::config::Config;
use crate::env::{Environment, EnvironmentAdapter};
use crate::loss::ActorCriticLoss;
use crate::metrics::MetricsLogger;
use crate::network::ActorCritic;
use crate::progress::TrainingProgress;
use crate::returns::discounted_returns;
use crate::rollout::run_episode;
use crate::stats::RunningStatistics;

/// Results of one training step (one episode plus one update)
#[derive(Debug, Clone)]
pub struct StepMetrics {
    pub episode_reward: f32,
    pub episode_length: usize,
    pub terminated: bool,
    pub total_loss: f32,
    pub actor_loss: f32,
    pub critic_loss: f32,
}

/// Roll out one episode, compute returns and loss, and apply one optimizer step
#[allow(clippy::too_many_arguments)]
pub fn train_step<B: AutodiffBackend, E: Environment>(
    model: ActorCritic<B>,
    optimizer: &mut impl Optimizer<ActorCritic<B>, B>,
    env: &mut EnvironmentAdapter<E>,
    initial_obs: Vec<f32>,
    loss_fn: &ActorCriticLoss,
    config: &Config,
    rng: &mut impl Rng,
    device: &B::Device,
) -> Result<(ActorCritic<B>, StepMetrics)> {
    let trajectory = run_episode(
        &model,
        env,
        initial_obs,
        config.max_steps_per_episode,
        rng,
        device,
    )?;

    let returns = discounted_returns(&trajectory.rewards, config.gamma, config.standardize_returns);
    let returns = Tensor::<B, 1>::from_floats(returns.as_slice(), device);

    let terms = loss_fn.compute(trajectory.log_probs.clone(), trajectory.values.clone(), returns);

    let metrics = StepMetrics {
        episode_reward: trajectory.total_reward(),
        episode_length: trajectory.num_steps(),
        terminated: trajectory.terminated,
        total_loss: terms.total.clone().into_scalar().elem(),
        actor_loss: terms.actor.into_scalar().elem(),
        critic_loss: terms.critic.into_scalar().elem(),
    };

    let grads = terms.total.backward();
    let grads = GradientsParams::from_grads(grads, &model);
    let model = optimizer.step(config.learning_rate, model, grads);

    Ok((model, metrics))
}

/// The driver's stopping rule: trailing average above the threshold, and
/// enough episodes played for the average to mean something
pub fn is_solved(episode: usize, average_reward: f32, config: &Config) -> bool {
    average_reward > config.reward_threshold && episode >= config.min_episodes_criterion
}

/// Final state of a training run
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub solved: bool,
    /// Index of the last episode played
    pub episode: usize,
    /// Trailing-window average reward after the last episode, the value the
    /// stopping rule compares against the threshold
    pub average_reward: f32,
    /// Mean reward over every episode played, the value the summary reports
    pub overall_mean_reward: f32,
    pub episodes_played: usize,
}

impl TrainingOutcome {
    /// The single summary line printed at the end of a run
    pub fn summary(&self) -> String {
        if self.solved {
            format!(
                "Solved at episode {}: average reward: {:.2}!",
                self.episode, self.overall_mean_reward
            )
        } else {
            format!(
                "Not solved after {} episodes: average reward: {:.2}",
                self.episodes_played, self.overall_mean_reward
            )
        }
    }
}

/// Owns the environment, sampler RNG and reward statistics of one training run
///
/// The network and optimizer are created by [`Trainer::run`].
pub struct Trainer<B: AutodiffBackend, E: Environment> {
    config: Config,
    device: B::Device,
    env: EnvironmentAdapter<E>,
    rng: StdRng,
    stats: RunningStatistics,
    loss_fn: ActorCriticLoss,
}

impl<B: AutodiffBackend, E: Environment> Trainer<B, E> {
    /// Seed every random source from `config.seed`: backend (parameter init),
    /// environment resets, and action sampling
    pub fn new(config: Config, device: B::Device) -> Self {
        B::seed(config.seed);
        let env = EnvironmentAdapter::from_seed(config.seed);
        let rng = StdRng::seed_from_u64(config.seed);
        let stats = RunningStatistics::new(config.reward_window);
        let loss_fn = ActorCriticLoss::new(config.huber_delta);

        Self {
            config,
            device,
            env,
            rng,
            stats,
            loss_fn,
        }
    }

    /// Train until solved or `max_episodes` is exhausted
    ///
    /// Returns the trained model and the outcome. Any environment error aborts
    /// the run.
    pub fn run(&mut self) -> Result<(ActorCritic<B>, TrainingOutcome)> {
        let config = self.config.clone();
        let mut model: ActorCritic<B> = ActorCritic::new(
            self.env.observation_dim(),
            self.env.action_count(),
            &config,
            &self.device,
        );
        let mut optimizer = AdamConfig::new()
            .with_epsilon(config.adam_epsilon)
            .init::<B, ActorCritic<B>>();

        let mut logger = match &config.run_dir {
            Some(run_dir) => {
                fs::create_dir_all(run_dir)
                    .with_context(|| format!("Failed to create run dir: {:?}", run_dir))?;
                config.save_snapshot(run_dir)?;
                let mut logger = MetricsLogger::new(run_dir)
                    .with_context(|| format!("Failed to open metrics in {:?}", run_dir))?;
                logger.log_config(&config)?;
                Some(logger)
            }
            None => None,
        };

        let progress = TrainingProgress::new(config.max_episodes as u64, config.progress);
        let mut outcome = TrainingOutcome {
            solved: false,
            episode: 0,
            average_reward: 0.0,
            overall_mean_reward: 0.0,
            episodes_played: 0,
        };

        for episode in 0..config.max_episodes {
            let initial_obs = self.env.reset()?;
            let (updated, metrics) = train_step(
                model,
                &mut optimizer,
                &mut self.env,
                initial_obs,
                &self.loss_fn,
                &config,
                &mut self.rng,
                &self.device,
            )
            .with_context(|| format!("Episode {episode} failed"))?;
            model = updated;

            self.stats.push(metrics.episode_reward);
            let average_reward = self.stats.trailing_average();
            let overall_mean_reward = self.stats.overall_mean();
            progress.update(episode, metrics.episode_reward, average_reward);

            if let Some(logger) = logger.as_mut() {
                let summary = EpisodeSummary {
                    average_reward,
                    overall_mean_reward,
                    total_env_steps: self.env.total_steps(),
                };
                log_episode(logger, episode, &metrics, &summary)?;
            }

            outcome = TrainingOutcome {
                solved: is_solved(episode, average_reward, &config),
                episode,
                average_reward,
                overall_mean_reward,
                episodes_played: episode + 1,
            };
            if outcome.solved {
                break;
            }
        }
        progress.finish();

        if let Some(logger) = logger.as_mut() {
            logger.log_outcome(&outcome)?;
        }
        if let Some(run_dir) = &config.run_dir {
            let metadata = CheckpointMetadata {
                episode: outcome.episode,
                average_reward: outcome.average_reward,
                solved: outcome.solved,
                env_name: E::NAME.to_string(),
                seed: config.seed,
                obs_dim: E::OBSERVATION_DIM,
                action_count: model.action_count(),
                hidden_size: model.hidden_size(),
            };
            let path = checkpoint::save(run_dir, "final", &model.valid(), &metadata)?;
            progress.println(format!("Saved checkpoint to {}", path.display()));
        }

        Ok((model, outcome))
    }
}

/// Run-level statistics logged next to each episode's [`StepMetrics`]
struct EpisodeSummary {
    average_reward: f32,
    overall_mean_reward: f32,
    total_env_steps: usize,
}

fn log_episode(
    logger: &mut MetricsLogger,
    episode: usize,
    metrics: &StepMetrics,
    summary: &EpisodeSummary,
) -> std::io::Result<()> {
    let terminated = if metrics.terminated { 1.0 } else { 0.0 };
    logger.log_scalars(
        episode,
        &[
            ("episode/reward", metrics.episode_reward),
            ("episode/length", metrics.episode_length as f32),
            ("episode/terminated", terminated),
            ("episode/average_reward", summary.average_reward),
            ("episode/overall_mean_reward", summary.overall_mean_reward),
            ("env/total_steps", summary.total_env_steps as f32),
            ("train/loss", metrics.total_loss),
            ("train/actor_loss", metrics.actor_loss),
            ("train/critic_loss", metrics.critic_loss),
        ],
    )
}
