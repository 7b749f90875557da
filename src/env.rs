//! Environment trait and the adapter that feeds it into the training pipeline

use anyhow::{ensure, Result};

/// Minimal simulation interface - just what the actor-critic loop needs
///
/// Environments speak their native precision (`f64`, as classic-control
/// simulators do); [`EnvironmentAdapter`] converts to the `f32` used by the
/// network and the return estimator.
pub trait Environment: Send + 'static {
    /// Dimension of observation vector
    const OBSERVATION_DIM: usize;

    /// Number of discrete actions
    const ACTION_COUNT: usize;

    /// Environment name for logging and config dispatch
    const NAME: &'static str;

    /// Create a new environment seeded for reproducible resets
    fn new(seed: u64) -> Self;

    /// Reset environment and return initial observation
    fn reset(&mut self) -> Vec<f64>;

    /// Take action and return (observation, reward, done)
    ///
    /// An invalid action or an internal simulation failure is an error.
    fn step(&mut self, action: usize) -> Result<(Vec<f64>, f64, bool)>;
}

/// One environment transition in pipeline precision
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub observation: Vec<f32>,
    pub reward: f32,
    pub terminal: bool,
}

/// Wraps an [`Environment`], validating its output and converting it to `f32`
pub struct EnvironmentAdapter<E: Environment> {
    env: E,
    /// Total `step` calls since construction
    steps: usize,
}

impl<E: Environment> EnvironmentAdapter<E> {
    pub fn new(env: E) -> Self {
        Self { env, steps: 0 }
    }

    /// Create the wrapped environment from a seed
    pub fn from_seed(seed: u64) -> Self {
        Self::new(E::new(seed))
    }

    pub fn observation_dim(&self) -> usize {
        E::OBSERVATION_DIM
    }

    pub fn action_count(&self) -> usize {
        E::ACTION_COUNT
    }

    /// Number of `step` calls made through this adapter
    pub fn total_steps(&self) -> usize {
        self.steps
    }

    #[cfg(test)]
    pub fn inner(&self) -> &E {
        &self.env
    }

    pub fn reset(&mut self) -> Result<Vec<f32>> {
        let obs = self.env.reset();
        convert_observation::<E>(&obs)
    }

    pub fn step(&mut self, action: usize) -> Result<Transition> {
        ensure!(
            action < E::ACTION_COUNT,
            "{}: action {} out of range (action count {})",
            E::NAME,
            action,
            E::ACTION_COUNT
        );

        self.steps += 1;
        let (obs, reward, terminal) = self.env.step(action)?;
        ensure!(
            reward.is_finite(),
            "{}: non-finite reward {}",
            E::NAME,
            reward
        );

        Ok(Transition {
            observation: convert_observation::<E>(&obs)?,
            reward: reward as f32,
            terminal,
        })
    }
}

fn convert_observation<E: Environment>(obs: &[f64]) -> Result<Vec<f32>> {
    ensure!(
        obs.len() == E::OBSERVATION_DIM,
        "{}: observation has {} values, expected {}",
        E::NAME,
        obs.len(),
        E::OBSERVATION_DIM
    );
    ensure!(
        obs.iter().all(|v| v.is_finite()),
        "{}: non-finite observation {:?}",
        E::NAME,
        obs
    );
    Ok(obs.iter().map(|&v| v as f32).collect())
}
