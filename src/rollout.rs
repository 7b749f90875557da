//! Episode rollout: drives the environment with the current policy and
//! records what the loss needs.

use anyhow::{ensure, Result};
use burn::prelude::*;
use rand::Rng;

use crate::distributions::{actions_to_vec, log_prob_categorical, sample_categorical};
use crate::env::{Environment, EnvironmentAdapter};
use crate::network::ActorCritic;

/// Data from a single episode
///
/// `log_probs` and `values` stay attached to the autodiff graph of the forward
/// passes that produced them, so the loss can backpropagate through the whole
/// episode. All per-step sequences have the same length.
#[derive(Debug)]
pub struct Trajectory<B: Backend> {
    /// Log probability of the sampled action at each step [len]
    pub log_probs: Tensor<B, 1>,
    /// Critic value estimate at each step [len]
    pub values: Tensor<B, 1>,
    /// Raw reward at each step
    pub rewards: Vec<f32>,
    /// True if the episode ended on a terminal signal rather than the step cap
    pub terminated: bool,
}

impl<B: Backend> Trajectory<B> {
    /// Number of steps actually taken
    pub fn num_steps(&self) -> usize {
        self.rewards.len()
    }

    /// Sum of raw rewards over the episode
    pub fn total_reward(&self) -> f32 {
        self.rewards.iter().sum()
    }

    /// Probability of each sampled action (exp of the stored log-probabilities)
    #[cfg(test)]
    pub fn action_probs(&self) -> Vec<f32> {
        self.log_probs
            .clone()
            .exp()
            .into_data()
            .to_vec()
            .expect("action probs to vec")
    }
}

/// Run one episode of at most `max_steps` steps starting from `initial_obs`
///
/// Each step queries the network, samples an action from the categorical
/// distribution over its logits, and steps the environment. The episode stops
/// after the first step that reports a terminal state. Environment errors abort
/// the episode.
pub fn run_episode<B: Backend, E: Environment>(
    model: &ActorCritic<B>,
    env: &mut EnvironmentAdapter<E>,
    initial_obs: Vec<f32>,
    max_steps: usize,
    rng: &mut impl Rng,
    device: &B::Device,
) -> Result<Trajectory<B>> {
    ensure!(max_steps > 0, "max_steps must be > 0");
    let obs_dim = env.observation_dim();

    let mut log_probs: Vec<Tensor<B, 1>> = Vec::with_capacity(max_steps);
    let mut values: Vec<Tensor<B, 1>> = Vec::with_capacity(max_steps);
    let mut rewards: Vec<f32> = Vec::with_capacity(max_steps);
    let mut terminated = false;

    let mut obs = initial_obs;
    for _step in 0..max_steps {
        let obs_tensor: Tensor<B, 2> =
            Tensor::<B, 1>::from_floats(obs.as_slice(), device).reshape([1, obs_dim]);
        let (logits, value) = model.forward(obs_tensor);

        // Sampling is not part of the differentiated computation
        let action_tensor = sample_categorical(logits.clone().detach(), rng, device);
        let action = actions_to_vec(action_tensor.clone())[0];

        log_probs.push(log_prob_categorical(logits, action_tensor));
        values.push(value.reshape([1]));

        let transition = env.step(action)?;
        rewards.push(transition.reward);
        obs = transition.observation;

        if transition.terminal {
            terminated = true;
            break;
        }
    }

    assert_eq!(log_probs.len(), rewards.len());
    assert_eq!(values.len(), rewards.len());

    Ok(Trajectory {
        log_probs: Tensor::cat(log_probs, 0),
        values: Tensor::cat(values, 0),
        rewards,
        terminated,
    })
}
