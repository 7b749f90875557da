use burn::nn::{Linear, LinearConfig};
use burn::prelude::*;
use burn::tensor::activation::relu;

use crate::config::Config;

/// Actor-Critic network with a shared hidden layer and separate linear heads
///
/// ```text
/// obs ─ Linear ─ ReLU ─┬─ policy_head → logits [batch, action_count]
///                      └─ value_head  → value  [batch, 1]
/// ```
///
/// Parameters use Burn's default `Linear` initialization.
#[derive(Module, Debug)]
pub struct ActorCritic<B: Backend> {
    /// Shared hidden layer
    pub common: Linear<B>,
    /// Policy output head (unnormalized logits)
    pub policy_head: Linear<B>,
    /// Value output head (scalar state value)
    pub value_head: Linear<B>,
}

impl<B: Backend> ActorCritic<B> {
    pub fn new(obs_dim: usize, action_count: usize, config: &Config, device: &B::Device) -> Self {
        Self::with_hidden_size(obs_dim, action_count, config.hidden_size, device)
    }

    pub fn with_hidden_size(
        obs_dim: usize,
        action_count: usize,
        hidden_size: usize,
        device: &B::Device,
    ) -> Self {
        Self {
            common: LinearConfig::new(obs_dim, hidden_size).init(device),
            policy_head: LinearConfig::new(hidden_size, action_count).init(device),
            value_head: LinearConfig::new(hidden_size, 1).init(device),
        }
    }

    /// Forward pass returning action logits and value
    ///
    /// Input: observations [batch, `obs_dim`]
    /// Output: (logits [batch, `action_count`], values [batch, 1])
    pub fn forward(&self, obs: Tensor<B, 2>) -> (Tensor<B, 2>, Tensor<B, 2>) {
        let hidden = relu(self.common.forward(obs));
        let logits = self.policy_head.forward(hidden.clone());
        let values = self.value_head.forward(hidden);
        (logits, values)
    }

    /// Number of discrete actions the policy head scores
    pub fn action_count(&self) -> usize {
        self.policy_head.weight.val().dims()[1]
    }

    /// Width of the shared hidden layer
    pub fn hidden_size(&self) -> usize {
        self.common.weight.val().dims()[1]
    }
}
