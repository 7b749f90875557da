//! Combined actor-critic loss

use burn::nn::loss::{HuberLoss, HuberLossConfig, Reduction};
use burn::prelude::*;

/// Loss terms for one episode
///
/// All three are single-element tensors; `total` is the one to backpropagate.
#[derive(Debug, Clone)]
pub struct LossTerms<B: Backend> {
    pub total: Tensor<B, 1>,
    pub actor: Tensor<B, 1>,
    pub critic: Tensor<B, 1>,
}

/// Policy-gradient actor loss plus summed Huber critic loss
#[derive(Debug, Clone)]
pub struct ActorCriticLoss {
    huber: HuberLoss,
}

impl ActorCriticLoss {
    pub fn new(huber_delta: f32) -> Self {
        Self {
            huber: HuberLossConfig::new(huber_delta).init(),
        }
    }

    /// Compute the loss from per-step log-probabilities, value estimates and
    /// returns, all of shape [len]
    ///
    /// - advantage = returns - values, with `values` detached so the actor
    ///   term only trains the policy head
    /// - actor = -sum(log_prob * advantage)
    /// - critic = sum(huber(values, returns))
    ///
    /// `returns` is treated as a constant target and detached.
    pub fn compute<B: Backend>(
        &self,
        log_probs: Tensor<B, 1>,
        values: Tensor<B, 1>,
        returns: Tensor<B, 1>,
    ) -> LossTerms<B> {
        assert_eq!(log_probs.dims(), values.dims());
        assert_eq!(values.dims(), returns.dims());

        let returns = returns.detach();
        let advantage = returns.clone() - values.clone().detach();

        let actor = -(log_probs * advantage).sum();
        let critic = self.huber.forward(values, returns, Reduction::Sum);
        let total = actor.clone() + critic.clone();

        LossTerms {
            total,
            actor,
            critic,
        }
    }
}

impl Default for ActorCriticLoss {
    fn default() -> Self {
        Self::new(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::{Autodiff, NdArray};

    type TestBackend = NdArray<f32>;
    type TestAutodiffBackend = Autodiff<NdArray<f32>>;

    fn scalar(t: Tensor<TestBackend, 1>) -> f32 {
        t.into_scalar()
    }

    #[test]
    fn test_zero_loss_when_values_match_returns() {
        let device = Default::default();
        let loss = ActorCriticLoss::default();

        let log_probs = Tensor::<TestBackend, 1>::from_floats([-0.3, -1.2, -0.05], &device);
        let returns = Tensor::<TestBackend, 1>::from_floats([1.2, -0.4, -0.8], &device);
        let values = returns.clone();

        let terms = loss.compute(log_probs, values, returns);
        assert_eq!(scalar(terms.critic), 0.0);
        assert_eq!(scalar(terms.actor), 0.0);
        assert_eq!(scalar(terms.total), 0.0);
    }

    #[test]
    fn test_actor_loss_value() {
        let device = Default::default();
        let loss = ActorCriticLoss::default();

        let log_probs = Tensor::<TestBackend, 1>::from_floats([-0.5, -2.0], &device);
        let values = Tensor::<TestBackend, 1>::from_floats([0.0, 1.0], &device);
        let returns = Tensor::<TestBackend, 1>::from_floats([1.0, 0.5], &device);

        let terms = loss.compute(log_probs, values, returns);
        // -( -0.5 * 1.0 + -2.0 * -0.5 ) = -0.5
        assert!((scalar(terms.actor) + 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_critic_loss_is_summed_huber() {
        let device = Default::default();
        let loss = ActorCriticLoss::new(1.0);

        let log_probs = Tensor::<TestBackend, 1>::zeros([2], &device);
        let values = Tensor::<TestBackend, 1>::from_floats([0.0, 0.0], &device);
        // Residual 0.5 is quadratic (0.125), residual 3 is linear (2.5)
        let returns = Tensor::<TestBackend, 1>::from_floats([0.5, 3.0], &device);

        let terms = loss.compute(log_probs, values, returns);
        assert!((scalar(terms.critic) - 2.625).abs() < 1e-5);
        assert!((scalar(terms.total) - 2.625).abs() < 1e-5);
    }

    #[test]
    fn test_actor_gradient_does_not_reach_values() {
        let device = Default::default();
        let loss = ActorCriticLoss::default();

        let log_probs =
            Tensor::<TestAutodiffBackend, 1>::from_floats([-0.7, -0.2], &device).require_grad();
        let values =
            Tensor::<TestAutodiffBackend, 1>::from_floats([0.1, 0.2], &device).require_grad();
        let returns =
            Tensor::<TestAutodiffBackend, 1>::from_floats([0.3, 0.0], &device).require_grad();

        let terms = loss.compute(log_probs.clone(), values.clone(), returns.clone());
        let grads = terms.actor.backward();

        // d(actor)/d(log_prob) = -advantage
        let g_lp: Vec<f32> = log_probs.grad(&grads).unwrap().into_data().to_vec().unwrap();
        assert!((g_lp[0] + 0.2).abs() < 1e-6);
        assert!((g_lp[1] - 0.2).abs() < 1e-6);

        // Advantage is detached from both values and returns
        assert!(values.grad(&grads).is_none());
        assert!(returns.grad(&grads).is_none());
    }

    #[test]
    fn test_critic_gradient_only_reaches_values() {
        let device = Default::default();
        let loss = ActorCriticLoss::default();

        let log_probs =
            Tensor::<TestAutodiffBackend, 1>::from_floats([-0.7, -0.2], &device).require_grad();
        let values =
            Tensor::<TestAutodiffBackend, 1>::from_floats([0.1, 0.2], &device).require_grad();
        let returns =
            Tensor::<TestAutodiffBackend, 1>::from_floats([0.3, 0.0], &device).require_grad();

        let terms = loss.compute(log_probs, values.clone(), returns.clone());
        let grads = terms.total.backward();

        // Quadratic region: d/dv 0.5 (v - r)^2 = v - r
        let g_v: Vec<f32> = values.grad(&grads).unwrap().into_data().to_vec().unwrap();
        assert!((g_v[0] + 0.2).abs() < 1e-5);
        assert!((g_v[1] - 0.2).abs() < 1e-5);
        assert!(returns.grad(&grads).is_none());
    }
}
