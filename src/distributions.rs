//! Categorical action distribution helpers over policy logits

use burn::prelude::*;
use burn::tensor::activation::log_softmax;
use rand::distributions::Open01;
use rand::Rng;

/// Standard Gumbel noise, `-ln(-ln(u))` with `u` drawn from the open interval (0, 1)
fn gumbel_noise(rng: &mut impl Rng, len: usize) -> Vec<f32> {
    (0..len)
        .map(|_| {
            let u: f32 = rng.sample(Open01);
            -(-u.ln()).ln()
        })
        .collect()
}

/// Draw one action per row of `logits` [batch, `num_actions`]
///
/// Perturbing every logit with independent Gumbel noise and taking the row
/// argmax samples exactly from `softmax(logits)`, without normalizing.
/// All randomness comes from `rng`, so a seeded generator replays the same
/// actions.
pub fn sample_categorical<B: Backend>(
    logits: Tensor<B, 2>,
    rng: &mut impl Rng,
    device: &B::Device,
) -> Tensor<B, 1, Int> {
    let [batch, num_actions] = logits.dims();
    let noise = gumbel_noise(rng, batch * num_actions);
    let noise = Tensor::<B, 1>::from_floats(noise.as_slice(), device).reshape([batch, num_actions]);

    (logits + noise).argmax(1).squeeze_dims(&[1])
}

/// Compute log probabilities of taken actions under categorical distribution
///
/// Computed in log-space from the logits, so a vanishing probability yields a
/// large negative number rather than `-inf`.
///
/// logits: [batch, `num_actions`]
/// actions: [batch]
/// returns: [batch]
pub fn log_prob_categorical<B: Backend>(
    logits: Tensor<B, 2>,
    actions: Tensor<B, 1, Int>,
) -> Tensor<B, 1> {
    gather_1d(log_softmax(logits, 1), actions)
}

/// Copy integer action indices back to the host
pub fn actions_to_vec<B: Backend>(actions: Tensor<B, 1, Int>) -> Vec<usize> {
    // Convert through float to avoid IntElem type mismatches between backends
    actions
        .float()
        .into_data()
        .to_vec::<f32>()
        .expect("actions to vec")
        .into_iter()
        .map(|x| x as usize)
        .collect()
}

/// Gather values at indices along dimension 1
/// Equivalent to: output[i] = input[i, indices[i]]
fn gather_1d<B: Backend>(input: Tensor<B, 2>, indices: Tensor<B, 1, Int>) -> Tensor<B, 1> {
    let indices_2d = indices.unsqueeze_dim(1); // [batch, 1]
    input.gather(1, indices_2d).squeeze_dims(&[1])
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use rand::SeedableRng;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_sample_categorical_shape() {
        let device = Default::default();
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);

        let logits: Tensor<TestBackend, 2> = Tensor::zeros([8, 4], &device);
        let actions = sample_categorical(logits, &mut rng, &device);

        assert_eq!(actions.dims(), [8]);
    }

    #[test]
    fn test_sample_categorical_dominant_action() {
        let device = Default::default();
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);

        // Heavily biased towards action 2
        let logits: Tensor<TestBackend, 2> =
            Tensor::from_floats([[0.0, 0.0, 100.0, 0.0]], &device);
        let actions = sample_categorical(logits, &mut rng, &device);

        assert_eq!(actions_to_vec(actions), vec![2]);
    }

    #[test]
    fn test_sample_categorical_is_stochastic() {
        let device = Default::default();
        let mut rng = rand::rngs::StdRng::seed_from_u64(3);

        // Uniform over 2 actions: 400 draws should hit both, roughly evenly
        let logits: Tensor<TestBackend, 2> = Tensor::zeros([400, 2], &device);
        let actions = actions_to_vec(sample_categorical(logits, &mut rng, &device));

        let ones = actions.iter().filter(|&&a| a == 1).count();
        assert!(actions.iter().all(|&a| a < 2));
        assert!(ones > 140 && ones < 260, "ones = {ones}");
    }

    #[test]
    fn test_sample_categorical_matches_probabilities() {
        let device = Default::default();
        let mut rng = rand::rngs::StdRng::seed_from_u64(11);

        // p = softmax([ln 3, 0]) = [0.75, 0.25]
        let row = [3.0_f32.ln(), 0.0];
        let rows: Vec<f32> = (0..1000).flat_map(|_| row).collect();
        let logits = Tensor::<TestBackend, 1>::from_floats(rows.as_slice(), &device).reshape([1000, 2]);
        let actions = actions_to_vec(sample_categorical(logits, &mut rng, &device));

        let zeros = actions.iter().filter(|&&a| a == 0).count() as f32 / 1000.0;
        assert!((zeros - 0.75).abs() < 0.06, "p(0) = {zeros}");
    }

    #[test]
    fn test_gumbel_noise_is_finite() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(5);
        let noise = gumbel_noise(&mut rng, 10_000);
        assert!(noise.iter().all(|n| n.is_finite()));

        // Standard Gumbel mean is the Euler-Mascheroni constant
        let mean = noise.iter().sum::<f32>() / noise.len() as f32;
        assert!((mean - 0.5772).abs() < 0.05, "mean = {mean}");
    }

    #[test]
    fn test_same_seed_replays_actions() {
        let device = Default::default();
        let logits: Tensor<TestBackend, 2> = Tensor::zeros([64, 3], &device);

        let draw = |seed| {
            let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
            actions_to_vec(sample_categorical(logits.clone(), &mut rng, &device))
        };
        assert_eq!(draw(17), draw(17));
    }

    #[test]
    fn test_log_prob_categorical() {
        let device = Default::default();

        // Uniform logits
        let logits: Tensor<TestBackend, 2> = Tensor::zeros([2, 4], &device);
        let actions: Tensor<TestBackend, 1, Int> = Tensor::from_ints([0, 2], &device);

        let log_probs: Vec<f32> = log_prob_categorical(logits, actions)
            .into_data()
            .to_vec()
            .unwrap();

        // With 4 actions and uniform distribution, log_prob = log(0.25)
        let expected = 0.25_f32.ln();
        for lp in log_probs {
            assert!((lp - expected).abs() < 1e-4);
        }
    }

    #[test]
    fn test_log_prob_of_sampled_not_max_action() {
        let device = Default::default();

        let logits: Tensor<TestBackend, 2> = Tensor::from_floats([[2.0, 0.0]], &device);
        let actions: Tensor<TestBackend, 1, Int> = Tensor::from_ints([1], &device);
        let lp: f32 = log_prob_categorical(logits, actions).into_scalar();

        let expected = (1.0 / (1.0 + 2.0_f32.exp())).ln();
        assert!((lp - expected).abs() < 1e-5);
    }

    #[test]
    fn test_log_prob_finite_for_vanishing_probability() {
        let device = Default::default();

        // softmax would underflow to exactly 0 for action 1
        let logits: Tensor<TestBackend, 2> = Tensor::from_floats([[200.0, -200.0]], &device);
        let actions: Tensor<TestBackend, 1, Int> = Tensor::from_ints([1], &device);
        let lp: f32 = log_prob_categorical(logits, actions).into_scalar();

        assert!(lp.is_finite());
        assert!((lp + 400.0).abs() < 1e-2);
    }
}
