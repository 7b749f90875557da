//! Discounted return estimation

/// Numerical floor added to the standard deviation when standardizing
pub const STD_EPSILON: f32 = f32::EPSILON;

/// Compute discounted returns for a single episode
///
/// returns[t] = r_t + gamma * returns[t+1], with returns[T] = 0.
/// Walks the rewards backwards; there is no reset inside the sequence.
/// When `standardize` is set the returns are rescaled to zero mean and unit
/// variance (see [`standardize`]).
pub fn discounted_returns(rewards: &[f32], gamma: f32, standardize_returns: bool) -> Vec<f32> {
    let mut returns = vec![0.0_f32; rewards.len()];
    let mut discounted_sum = 0.0_f32;

    // Backward pass through time
    for (t, &reward) in rewards.iter().enumerate().rev() {
        discounted_sum = reward + gamma * discounted_sum;
        returns[t] = discounted_sum;
    }

    if standardize_returns {
        standardize(&mut returns);
    }
    returns
}

/// Rescale in place to zero mean and unit variance
///
/// Uses the population standard deviation plus [`STD_EPSILON`] as the
/// denominator, so constant and single-element inputs map to zeros instead of
/// dividing by zero.
pub fn standardize(values: &mut [f32]) {
    if values.is_empty() {
        return;
    }
    let n = values.len() as f32;
    let mean = values.iter().sum::<f32>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f32>() / n;
    let denom = var.sqrt() + STD_EPSILON;

    for v in values.iter_mut() {
        *v = (*v - mean) / denom;
    }
}
