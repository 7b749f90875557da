use std::collections::VecDeque;

/// Per-episode reward bookkeeping for the training driver
///
/// Keeps the most recent `window` episode rewards for the trailing average
/// used by the termination check, plus a running mean over every episode.
#[derive(Debug, Clone)]
pub struct RunningStatistics {
    recent: VecDeque<f32>,
    window: usize,
    total: f64,
    episodes: usize,
}

impl RunningStatistics {
    pub fn new(window: usize) -> Self {
        assert!(window > 0, "window must be > 0");
        Self {
            recent: VecDeque::with_capacity(window),
            window,
            total: 0.0,
            episodes: 0,
        }
    }

    /// Record a completed episode's total reward
    pub fn push(&mut self, episode_reward: f32) {
        if self.recent.len() == self.window {
            self.recent.pop_front();
        }
        self.recent.push_back(episode_reward);
        self.total += f64::from(episode_reward);
        self.episodes += 1;
    }

    /// Mean over the last `window` episodes (fewer while warming up, 0 if none)
    pub fn trailing_average(&self) -> f32 {
        if self.recent.is_empty() {
            return 0.0;
        }
        self.recent.iter().sum::<f32>() / self.recent.len() as f32
    }

    /// Mean over all recorded episodes
    pub fn overall_mean(&self) -> f32 {
        if self.episodes == 0 {
            return 0.0;
        }
        (self.total / self.episodes as f64) as f32
    }
}
