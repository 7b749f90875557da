//! Progress bar for training visualization
//!
//! Uses indicatif: one bar over the episode budget, with the latest episode
//! reward and the trailing average in the message.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Instant;

/// Training progress display
pub struct TrainingProgress {
    bar: ProgressBar,
    start_time: Instant,
}

impl TrainingProgress {
    /// Create new progress display over `max_episodes` episodes
    ///
    /// A disabled display still tracks position but never draws.
    pub fn new(max_episodes: u64, enabled: bool) -> Self {
        let bar = if enabled {
            ProgressBar::new(max_episodes)
        } else {
            ProgressBar::hidden()
        };
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) | {prefix} | {msg}",
            )
            .expect("valid template")
            .progress_chars("##-"),
        );
        bar.set_message("Starting...");

        Self {
            bar,
            start_time: Instant::now(),
        }
    }

    /// Update after an episode finished
    pub fn update(&self, episode: usize, episode_reward: f32, average_reward: f32) {
        self.bar.set_position(episode as u64 + 1);
        self.bar.set_prefix(format!("Episode {episode}"));

        let elapsed = self.start_time.elapsed().as_secs_f32();
        let eps = if elapsed > 0.0 {
            (episode + 1) as f32 / elapsed
        } else {
            0.0
        };

        self.bar.set_message(format!(
            "episode_reward: {:.1} | average_reward: {:.2} | {:.1} ep/s",
            episode_reward, average_reward, eps
        ));
    }

    /// Print a line above the bar without corrupting it
    pub fn println(&self, line: impl AsRef<str>) {
        self.bar.suspend(|| println!("{}", line.as_ref()));
    }

    /// Finish training and close the progress bar
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }

    #[cfg(test)]
    pub fn position(&self) -> u64 {
        self.bar.position()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_progress_tracks_position() {
        let progress = TrainingProgress::new(10, false);
        progress.update(0, 12.0, 12.0);
        progress.update(4, 30.0, 20.0);
        assert_eq!(progress.position(), 5);
        progress.finish();
    }
}
