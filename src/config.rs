use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Advantage actor-critic training for discrete-action control tasks
#[derive(Parser, Debug, Default)]
#[command(name = "burn-actor-critic", version, about)]
pub struct CliArgs {
    /// Path to TOML config file (built-in defaults are used if it does not exist)
    #[arg(short, long, default_value = "configs/default.toml")]
    pub config: PathBuf,

    /// Directory for metrics, config snapshot and final checkpoint
    #[arg(long)]
    pub run_dir: Option<PathBuf>,

    /// Disable the progress bar
    #[arg(long)]
    pub no_progress: bool,

    // --- Overrides ---
    #[arg(long)]
    pub env: Option<String>,

    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long)]
    pub learning_rate: Option<f64>,

    #[arg(long)]
    pub max_episodes: Option<usize>,

    #[arg(long)]
    pub max_steps: Option<usize>,

    #[arg(long)]
    pub reward_threshold: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Environment
    #[serde(default = "default_env")]
    pub env: String,
    #[serde(default = "default_seed")]
    pub seed: u64,

    // Driver
    #[serde(default = "default_min_episodes_criterion")]
    pub min_episodes_criterion: usize,
    #[serde(default = "default_max_episodes")]
    pub max_episodes: usize,
    #[serde(default = "default_max_steps_per_episode")]
    pub max_steps_per_episode: usize,
    #[serde(default = "default_reward_threshold")]
    pub reward_threshold: f32,
    #[serde(default = "default_reward_window")]
    pub reward_window: usize,

    // Returns and loss
    #[serde(default = "default_gamma")]
    pub gamma: f32,
    #[serde(default = "default_true")]
    pub standardize_returns: bool,
    #[serde(default = "default_huber_delta")]
    pub huber_delta: f32,

    // Optimizer
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    #[serde(default = "default_adam_epsilon")]
    pub adam_epsilon: f32,

    // Network
    #[serde(default = "default_hidden_size")]
    pub hidden_size: usize,

    // Output
    #[serde(default = "default_true")]
    pub progress: bool,
    #[serde(default)]
    pub run_dir: Option<PathBuf>,
}

// Default value functions
fn default_env() -> String {
    "cartpole".to_string()
}
fn default_seed() -> u64 {
    42
}
fn default_min_episodes_criterion() -> usize {
    100
}
fn default_max_episodes() -> usize {
    10_000
}
fn default_max_steps_per_episode() -> usize {
    1_000
}
fn default_reward_threshold() -> f32 {
    200.0
}
fn default_reward_window() -> usize {
    100
}
fn default_gamma() -> f32 {
    0.99
}
fn default_true() -> bool {
    true
}
fn default_huber_delta() -> f32 {
    1.0
}
fn default_learning_rate() -> f64 {
    0.01
}
fn default_adam_epsilon() -> f32 {
    1e-7
}
fn default_hidden_size() -> usize {
    128
}

impl Default for Config {
    fn default() -> Self {
        Self {
            env: default_env(),
            seed: default_seed(),
            min_episodes_criterion: default_min_episodes_criterion(),
            max_episodes: default_max_episodes(),
            max_steps_per_episode: default_max_steps_per_episode(),
            reward_threshold: default_reward_threshold(),
            reward_window: default_reward_window(),
            gamma: default_gamma(),
            standardize_returns: default_true(),
            huber_delta: default_huber_delta(),
            learning_rate: default_learning_rate(),
            adam_epsilon: default_adam_epsilon(),
            hidden_size: default_hidden_size(),
            progress: default_true(),
            run_dir: None,
        }
    }
}

impl Config {
    /// Load config from TOML file, apply CLI overrides
    pub fn load(args: &CliArgs) -> Result<Self> {
        let mut config = if args.config.exists() {
            Self::load_from_path(&args.config)?
        } else {
            Config::default()
        };

        config.apply_cli_overrides(args);
        Ok(config)
    }

    /// Load config from a specific TOML file path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config: {:?}", path))
    }

    /// Apply all CLI overrides to this config
    fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(env) = &args.env {
            self.env = env.clone();
        }
        if let Some(s) = args.seed {
            self.seed = s;
        }
        if let Some(lr) = args.learning_rate {
            self.learning_rate = lr;
        }
        if let Some(n) = args.max_episodes {
            self.max_episodes = n;
        }
        if let Some(n) = args.max_steps {
            self.max_steps_per_episode = n;
        }
        if let Some(t) = args.reward_threshold {
            self.reward_threshold = t;
        }
        if let Some(dir) = &args.run_dir {
            self.run_dir = Some(dir.clone());
        }
        if args.no_progress {
            self.progress = false;
        }
    }

    /// Write the resolved config next to the run's other outputs
    pub fn save_snapshot(&self, run_dir: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        let path = run_dir.join("config.toml");
        fs::write(&path, content).with_context(|| format!("Failed to write config: {:?}", path))
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.learning_rate <= 0.0 {
            bail!("learning_rate must be > 0");
        }
        if !(0.0..1.0).contains(&self.gamma) {
            bail!("gamma must be in [0, 1)");
        }
        if self.max_episodes == 0 {
            bail!("max_episodes must be > 0");
        }
        if self.max_steps_per_episode == 0 {
            bail!("max_steps_per_episode must be > 0");
        }
        if self.reward_window == 0 {
            bail!("reward_window must be > 0");
        }
        if self.hidden_size == 0 {
            bail!("hidden_size must be > 0");
        }
        if self.huber_delta <= 0.0 {
            bail!("huber_delta must be > 0");
        }
        Ok(())
    }
}
