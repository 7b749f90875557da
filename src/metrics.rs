//! Per-run metrics as JSON lines
//!
//! `metrics.jsonl` in the run directory gets one `config` record when a run
//! starts, `scalar` records for every episode, and one `outcome` record when
//! the run ends. The file is opened in append mode so a rerun into the same
//! directory extends the history instead of truncating it.

use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::trainer::TrainingOutcome;

pub const METRICS_FILE: &str = "metrics.jsonl";

/// One line of `metrics.jsonl`
#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Record<'a> {
    Config {
        data: serde_json::Value,
    },
    Scalar {
        episode: usize,
        name: &'a str,
        value: f32,
    },
    Outcome {
        solved: bool,
        episode: usize,
        episodes_played: usize,
        average_reward: f32,
        overall_mean_reward: f32,
    },
}

/// Buffered writer for the run's metrics file
pub struct MetricsLogger {
    writer: BufWriter<File>,
}

impl MetricsLogger {
    pub fn new(run_dir: &Path) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(run_dir.join(METRICS_FILE))?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    /// Record the effective configuration of the run
    pub fn log_config<T: Serialize>(&mut self, config: &T) -> std::io::Result<()> {
        let data = serde_json::to_value(config)?;
        self.write(&Record::Config { data })
    }

    /// Record named scalars for one episode, one line each
    pub fn log_scalars(&mut self, episode: usize, scalars: &[(&str, f32)]) -> std::io::Result<()> {
        for &(name, value) in scalars {
            self.write(&Record::Scalar {
                episode,
                name,
                value,
            })?;
        }
        Ok(())
    }

    /// Record the end of the run and flush
    pub fn log_outcome(&mut self, outcome: &TrainingOutcome) -> std::io::Result<()> {
        self.write(&Record::Outcome {
            solved: outcome.solved,
            episode: outcome.episode,
            episodes_played: outcome.episodes_played,
            average_reward: outcome.average_reward,
            overall_mean_reward: outcome.overall_mean_reward,
        })?;
        self.writer.flush()
    }

    fn write(&mut self, record: &Record) -> std::io::Result<()> {
        let line = serde_json::to_string(record)?;
        writeln!(self.writer, "{line}")
    }
}
