//! `CartPole` environment - classic control task
//!
//! Physics and episode limits follow `OpenAI` Gym CartPole-v1
//! (explicit Euler integration, 500-step time limit).
//! Goal: Balance a pole on a cart by pushing left or right

use anyhow::{bail, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::env::Environment;

/// `CartPole` physics constants (matching `OpenAI` Gym)
const GRAVITY: f64 = 9.8;
const CART_MASS: f64 = 1.0;
const POLE_MASS: f64 = 0.1;
const TOTAL_MASS: f64 = CART_MASS + POLE_MASS;
const POLE_HALF_LENGTH: f64 = 0.5;
const POLE_MASS_LENGTH: f64 = POLE_MASS * POLE_HALF_LENGTH;
const FORCE_MAG: f64 = 10.0;
const TAU: f64 = 0.02; // Time step

/// Termination thresholds
const X_THRESHOLD: f64 = 2.4;
const THETA_THRESHOLD: f64 = 12.0 * std::f64::consts::PI / 180.0; // 12 degrees
const MAX_STEPS: usize = 500;

/// `CartPole` state
#[derive(Debug, Clone)]
pub struct CartPole {
    /// Cart position
    x: f64,
    /// Cart velocity
    x_dot: f64,
    /// Pole angle (radians, 0 = upright)
    theta: f64,
    /// Pole angular velocity
    theta_dot: f64,
    /// Steps taken in current episode
    steps: usize,
    /// RNG for initial state randomization
    rng: StdRng,
}

impl CartPole {
    /// Physics step using explicit Euler integration
    fn physics_step(&mut self, force: f64) {
        let cos_theta = self.theta.cos();
        let sin_theta = self.theta.sin();

        // Equations of motion (derived from Lagrangian mechanics)
        let temp = (force + POLE_MASS_LENGTH * self.theta_dot.powi(2) * sin_theta) / TOTAL_MASS;
        let theta_acc = (GRAVITY * sin_theta - cos_theta * temp)
            / (POLE_HALF_LENGTH * (4.0 / 3.0 - POLE_MASS * cos_theta.powi(2) / TOTAL_MASS));
        let x_acc = temp - POLE_MASS_LENGTH * theta_acc * cos_theta / TOTAL_MASS;

        // Positions advance with the old velocities
        self.x += TAU * self.x_dot;
        self.x_dot += TAU * x_acc;
        self.theta += TAU * self.theta_dot;
        self.theta_dot += TAU * theta_acc;
    }

    /// Pole fell or cart left the track
    fn is_failed(&self) -> bool {
        self.x.abs() > X_THRESHOLD || self.theta.abs() > THETA_THRESHOLD
    }

    /// Get state as observation vector
    fn get_obs(&self) -> Vec<f64> {
        vec![self.x, self.x_dot, self.theta, self.theta_dot]
    }
}

impl Environment for CartPole {
    const OBSERVATION_DIM: usize = 4;
    const ACTION_COUNT: usize = 2;
    const NAME: &'static str = "cartpole";

    fn new(seed: u64) -> Self {
        let mut env = Self {
            x: 0.0,
            x_dot: 0.0,
            theta: 0.0,
            theta_dot: 0.0,
            steps: 0,
            rng: StdRng::seed_from_u64(seed),
        };
        // Initialize to random state
        let _ = env.reset();
        env
    }

    fn reset(&mut self) -> Vec<f64> {
        // Random initial state in [-0.05, 0.05]
        self.x = self.rng.gen_range(-0.05..0.05);
        self.x_dot = self.rng.gen_range(-0.05..0.05);
        self.theta = self.rng.gen_range(-0.05..0.05);
        self.theta_dot = self.rng.gen_range(-0.05..0.05);
        self.steps = 0;
        self.get_obs()
    }

    fn step(&mut self, action: usize) -> Result<(Vec<f64>, f64, bool)> {
        // Action: 0 = push left, 1 = push right
        let force = match action {
            0 => -FORCE_MAG,
            1 => FORCE_MAG,
            _ => bail!("cartpole: invalid action {action}"),
        };

        self.physics_step(force);
        self.steps += 1;

        let done = self.is_failed() || self.steps >= MAX_STEPS;

        // Reward: +1 for every step, including the one that ends the episode
        Ok((self.get_obs(), 1.0, done))
    }
}
