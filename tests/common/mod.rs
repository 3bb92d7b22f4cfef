//! Common test helpers for tracking integration tests

#![allow(dead_code)]

use ctrv_tracker::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

/// Noise-free CTRV target.
#[derive(Debug, Clone, Copy)]
pub struct Target {
    pub px: f64,
    pub py: f64,
    pub speed: f64,
    pub yaw: f64,
    pub yaw_rate: f64,
}

impl Target {
    /// Exact state `[px, py, v, yaw, yaw_rate]` after `t` seconds.
    pub fn at(&self, t: f64) -> [f64; 5] {
        let yaw = self.yaw + self.yaw_rate * t;
        let (px, py) = if self.yaw_rate.abs() > 1e-9 {
            let r = self.speed / self.yaw_rate;
            (
                self.px + r * (yaw.sin() - self.yaw.sin()),
                self.py + r * (self.yaw.cos() - yaw.cos()),
            )
        } else {
            (
                self.px + self.speed * t * self.yaw.cos(),
                self.py + self.speed * t * self.yaw.sin(),
            )
        };
        [px, py, self.speed, yaw, self.yaw_rate]
    }
}

/// Converts seconds to whole microseconds.
pub fn micros(t: f64) -> u64 {
    (t * 1e6).round() as u64
}

/// Exact range-sensor reading `[range, bearing, range_rate]` of a state.
pub fn polar(state: &[f64; 5]) -> [f64; 3] {
    let [px, py, v, yaw, _] = *state;
    let range = (px * px + py * py).sqrt();
    let bearing = py.atan2(px);
    let range_rate = (px * v * yaw.cos() + py * v * yaw.sin()) / range;
    [range, bearing, range_rate]
}

/// Noise-free observation of `state`, alternating sensors with `k`.
pub fn exact_observation(k: u64, state: &[f64; 5], timestamp_us: u64) -> Observation<f64> {
    if k % 2 == 0 {
        Observation::position(state[0], state[1], timestamp_us)
    } else {
        let [r, b, rr] = polar(state);
        Observation::range(r, b, rr, timestamp_us)
    }
}

/// Seeded sensor simulator matching the default sensor noise.
pub struct NoisySensors {
    rng: StdRng,
    position: Normal<f64>,
    range: Normal<f64>,
    bearing: Normal<f64>,
    range_rate: Normal<f64>,
}

impl NoisySensors {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            position: Normal::new(0.0, 0.15).unwrap(),
            range: Normal::new(0.0, 0.3).unwrap(),
            bearing: Normal::new(0.0, 0.03).unwrap(),
            range_rate: Normal::new(0.0, 0.3).unwrap(),
        }
    }

    /// Noisy observation of `state`, alternating sensors with `k`.
    pub fn observe(&mut self, k: u64, state: &[f64; 5], timestamp_us: u64) -> Observation<f64> {
        if k % 2 == 0 {
            Observation::position(
                state[0] + self.position.sample(&mut self.rng),
                state[1] + self.position.sample(&mut self.rng),
                timestamp_us,
            )
        } else {
            let [r, b, rr] = polar(state);
            Observation::range(
                r + self.range.sample(&mut self.rng),
                b + self.bearing.sample(&mut self.rng),
                rr + self.range_rate.sample(&mut self.rng),
                timestamp_us,
            )
        }
    }
}

/// Euclidean distance between the estimated and true positions.
pub fn position_error(belief: &Belief<f64>, truth: &[f64; 5]) -> f64 {
    let [x, y] = belief.position();
    ((x - truth[0]).powi(2) + (y - truth[1]).powi(2)).sqrt()
}
