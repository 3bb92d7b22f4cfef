//! Example usage of the CTRV tracker
//!
//! Simulates a target on a constant turn and tracks it with alternating
//! position and range observations.

use ctrv_tracker::prelude::*;

/// Simulation step in microseconds.
const STEP_US: u64 = 50_000;

/// Noise-free CTRV target `[px, py, v, yaw, yaw_rate]` at time `t` seconds.
fn truth(t: f64) -> [f64; 5] {
    let (x0, y0, v, yaw0, yawd) = (10.0, 0.0, 5.0, std::f64::consts::FRAC_PI_2, 0.2);
    let yaw = yaw0 + yawd * t;
    let r = v / yawd;
    [
        x0 + r * (yaw.sin() - yaw0.sin()),
        y0 + r * (yaw0.cos() - yaw.cos()),
        v,
        yaw,
        yawd,
    ]
}

/// Deterministic stand-in for sensor noise.
fn jitter(k: u64, scale: f64) -> f64 {
    scale * ((k as f64) * 12.9898).sin()
}

fn main() {
    println!("CTRV Tracker: Unscented Kalman Filter Demo");
    println!("==========================================\n");

    let config = FilterConfig::new(
        ProcessNoise::default(),
        PositionSensor::default(),
        RangeSensor::default(),
    );
    let mut filter = FusionFilter::<f64>::new(config);

    for k in 0..200u64 {
        let timestamp_us = k * STEP_US;
        let t = timestamp_us as f64 / 1e6;
        let [px, py, v, yaw, _] = truth(t);

        // Alternate sensors, as a fused stream would
        let observation = if k % 2 == 0 {
            Observation::position(px + jitter(k, 0.1), py + jitter(k + 7, 0.1), timestamp_us)
        } else {
            let range = (px * px + py * py).sqrt();
            let bearing = py.atan2(px);
            let range_rate = (px * v * yaw.cos() + py * v * yaw.sin()) / range;
            Observation::range(
                range + jitter(k, 0.2),
                bearing + jitter(k + 3, 0.02),
                range_rate + jitter(k + 5, 0.2),
                timestamp_us,
            )
        };

        let outcome = match filter.process(&observation) {
            Ok(outcome) => outcome,
            Err(err) => {
                eprintln!("Step {} failed: {}", k, err);
                filter.reset();
                continue;
            }
        };

        if k % 20 == 0 {
            let Some(belief) = filter.belief() else {
                continue;
            };
            let [ex, ey] = belief.position();
            println!("t = {:5.2} s ({} observation)", t, outcome.sensor());
            println!("  truth:    pos=({:7.2}, {:7.2}), v={:5.2}", px, py, v);
            println!(
                "  estimate: pos=({:7.2}, {:7.2}), v={:5.2}, yaw_rate={:5.2}",
                ex,
                ey,
                belief.speed(),
                belief.yaw_rate()
            );
            if let Some(nis) = outcome.nis() {
                println!("  NIS: {:.3}", nis);
            }
            println!("  uncertainty (trace P): {:.4}\n", belief.uncertainty());
        }
    }

    println!("Tracking complete!");
}
