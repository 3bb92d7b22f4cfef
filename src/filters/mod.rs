//! Unscented filtering of the CTRV state
//!
//! - [`sigma`]: weights, sigma point generation and weighted recovery
//! - [`ukf`]: the prediction and correction steps over [`Belief`](crate::types::belief::Belief) values
//! - [`fusion::FusionFilter`]: the stateful two-sensor tracker
//! - [`config::FilterConfig`]: its configuration

pub mod config;
pub mod fusion;
pub mod sigma;
pub mod ukf;
