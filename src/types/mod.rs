//! Core types for type-safe vector spaces, beliefs and observations

pub mod angle;
pub mod belief;
pub mod observation;
pub mod spaces;
pub mod transforms;
