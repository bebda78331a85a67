//! Powerduel Fitness - Scoring plans against every opposing response
//!
//! This crate provides:
//! - Enumeration of the opposing hand's legal plans
//! - Per-chromosome win rates from exhaustive duel simulation
//! - Population scoring on a bounded rayon pool
//! - A limit on how many opposing plans are enumerated

mod config;
mod fitness;

pub use config::EvalConfig;
pub use fitness::{
    build_pool, evaluate_chromosome, FitnessEvaluator, FitnessResult, OpponentPlans, SharedPool,
    TooManyPlans,
};
