//! Powerduel AI - Move selection for a computer player
//!
//! This crate provides the engine entry point:
//! - `choose_move` for one decision with an explicit random source
//! - `MoveEngine` for repeated, seeded decisions
//! - `EngineConfig` tying the evolution and evaluation settings together
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: choose_move (orchestration)
//! - Level 2: generate, score, evolve (phases, in powerduel-evolve and powerduel-fitness)
//! - Level 3: duel simulation and variation operators (steps)
//! - Level 4: utilities, configuration

mod config;
mod engine;

pub use config::EngineConfig;
pub use engine::{choose_move, Move, MoveEngine, MoveError};
