//! Builds and solves MATCH electricity planning models.
//!
//! A model is assembled from modules (load zones, generators, local T&D) which declare variables
//! and named quantities, and register those quantities in shared lists. Once every module has been
//! declared, the lists are frozen and summed into per-zone energy balance constraints and a
//! discounted cost objective, which is minimised with HiGHS.
#![warn(missing_docs)]
use std::path::PathBuf;

pub mod builder;
pub mod cli;
pub mod cost;
pub mod error;
pub mod expression;
pub mod finance;
pub mod generator;
pub mod id;
pub mod input;
pub mod local_td;
pub mod log;
pub mod model;
pub mod output;
pub mod power_balance;
pub mod registry;
pub mod settings;
pub mod solver;
pub mod timescale;
pub mod units;
pub mod zone;

#[cfg(test)]
mod fixture;

/// The folder where program-wide configuration (e.g. `settings.toml`) is kept
pub fn get_match_config_dir() -> PathBuf {
    let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("match-model");

    path
}
