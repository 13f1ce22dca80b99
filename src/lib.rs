//! Black-Scholes-Merton pricing, Greeks and implied volatility for vanilla
//! European options, plus a mispricing signal built on top of them.
//!
//! Every engine entry point is a pure function of its arguments; configuration
//! travels as explicit `EngineConfig` / `SignalConfig` values.

pub mod cli;
pub mod config;
pub mod errors;
pub mod execution;
pub mod models;
pub mod report;
pub mod risk;
pub mod types;
