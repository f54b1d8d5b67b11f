//! Deterministic random number generation
//!
//! Uses xorshift64* algorithm for fast, deterministic random number generation.
//! All randomness in the simulator (arrival intervals) goes through this module.

mod xorshift;

pub use xorshift::RngManager;
