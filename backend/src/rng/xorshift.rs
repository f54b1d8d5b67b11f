//! xorshift64* random number generator
//!
//! This is a fast, high-quality PRNG that is deterministic and suitable
//! for simulation purposes.
//!
//! # Algorithm
//!
//! xorshift64* is a variant of xorshift that passes TestU01's BigCrush
//! statistical tests. It uses 64-bit state and produces 64-bit output.
//!
//! # Determinism
//!
//! Same seed → same sequence of random numbers. Every arrival stream owns
//! its own generator, derived from the simulation seed and the stream index,
//! so sources never share or perturb each other's sequences.

use serde::{Deserialize, Serialize};

/// Multiplier used to spread stream indices across the seed space (golden ratio)
const STREAM_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

/// Deterministic random number generator using xorshift64*
///
/// # Example
/// ```
/// use queue_simulator_core_rs::RngManager;
///
/// let mut rng = RngManager::new(12345);
/// let u = rng.next_open_f64();
/// assert!(u > 0.0 && u < 1.0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngManager {
    /// Internal state (64-bit)
    state: u64,
}

impl RngManager {
    /// Create a new RNG with given seed
    ///
    /// A zero seed is replaced by 1 (xorshift never leaves the zero state).
    pub fn new(seed: u64) -> Self {
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Create the generator for one independent stream of a seeded run
    ///
    /// # Example
    /// ```
    /// use queue_simulator_core_rs::RngManager;
    ///
    /// let mut a = RngManager::for_stream(42, 0);
    /// let mut b = RngManager::for_stream(42, 1);
    /// assert_ne!(a.next(), b.next());
    /// ```
    pub fn for_stream(seed: u64, stream: u64) -> Self {
        let mixed = seed ^ stream.wrapping_add(1).wrapping_mul(STREAM_MIX);
        let mut rng = Self::new(mixed);
        // Discard the first output so nearby seeds decorrelate
        rng.next();
        rng
    }

    /// Generate next random u64 value
    pub fn next(&mut self) -> u64 {
        // xorshift64* algorithm
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    /// Get current RNG state (for replay)
    pub fn get_state(&self) -> u64 {
        self.state
    }

    /// Generate random f64 strictly inside (0.0, 1.0)
    ///
    /// Uses the top 52 bits, centred in their lattice cell: `(k + 0.5) / 2^52`.
    /// The half-step offset is exact at this width, so the largest value is
    /// `1 - 2^-53` and the smallest `2^-53`; safe to feed into `ln`.
    pub fn next_open_f64(&mut self) -> f64 {
        let value = self.next();
        ((value >> 12) as f64 + 0.5) * (1.0 / ((1u64 << 52) as f64))
    }

    /// Sample an exponentially distributed interval with the given rate
    ///
    /// Always finite and strictly positive for a finite positive `rate`.
    pub fn exponential(&mut self, rate: f64) -> f64 {
        -self.next_open_f64().ln() / rate
    }
}
