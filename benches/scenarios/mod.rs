//! Scenario benchmarks.
//!
//! Whole voices as the pool renders them, and a pool under a realistic
//! chord load.

mod poly;
mod voices;

pub use poly::bench_poly;
pub use voices::bench_voices;
