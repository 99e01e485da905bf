//! Core business logic modules

pub mod staking;

// Re-export commonly used types
pub use staking::{FibonacciProgression, FibonacciSequence, StakingStrategy};
