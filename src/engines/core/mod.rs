//! Core execution support
//!
//! Thread-pool setup and order-preserving fan-out shared by the design layer.

pub mod parallel;
