//! Compute primitives for primer design
//!
//! This module provides the pure computational kernels: string operations,
//! nearest-neighbor thermodynamics and the dimer/hairpin scanners. Nothing in
//! here allocates shared state or performs I/O.

pub mod string_ops;
pub mod thermo;
pub mod dimer;
pub mod hairpin;

/// Compute operation result type
pub type ComputeResult<T> = Result<T, ComputeError>;

/// Error types for compute operations
#[derive(Debug, thiserror::Error)]
pub enum ComputeError {
    #[error("Invalid input data: {0}")]
    InvalidInput(String),
}
