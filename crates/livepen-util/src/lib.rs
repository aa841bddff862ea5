//! livepen-util - Utility functions for livepen
//!
//! This crate provides the small host-side helpers that do not belong in the
//! persistence core.

pub mod debounce;

// Re-exports for convenience
pub use debounce::Debouncer;
