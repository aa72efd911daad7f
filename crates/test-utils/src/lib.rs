//! Shared test utilities for the climate-region-means workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Synthetic field and outline generators
//! - Common grid and region fixtures
//! - Temp-dir writers for on-disk datasets
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{regular_field, fixtures};
//! ```

pub mod files;
pub mod fixtures;
pub mod generators;

// Re-export commonly used items at the crate root
pub use files::*;
pub use fixtures::*;
pub use generators::*;

/// Macro for approximate floating-point equality assertions.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(1.0001_f64, 1.0_f64, 0.001_f64); // passes
/// assert_approx_eq!(1.1_f32, 1.0_f32, 0.001_f32);    // fails
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if diff > epsilon {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}

/// Assert that a region mean exists and is close to the expected value.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_mean_approx;
///
/// assert_mean_approx!(Some(4.00001), 4.0, 1e-3);
/// ```
#[macro_export]
macro_rules! assert_mean_approx {
    ($mean:expr, $expected:expr, $epsilon:expr) => {{
        match $mean {
            Some(value) => $crate::assert_approx_eq!(value, $expected, $epsilon),
            None => panic!("assertion failed: expected a mean near {:?}, got no data", $expected),
        }
    }};
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_assert_approx_eq_passes() {
        assert_approx_eq!(1.0001, 1.0, 0.001);
        assert_approx_eq!(-5.5, -5.500001, 0.0001);
    }

    #[test]
    #[should_panic(expected = "assertion failed")]
    fn test_assert_approx_eq_fails() {
        assert_approx_eq!(1.1, 1.0, 0.001);
    }

    #[test]
    #[should_panic(expected = "got no data")]
    fn test_assert_mean_approx_rejects_no_data() {
        let mean: Option<f64> = None;
        assert_mean_approx!(mean, 1.0, 0.1);
    }
}
