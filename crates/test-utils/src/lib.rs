//! Test helpers shared by the workspace crates: fixture lookup, scratch
//! directories, STAC item and footprint builders, and a float assertion.

pub mod fixtures;
pub mod paths;

pub use paths::*;

/// Resolve a fixture with [`find_test_file`], or return early from the test
/// with a note on stderr when it is absent.
///
/// ```ignore
/// let path = require_test_file!("feature_collection.json");
/// ```
#[macro_export]
macro_rules! require_test_file {
    ($name:expr) => {{
        match $crate::find_test_file($name) {
            Some(path) => path,
            None => {
                eprintln!("SKIPPED: fixture '{}' not found (TEST_DATA_DIR)", $name);
                return;
            }
        }
    }};
}

/// Assert that two numbers differ by at most `epsilon`.
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let (left, right, epsilon) = ($left as f64, $right as f64, $epsilon as f64);
        let diff = (left - right).abs();
        if diff > epsilon {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_assert_approx_eq_within_epsilon() {
        assert_approx_eq!(600115.72, 600116.1, 1.0);
        assert_approx_eq!(-5.5, -5.500001, 0.0001);
    }

    #[test]
    #[should_panic(expected = "assertion failed")]
    fn test_assert_approx_eq_outside_epsilon() {
        assert_approx_eq!(5497371.25, 5497373.0, 1.0);
    }
}
