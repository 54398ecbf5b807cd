//! CPU-intensive voxel algorithms run behind the worker boundary.
//!
//! Every function here is a pure transformation of a dense row-major mask
//! buffer addressed as `x + y * width + z * width * height`; nothing retains
//! state between calls, which is what lets the worker isolate them freely.

pub mod interslice;
pub mod labeling;
pub mod morphology;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaskError {
    #[error("Buffer length {len} does not match dimensions {width}x{height}x{n_slices}")]
    InvalidDimensions {
        len: usize,
        width: usize,
        height: usize,
        n_slices: usize,
    },

    #[error("Component count exceeds the maximum of {max}")]
    TooManyComponents { max: usize },
}

/// Validate a buffer against its declared dimensions.
pub(crate) fn check_dimensions(
    len: usize,
    width: usize,
    height: usize,
    n_slices: usize,
) -> Result<(), TaskError> {
    let expected = width
        .checked_mul(height)
        .and_then(|area| area.checked_mul(n_slices));
    if expected != Some(len) || len == 0 {
        return Err(TaskError::InvalidDimensions {
            len,
            width,
            height,
            n_slices,
        });
    }
    Ok(())
}

#[inline]
pub(crate) fn voxel_index(x: usize, y: usize, z: usize, width: usize, height: usize) -> usize {
    x + y * width + z * width * height
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimension_check_accepts_exact_product() {
        assert!(check_dimensions(24, 2, 3, 4).is_ok());
    }

    #[test]
    fn dimension_check_rejects_mismatch_and_overflow() {
        assert!(check_dimensions(23, 2, 3, 4).is_err());
        assert!(check_dimensions(0, 0, 0, 0).is_err());
        assert!(check_dimensions(8, usize::MAX, 2, 2).is_err());
    }
}
