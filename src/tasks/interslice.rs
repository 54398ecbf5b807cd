//! Shape-based inter-slice interpolation for sparsely annotated masks.
//!
//! Annotators typically label every k-th z-plane of a volume; this module
//! fills the empty planes in between. Each annotated boundary slice is
//! turned into a signed chamfer distance map (positive inside the shape,
//! negative outside), the two maps are blended linearly by the slice's
//! position in the gap, and the blend is thresholded back to a binary
//! shape. Identical boundary shapes therefore propagate unchanged, and
//! differing shapes morph smoothly from one to the other.

use crate::tasks::{TaskError, check_dimensions};

/// Finite stand-in for "no boundary anywhere on this slice"; keeps the
/// blend arithmetic away from infinities.
const FAR: f32 = 1.0e9;

const ORTHOGONAL: f32 = 1.0;
const DIAGONAL: f32 = std::f32::consts::SQRT_2;

/// Fill unannotated z-planes between annotated neighbors.
///
/// A slice counts as annotated when it contains at least one nonzero voxel.
/// Slices with annotated neighbors on both sides are synthesized by
/// shape-based interpolation; slices outside the annotated range are left
/// unmodified, and a volume with fewer than two annotated slices is
/// returned as-is. Interpolated voxels are written as 1.
///
/// # Errors
///
/// [`TaskError::InvalidDimensions`] if the buffer length does not match the
/// declared dimensions.
pub fn interpolate_slices(
    mask: &[u8],
    width: usize,
    height: usize,
    n_slices: usize,
) -> Result<Vec<u8>, TaskError> {
    check_dimensions(mask.len(), width, height, n_slices)?;

    let slice_len = width * height;
    let annotated: Vec<usize> = (0..n_slices)
        .filter(|z| mask[z * slice_len..(z + 1) * slice_len].iter().any(|&v| v != 0))
        .collect();

    let mut output = mask.to_vec();
    if annotated.len() < 2 {
        return Ok(output);
    }

    for pair in annotated.windows(2) {
        let (z0, z1) = (pair[0], pair[1]);
        if z1 - z0 < 2 {
            continue;
        }
        let d0 = signed_distance_map(&mask[z0 * slice_len..(z0 + 1) * slice_len], width, height);
        let d1 = signed_distance_map(&mask[z1 * slice_len..(z1 + 1) * slice_len], width, height);

        for z in (z0 + 1)..z1 {
            let t = (z - z0) as f32 / (z1 - z0) as f32;
            let slice = &mut output[z * slice_len..(z + 1) * slice_len];
            for (index, voxel) in slice.iter_mut().enumerate() {
                let blended = d0[index].mul_add(1.0 - t, d1[index] * t);
                if blended >= 0.0 {
                    *voxel = 1;
                }
            }
        }
    }

    Ok(output)
}

/// Signed chamfer distance to the shape boundary: positive inside,
/// negative outside.
fn signed_distance_map(slice: &[u8], width: usize, height: usize) -> Vec<f32> {
    let inside: Vec<bool> = slice.iter().map(|&v| v != 0).collect();
    let to_foreground = chamfer_distance(&inside, width, height, true);
    let to_background = chamfer_distance(&inside, width, height, false);

    inside
        .iter()
        .enumerate()
        .map(|(i, &is_inside)| {
            if is_inside {
                to_background[i].min(FAR)
            } else {
                -to_foreground[i].min(FAR)
            }
        })
        .collect()
}

/// Two-pass chamfer transform: distance from every pixel to the nearest
/// pixel whose membership equals `target`.
fn chamfer_distance(inside: &[bool], width: usize, height: usize, target: bool) -> Vec<f32> {
    let mut distance: Vec<f32> = inside
        .iter()
        .map(|&v| if v == target { 0.0 } else { f32::MAX })
        .collect();

    let relax = |distance: &mut Vec<f32>, index: usize, neighbor: usize, weight: f32| {
        let candidate = distance[neighbor] + weight;
        if candidate < distance[index] {
            distance[index] = candidate;
        }
    };

    // Forward pass: west, north and the two north diagonals.
    for y in 0..height {
        for x in 0..width {
            let index = y * width + x;
            if x > 0 {
                relax(&mut distance, index, index - 1, ORTHOGONAL);
            }
            if y > 0 {
                relax(&mut distance, index, index - width, ORTHOGONAL);
                if x > 0 {
                    relax(&mut distance, index, index - width - 1, DIAGONAL);
                }
                if x + 1 < width {
                    relax(&mut distance, index, index - width + 1, DIAGONAL);
                }
            }
        }
    }

    // Backward pass: east, south and the two south diagonals.
    for y in (0..height).rev() {
        for x in (0..width).rev() {
            let index = y * width + x;
            if x + 1 < width {
                relax(&mut distance, index, index + 1, ORTHOGONAL);
            }
            if y + 1 < height {
                relax(&mut distance, index, index + width, ORTHOGONAL);
                if x + 1 < width {
                    relax(&mut distance, index, index + width + 1, DIAGONAL);
                }
                if x > 0 {
                    relax(&mut distance, index, index + width - 1, DIAGONAL);
                }
            }
        }
    }

    distance
}
