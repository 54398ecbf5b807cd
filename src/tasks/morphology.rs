//! Binary morphological dilation and erosion.

use crate::tasks::{TaskError, check_dimensions, voxel_index};

/// The 6-neighbor cross element: the voxel itself plus its face neighbors.
pub fn cross_structure() -> Vec<[i32; 3]> {
    vec![
        [0, 0, 0],
        [-1, 0, 0],
        [1, 0, 0],
        [0, -1, 0],
        [0, 1, 0],
        [0, 0, -1],
        [0, 0, 1],
    ]
}

/// All offsets within Euclidean distance `radius` of the center.
pub fn ball_structure(radius: i32) -> Vec<[i32; 3]> {
    let mut offsets = Vec::new();
    let r2 = radius * radius;
    for dz in -radius..=radius {
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx * dx + dy * dy + dz * dz <= r2 {
                    offsets.push([dx, dy, dz]);
                }
            }
        }
    }
    offsets
}

/// Dilate or erode a binary mask with the given structuring element.
///
/// Dilation marks a voxel foreground if any structure offset lands on a
/// foreground voxel; erosion keeps a voxel only if every offset lands on
/// one. Offsets falling outside the volume count as background, so boundary
/// voxels erode toward background. The input buffer is left untouched and a
/// new buffer is returned, which lets callers diff against the previous
/// state or undo.
///
/// # Errors
///
/// [`TaskError::InvalidDimensions`] if the buffer length does not match the
/// declared dimensions.
pub fn apply(
    mask: &[u8],
    width: usize,
    height: usize,
    n_slices: usize,
    structure: &[[i32; 3]],
    erode: bool,
) -> Result<Vec<u8>, TaskError> {
    check_dimensions(mask.len(), width, height, n_slices)?;

    let mut output = vec![0u8; mask.len()];
    for z in 0..n_slices {
        for y in 0..height {
            for x in 0..width {
                let keep = if erode {
                    structure
                        .iter()
                        .all(|offset| offset_is_foreground(mask, (x, y, z), offset, (width, height, n_slices)))
                } else {
                    structure
                        .iter()
                        .any(|offset| offset_is_foreground(mask, (x, y, z), offset, (width, height, n_slices)))
                };
                if keep {
                    output[voxel_index(x, y, z, width, height)] = 1;
                }
            }
        }
    }
    Ok(output)
}

#[inline]
fn offset_is_foreground(
    mask: &[u8],
    (x, y, z): (usize, usize, usize),
    offset: &[i32; 3],
    (width, height, n_slices): (usize, usize, usize),
) -> bool {
    let nx = x as i32 + offset[0];
    let ny = y as i32 + offset[1];
    let nz = z as i32 + offset[2];
    if nx < 0
        || ny < 0
        || nz < 0
        || nx >= width as i32
        || ny >= height as i32
        || nz >= n_slices as i32
    {
        return false;
    }
    mask[voxel_index(nx as usize, ny as usize, nz as usize, width, height)] != 0
}
