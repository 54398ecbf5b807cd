//! Connected-component labeling over binary masks.
//!
//! Components are discovered by a raster scan (x fastest, then y, then z)
//! and flood-filled with labels assigned in discovery order starting at 1,
//! so repeated runs over the same mask produce identical label maps.

use crate::enums::Connectivity;
use crate::tasks::{TaskError, check_dimensions, voxel_index};

/// Label values live in a `u8` map; 0 is reserved for background.
const MAX_LABEL: usize = u8::MAX as usize;

/// Per-component statistics; `N` is the coordinate dimensionality.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LabelStats<const N: usize> {
    /// Number of voxels carrying this label.
    pub volume: u32,
    /// Componentwise minimum of the labeled coordinates.
    pub min: [u32; N],
    /// Componentwise maximum of the labeled coordinates.
    pub max: [u32; N],
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelingResults2D {
    pub label_map: Vec<u8>,
    pub label_count: u32,
    /// Indexed by `label - 1`.
    pub stats: Vec<LabelStats<2>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelingResults3D {
    pub label_map: Vec<u8>,
    pub label_count: u32,
    /// Indexed by `label - 1`.
    pub stats: Vec<LabelStats<3>>,
}

/// Label the connected foreground components of a 3D mask.
///
/// Foreground is any nonzero voxel. Adjacency is face-only for
/// [`Connectivity::Six`] and includes edges and corners for
/// [`Connectivity::TwentySix`].
///
/// # Errors
///
/// [`TaskError::InvalidDimensions`] if the buffer length does not match the
/// declared dimensions; [`TaskError::TooManyComponents`] if more components
/// exist than `max_components` (or than fit in the `u8` label range). No
/// partial result is produced.
pub fn label_components_3d(
    mask: &[u8],
    width: usize,
    height: usize,
    n_slices: usize,
    connectivity: Connectivity,
    max_components: usize,
) -> Result<LabelingResults3D, TaskError> {
    check_dimensions(mask.len(), width, height, n_slices)?;
    let max = max_components.min(MAX_LABEL);

    let mut label_map = vec![0u8; mask.len()];
    let mut stats: Vec<LabelStats<3>> = Vec::new();
    let mut stack: Vec<(usize, usize, usize)> = Vec::new();

    for z in 0..n_slices {
        for y in 0..height {
            for x in 0..width {
                let seed = voxel_index(x, y, z, width, height);
                if mask[seed] == 0 || label_map[seed] != 0 {
                    continue;
                }
                if stats.len() >= max {
                    return Err(TaskError::TooManyComponents { max });
                }
                let label = (stats.len() + 1) as u8;
                stats.push(flood_fill(
                    mask,
                    &mut label_map,
                    &mut stack,
                    (x, y, z),
                    (width, height, n_slices),
                    connectivity,
                    label,
                ));
            }
        }
    }

    Ok(LabelingResults3D {
        label_map,
        label_count: stats.len() as u32,
        stats,
    })
}

/// Label the connected foreground components of a single 2D plane.
///
/// [`Connectivity::Six`] restricts to the in-plane 4-neighborhood and
/// [`Connectivity::TwentySix`] to the 8-neighborhood. Errors as in
/// [`label_components_3d`].
pub fn label_components_2d(
    mask: &[u8],
    width: usize,
    height: usize,
    connectivity: Connectivity,
    max_components: usize,
) -> Result<LabelingResults2D, TaskError> {
    let results = label_components_3d(mask, width, height, 1, connectivity, max_components)?;
    Ok(LabelingResults2D {
        label_map: results.label_map,
        label_count: results.label_count,
        stats: results
            .stats
            .into_iter()
            .map(|s| LabelStats {
                volume: s.volume,
                min: [s.min[0], s.min[1]],
                max: [s.max[0], s.max[1]],
            })
            .collect(),
    })
}

fn flood_fill(
    mask: &[u8],
    label_map: &mut [u8],
    stack: &mut Vec<(usize, usize, usize)>,
    seed: (usize, usize, usize),
    (width, height, n_slices): (usize, usize, usize),
    connectivity: Connectivity,
    label: u8,
) -> LabelStats<3> {
    let mut stats = LabelStats {
        volume: 0,
        min: [seed.0 as u32, seed.1 as u32, seed.2 as u32],
        max: [seed.0 as u32, seed.1 as u32, seed.2 as u32],
    };

    label_map[voxel_index(seed.0, seed.1, seed.2, width, height)] = label;
    stack.push(seed);

    while let Some((x, y, z)) = stack.pop() {
        stats.volume += 1;
        for (axis, value) in [x as u32, y as u32, z as u32].into_iter().enumerate() {
            stats.min[axis] = stats.min[axis].min(value);
            stats.max[axis] = stats.max[axis].max(value);
        }

        for dz in -1i32..=1 {
            for dy in -1i32..=1 {
                for dx in -1i32..=1 {
                    if !connectivity.connects(dx, dy, dz) {
                        continue;
                    }
                    let nx = x as i32 + dx;
                    let ny = y as i32 + dy;
                    let nz = z as i32 + dz;
                    if nx < 0
                        || ny < 0
                        || nz < 0
                        || nx >= width as i32
                        || ny >= height as i32
                        || nz >= n_slices as i32
                    {
                        continue;
                    }
                    let (nx, ny, nz) = (nx as usize, ny as usize, nz as usize);
                    let index = voxel_index(nx, ny, nz, width, height);
                    if mask[index] != 0 && label_map[index] == 0 {
                        label_map[index] = label;
                        stack.push((nx, ny, nz));
                    }
                }
            }
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask_3d(dim: usize, foreground: &[(usize, usize, usize)]) -> Vec<u8> {
        let mut mask = vec![0u8; dim * dim * dim];
        for &(x, y, z) in foreground {
            mask[voxel_index(x, y, z, dim, dim)] = 1;
        }
        mask
    }

    #[test]
    fn corner_adjacent_voxels_split_under_six_connectivity() {
        let mask = mask_3d(3, &[(0, 0, 0), (1, 1, 1)]);

        let six = label_components_3d(&mask, 3, 3, 3, Connectivity::Six, 10).unwrap();
        assert_eq!(six.label_count, 2);

        let full = label_components_3d(&mask, 3, 3, 3, Connectivity::TwentySix, 10).unwrap();
        assert_eq!(full.label_count, 1);
        assert_eq!(full.stats[0].volume, 2);
    }

    #[test]
    fn far_corners_are_two_unit_components() {
        let mask = mask_3d(5, &[(0, 0, 0), (4, 4, 4)]);
        let results = label_components_3d(&mask, 5, 5, 5, Connectivity::TwentySix, 10).unwrap();
        assert_eq!(results.label_count, 2);
        for stats in &results.stats {
            assert_eq!(stats.volume, 1);
        }
        assert_eq!(results.stats[0].min, [0, 0, 0]);
        assert_eq!(results.stats[1].min, [4, 4, 4]);
    }

    #[test]
    fn labeling_is_deterministic() {
        let mask = mask_3d(4, &[(0, 0, 0), (1, 0, 0), (3, 3, 3), (0, 3, 1), (1, 3, 1)]);
        let first = label_components_3d(&mask, 4, 4, 4, Connectivity::Six, 16).unwrap();
        let second = label_components_3d(&mask, 4, 4, 4, Connectivity::Six, 16).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn labels_follow_raster_discovery_order() {
        // Region at (0, 0, 0) is discovered before the one at (2, 2, 0).
        let mask = mask_3d(3, &[(2, 2, 0), (0, 0, 0)]);
        let results = label_components_3d(&mask, 3, 3, 3, Connectivity::Six, 10).unwrap();
        assert_eq!(results.label_map[voxel_index(0, 0, 0, 3, 3)], 1);
        assert_eq!(results.label_map[voxel_index(2, 2, 0, 3, 3)], 2);
    }

    #[test]
    fn component_bound_is_a_hard_error() {
        let mask = mask_3d(3, &[(0, 0, 0), (2, 2, 2)]);
        let err = label_components_3d(&mask, 3, 3, 3, Connectivity::Six, 1).unwrap_err();
        assert_eq!(err, TaskError::TooManyComponents { max: 1 });
    }

    #[test]
    fn mismatched_dimensions_are_rejected() {
        let err = label_components_3d(&[1, 0, 1], 2, 2, 2, Connectivity::Six, 4).unwrap_err();
        assert!(matches!(err, TaskError::InvalidDimensions { len: 3, .. }));
    }

    #[test]
    fn bounding_boxes_track_component_extents() {
        let mask = mask_3d(4, &[(1, 1, 1), (2, 1, 1), (2, 2, 1), (2, 2, 2)]);
        let results = label_components_3d(&mask, 4, 4, 4, Connectivity::Six, 4).unwrap();
        assert_eq!(results.label_count, 1);
        assert_eq!(results.stats[0].volume, 4);
        assert_eq!(results.stats[0].min, [1, 1, 1]);
        assert_eq!(results.stats[0].max, [2, 2, 2]);
    }

    #[test]
    fn plane_labeling_distinguishes_four_and_eight_neighborhoods() {
        // Two pixels touching only diagonally.
        let mask = [1u8, 0, 0, 1];
        let four = label_components_2d(&mask, 2, 2, Connectivity::Six, 4).unwrap();
        assert_eq!(four.label_count, 2);
        assert_eq!(four.stats[0].min, [0, 0]);
        assert_eq!(four.stats[1].min, [1, 1]);

        let eight = label_components_2d(&mask, 2, 2, Connectivity::TwentySix, 4).unwrap();
        assert_eq!(eight.label_count, 1);
        assert_eq!(eight.stats[0].max, [1, 1]);
    }
}
