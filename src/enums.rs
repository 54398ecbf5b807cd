#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Orientation {
    Axial,
    Coronal,
    Sagittal,
}

/// In-plane resampling mode for orthogonal MPR extraction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Interpolation {
    #[default]
    Nearest,
    Bilinear,
}

/// Voxel adjacency used by connected-component labeling.
///
/// `Six` connects voxels sharing a face; `TwentySix` additionally connects
/// edge and corner neighbors. Restricted to a single z-plane these reduce to
/// the 4- and 8-neighborhoods.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Connectivity {
    #[default]
    Six,
    TwentySix,
}

impl Connectivity {
    #[inline]
    pub(crate) fn connects(self, dx: i32, dy: i32, dz: i32) -> bool {
        match self {
            Connectivity::Six => dx.abs() + dy.abs() + dz.abs() == 1,
            Connectivity::TwentySix => (dx, dy, dz) != (0, 0, 0),
        }
    }
}
