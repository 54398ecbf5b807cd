/// An oblique cutting plane through a volume.
///
/// The axes need not be orthogonal or unit length; their magnitude encodes
/// the sampling extent, so `point_at(1.0, 1.0)` is the far corner of the
/// sampled region.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Section {
    pub origin: [f64; 3],
    pub x_axis: [f64; 3],
    pub y_axis: [f64; 3],
}

/// Restricted form of a [`Section`] used by 2D viewers: an axis-aligned
/// slice at a specific frame index.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewSection {
    pub origin: [f64; 2],
    pub x_axis: [f64; 2],
    pub y_length: f64,
    pub image_number: i32,
}

impl Section {
    /// Embeds a 2D-view section into 3D. The frame index becomes the
    /// z-origin and the y-axis gets zero x/z components.
    pub fn from_view(view: &ViewSection) -> Self {
        Self {
            origin: [view.origin[0], view.origin[1], f64::from(view.image_number)],
            x_axis: [view.x_axis[0], view.x_axis[1], 0.0],
            y_axis: [0.0, view.y_length, 0.0],
        }
    }

    /// Projects an axis-aligned, z-normal section back to its 2D-view form.
    ///
    /// The frame index is the rounded z-origin. This is lossy for genuinely
    /// oblique sections; callers must not pass those through this path.
    pub fn to_view(&self) -> ViewSection {
        ViewSection {
            origin: [self.origin[0], self.origin[1]],
            x_axis: [self.x_axis[0], self.x_axis[1]],
            y_length: self.y_axis[1],
            image_number: self.origin[2].round() as i32,
        }
    }

    /// Sample point at plane coordinates `(u, v)`, each in `[0, 1]` for
    /// points within the sampling extent.
    #[inline]
    pub fn point_at(&self, u: f64, v: f64) -> [f64; 3] {
        [
            self.origin[0] + u * self.x_axis[0] + v * self.y_axis[0],
            self.origin[1] + u * self.x_axis[1] + v * self.y_axis[1],
            self.origin[2] + u * self.x_axis[2] + v * self.y_axis[2],
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_section_round_trips() {
        let view = ViewSection {
            origin: [12.5, -3.25],
            x_axis: [256.0, 0.5],
            y_length: 256.0,
            image_number: 42,
        };
        let section = Section::from_view(&view);
        assert_eq!(section.origin, [12.5, -3.25, 42.0]);
        assert_eq!(section.y_axis, [0.0, 256.0, 0.0]);
        assert_eq!(section.to_view(), view);
    }

    #[test]
    fn negative_frame_index_round_trips() {
        let view = ViewSection {
            origin: [0.0, 0.0],
            x_axis: [1.0, 0.0],
            y_length: 1.0,
            image_number: -7,
        };
        assert_eq!(Section::from_view(&view).to_view(), view);
    }

    #[test]
    fn point_at_combines_axes() {
        let section = Section {
            origin: [1.0, 2.0, 3.0],
            x_axis: [10.0, 0.0, 0.0],
            y_axis: [0.0, 20.0, 2.0],
        };
        assert_eq!(section.point_at(0.0, 0.0), [1.0, 2.0, 3.0]);
        assert_eq!(section.point_at(0.5, 0.5), [6.0, 12.0, 4.0]);
        assert_eq!(section.point_at(1.0, 1.0), [11.0, 22.0, 5.0]);
    }
}
