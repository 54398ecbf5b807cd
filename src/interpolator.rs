use ndarray::{Array3, ArrayView2};

pub(crate) struct Interpolator;

impl Interpolator {
    #[inline]
    pub(crate) fn bilinear_interpolate(slice: &ArrayView2<u16>, y: f32, x: f32) -> f32 {
        let (height, width) = slice.dim();

        let y0 = y.floor() as usize;
        let x0 = x.floor() as usize;
        let y1 = (y0 + 1).min(height - 1);
        let x1 = (x0 + 1).min(width - 1);

        let dy = y - y0 as f32;
        let dx = x - x0 as f32;
        let one_minus_dx = 1.0 - dx;
        let one_minus_dy = 1.0 - dy;

        let v00 = f32::from(slice[[y0, x0]]);
        let v01 = f32::from(slice[[y0, x1]]);
        let v10 = f32::from(slice[[y1, x0]]);
        let v11 = f32::from(slice[[y1, x1]]);

        let v0 = v00.mul_add(one_minus_dx, v01 * dx);
        let v1 = v10.mul_add(one_minus_dx, v11 * dx);

        v0.mul_add(one_minus_dy, v1 * dy)
    }

    /// Trilinear interpolation over the 8 surrounding lattice voxels.
    /// Coordinates must already be clamped to `[0, dim - 1]`; the volume is
    /// addressed as `(z, y, x)`.
    #[inline]
    pub(crate) fn trilinear_interpolate(volume: &Array3<u16>, z: f64, y: f64, x: f64) -> f64 {
        let (depth, height, width) = volume.dim();

        let z0 = z.floor() as usize;
        let y0 = y.floor() as usize;
        let x0 = x.floor() as usize;
        let z1 = (z0 + 1).min(depth - 1);
        let y1 = (y0 + 1).min(height - 1);
        let x1 = (x0 + 1).min(width - 1);

        let dz = z - z0 as f64;
        let dy = y - y0 as f64;
        let dx = x - x0 as f64;

        let lerp = |a: f64, b: f64, t: f64| a.mul_add(1.0 - t, b * t);

        let c00 = lerp(
            f64::from(volume[[z0, y0, x0]]),
            f64::from(volume[[z0, y0, x1]]),
            dx,
        );
        let c01 = lerp(
            f64::from(volume[[z0, y1, x0]]),
            f64::from(volume[[z0, y1, x1]]),
            dx,
        );
        let c10 = lerp(
            f64::from(volume[[z1, y0, x0]]),
            f64::from(volume[[z1, y0, x1]]),
            dx,
        );
        let c11 = lerp(
            f64::from(volume[[z1, y1, x0]]),
            f64::from(volume[[z1, y1, x1]]),
            dx,
        );

        let c0 = lerp(c00, c01, dy);
        let c1 = lerp(c10, c11, dy);

        lerp(c0, c1, dz)
    }
}
