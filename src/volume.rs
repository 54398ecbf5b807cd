use crate::enums::{Interpolation, Orientation};
use crate::interpolator::Interpolator;
use crate::section::Section;

use image::GrayImage;
use image::ImageBuffer;
use ndarray::Array3;
use ndarray::ArrayView2;
use ndarray::s;
use rayon::prelude::*;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VolumeError {
    #[error("Output dimensions must be positive, got {width}x{height}")]
    InvalidOutputSize { width: u32, height: u32 },

    #[error("Buffer length {len} does not match dimensions {depth}x{height}x{width}")]
    DimensionMismatch {
        len: usize,
        depth: usize,
        height: usize,
        width: usize,
    },
}

/// A loaded scan: a dense scalar grid plus voxel spacing.
///
/// The grid is immutable for the lifetime of any sampling call; label
/// volumes edited by the voxel tasks are separate buffers owned by the
/// caller. Sample points outside the grid resolve to `background`, which
/// defaults to the minimum representable intensity.
#[derive(Debug)]
pub struct Volume {
    data: Array3<u16>,
    spacing: (f32, f32, f32),
    background: u16,
}

impl Volume {
    pub fn new(data: Array3<u16>, spacing: (f32, f32, f32)) -> Self {
        Self {
            data,
            spacing,
            background: u16::MIN,
        }
    }

    /// Build a volume from a decoded voxel buffer, as handed over by the
    /// DICOM-decoding collaborator.
    ///
    /// # Errors
    ///
    /// Returns [`VolumeError::DimensionMismatch`] if the buffer length does
    /// not equal `depth * height * width`, or if any dimension is zero.
    pub fn from_raw(
        buffer: Vec<u16>,
        (depth, height, width): (usize, usize, usize),
        spacing: (f32, f32, f32),
    ) -> Result<Self, VolumeError> {
        let len = buffer.len();
        if len == 0 || depth == 0 || height == 0 || width == 0 {
            return Err(VolumeError::DimensionMismatch {
                len,
                depth,
                height,
                width,
            });
        }
        let data = Array3::from_shape_vec((depth, height, width), buffer).map_err(|_| {
            VolumeError::DimensionMismatch {
                len,
                depth,
                height,
                width,
            }
        })?;
        Ok(Self::new(data, spacing))
    }

    pub fn with_background(mut self, background: u16) -> Self {
        self.background = background;
        self
    }

    /// Get the dimensions of the volume (depth, height, width)
    pub fn dim(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    /// Get a reference to the underlying data
    pub fn data(&self) -> &Array3<u16> {
        &self.data
    }

    pub fn spacing(&self) -> (f32, f32, f32) {
        self.spacing
    }

    #[inline]
    fn normalize_to_u8(value: f32) -> u8 {
        (value * 255.0 / 65535.0).clamp(0.0, 255.0) as u8
    }

    pub fn get_slice_from_axis(
        &self,
        index: usize,
        orientation: &Orientation,
    ) -> Option<ArrayView2<'_, u16>> {
        if !self.is_valid_index(index, orientation) {
            return None;
        }
        let slice_result = match orientation {
            Orientation::Axial => self.data.slice(s![index, .., ..]),
            Orientation::Coronal => self.data.slice(s![.., index, ..]),
            Orientation::Sagittal => self.data.slice(s![.., .., index]),
        };
        Some(slice_result)
    }

    /// Extract an axis-aligned plane at `index`, resampled to the requested
    /// window with nearest-neighbor lookup. [`orthogonal_mpr_with`] selects
    /// a different resampling mode.
    ///
    /// An out-of-range index clamps to the volume bounds rather than
    /// failing, so a viewer scrolling past the last frame keeps showing it.
    ///
    /// # Errors
    ///
    /// Returns [`VolumeError::InvalidOutputSize`] when either window
    /// dimension is zero.
    ///
    /// [`orthogonal_mpr_with`]: Self::orthogonal_mpr_with
    pub fn orthogonal_mpr(
        &self,
        orientation: Orientation,
        index: usize,
        window_width: u32,
        window_height: u32,
    ) -> Result<GrayImage, VolumeError> {
        self.orthogonal_mpr_with(
            orientation,
            index,
            window_width,
            window_height,
            Interpolation::Nearest,
        )
    }

    /// [`orthogonal_mpr`](Self::orthogonal_mpr) with an explicit in-plane
    /// resampling mode.
    pub fn orthogonal_mpr_with(
        &self,
        orientation: Orientation,
        index: usize,
        window_width: u32,
        window_height: u32,
        interpolation: Interpolation,
    ) -> Result<GrayImage, VolumeError> {
        Self::check_output_size(window_width, window_height)?;

        let clamped = index.min(self.max_index(&orientation).saturating_sub(1));
        // Misses only for an empty volume.
        let (depth, height, width) = self.data.dim();
        let slice = self
            .get_slice_from_axis(clamped, &orientation)
            .ok_or(VolumeError::DimensionMismatch {
                len: 0,
                depth,
                height,
                width,
            })?;

        let (slice_height, slice_width) = slice.dim();
        if (slice_width as u32, slice_height as u32) == (window_width, window_height) {
            return Self::slice_to_image(&slice, window_width, window_height);
        }
        self.resample_slice(&slice, window_width, window_height, interpolation)
    }

    /// Sample the volume along an arbitrary oblique section into a
    /// `out_width` x `out_height` image.
    ///
    /// Each output pixel maps to `origin + (x / out_width) * x_axis +
    /// (y / out_height) * y_axis` in voxel space and is trilinearly
    /// interpolated; points outside the grid yield the background value.
    ///
    /// # Errors
    ///
    /// Returns [`VolumeError::InvalidOutputSize`] when either output
    /// dimension is zero.
    pub fn oblique_sample(
        &self,
        section: &Section,
        out_width: u32,
        out_height: u32,
    ) -> Result<GrayImage, VolumeError> {
        Self::check_output_size(out_width, out_height)?;

        let pixel_data: Vec<u8> = (0..out_height)
            .into_par_iter()
            .flat_map(|y| {
                (0..out_width)
                    .map(|x| {
                        let u = f64::from(x) / f64::from(out_width);
                        let v = f64::from(y) / f64::from(out_height);
                        let point = section.point_at(u, v);
                        Self::normalize_to_u8(self.sample_point(point) as f32)
                    })
                    .collect::<Vec<u8>>()
            })
            .collect();

        ImageBuffer::from_raw(out_width, out_height, pixel_data).ok_or(
            VolumeError::InvalidOutputSize {
                width: out_width,
                height: out_height,
            },
        )
    }

    /// Trilinear sample at an `(x, y, z)` voxel-space point; out-of-bounds
    /// points return the background value.
    pub fn sample_point(&self, point: [f64; 3]) -> f64 {
        let (depth, height, width) = self.data.dim();
        let [x, y, z] = point;

        // Subtraction stays in f64 so degenerate dimensions fall through
        // to the background value instead of underflowing.
        let in_bounds = x >= 0.0
            && x <= width as f64 - 1.0
            && y >= 0.0
            && y <= height as f64 - 1.0
            && z >= 0.0
            && z <= depth as f64 - 1.0;
        if !in_bounds {
            return f64::from(self.background);
        }

        Interpolator::trilinear_interpolate(&self.data, z, y, x)
    }

    fn slice_to_image(
        slice: &ArrayView2<'_, u16>,
        width: u32,
        height: u32,
    ) -> Result<GrayImage, VolumeError> {
        let pixel_data: Vec<u8> = slice
            .into_par_iter()
            .map(|&v| Self::normalize_to_u8(f32::from(v)))
            .collect();
        ImageBuffer::from_raw(width, height, pixel_data)
            .ok_or(VolumeError::InvalidOutputSize { width, height })
    }

    fn resample_slice(
        &self,
        slice: &ArrayView2<'_, u16>,
        width: u32,
        height: u32,
        interpolation: Interpolation,
    ) -> Result<GrayImage, VolumeError> {
        let (slice_height, slice_width) = slice.dim();

        let pixel_data: Vec<u8> = (0..height)
            .into_par_iter()
            .flat_map(|y| {
                (0..width)
                    .map(|x| {
                        // Normalized coordinates with half-pixel offset
                        let norm_x = (x as f32 + 0.5) / width as f32;
                        let norm_y = (y as f32 + 0.5) / height as f32;

                        let src_x = norm_x * slice_width as f32 - 0.5;
                        let src_y = norm_y * slice_height as f32 - 0.5;

                        let src_x = src_x.max(0.0).min((slice_width - 1) as f32);
                        let src_y = src_y.max(0.0).min((slice_height - 1) as f32);

                        let value = match interpolation {
                            Interpolation::Nearest => f32::from(
                                slice[[src_y.round() as usize, src_x.round() as usize]],
                            ),
                            Interpolation::Bilinear => {
                                Interpolator::bilinear_interpolate(slice, src_y, src_x)
                            }
                        };
                        Self::normalize_to_u8(value)
                    })
                    .collect::<Vec<u8>>()
            })
            .collect();

        ImageBuffer::from_raw(width, height, pixel_data)
            .ok_or(VolumeError::InvalidOutputSize { width, height })
    }

    fn check_output_size(width: u32, height: u32) -> Result<(), VolumeError> {
        if width == 0 || height == 0 {
            return Err(VolumeError::InvalidOutputSize { width, height });
        }
        Ok(())
    }

    fn max_index(&self, orientation: &Orientation) -> usize {
        let dim = self.data.dim();
        match orientation {
            Orientation::Axial => dim.0,
            Orientation::Coronal => dim.1,
            Orientation::Sagittal => dim.2,
        }
    }

    fn is_valid_index(&self, index: usize, orientation: &Orientation) -> bool {
        index < self.max_index(orientation)
    }
}
