//! # volume-mpr
//!
//! Volumetric image-processing core for a medical-image viewer: serves 2D
//! cross-sections (multi-planar reconstructions) of a 3D scan and runs the
//! CPU-intensive voxel-editing algorithms off the interactive path.
//!
//! The crate has three layers:
//!
//!  - [`volume`] owns the scalar voxel grid and samples it along arbitrary
//!    [`section::Section`] planes, orthogonally (Axial / Coronal /
//!    Sagittal) or obliquely with trilinear interpolation.
//!  - [`cache`] bounds memory with LRU caches over the rendered images,
//!    keyed by a deterministic serialization of the sampling parameters.
//!  - [`tasks`] holds the voxel algorithms (connected-component labeling
//!    with 6- or 26-neighbor adjacency, morphological dilation/erosion,
//!    inter-slice interpolation) and [`worker`] runs each of them on an
//!    isolated thread that reports failures as values instead of crashing
//!    the host.
//!
//! Decoding DICOM files into the voxel buffer is a collaborator's job;
//! [`volume::Volume::from_raw`] accepts the decoded buffer directly.
//!
//! # Examples
//!
//! Sample an axial plane, cache it, and label the scan's foreground in the
//! background:
//!
//! ```
//! use volume_mpr::cache::{PixelCache, SectionKey};
//! use volume_mpr::section::{Section, ViewSection};
//! use volume_mpr::worker::{TaskHandle, TaskRequest, TaskReply};
//! use volume_mpr::{Connectivity, Volume};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let volume = Volume::from_raw(vec![0u16; 8 * 8 * 8], (8, 8, 8), (1.0, 1.0, 1.0))?;
//!
//! let view = ViewSection { origin: [0.0, 0.0], x_axis: [8.0, 0.0], y_length: 8.0, image_number: 4 };
//! let section = Section::from_view(&view);
//! let key = SectionKey {
//!     section,
//!     output: (64, 64),
//!     window_center: 40.0,
//!     window_width: 400.0,
//! };
//!
//! let mut cache = PixelCache::bounded(32);
//! let key_string = key.to_key_string();
//! if cache.get(&key_string).is_none() {
//!     let image = volume.oblique_sample(&section, 64, 64)?;
//!     cache.put(key_string, image);
//! }
//!
//! let handle = TaskHandle::spawn(TaskRequest::ConnectedComponents {
//!     input: vec![0u8; 8 * 8 * 8],
//!     width: 8,
//!     height: 8,
//!     n_slices: 8,
//!     connectivity: Connectivity::Six,
//!     max_components: 32,
//! });
//! match handle.join() {
//!     Ok(TaskReply::Labeling(results)) => assert_eq!(results.label_count, 0),
//!     Ok(_) => unreachable!(),
//!     Err(message) => eprintln!("labeling failed: {message}"),
//! }
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod enums;
mod interpolator;
pub mod section;
pub mod tasks;
pub mod volume;
pub mod worker;

pub use enums::{Connectivity, Interpolation, Orientation};
pub use volume::{Volume, VolumeError};
