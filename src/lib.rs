//! Slice plots of brain atlas regions over a structural MRI.
//!
//! Given one value per region of a 4D atlas (one label plane per region, stored in a NIfTI file), this crate
//! draws the regions as filled contours whose opacity follows the values, adds the outline of all drawn regions
//! and two contour bands of a structural brain image for anatomical context, labels the slice coordinates and
//! optionally saves the figure as an image file.
//!
//! The main entry point is [`plot_slices`]. Use [`SliceCompositor`] to run the same pipeline on volumes that
//! are already in memory.

pub mod affine;
pub mod color;
pub mod compositor;
pub mod contour;
pub mod display;
pub mod error;
pub mod figure;
mod label;
pub mod smooth;
pub mod traits;
pub mod util;
pub mod volume;
pub mod weights;

pub use affine::Affine;
pub use color::{Color, Palette};
pub use compositor::{plot_slices, Composition, PlotOptions, RegionLayer, SliceCompositor, DEFAULT_STRUCTURAL};
pub use display::{Cut, CutSpec, Direction, DisplayMode};
pub use error::{Result, RoisliceError};
pub use figure::{ContourStyle, Figure, Layer, LayerKind, Panel};
pub use traits::WorldSampler;
pub use volume::{read_label_volume, read_volume, LabelVolume, Volume};
pub use weights::RegionWeights;
