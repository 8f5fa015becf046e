//! Compositing of atlas regions, scaled by per-region values, over a structural brain image.

use std::path::{Path, PathBuf};

use crate::color::{Color, Palette};
use crate::display::{resolve_cuts, validate_cuts, CutSpec, DisplayMode};
use crate::error::{Result, RoisliceError};
use crate::figure::{ContourStyle, Figure, LayerKind};
use crate::smooth::smooth_volume;
use crate::volume::{read_label_volume, read_volume, LabelVolume, Volume};
use crate::weights::RegionWeights;

/// The MNI152 1mm brain template of an FSL 6.0.1 installation.
pub const DEFAULT_STRUCTURAL: &str = "/opt/fsl/6.0.1/data/standard/MNI152_T1_1mm_brain.nii.gz";

/// Smoothing FWHM (mm) applied to each region before contouring.
pub const REGION_FWHM: f64 = 1.0;
/// Contour level of the smoothed region planes.
pub const REGION_LEVEL: f64 = 0.02;

/// Annotation text size in pixels per unit of line width.
pub const ANNOTATION_SIZE_PER_LINE_WIDTH: f64 = 12.0;
/// The widest accepted line width.
pub const MAX_LINE_WIDTH: f64 = 50.0;


/// One contour band of the structural background image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StructuralBand {
    pub fwhm: f64,
    pub level: f64,
    pub alpha: f64,
    pub color: Color,
}

/// The anatomical context drawn on top of all regions: a coarse outline of the brain and a finer inner band.
pub const STRUCTURAL_BANDS: [StructuralBand; 2] = [
    StructuralBand { fwhm: 5.0, level: 95.0, alpha: 1.0, color: Color::rgb(64, 64, 64) },
    StructuralBand { fwhm: 0.5, level: 5000.0, alpha: 0.8, color: Color::rgb(170, 170, 170) },
];


/// Text size of the slice coordinate labels for a line width: `trunc(12 * line_width)`.
pub fn annotation_size(line_width: f64) -> u32 {
    (ANNOTATION_SIZE_PER_LINE_WIDTH * line_width) as u32
}


/// Options for [`plot_slices`]. All have defaults, see [`PlotOptions::default`].
#[derive(Debug, Clone, PartialEq)]
pub struct PlotOptions {
    /// Structural MRI drawn as context. Defaults to [`DEFAULT_STRUCTURAL`].
    pub structural: PathBuf,
    /// Where to write the figure; the format follows the extension. `None` writes nothing.
    pub saveloc: Option<PathBuf>,
    pub orientation: DisplayMode,
    pub cut_coords: CutSpec,
    /// Scales contour strokes and label text.
    pub line_width: f64,
    /// One color for all regions, or one per region.
    pub colors: Vec<Color>,
}

impl Default for PlotOptions {
    fn default() -> PlotOptions {
        PlotOptions {
            structural: PathBuf::from(DEFAULT_STRUCTURAL),
            saveloc: None,
            orientation: DisplayMode::default(),
            cut_coords: CutSpec::default(),
            line_width: 1.0,
            colors: vec![Color::GREY],
        }
    }
}

impl PlotOptions {
    pub fn with_structural<P: AsRef<Path>>(mut self, path: P) -> PlotOptions {
        self.structural = path.as_ref().to_path_buf();
        self
    }

    pub fn with_saveloc<P: AsRef<Path>>(mut self, path: P) -> PlotOptions {
        self.saveloc = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn with_orientation(mut self, orientation: DisplayMode) -> PlotOptions {
        self.orientation = orientation;
        self
    }

    pub fn with_cut_coords<C: Into<CutSpec>>(mut self, cut_coords: C) -> PlotOptions {
        self.cut_coords = cut_coords.into();
        self
    }

    pub fn with_line_width(mut self, line_width: f64) -> PlotOptions {
        self.line_width = line_width;
        self
    }

    pub fn with_colors(mut self, colors: Vec<Color>) -> PlotOptions {
        self.colors = colors;
        self
    }

    /// Check the options that do not depend on any data.
    pub fn validate(&self) -> Result<()> {
        if !(self.line_width > 0.0 && self.line_width <= MAX_LINE_WIDTH) {
            return Err(RoisliceError::InvalidInput(format!(
                "line width must be in (0, {}], got {}", MAX_LINE_WIDTH, self.line_width)));
        }
        validate_cuts(self.orientation, &self.cut_coords)
    }
}


/// A region to draw: its atlas index, color and opacity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionLayer {
    pub index: usize,
    pub color: Color,
    pub alpha: f64,
}

/// Everything derived from the atlas before drawing starts.
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    /// The atlas with the planes of zero-weight regions cleared.
    pub atlas: LabelVolume,
    /// Binary union of the regions with non-zero weight.
    pub mask: Volume,
    /// Regions with non-zero weight, in atlas order.
    pub regions: Vec<RegionLayer>,
}


/// Draws atlas regions with opacities from per-region values, then anatomical context, into a [`Figure`].
#[derive(Debug, Clone, PartialEq)]
pub struct SliceCompositor {
    pub weights: RegionWeights,
    pub palette: Palette,
    pub options: PlotOptions,
}

impl SliceCompositor {

    /// Validate weights and options and pick the palette. Touches no files.
    pub fn new(weights: &[f64], options: PlotOptions) -> Result<SliceCompositor> {
        let weights = RegionWeights::normalize(weights)?;
        options.validate()?;
        let palette = Palette::resolve(&options.colors, weights.len())?;
        Ok(SliceCompositor { weights, palette, options })
    }

    /// Mask out zero-weight regions, build the combined mask and the ordered region layers.
    ///
    /// The atlas is moved into the composition, with the planes of excluded regions zeroed in place.
    pub fn prepare(&self, mut atlas: LabelVolume) -> Result<Composition> {
        if atlas.num_regions() != self.weights.len() {
            return Err(RoisliceError::InvalidInput(format!(
                "got {} region weights for an atlas with {} regions", self.weights.len(), atlas.num_regions())));
        }

        for idx in self.weights.excluded() {
            atlas.clear_region(idx);
        }
        log::debug!("Drawing regions {:?}, excluding regions {:?}.", self.weights.included(), self.weights.excluded());

        let mask = atlas.combined_mask();
        let regions = self
            .weights
            .included()
            .into_iter()
            .map(|idx| RegionLayer { index: idx, color: self.palette.color_for(idx), alpha: self.weights.values[idx] })
            .collect();

        Ok(Composition { atlas, mask, regions })
    }

    /// Draw a prepared composition over `structural`.
    ///
    /// Regions are smoothed one at a time, right before they are drawn.
    pub fn draw(&self, composition: &Composition, structural: &Volume) -> Result<Figure> {
        let line_width = self.options.line_width;
        let cuts = resolve_cuts(self.options.orientation, &self.options.cut_coords, &composition.mask)?;
        log::debug!("Cutting along {:?}.", cuts.iter().map(|c| c.to_string()).collect::<Vec<String>>());

        let mut figure = Figure::new(self.options.orientation, &cuts, &composition.mask)?;
        figure.add_outline(&composition.mask, Color::GREY, line_width);

        for region in composition.regions.iter() {
            let smoothed = smooth_volume(&composition.atlas.region_volume(region.index), REGION_FWHM);
            let style = ContourStyle {
                level: REGION_LEVEL,
                color: region.color,
                alpha: region.alpha,
                filled: true,
                line_width,
            };
            figure.add_contours(LayerKind::Region(region.index), &smoothed, style);
        }

        for band in STRUCTURAL_BANDS.iter() {
            let smoothed = smooth_volume(structural, band.fwhm);
            let style = ContourStyle {
                level: band.level,
                color: band.color,
                alpha: band.alpha,
                filled: false,
                line_width,
            };
            figure.add_contours(LayerKind::Structural, &smoothed, style);
        }

        figure.annotate(annotation_size(line_width))?;
        Ok(figure)
    }

    /// Run the whole pipeline on loaded volumes and save the figure if a save location is set.
    pub fn compose(&self, atlas: LabelVolume, structural: &Volume) -> Result<Figure> {
        let composition = self.prepare(atlas)?;
        let figure = self.draw(&composition, structural)?;
        if let Some(path) = &self.options.saveloc {
            figure.save(path)?;
        }
        Ok(figure)
    }
}


/// Plot the regions of a 4D atlas over a structural MRI, each region's opacity given by its value.
///
/// `weights` holds one non-negative value per atlas region. Values are scaled by their maximum, so the
/// largest value is drawn opaque; regions with value 0 are left out entirely. Colors, cuts, the background
/// image and an optional output file are set in `options`.
///
/// Weights and options are checked before any file is read.
///
/// # Examples
///
/// ```no_run
/// use roislice::{plot_slices, CutSpec, PlotOptions};
/// let options = PlotOptions::default()
///     .with_cut_coords(CutSpec::Coords(vec![-10.0, 0.0, 10.0]))
///     .with_saveloc("/tmp/rois.png");
/// let figure = plot_slices(&[1.0, 0.0, 0.5], "/path/to/atlas4d.nii.gz", &options).unwrap();
/// println!("{}", figure);
/// ```
pub fn plot_slices<P: AsRef<Path>>(weights: &[f64], atlas4d: P, options: &PlotOptions) -> Result<Figure> {
    let compositor = SliceCompositor::new(weights, options.clone())?;
    let atlas = read_label_volume(atlas4d)?;
    let structural = read_volume(&options.structural)?;
    compositor.compose(atlas, &structural)
}
