//! The figure: an owned canvas that drawing steps are applied to in order.
//!
//! A [`Figure`] holds one [`Panel`] per cut. Each panel is a raster of the cut plane covering the in-plane
//! world extent of a reference volume. Volumes on other voxel grids are resampled through their own affine,
//! so everything drawn into one figure lines up in world space. Every drawing step is composited on top of
//! the previous ones.

use image::{imageops, DynamicImage, GrayImage, Luma, Rgb, RgbImage, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut};
use ndarray::Array2;

use std::fmt;
use std::path::Path;

use crate::color::Color;
use crate::contour::{fill_mask, march_squares};
use crate::display::{Cut, Direction, DisplayMode};
use crate::error::{Result, RoisliceError};
use crate::label::draw_label;
use crate::traits::WorldSampler;
use crate::util::output_format;
use crate::volume::Volume;

/// Raster resolution of the panels.
pub const PIXELS_PER_MM: f64 = 2.0;
/// Line thickness in pixels for a line width of 1.
pub const PIXELS_PER_LINE_WIDTH: f64 = 1.5;
/// Space between panels and around the figure, in pixels.
pub const PANEL_MARGIN: u32 = 8;


/// How a contour layer is drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct ContourStyle {
    /// The iso-value of the contour.
    pub level: f64,
    pub color: Color,
    /// Opacity in `[0, 1]`, applied to the line and the fill alike.
    pub alpha: f64,
    /// Whether the area at or above `level` is filled as well.
    pub filled: bool,
    pub line_width: f64,
}

/// What a layer of the figure shows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LayerKind {
    /// The outline of the union of all drawn regions.
    Outline,
    /// A single region of interest, by index into the atlas.
    Region(usize),
    /// A contour band of the structural background image.
    Structural,
}

/// A record of one drawing step, in the order the steps were applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub kind: LayerKind,
    pub style: ContourStyle,
}


/// One cut plane rendered as an RGBA raster.
#[derive(Debug, Clone)]
pub struct Panel {
    pub cut: Cut,
    pub image: RgbaImage,
    /// World position of the center of pixel (0, 0).
    origin: [f64; 3],
    /// World step per pixel to the right and per pixel downwards.
    right: [f64; 3],
    down: [f64; 3],
}

impl Panel {

    fn new(cut: Cut, reference: &Volume, pixels_per_mm: f64, background: Color) -> Result<Panel> {
        let (h, v) = cut.direction.in_plane();
        let (h_min, h_max) = grid_extent(reference, h);
        let (v_min, v_max) = grid_extent(reference, v);
        let width = ((h_max - h_min) * pixels_per_mm).ceil();
        let height = ((v_max - v_min) * pixels_per_mm).ceil();
        if !(width >= 1.0 && height >= 1.0) {
            return Err(RoisliceError::Render(format!("cut {} of the reference volume is empty", cut)));
        }

        let step = 1.0 / pixels_per_mm;
        let mut origin = [0.0; 3];
        origin[cut.direction.to_usize()] = cut.coord;
        origin[h.to_usize()] = h_min + 0.5 * step;
        origin[v.to_usize()] = v_max - 0.5 * step;
        let mut right = [0.0; 3];
        right[h.to_usize()] = step;
        let mut down = [0.0; 3];
        down[v.to_usize()] = -step;

        Ok(Panel {
            cut,
            image: RgbaImage::from_pixel(width as u32, height as u32, background.to_rgba(1.0)),
            origin,
            right,
            down,
        })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// World coordinates of the center of pixel `(px, py)`.
    pub fn pixel_to_world(&self, px: f64, py: f64) -> [f64; 3] {
        let mut w = self.origin;
        for axis in 0..3 {
            w[axis] += px * self.right[axis] + py * self.down[axis];
        }
        w
    }

    /// Sample `source` at every pixel center. The result is indexed `[[row, col]]`.
    pub fn sample<S: WorldSampler + ?Sized>(&self, source: &S) -> Array2<f64> {
        let (w, h) = (self.width() as usize, self.height() as usize);
        Array2::from_shape_fn((h, w), |(row, col)| source.sample_world(self.pixel_to_world(col as f64, row as f64)))
    }

    /// Rasterize the contour of `grid` at `style.level` (and its fill) into a coverage mask.
    fn coverage(&self, grid: &Array2<f64>, style: &ContourStyle) -> GrayImage {
        let mut mask = GrayImage::new(self.width(), self.height());
        let on = Luma([255u8]);

        if style.filled {
            for ((row, col), inside) in fill_mask(grid.view(), style.level).indexed_iter() {
                if *inside {
                    mask.put_pixel(col as u32, row as u32, on);
                }
            }
        }

        let thickness = (style.line_width * PIXELS_PER_LINE_WIDTH).max(1.0);
        let max_radius = self.width().max(self.height()) as i32;
        let radius = (((thickness - 1.0) / 2.0).round() as i32).min(max_radius);
        for segment in march_squares(grid.view(), style.level) {
            let start = (segment.start.x as f32, segment.start.y as f32);
            let end = (segment.end.x as f32, segment.end.y as f32);
            draw_line_segment_mut(&mut mask, start, end, on);
            if radius > 0 {
                for p in [start, end].iter() {
                    draw_filled_circle_mut(&mut mask, (p.0.round() as i32, p.1.round() as i32), radius, on);
                }
            }
        }
        mask
    }

    /// Paint `color` with opacity `alpha` over every covered pixel.
    fn composite(&mut self, coverage: &GrayImage, color: Color, alpha: f64) {
        let alpha = alpha.max(0.0).min(1.0);
        let top = [color.r, color.g, color.b];
        for (x, y, c) in coverage.enumerate_pixels() {
            if c.0[0] == 0 {
                continue;
            }
            let below = self.image.get_pixel_mut(x, y);
            for ch in 0..3 {
                let mixed = top[ch] as f64 * alpha + below.0[ch] as f64 * (1.0 - alpha);
                below.0[ch] = mixed.round() as u8;
            }
        }
    }
}

/// World extent along `direction` of the whole voxel grid of `volume`, voxel edges included.
fn grid_extent(volume: &Volume, direction: Direction) -> (f64, f64) {
    let dims = volume.dims();
    let axis = direction.to_usize();
    let mut extent = (f64::INFINITY, f64::NEG_INFINITY);
    for &i in [-0.5, dims[0] as f64 - 0.5].iter() {
        for &j in [-0.5, dims[1] as f64 - 0.5].iter() {
            for &k in [-0.5, dims[2] as f64 - 0.5].iter() {
                let c = volume.affine.voxel_to_world([i, j, k])[axis];
                extent = (extent.0.min(c), extent.1.max(c));
            }
        }
    }
    extent
}


/// A multi-panel slice figure. Build it with [`Figure::new`], draw into it, then save or inspect it.
#[derive(Debug, Clone)]
pub struct Figure {
    pub mode: DisplayMode,
    pub panels: Vec<Panel>,
    pub background: Color,
    layers: Vec<Layer>,
    annotation_size: Option<u32>,
}

impl Figure {

    /// Create an empty figure with one panel per cut, covering the grid of `reference`.
    pub fn new(mode: DisplayMode, cuts: &[Cut], reference: &Volume) -> Result<Figure> {
        Figure::with_resolution(mode, cuts, reference, PIXELS_PER_MM)
    }

    /// Like [`Figure::new`], with a custom raster resolution in pixels per millimetre.
    pub fn with_resolution(mode: DisplayMode, cuts: &[Cut], reference: &Volume, pixels_per_mm: f64) -> Result<Figure> {
        if cuts.is_empty() {
            return Err(RoisliceError::Render(String::from("a figure needs at least one cut")));
        }
        if !(pixels_per_mm > 0.0 && pixels_per_mm.is_finite()) {
            return Err(RoisliceError::InvalidInput(format!("invalid resolution {} pixels per mm", pixels_per_mm)));
        }
        if reference.data.is_empty() {
            return Err(RoisliceError::Render(String::from("the reference volume has no voxels")));
        }
        let background = Color::WHITE;
        let panels = cuts
            .iter()
            .map(|cut| Panel::new(*cut, reference, pixels_per_mm, background))
            .collect::<Result<Vec<Panel>>>()?;

        Ok(Figure { mode, panels, background, layers: Vec::new(), annotation_size: None })
    }

    /// The cuts shown, in panel order.
    pub fn cuts(&self) -> Vec<Cut> {
        self.panels.iter().map(|p| p.cut).collect()
    }

    /// All drawing steps applied so far, oldest first.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// The text size of the coordinate labels, if the figure was annotated.
    pub fn annotation_size(&self) -> Option<u32> {
        self.annotation_size
    }

    /// Draw a contour of `source` into every panel.
    pub fn add_contours<S: WorldSampler + ?Sized>(&mut self, kind: LayerKind, source: &S, style: ContourStyle) {
        for panel in self.panels.iter_mut() {
            let grid = panel.sample(source);
            let coverage = panel.coverage(&grid, &style);
            panel.composite(&coverage, style.color, style.alpha);
        }
        self.layers.push(Layer { kind, style });
    }

    /// Draw the unfilled outline of a binary mask.
    pub fn add_outline<S: WorldSampler + ?Sized>(&mut self, mask: &S, color: Color, line_width: f64) {
        let style = ContourStyle { level: 0.5, color, alpha: 1.0, filled: false, line_width };
        self.add_contours(LayerKind::Outline, mask, style);
    }

    /// Label every panel with its cut coordinate, e.g. `z=-12`, in the lower left corner.
    ///
    /// Text never gets taller than the panel it labels.
    pub fn annotate(&mut self, size: u32) -> Result<()> {
        let ink = Color::BLACK.to_rgba(1.0);
        for panel in self.panels.iter_mut() {
            let label = panel.cut.to_string();
            let height = panel.height();
            let baseline = height as i32 - 2;
            draw_label(&mut panel.image, &label, 2, baseline, size.min(height), ink)?;
        }
        self.annotation_size = Some(size);
        Ok(())
    }

    /// Lay out all panels side by side on the background color.
    pub fn to_image(&self) -> RgbImage {
        let width = self.panels.iter().map(|p| p.width()).sum::<u32>() + PANEL_MARGIN * (self.panels.len() as u32 + 1);
        let height = self.panels.iter().map(|p| p.height()).max().unwrap_or(0) + 2 * PANEL_MARGIN;
        let bg = self.background;
        let mut canvas = RgbaImage::from_pixel(width, height, Rgba([bg.r, bg.g, bg.b, 255]));

        let mut x = PANEL_MARGIN as i64;
        for panel in self.panels.iter() {
            imageops::replace(&mut canvas, &panel.image, x, PANEL_MARGIN as i64);
            x += (panel.width() + PANEL_MARGIN) as i64;
        }
        DynamicImage::ImageRgba8(canvas).to_rgb8()
    }

    /// Write the figure to `path`. The image format is chosen from the file extension.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let format = output_format(&path)?;
        log::debug!("Saving figure with {} panels to '{}' as {:?}.", self.panels.len(), path.as_ref().display(), format);
        DynamicImage::ImageRgb8(self.to_image()).save_with_format(path, format)?;
        Ok(())
    }

    /// The color of pixel `(x, y)` of panel `panel`, without its alpha channel.
    pub fn panel_pixel(&self, panel: usize, x: u32, y: u32) -> Rgb<u8> {
        let p = self.panels[panel].image.get_pixel(x, y);
        Rgb([p.0[0], p.0[1], p.0[2]])
    }
}

impl fmt::Display for Figure {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Slice figure in '{}' mode with {} panels and {} layers.", self.mode, self.panels.len(), self.layers.len())
    }
}


#[cfg(test)]
mod test {
    use super::*;
    use crate::affine::Affine;
    use ndarray::Array3;

    fn cube(size: usize, lo: usize, hi: usize) -> Volume {
        let mut data = Array3::<f64>::zeros((size, size, size));
        for i in lo..hi {
            for j in lo..hi {
                for k in lo..hi {
                    data[[i, j, k]] = 1.0;
                }
            }
        }
        Volume::new(data, Affine::identity())
    }

    fn z_cut(coord: f64) -> Cut {
        Cut { direction: Direction::Z, coord }
    }

    #[test]
    fn panels_cover_the_reference_grid() {
        let reference = cube(10, 3, 7);
        let fig = Figure::new(DisplayMode::Z, &[z_cut(5.0), z_cut(6.0)], &reference).unwrap();

        assert_eq!(2, fig.panels.len());
        assert_eq!(20, fig.panels[0].width());
        assert_eq!(20, fig.panels[0].height());
        // Top-left pixel center: x at the low edge, y at the high edge.
        assert_eq!([-0.25, 9.25, 5.0], fig.panels[0].pixel_to_world(0.0, 0.0));

        let img = fig.to_image();
        assert_eq!(20 * 2 + PANEL_MARGIN * 3, img.width());
        assert_eq!(20 + PANEL_MARGIN * 2, img.height());
    }

    #[test]
    fn filled_contours_are_blended_with_their_alpha() {
        let reference = cube(10, 3, 7);
        let mut fig = Figure::new(DisplayMode::Z, &[z_cut(5.0)], &reference).unwrap();
        let style = ContourStyle { level: 0.5, color: Color::BLACK, alpha: 0.5, filled: true, line_width: 1.0 };
        fig.add_contours(LayerKind::Region(0), &reference, style);

        // Pixel (10, 10) is at world (4.75, 4.25), deep inside the cube.
        assert_eq!(Rgb([128, 128, 128]), fig.panel_pixel(0, 10, 10));
        // Far corner stays background.
        assert_eq!(Rgb([255, 255, 255]), fig.panel_pixel(0, 0, 0));
        assert_eq!(LayerKind::Region(0), fig.layers()[0].kind);
    }

    #[test]
    fn outlines_leave_the_interior_untouched() {
        let reference = cube(10, 2, 8);
        let mut fig = Figure::new(DisplayMode::Z, &[z_cut(5.0)], &reference).unwrap();
        fig.add_outline(&reference, Color::BLACK, 1.0);

        assert_eq!(Rgb([255, 255, 255]), fig.panel_pixel(0, 10, 10));
        let drawn = fig.panels[0].image.pixels().filter(|p| p.0 != [255, 255, 255, 255]).count();
        assert!(drawn > 0);
        assert_eq!(LayerKind::Outline, fig.layers()[0].kind);
    }

    #[test]
    fn later_layers_cover_earlier_ones() {
        let reference = cube(10, 3, 7);
        let mut fig = Figure::new(DisplayMode::Z, &[z_cut(5.0)], &reference).unwrap();
        let red = Color::rgb(255, 0, 0);
        let blue = Color::rgb(0, 0, 255);
        fig.add_contours(LayerKind::Region(0), &reference, ContourStyle { level: 0.5, color: red, alpha: 1.0, filled: true, line_width: 1.0 });
        fig.add_contours(LayerKind::Region(1), &reference, ContourStyle { level: 0.5, color: blue, alpha: 1.0, filled: true, line_width: 1.0 });

        assert_eq!(Rgb([0, 0, 255]), fig.panel_pixel(0, 10, 10));
        assert_eq!(2, fig.layers().len());
    }

    #[test]
    fn cuts_outside_the_volume_draw_nothing() {
        let reference = cube(10, 3, 7);
        let mut fig = Figure::new(DisplayMode::Z, &[z_cut(100.0)], &reference).unwrap();
        fig.add_outline(&reference, Color::BLACK, 1.0);
        assert!(fig.panels[0].image.pixels().all(|p| p.0 == [255, 255, 255, 255]));
    }

    #[test]
    fn annotation_records_its_size_and_draws_ink() {
        let reference = cube(40, 3, 7);
        let mut fig = Figure::new(DisplayMode::Z, &[z_cut(5.0)], &reference).unwrap();
        assert_eq!(None, fig.annotation_size());

        fig.annotate(12).unwrap();
        assert_eq!(Some(12), fig.annotation_size());
        assert!(fig.panels[0].image.pixels().any(|p| p.0[0] < 128));
    }

    #[test]
    fn huge_line_widths_and_text_sizes_stay_within_the_panel() {
        let reference = cube(10, 3, 7);
        let mut fig = Figure::new(DisplayMode::Z, &[z_cut(5.0)], &reference).unwrap();
        let style = ContourStyle { level: 0.5, color: Color::BLACK, alpha: 1.0, filled: false, line_width: 1.0e9 };
        fig.add_contours(LayerKind::Outline, &reference, style);
        assert!(fig.panels[0].image.pixels().all(|p| p.0 == [0, 0, 0, 255]));

        fig.annotate(u32::MAX).unwrap();
        assert_eq!(Some(u32::MAX), fig.annotation_size());
        assert_eq!((20, 20), fig.panels[0].image.dimensions());
    }

    #[test]
    fn figures_need_cuts_and_voxels() {
        let reference = cube(4, 0, 2);
        assert!(Figure::new(DisplayMode::Z, &[], &reference).is_err());
        let empty = Volume::new(Array3::<f64>::zeros((0, 3, 3)), Affine::identity());
        assert!(Figure::new(DisplayMode::Z, &[z_cut(0.0)], &empty).is_err());
        assert!(Figure::with_resolution(DisplayMode::Z, &[z_cut(0.0)], &reference, 0.0).is_err());
    }
}
