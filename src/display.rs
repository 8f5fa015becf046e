//! Display modes (which anatomical planes to cut) and the world coordinates of the cuts.

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, RoisliceError};
use crate::volume::Volume;


/// A world axis. A cut along an axis shows the plane perpendicular to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    X,
    Y,
    Z,
}

impl Direction {
    pub fn to_usize(&self) -> usize {
        match self {
            Direction::X => 0,
            Direction::Y => 1,
            Direction::Z => 2,
        }
    }

    /// The two world axes spanning the cut plane, as (horizontal, vertical) on screen.
    pub fn in_plane(&self) -> (Direction, Direction) {
        match self {
            Direction::X => (Direction::Y, Direction::Z),
            Direction::Y => (Direction::X, Direction::Z),
            Direction::Z => (Direction::X, Direction::Y),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::X => write!(f, "x"),
            Direction::Y => write!(f, "y"),
            Direction::Z => write!(f, "z"),
        }
    }
}


/// Which planes are shown: several cuts along one axis, or one cut each along several axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    X,
    Y,
    Z,
    XZ,
    YZ,
    YX,
    Ortho,
}

impl DisplayMode {

    /// The cut directions in on-screen order.
    pub fn directions(&self) -> Vec<Direction> {
        match self {
            DisplayMode::X => vec![Direction::X],
            DisplayMode::Y => vec![Direction::Y],
            DisplayMode::Z => vec![Direction::Z],
            DisplayMode::XZ => vec![Direction::X, Direction::Z],
            DisplayMode::YZ => vec![Direction::Y, Direction::Z],
            DisplayMode::YX => vec![Direction::Y, Direction::X],
            DisplayMode::Ortho => vec![Direction::X, Direction::Y, Direction::Z],
        }
    }

    /// Whether all cuts are taken along a single axis.
    pub fn is_single_axis(&self) -> bool {
        self.directions().len() == 1
    }
}

impl Default for DisplayMode {
    fn default() -> DisplayMode {
        DisplayMode::Z
    }
}

impl FromStr for DisplayMode {
    type Err = RoisliceError;

    fn from_str(s: &str) -> Result<DisplayMode> {
        match s.trim().to_ascii_lowercase().as_str() {
            "x" => Ok(DisplayMode::X),
            "y" => Ok(DisplayMode::Y),
            "z" => Ok(DisplayMode::Z),
            "xz" => Ok(DisplayMode::XZ),
            "yz" => Ok(DisplayMode::YZ),
            "yx" => Ok(DisplayMode::YX),
            "ortho" => Ok(DisplayMode::Ortho),
            other => Err(RoisliceError::InvalidInput(format!("unknown display mode '{}'", other))),
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DisplayMode::X => "x",
            DisplayMode::Y => "y",
            DisplayMode::Z => "z",
            DisplayMode::XZ => "xz",
            DisplayMode::YZ => "yz",
            DisplayMode::YX => "yx",
            DisplayMode::Ortho => "ortho",
        };
        write!(f, "{}", name)
    }
}


/// Where to cut: a number of evenly spaced cuts, or explicit world coordinates in millimetres.
#[derive(Debug, Clone, PartialEq)]
pub enum CutSpec {
    Count(usize),
    Coords(Vec<f64>),
}

impl Default for CutSpec {
    fn default() -> CutSpec {
        CutSpec::Count(5)
    }
}

impl From<usize> for CutSpec {
    fn from(n: usize) -> CutSpec {
        CutSpec::Count(n)
    }
}

impl From<Vec<f64>> for CutSpec {
    fn from(coords: Vec<f64>) -> CutSpec {
        CutSpec::Coords(coords)
    }
}


/// A single cut: the plane perpendicular to `direction` at world coordinate `coord`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cut {
    pub direction: Direction,
    pub coord: f64,
}

impl fmt::Display for Cut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.direction, self.coord.round() as i64)
    }
}


/// Check a cut specification against a display mode without looking at any data.
pub fn validate_cuts(mode: DisplayMode, spec: &CutSpec) -> Result<()> {
    match spec {
        CutSpec::Count(0) if mode.is_single_axis() => {
            Err(RoisliceError::InvalidInput(String::from("the number of cuts must be positive")))
        }
        CutSpec::Coords(coords) if coords.is_empty() => {
            Err(RoisliceError::InvalidInput(String::from("the list of cut coordinates must not be empty")))
        }
        CutSpec::Coords(coords) if coords.iter().any(|c| !c.is_finite()) => {
            Err(RoisliceError::InvalidInput(String::from("cut coordinates must be finite")))
        }
        CutSpec::Coords(coords) if !mode.is_single_axis() && coords.len() != mode.directions().len() => {
            Err(RoisliceError::InvalidInput(format!(
                "display mode '{}' needs {} cut coordinates, got {}", mode, mode.directions().len(), coords.len())))
        }
        _ => Ok(()),
    }
}

/// Resolve the cuts to draw, using `reference` (the combined ROI mask) to place automatic cuts.
///
/// For a single-axis mode, `Count(n)` places `n` cuts evenly inside the world extent of the non-zero voxels
/// along that axis, excluding its ends. Multi-axis modes with `Count(_)` cut through the mask's center of mass.
/// An empty mask falls back to the full volume.
pub fn resolve_cuts(mode: DisplayMode, spec: &CutSpec, reference: &Volume) -> Result<Vec<Cut>> {
    validate_cuts(mode, spec)?;
    let directions = mode.directions();

    let cuts: Vec<Cut> = match spec {
        CutSpec::Coords(coords) if mode.is_single_axis() => {
            coords.iter().map(|&coord| Cut { direction: directions[0], coord }).collect()
        }
        CutSpec::Coords(coords) => {
            directions.iter().zip(coords.iter()).map(|(&direction, &coord)| Cut { direction, coord }).collect()
        }
        CutSpec::Count(n) if mode.is_single_axis() => {
            let direction = directions[0];
            let (lo, hi) = world_extent(reference, direction);
            (1..=*n)
                .map(|i| Cut { direction, coord: lo + (hi - lo) * i as f64 / (*n as f64 + 1.0) })
                .collect()
        }
        CutSpec::Count(_) => {
            let center = center_of_mass(reference);
            directions.iter().map(|&direction| Cut { direction, coord: center[direction.to_usize()] }).collect()
        }
    };
    Ok(cuts)
}


/// World coordinates of the corners of the voxel box `[lo, hi]` (inclusive voxel indices).
fn box_corners(volume: &Volume, lo: [usize; 3], hi: [usize; 3]) -> Vec<[f64; 3]> {
    let mut corners = Vec::with_capacity(8);
    for &i in [lo[0], hi[0]].iter() {
        for &j in [lo[1], hi[1]].iter() {
            for &k in [lo[2], hi[2]].iter() {
                corners.push(volume.affine.voxel_to_world([i as f64, j as f64, k as f64]));
            }
        }
    }
    corners
}

/// The voxel bounding box of all non-zero voxels, or the full grid if there are none.
pub fn nonzero_bounds(volume: &Volume) -> ([usize; 3], [usize; 3]) {
    let dims = volume.dims();
    let mut lo = dims;
    let mut hi = [0usize; 3];
    let mut any = false;
    for ((i, j, k), v) in volume.data.indexed_iter() {
        if *v != 0.0 {
            any = true;
            let idx = [i, j, k];
            for axis in 0..3 {
                lo[axis] = lo[axis].min(idx[axis]);
                hi[axis] = hi[axis].max(idx[axis]);
            }
        }
    }
    if any {
        (lo, hi)
    } else {
        ([0; 3], [dims[0].saturating_sub(1), dims[1].saturating_sub(1), dims[2].saturating_sub(1)])
    }
}

/// The world-space extent `(min, max)` of the non-zero voxels along `direction`.
pub fn world_extent(volume: &Volume, direction: Direction) -> (f64, f64) {
    let (lo, hi) = nonzero_bounds(volume);
    let axis = direction.to_usize();
    box_corners(volume, lo, hi)
        .iter()
        .map(|c| c[axis])
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(mn, mx), v| (mn.min(v), mx.max(v)))
}

/// The world-space center of mass of the absolute voxel values, or the grid center for an all-zero volume.
pub fn center_of_mass(volume: &Volume) -> [f64; 3] {
    let mut total = 0.0;
    let mut acc = [0.0f64; 3];
    for ((i, j, k), v) in volume.data.indexed_iter() {
        let w = v.abs();
        if w > 0.0 {
            total += w;
            acc[0] += w * i as f64;
            acc[1] += w * j as f64;
            acc[2] += w * k as f64;
        }
    }
    let voxel = if total > 0.0 {
        [acc[0] / total, acc[1] / total, acc[2] / total]
    } else {
        let d = volume.dims();
        let half = |axis: usize| (d[axis] as f64 - 1.0).max(0.0) / 2.0;
        [half(0), half(1), half(2)]
    };
    volume.affine.voxel_to_world(voxel)
}
