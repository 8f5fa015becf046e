//! Iso-contours of 2D slices using the marching squares algorithm.
//!
//! Grids are indexed `[[row, col]]`. Points are returned in grid coordinates, with `x` along
//! columns and `y` along rows, so a point `(x, y)` lies between the samples around `[[y, x]]`.

use ndarray::{Array2, ArrayView2};


/// A point in grid coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Point {
        Point { x, y }
    }
}

/// A straight piece of a contour line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}


/// Compute the line segments where `grid` crosses `level`.
///
/// Samples `>= level` count as inside. Cells with a NaN corner are skipped.
///
/// # Examples
///
/// ```
/// use ndarray::arr2;
/// let grid = arr2(&[[0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 0.0]]);
/// let segments = roislice::contour::march_squares(grid.view(), 0.5);
/// assert_eq!(4, segments.len());
/// ```
pub fn march_squares(grid: ArrayView2<f64>, level: f64) -> Vec<Segment> {
    let (rows, cols) = grid.dim();
    if rows < 2 || cols < 2 {
        return vec![];
    }

    let mut segments = Vec::new();
    for y in 0..rows - 1 {
        for x in 0..cols - 1 {
            let tl = grid[[y, x]];
            let tr = grid[[y, x + 1]];
            let br = grid[[y + 1, x + 1]];
            let bl = grid[[y + 1, x]];
            if tl.is_nan() || tr.is_nan() || br.is_nan() || bl.is_nan() {
                continue;
            }

            let mut case = 0u8;
            if tl >= level { case |= 1; }
            if tr >= level { case |= 2; }
            if br >= level { case |= 4; }
            if bl >= level { case |= 8; }
            if case == 0 || case == 15 {
                continue;
            }

            let (x, y) = (x as f64, y as f64);
            let top = interpolate(Point::new(x, y), Point::new(x + 1.0, y), tl, tr, level);
            let right = interpolate(Point::new(x + 1.0, y), Point::new(x + 1.0, y + 1.0), tr, br, level);
            let bottom = interpolate(Point::new(x, y + 1.0), Point::new(x + 1.0, y + 1.0), bl, br, level);
            let left = interpolate(Point::new(x, y), Point::new(x, y + 1.0), tl, bl, level);

            let seg = |start, end| Segment { start, end };
            match case {
                1 | 14 => segments.push(seg(left, top)),
                2 | 13 => segments.push(seg(top, right)),
                3 | 12 => segments.push(seg(left, right)),
                4 | 11 => segments.push(seg(right, bottom)),
                6 | 9 => segments.push(seg(top, bottom)),
                7 | 8 => segments.push(seg(left, bottom)),
                5 | 10 => {
                    // Saddle: resolve with the cell average.
                    let center_inside = (tl + tr + br + bl) / 4.0 >= level;
                    if (case == 5) == center_inside {
                        segments.push(seg(left, bottom));
                        segments.push(seg(top, right));
                    } else {
                        segments.push(seg(left, top));
                        segments.push(seg(right, bottom));
                    }
                }
                _ => {}
            }
        }
    }
    segments
}

/// The point between `p1` and `p2` where the linearly interpolated value equals `level`.
fn interpolate(p1: Point, p2: Point, v1: f64, v2: f64, level: f64) -> Point {
    if (v2 - v1).abs() < 1e-12 {
        return Point::new((p1.x + p2.x) / 2.0, (p1.y + p2.y) / 2.0);
    }
    let t = ((level - v1) / (v2 - v1)).max(0.0).min(1.0);
    Point::new(p1.x + t * (p2.x - p1.x), p1.y + t * (p2.y - p1.y))
}


/// Boolean fill of the region enclosed by the contour at `level`: every sample `>= level`.
pub fn fill_mask(grid: ArrayView2<f64>, level: f64) -> Array2<bool> {
    grid.mapv(|v| v >= level)
}
