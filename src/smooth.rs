//! Gaussian smoothing of volumes, with the kernel width given as FWHM in millimetres.

use ndarray::{Array1, Array3, Axis, Zip};

use crate::volume::Volume;


/// Ratio between the full width at half maximum and the standard deviation of a Gaussian.
pub const FWHM_PER_SIGMA: f64 = 2.3548200450309493; // sqrt(8 ln 2)

/// The kernel is cut off at this many standard deviations.
const TRUNCATE: f64 = 4.0;


/// Convert a FWHM in millimetres into per-axis standard deviations in voxels.
pub fn fwhm_to_sigma(fwhm: f64, voxel_sizes: [f64; 3]) -> [f64; 3] {
    let mut sigma = [0.0; 3];
    for (axis, s) in sigma.iter_mut().enumerate() {
        *s = fwhm / FWHM_PER_SIGMA / voxel_sizes[axis];
    }
    sigma
}

/// Normalized 1D Gaussian kernel, symmetric around its center element.
pub fn gaussian_kernel(sigma: f64) -> Array1<f64> {
    if sigma <= 0.0 || !sigma.is_finite() {
        return Array1::from(vec![1.0]);
    }
    let radius = (TRUNCATE * sigma + 0.5) as isize;
    let kernel = Array1::from_iter((-radius..=radius).map(|x| (-0.5 * (x as f64 / sigma).powi(2)).exp()));
    let total = kernel.sum();
    kernel / total
}


/// Smooth a volume with an isotropic Gaussian of the given FWHM (mm), respecting its voxel sizes.
///
/// Voxels beyond the border replicate the nearest edge voxel. A non-positive FWHM returns an unchanged copy.
pub fn smooth_volume(volume: &Volume, fwhm: f64) -> Volume {
    if fwhm <= 0.0 || !fwhm.is_finite() {
        return volume.clone();
    }
    let sigma = fwhm_to_sigma(fwhm, volume.affine.voxel_sizes());
    let mut data = volume.data.clone();
    for (axis, s) in sigma.iter().enumerate() {
        data = convolve_axis(&data, Axis(axis), &gaussian_kernel(*s));
    }
    Volume::new(data, volume.affine.clone())
}


/// Convolve every 1D lane of `data` along `axis` with `kernel`.
fn convolve_axis(data: &Array3<f64>, axis: Axis, kernel: &Array1<f64>) -> Array3<f64> {
    if kernel.len() == 1 {
        return data.clone();
    }
    let radius = (kernel.len() / 2) as isize;
    let mut out = Array3::<f64>::zeros(data.raw_dim());

    Zip::from(out.lanes_mut(axis))
        .and(data.lanes(axis))
        .for_each(|mut out_lane, lane| {
            let n = lane.len() as isize;
            for i in 0..n {
                let mut acc = 0.0;
                for (k, w) in kernel.iter().enumerate() {
                    let src = (i + k as isize - radius).max(0).min(n - 1);
                    acc += w * lane[src as usize];
                }
                out_lane[i as usize] = acc;
            }
        });
    out
}
