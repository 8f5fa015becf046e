//! Functions for loading brain volumes and 4D label atlases from NIfTI files.
//!
//! Decoding is done by the `nifti` crate; this module turns the result into `ndarray` arrays
//! paired with the voxel-to-world [`Affine`] of the file.

use ndarray::{Array3, Array4, ArrayView3, Axis, Ix3, Ix4};
use nifti::{IntoNdArray, NiftiHeader, NiftiObject, ReaderOptions};

use std::fmt;
use std::path::Path;

use crate::affine::Affine;
use crate::error::{Result, RoisliceError};
use crate::traits::WorldSampler;


/// A 3D scalar field on a voxel grid, with its voxel-to-world transform.
#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    pub data: Array3<f64>,
    pub affine: Affine,
}

/// A stack of 3D label planes, one per region of interest, sharing one affine.
///
/// The region axis comes first: `data[[r, i, j, k]]`.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelVolume {
    pub data: Array4<f64>,
    pub affine: Affine,
}


impl Volume {

    pub fn new(data: Array3<f64>, affine: Affine) -> Volume {
        Volume { data, affine }
    }

    /// Read a 3D volume from a `.nii` or `.nii.gz` file.
    ///
    /// A 4D file is accepted if it holds a single frame.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Volume> {
        let (data, affine) = load_nifti(path.as_ref())?;
        let data = match data.ndim() {
            3 => data.into_dimensionality::<Ix3>(),
            4 if data.shape()[3] == 1 => data.index_axis_move(Axis(3), 0).into_dimensionality::<Ix3>(),
            _ => {
                return Err(RoisliceError::InvalidInput(format!(
                    "expected a 3D volume in '{}', got shape {:?}", path.as_ref().display(), data.shape())));
            }
        }
        .map_err(|e| RoisliceError::InvalidInput(e.to_string()))?;
        Ok(Volume { data, affine })
    }

    /// The voxel grid dimensions.
    pub fn dims(&self) -> [usize; 3] {
        let s = self.data.shape();
        [s[0], s[1], s[2]]
    }
}

impl WorldSampler for Volume {
    fn sample_world(&self, world: [f64; 3]) -> f64 {
        trilinear(self.data.view(), self.affine.world_to_voxel(world))
    }
}

impl fmt::Display for Volume {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Brain volume with {:?} voxels of size {:?} mm.", self.dims(), self.affine.voxel_sizes())
    }
}


impl LabelVolume {

    pub fn new(data: Array4<f64>, affine: Affine) -> LabelVolume {
        LabelVolume { data, affine }
    }

    /// Read a label atlas from a `.nii` or `.nii.gz` file.
    ///
    /// Regions are stored along the fourth (time) axis of the file and moved to the front. A 3D file yields
    /// a single region.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<LabelVolume> {
        let (data, affine) = load_nifti(path.as_ref())?;
        let data = match data.ndim() {
            3 => data.insert_axis(Axis(3)).into_dimensionality::<Ix4>(),
            4 => data.into_dimensionality::<Ix4>(),
            _ => {
                return Err(RoisliceError::InvalidInput(format!(
                    "expected a 4D label volume in '{}', got shape {:?}", path.as_ref().display(), data.shape())));
            }
        }
        .map_err(|e| RoisliceError::InvalidInput(e.to_string()))?;

        // (x, y, z, region) -> (region, x, y, z)
        let data = data.permuted_axes([3, 0, 1, 2]).as_standard_layout().into_owned();
        Ok(LabelVolume { data, affine })
    }

    /// The number of region planes.
    pub fn num_regions(&self) -> usize {
        self.data.len_of(Axis(0))
    }

    /// The voxel grid dimensions of a single plane.
    pub fn dims(&self) -> [usize; 3] {
        let s = self.data.shape();
        [s[1], s[2], s[3]]
    }

    /// The label plane of the region at `index`.
    ///
    /// # Panics
    ///
    /// If `index` is not smaller than [`LabelVolume::num_regions`].
    pub fn region(&self, index: usize) -> ArrayView3<f64> {
        self.data.index_axis(Axis(0), index)
    }

    /// A copy of the label plane at `index` as a standalone [`Volume`].
    pub fn region_volume(&self, index: usize) -> Volume {
        Volume::new(self.region(index).to_owned(), self.affine.clone())
    }

    /// Set every voxel of the region at `index` to zero.
    pub fn clear_region(&mut self, index: usize) {
        self.data.index_axis_mut(Axis(0), index).fill(0.0);
    }

    /// The binary union of all region planes: `sign(sum over regions)` per voxel.
    pub fn combined_mask(&self) -> Volume {
        let mask = self.data.sum_axis(Axis(0)).mapv(|v| {
            if v > 0.0 {
                1.0
            } else if v < 0.0 {
                -1.0
            } else {
                0.0
            }
        });
        Volume::new(mask, self.affine.clone())
    }
}

impl fmt::Display for LabelVolume {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Label volume with {} regions on a {:?} voxel grid.", self.num_regions(), self.dims())
    }
}


/// Read a 3D brain volume from a NIfTI file.
///
/// # Examples
///
/// ```no_run
/// let t1 = roislice::read_volume("/opt/fsl/6.0.1/data/standard/MNI152_T1_1mm_brain.nii.gz").unwrap();
/// println!("{}", t1);
/// ```
pub fn read_volume<P: AsRef<Path>>(path: P) -> Result<Volume> {
    Volume::from_file(path)
}

/// Read a 4D label atlas from a NIfTI file, regions along the leading axis of the result.
///
/// # Examples
///
/// ```no_run
/// let atlas = roislice::read_label_volume("/path/to/atlas4d.nii.gz").unwrap();
/// println!("Atlas holds {} regions.", atlas.num_regions());
/// ```
pub fn read_label_volume<P: AsRef<Path>>(path: P) -> Result<LabelVolume> {
    LabelVolume::from_file(path)
}


fn load_nifti(path: &Path) -> Result<(ndarray::ArrayD<f64>, Affine)> {
    log::debug!("Loading NIfTI volume '{}'.", path.display());
    let load_err = |err| RoisliceError::ResourceLoad(path.to_path_buf(), err);

    let obj = ReaderOptions::new().read_file(path).map_err(load_err)?;
    let affine = header_affine(obj.header())?;
    let data = obj.into_volume().into_ndarray::<f64>().map_err(load_err)?;
    Ok((data, affine))
}

/// The voxel-to-world transform stored in a NIfTI header.
///
/// The sform takes precedence over the qform. If neither is set, the transform follows from the voxel
/// sizes, centered on the middle of the grid with x flipped.
pub fn header_affine(header: &NiftiHeader) -> Result<Affine> {
    let invalid = |msg: &str| RoisliceError::InvalidInput(format!("unusable NIfTI header: {}", msg));
    if !(3..=7).contains(&header.dim[0]) {
        return Err(invalid("a volume needs 3 to 7 dimensions"));
    }

    let mut header = header.clone();
    if header.sform_code == 0 && header.qform_code != 0 {
        if header.pixdim[1..4].iter().any(|&d| d < 0.0) {
            return Err(invalid("negative voxel size"));
        }
        let (b, c, d) = (header.quatern_b as f64, header.quatern_c as f64, header.quatern_d as f64);
        if 1.0 - (b * b + c * c + d * d) < -3.0 * f32::EPSILON as f64 {
            return Err(invalid("qform quaternion is not a rotation"));
        }
        // qfac other than -1 reads as 1
        if header.pixdim[0] != -1.0 {
            header.pixdim[0] = 1.0;
        }
    }
    Affine::new(header.affine::<f64>())
}


/// Trilinear interpolation at a fractional voxel index. Positions outside the grid read as zero.
pub(crate) fn trilinear(data: ArrayView3<f64>, voxel: [f64; 3]) -> f64 {
    let dims = data.shape();
    let mut base = [0usize; 3];
    let mut frac = [0.0f64; 3];
    for axis in 0..3 {
        if dims[axis] == 0 {
            return 0.0;
        }
        let v = voxel[axis];
        let max = (dims[axis] - 1) as f64;
        if !v.is_finite() || v < -0.5 || v > max + 0.5 {
            return 0.0;
        }
        let v = v.max(0.0).min(max);
        let lo = v.floor().min((max - 1.0).max(0.0));
        base[axis] = lo as usize;
        frac[axis] = v - lo;
    }

    let at = |di: usize, dj: usize, dk: usize| {
        let i = (base[0] + di).min(dims[0] - 1);
        let j = (base[1] + dj).min(dims[1] - 1);
        let k = (base[2] + dk).min(dims[2] - 1);
        data[[i, j, k]]
    };

    let mut value = 0.0;
    for (di, wi) in [(0, 1.0 - frac[0]), (1, frac[0])].iter() {
        for (dj, wj) in [(0, 1.0 - frac[1]), (1, frac[1])].iter() {
            for (dk, wk) in [(0, 1.0 - frac[2]), (1, frac[2])].iter() {
                let w = wi * wj * wk;
                if w != 0.0 {
                    value += w * at(*di, *dj, *dk);
                }
            }
        }
    }
    value
}
