//! Voxel-to-world transforms of NIfTI volumes.

use nalgebra::{Matrix4, RowVector4, Vector4};

use crate::error::{Result, RoisliceError};


/// A 4x4 affine matrix mapping voxel indices `(i, j, k)` to world coordinates in millimetres.
#[derive(Debug, Clone, PartialEq)]
pub struct Affine {
    pub matrix: Matrix4<f64>,
    inverse: Matrix4<f64>,
}

impl Affine {

    /// Build an affine from a 4x4 matrix. The last row is forced to `[0, 0, 0, 1]`.
    ///
    /// Fails with [`RoisliceError::InvalidInput`] if the linear part is singular.
    pub fn new(matrix: Matrix4<f64>) -> Result<Affine> {
        let mut matrix = matrix;
        matrix.set_row(3, &RowVector4::new(0.0, 0.0, 0.0, 1.0));
        let singular = || RoisliceError::InvalidInput(String::from("affine transform is singular"));

        let det = matrix.determinant();
        if !det.is_finite() || det.abs() < 1e-12 {
            return Err(singular());
        }
        let inverse = matrix.try_inverse().ok_or_else(singular)?;
        Ok(Affine { matrix, inverse })
    }

    /// An axis-aligned affine with the given voxel sizes and world position of voxel `(0, 0, 0)`.
    pub fn from_scale_and_offset(voxel_size: [f64; 3], offset: [f64; 3]) -> Result<Affine> {
        #[rustfmt::skip]
        let matrix = Matrix4::new(
            voxel_size[0], 0.0, 0.0, offset[0],
            0.0, voxel_size[1], 0.0, offset[1],
            0.0, 0.0, voxel_size[2], offset[2],
            0.0, 0.0, 0.0, 1.0,
        );
        Affine::new(matrix)
    }

    /// The identity transform: one millimetre per voxel, origin at voxel `(0, 0, 0)`.
    pub fn identity() -> Affine {
        Affine { matrix: Matrix4::identity(), inverse: Matrix4::identity() }
    }

    /// Map a (possibly fractional) voxel index to world coordinates.
    pub fn voxel_to_world(&self, voxel: [f64; 3]) -> [f64; 3] {
        apply(&self.matrix, voxel)
    }

    /// Map world coordinates to a fractional voxel index.
    pub fn world_to_voxel(&self, world: [f64; 3]) -> [f64; 3] {
        apply(&self.inverse, world)
    }

    /// The voxel edge lengths in millimetres, i.e. the norms of the first three columns.
    pub fn voxel_sizes(&self) -> [f64; 3] {
        let mut sizes = [0.0; 3];
        for (axis, size) in sizes.iter_mut().enumerate() {
            *size = self.matrix.fixed_view::<3, 1>(0, axis).norm();
        }
        sizes
    }
}


fn apply(m: &Matrix4<f64>, p: [f64; 3]) -> [f64; 3] {
    let out = m * Vector4::new(p[0], p[1], p[2], 1.0);
    [out[0], out[1], out[2]]
}
