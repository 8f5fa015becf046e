//! Synthetic NIfTI-1 fixtures for the integration tests.

use ndarray::{Array3, Array4};
use nifti::writer::WriterOptions;
use nifti::NiftiHeader;

use std::path::Path;

/// A header with an axis-aligned sform and no qform.
pub fn sform_header(voxel_size: [f32; 3], origin: [f32; 3]) -> NiftiHeader {
    NiftiHeader {
        pixdim: [1.0, voxel_size[0], voxel_size[1], voxel_size[2], 1.0, 1.0, 1.0, 1.0],
        sform_code: 1,
        qform_code: 0,
        srow_x: [voxel_size[0], 0.0, 0.0, origin[0]],
        srow_y: [0.0, voxel_size[1], 0.0, origin[1]],
        srow_z: [0.0, 0.0, voxel_size[2], origin[2]],
        xyzt_units: 10,
        ..NiftiHeader::default()
    }
}

/// A header with only a qform: a 180 degree rotation about z and a flipped z axis (qfac -1).
pub fn qform_header(voxel_size: [f32; 3], offset: [f32; 3]) -> NiftiHeader {
    NiftiHeader {
        pixdim: [-1.0, voxel_size[0], voxel_size[1], voxel_size[2], 1.0, 1.0, 1.0, 1.0],
        sform_code: 0,
        qform_code: 1,
        quatern_d: 1.0,
        quatern_x: offset[0],
        quatern_y: offset[1],
        quatern_z: offset[2],
        xyzt_units: 10,
        ..NiftiHeader::default()
    }
}

/// A header with neither sform nor qform, only voxel sizes.
pub fn bare_header(voxel_size: [f32; 3]) -> NiftiHeader {
    NiftiHeader {
        pixdim: [1.0, voxel_size[0], voxel_size[1], voxel_size[2], 1.0, 1.0, 1.0, 1.0],
        sform_code: 0,
        qform_code: 0,
        xyzt_units: 10,
        ..NiftiHeader::default()
    }
}

/// Write a 3D volume given as `data[[i, j, k]]` with the geometry of `header`. A `.gz` path is compressed.
pub fn write_volume_with_header(path: &Path, data: &Array3<f32>, header: &NiftiHeader) {
    WriterOptions::new(path).reference_header(header).write_nifti(data).unwrap();
}

/// Write a 3D volume with an axis-aligned sform.
pub fn write_volume(path: &Path, data: &Array3<f32>, voxel_size: [f32; 3], origin: [f32; 3]) {
    write_volume_with_header(path, data, &sform_header(voxel_size, origin));
}

/// Write a label atlas given as `data[[region, i, j, k]]`; regions go to the fourth axis of the file.
pub fn write_atlas(path: &Path, data: &Array4<f32>, voxel_size: [f32; 3], origin: [f32; 3]) {
    let header = sform_header(voxel_size, origin);
    let xyzr = data.view().permuted_axes([1, 2, 3, 0]);
    WriterOptions::new(path).reference_header(&header).write_nifti(&xyzr).unwrap();
}

/// Three box-shaped regions side by side along x on a 30^3 grid with 1mm voxels.
pub fn three_region_atlas() -> Array4<f32> {
    let mut data = Array4::<f32>::zeros((3, 30, 30, 30));
    for (r, x0) in [4usize, 12, 20].iter().enumerate() {
        for i in *x0..x0 + 6 {
            for j in 10..20 {
                for k in 10..20 {
                    data[[r, i, j, k]] = 1.0;
                }
            }
        }
    }
    data
}

/// A "head": intensity 6000 inside a centered ball, 200 in a shell around it, 0 outside.
pub fn structural_image() -> Array3<f32> {
    Array3::from_shape_fn((30, 30, 30), |(i, j, k)| {
        let d = ((i as f32 - 14.5).powi(2) + (j as f32 - 14.5).powi(2) + (k as f32 - 14.5).powi(2)).sqrt();
        if d < 9.0 {
            6000.0
        } else if d < 13.0 {
            200.0
        } else {
            0.0
        }
    })
}
