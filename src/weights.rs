//! Per-region values that scale how strongly each region of interest is drawn.

use ndarray::Array1;
use ndarray_stats::QuantileExt;

use crate::error::{Result, RoisliceError};


/// Region weights scaled into `[0, 1]` by their maximum, one per region of interest.
///
/// A weight of exactly `0.0` excludes the region from the combined mask and from drawing.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionWeights {
    pub values: Array1<f64>,
}

impl RegionWeights {

    /// Validate and scale raw region values.
    ///
    /// Fails with [`RoisliceError::InvalidInput`] if `raw` is empty or holds a negative or non-finite
    /// value, and with [`RoisliceError::DegenerateInput`] if all values are zero.
    ///
    /// # Examples
    ///
    /// ```
    /// let w = roislice::RegionWeights::normalize(&[1.0, 0.0, 0.5]).unwrap();
    /// assert_eq!(w.values.to_vec(), vec![1.0, 0.0, 0.5]);
    /// assert_eq!(w.included(), vec![0, 2]);
    /// ```
    pub fn normalize(raw: &[f64]) -> Result<RegionWeights> {
        if raw.is_empty() {
            return Err(RoisliceError::InvalidInput(String::from("region weights must not be empty")));
        }
        if let Some(idx) = raw.iter().position(|v| !v.is_finite()) {
            return Err(RoisliceError::InvalidInput(format!("region weight {} is not a finite number", idx)));
        }
        if let Some(idx) = raw.iter().position(|v| *v < 0.0) {
            return Err(RoisliceError::InvalidInput(format!("negative weight {} for region {}", raw[idx], idx)));
        }

        let values = Array1::from(raw.to_vec());
        let max = *values.max().map_err(|e| RoisliceError::InvalidInput(e.to_string()))?;
        if max == 0.0 {
            return Err(RoisliceError::DegenerateInput);
        }

        Ok(RegionWeights { values: values / max })
    }

    /// The number of regions.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether the region at `index` is drawn at all.
    pub fn is_included(&self, index: usize) -> bool {
        self.values[index] != 0.0
    }

    /// Indices of all regions with a non-zero weight, in ascending order.
    pub fn included(&self) -> Vec<usize> {
        (0..self.len()).filter(|&idx| self.is_included(idx)).collect()
    }

    /// Indices of all regions with weight zero, in ascending order.
    pub fn excluded(&self) -> Vec<usize> {
        (0..self.len()).filter(|&idx| !self.is_included(idx)).collect()
    }
}
