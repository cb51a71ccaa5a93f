//! Raw and subsampled point stores.
//!
//! Columns are held as `Arc<[f64]>` so that the engine can hand the selected
//! coordinates to the binning primitive while it still owns (and may later
//! mutate) its caches.

use crate::error::{DensityError, Result};
use crate::scale::Axis;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use strum_macros::Display;

/// Whether binning runs over all points at the requested grid, or over the
/// subsampled points at a coarser grid while the view is being manipulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ResolutionMode {
    #[default]
    Full,
    Downres,
}

/// Take every `stride`-th element, starting with the first.
pub fn subsample(values: &[f64], stride: usize) -> Arc<[f64]> {
    values.iter().step_by(stride.max(1)).copied().collect()
}

/// Full column and its subsampled projection
#[derive(Debug, Clone)]
pub struct Column {
    full: Arc<[f64]>,
    sub: Arc<[f64]>,
}

impl Column {
    pub fn new(values: impl Into<Arc<[f64]>>, stride: usize) -> Self {
        let full: Arc<[f64]> = values.into();
        let sub = subsample(&full, stride);
        Self { full, sub }
    }

    pub fn full(&self) -> &Arc<[f64]> {
        &self.full
    }

    pub fn sub(&self) -> &Arc<[f64]> {
        &self.sub
    }

    pub fn select(&self, mode: ResolutionMode) -> &Arc<[f64]> {
        match mode {
            ResolutionMode::Full => &self.full,
            ResolutionMode::Downres => &self.sub,
        }
    }

    pub fn len(&self) -> usize {
        self.full.len()
    }

    pub fn is_empty(&self) -> bool {
        self.full.is_empty()
    }
}

/// Paired x/y coordinates; replaced wholesale, never edited in place
#[derive(Debug, Clone)]
pub struct PointSet {
    x: Column,
    y: Column,
}

impl PointSet {
    pub fn new(x: Vec<f64>, y: Vec<f64>, stride: usize) -> Result<Self> {
        if x.len() != y.len() {
            return Err(DensityError::length_mismatch("y", x.len(), y.len()));
        }
        Ok(Self {
            x: Column::new(x, stride),
            y: Column::new(y, stride),
        })
    }

    pub fn column(&self, axis: Axis) -> &Column {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
        }
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}
