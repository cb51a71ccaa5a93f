use crate::error::{DensityError, Result};
use crate::histogram::DEFAULT_PARALLEL_THRESHOLD;
use crate::scale::SymlogParams;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;

/// Options for constructing a [`DensityEngine`](crate::DensityEngine)
///
/// # Example
///
/// ```rust
/// use scatter_density::EngineOptions;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let options = EngineOptions::new()
///     .downres_factor(2u32)
///     .linthresh(1.0)
///     .linscale(1.0)
///     .build()?;
/// assert_eq!(options.base, 10.0);
/// # Ok(())
/// # }
/// ```
#[derive(Builder, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[builder(setter(into, strip_option), default)]
#[serde(default)]
pub struct EngineOptions {
    /// Bin-count divisor used while the view is being manipulated.
    /// Subsampling keeps every `downres_factor²`-th point.
    #[builder(default = "4")]
    pub downres_factor: u32,

    /// Half-width of the linear region of a symlog axis
    pub linthresh: Option<f64>,

    /// Stretch of the linear region of a symlog axis, in decades
    pub linscale: Option<f64>,

    /// Logarithm base of a symlog axis
    #[builder(default = "10.0")]
    pub base: f64,

    /// Point count from which the default histogram bins in parallel
    #[builder(default = "DEFAULT_PARALLEL_THRESHOLD")]
    pub parallel_threshold: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            downres_factor: 4,
            linthresh: None,
            linscale: None,
            base: 10.0,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl EngineOptions {
    /// Create a new builder for EngineOptions
    pub fn new() -> EngineOptionsBuilder {
        EngineOptionsBuilder::default()
    }

    /// Load options from a JSON document; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn symlog_params(&self) -> SymlogParams {
        SymlogParams {
            linthresh: self.linthresh,
            linscale: self.linscale,
            base: self.base,
        }
    }
}

/// Validated downres factor: a strictly positive integer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DownresFactor(NonZeroU32);

impl DownresFactor {
    pub fn get(self) -> u32 {
        self.0.get()
    }

    /// Subsampling stride, `factor²`
    pub fn stride(self) -> usize {
        let factor = self.0.get() as usize;
        factor.saturating_mul(factor)
    }

    /// Shrink a bin count for downres mode
    pub fn reduce(self, bins: usize) -> usize {
        bins / self.0.get() as usize
    }
}

impl TryFrom<u32> for DownresFactor {
    type Error = DensityError;

    fn try_from(value: u32) -> Result<Self> {
        NonZeroU32::new(value).map(Self).ok_or_else(|| {
            DensityError::configuration(
                "downres_factor should be a strictly positive integer value",
            )
        })
    }
}

/// Accepts values from untyped sources (JSON numbers, CLI floats) as long as
/// they are integral.
impl TryFrom<f64> for DownresFactor {
    type Error = DensityError;

    fn try_from(value: f64) -> Result<Self> {
        if value.fract() != 0.0 || value < 1.0 || value > u32::MAX as f64 {
            return Err(DensityError::configuration(format!(
                "downres_factor should be a strictly positive integer value, got {value}"
            )));
        }
        Self::try_from(value as u32)
    }
}
