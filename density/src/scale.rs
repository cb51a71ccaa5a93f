use crate::error::{DensityError, Result};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Plot axis selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
}

/// Axis scale kinds the engine knows how to bin in
///
/// Names follow the plotting surface vocabulary: `"linear"`, `"log"` and
/// `"symlog"`. Parsing is case-sensitive.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ScaleKind {
    /// Identity
    Linear,
    /// Base-10 logarithm
    Log,
    /// Symmetric logarithm: linear around zero, logarithmic beyond `linthresh`
    Symlog,
}

impl ScaleKind {
    /// Parse a scale name reported for `axis`.
    ///
    /// Unknown names are a hard error; there is no fallback to linear.
    pub fn parse(axis: Axis, name: &str) -> Result<Self> {
        name.parse()
            .map_err(|_| DensityError::unsupported_scale(axis, name))
    }
}

/// Mutable symlog parameters as set on the engine
///
/// `linthresh` and `linscale` may be left unset as long as no axis is
/// displayed in symlog; they are checked when a symlog scale is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SymlogParams {
    pub linthresh: Option<f64>,
    pub linscale: Option<f64>,
    pub base: f64,
}

impl Default for SymlogParams {
    fn default() -> Self {
        Self {
            linthresh: None,
            linscale: None,
            base: 10.0,
        }
    }
}

impl SymlogParams {
    /// Resolve into a fully specified [`Symlog`] transform.
    pub fn resolve(&self) -> Result<Symlog> {
        let linthresh = self
            .linthresh
            .ok_or_else(|| DensityError::missing_scale_parameter("linthresh"))?;
        let linscale = self
            .linscale
            .ok_or_else(|| DensityError::missing_scale_parameter("linscale"))?;
        Ok(Symlog::new(linthresh, linscale, self.base))
    }
}

/// Symmetric-logarithmic transform
///
/// For `|v| <= linthresh` the value is scaled by `adj = linscale / (1 - 1/base)`;
/// beyond it the transform is `sign(v) * linthresh * (adj + log_base(|v| / linthresh))`.
/// Both branches agree at `|v| == linthresh`.
///
/// No input is rejected: a zero `linthresh` or a `base` of one produce NaN or
/// infinite outputs, which the binning step later ignores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Symlog {
    pub linthresh: f64,
    pub linscale: f64,
    pub base: f64,
}

impl Symlog {
    pub fn new(linthresh: f64, linscale: f64, base: f64) -> Self {
        Self {
            linthresh,
            linscale,
            base,
        }
    }

    /// Slope of the linear region, `linscale / (1 - base^-1)`
    pub fn linscale_adj(&self) -> f64 {
        self.linscale / (1.0 - self.base.recip())
    }

    /// Linear-region branch, valid for `|v| <= linthresh`
    pub fn linear_branch(&self, value: f64) -> f64 {
        value * self.linscale_adj()
    }

    /// Logarithmic branch, valid for `|v| > linthresh`
    pub fn log_branch(&self, value: f64) -> f64 {
        let log_base = (value.abs() / self.linthresh).ln() / self.base.ln();
        sign(value) * self.linthresh * (self.linscale_adj() + log_base)
    }

    pub fn forward(&self, value: f64) -> f64 {
        if value.abs() <= self.linthresh {
            self.linear_branch(value)
        } else {
            self.log_branch(value)
        }
    }

    pub fn inverse(&self, value: f64) -> f64 {
        let adj = self.linscale_adj();
        if value.abs() <= self.linthresh * adj {
            value / adj
        } else {
            sign(value) * self.linthresh * self.base.powf(value.abs() / self.linthresh - adj)
        }
    }
}

/// Sign with `sign(0) == 0` and NaN passthrough.
///
/// `f64::signum` maps zero to one, which would turn the `0 * inf` case of a
/// degenerate threshold into an infinity instead of NaN.
fn sign(value: f64) -> f64 {
    if value == 0.0 || value.is_nan() {
        value * 0.0
    } else {
        value.signum()
    }
}

/// Trait for types that map values between data space and display space
pub trait Transformable {
    fn transform(&self, value: f64) -> f64;
    fn inverse_transform(&self, value: f64) -> f64;
}

/// A scale kind together with the parameters in effect for one call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ScaleTransform {
    Linear,
    Log,
    Symlog(Symlog),
}

impl ScaleTransform {
    /// Pair `kind` with the current symlog parameters.
    pub fn resolve(kind: ScaleKind, params: &SymlogParams) -> Result<Self> {
        Ok(match kind {
            ScaleKind::Linear => ScaleTransform::Linear,
            ScaleKind::Log => ScaleTransform::Log,
            ScaleKind::Symlog => ScaleTransform::Symlog(params.resolve()?),
        })
    }

    pub fn kind(&self) -> ScaleKind {
        match self {
            ScaleTransform::Linear => ScaleKind::Linear,
            ScaleTransform::Log => ScaleKind::Log,
            ScaleTransform::Symlog(_) => ScaleKind::Symlog,
        }
    }

    /// Transform every value of a column
    pub fn transform_all(&self, values: &[f64]) -> Vec<f64> {
        values.iter().map(|&v| self.transform(v)).collect()
    }

    /// Transform a `(min, max)` view bound pair
    pub fn transform_range(&self, (min, max): (f64, f64)) -> (f64, f64) {
        (self.transform(min), self.transform(max))
    }
}

impl Transformable for ScaleTransform {
    fn transform(&self, value: f64) -> f64 {
        match self {
            ScaleTransform::Linear => value,
            ScaleTransform::Log => value.log10(),
            ScaleTransform::Symlog(symlog) => symlog.forward(value),
        }
    }

    fn inverse_transform(&self, value: f64) -> f64 {
        match self {
            ScaleTransform::Linear => value,
            ScaleTransform::Log => 10f64.powf(value),
            ScaleTransform::Symlog(symlog) => symlog.inverse(value),
        }
    }
}
