//! # scatter-density
//!
//! On-demand 2D density histograms of large point clouds, for drawing as an
//! image behind an interactive scatter plot.
//!
//! ## Overview
//!
//! A [`DensityEngine`] owns the points (and optional per-point weights) and is
//! asked for a grid of bin values every time the view changes. It:
//!
//! - follows the axis scales of the plotting surface (`linear`, `log`,
//!   `symlog`), transforming both the points and the requested range;
//! - caches transformed coordinates per (axis, scale), computing each at most
//!   once per point assignment;
//! - bins a subsampled copy of the points onto a coarser grid while the view is
//!   being panned or zoomed ([`DensityEngine::downres`]), and everything at
//!   full resolution once it settles ([`DensityEngine::upres`]).
//!
//! Without weights each bin holds a point count; with weights it holds the
//! average weight of the points in the bin, NaN for empty bins.
//!
//! ## Basic Usage
//!
//! ```rust
//! use scatter_density::{DensityEngine, EngineOptions, ScaleKind, StaticScales};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let x: Vec<f64> = (1..=1000).map(f64::from).collect();
//! let y: Vec<f64> = x.iter().map(|v| v * 2.0).collect();
//! let options = EngineOptions::new().downres_factor(4u32).build()?;
//! let mut engine = DensityEngine::new(StaticScales::uniform(ScaleKind::Log), x, y, None, &options)?;
//!
//! // 64 rows (y) by 128 columns (x), ((ymin, ymax), (xmin, xmax)) in data units
//! let image = engine.compute((64, 128), ((1.0, 2000.0), (1.0, 1000.0)))?;
//! assert_eq!(image.shape(), &[64, 128]);
//! assert_eq!(image.sum(), 1000.0);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - `engine`: the [`DensityEngine`] and its [`DensityGrid`] result
//! - `scale`: axis scale kinds and the log/symlog transforms
//! - `cache`: lazily filled transformed-coordinate slots
//! - `points`: raw and subsampled point columns, resolution mode
//! - `histogram`: the [`Histogram2d`] binning primitive and its default
//!   implementation
//! - `surface`: the [`AxisScales`] query the engine makes of the plotting surface
//! - `options`: [`EngineOptions`] built with the builder pattern
//! - `error`: [`DensityError`]

pub mod cache;
pub mod engine;
pub mod error;
pub mod histogram;
pub mod options;
pub mod points;
pub mod scale;
pub mod surface;

// Re-export commonly used types
pub use cache::{ScaleCache, SlotState};
pub use engine::{DensityEngine, DensityGrid};
pub use error::{DensityError, Result};
pub use histogram::{BinRange, BinShape, DenseHistogram, Histogram2d};
pub use options::{DownresFactor, EngineOptions, EngineOptionsBuilder};
pub use points::{Column, ResolutionMode};
pub use scale::{Axis, ScaleKind, ScaleTransform, Symlog, SymlogParams, Transformable};
pub use surface::{AxisScales, StaticScales};
