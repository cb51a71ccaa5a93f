use crate::cache::{ScaleCache, SlotState};
use crate::error::{DensityError, Result};
use crate::histogram::{BinRange, BinShape, DenseHistogram, Histogram2d};
use crate::options::{DownresFactor, EngineOptions};
use crate::points::{Column, PointSet, ResolutionMode, subsample};
use crate::scale::{Axis, ScaleKind, ScaleTransform, SymlogParams};
use crate::surface::AxisScales;
use ndarray::Array2;
use std::sync::Arc;
use tracing::{debug, trace};

/// Optional per-point weights and their subsampled projection
#[derive(Debug, Clone)]
struct WeightSet {
    full: Arc<[f64]>,
    sub: Arc<[f64]>,
}

impl WeightSet {
    fn select(&self, mode: ResolutionMode) -> &Arc<[f64]> {
        match mode {
            ResolutionMode::Full => &self.full,
            ResolutionMode::Downres => &self.sub,
        }
    }
}

/// Result of one binning call, with the geometry it was computed on
#[derive(Debug, Clone)]
pub struct DensityGrid {
    /// Counts, or per-bin weighted averages (NaN where a bin is empty)
    pub values: Array2<f64>,
    /// Bin shape actually used, `(rows, cols)`
    pub bins: BinShape,
    /// Range bounds in transformed (scale) space, `((ymin, ymax), (xmin, xmax))`
    pub range: BinRange,
    pub x_scale: ScaleKind,
    pub y_scale: ScaleKind,
    pub mode: ResolutionMode,
}

impl DensityGrid {
    pub fn into_values(self) -> Array2<f64> {
        self.values
    }

    /// Sum of all finite bins
    pub fn total(&self) -> f64 {
        self.values.iter().filter(|v| v.is_finite()).sum()
    }
}

/// On-demand density histogram of a fixed point cloud
///
/// The engine keeps the raw points, a subsampled copy (every
/// `downres_factor²`-th point) and lazily transformed log/symlog coordinates,
/// and bins whichever set matches the current axis scales and resolution
/// mode.
///
/// # Example
///
/// ```rust
/// use scatter_density::{DensityEngine, EngineOptions, StaticScales};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let x = vec![1.0, 2.0, 3.0, 4.0, 100.0];
/// let y = x.clone();
/// let options = EngineOptions::new().downres_factor(2u32).build()?;
/// let mut engine = DensityEngine::new(StaticScales::default(), x, y, None, &options)?;
///
/// let full = engine.compute((2, 2), ((0.0, 100.0), (0.0, 100.0)))?;
/// assert_eq!(full.sum(), 5.0);
///
/// engine.downres();
/// let coarse = engine.compute((2, 2), ((0.0, 100.0), (0.0, 100.0)))?;
/// assert_eq!(coarse.shape(), &[1, 1]);
/// assert_eq!(coarse.sum(), 2.0);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct DensityEngine<S, H = DenseHistogram> {
    surface: S,
    histogram: H,
    downres_factor: DownresFactor,
    points: PointSet,
    weights: Option<WeightSet>,
    cache: ScaleCache,
    params: SymlogParams,
    mode: ResolutionMode,
}

impl<S: AxisScales> DensityEngine<S, DenseHistogram> {
    /// Create an engine binning with [`DenseHistogram`].
    pub fn new(
        surface: S,
        x: Vec<f64>,
        y: Vec<f64>,
        c: Option<Vec<f64>>,
        options: &EngineOptions,
    ) -> Result<Self> {
        let histogram = DenseHistogram::with_parallel_threshold(options.parallel_threshold);
        Self::with_histogram(surface, histogram, x, y, c, options)
    }
}

impl<S: AxisScales, H: Histogram2d> DensityEngine<S, H> {
    /// The image should be recomputed while an interaction is in progress,
    /// not only once it settles.
    pub const COMPUTE_WHEN_PRESSED: bool = true;

    /// Create an engine with a custom binning primitive.
    pub fn with_histogram(
        surface: S,
        histogram: H,
        x: Vec<f64>,
        y: Vec<f64>,
        c: Option<Vec<f64>>,
        options: &EngineOptions,
    ) -> Result<Self> {
        let downres_factor = DownresFactor::try_from(options.downres_factor)?;
        let points = PointSet::new(x, y, downres_factor.stride())?;
        let mut engine = Self {
            surface,
            histogram,
            downres_factor,
            points,
            weights: None,
            cache: ScaleCache::new(),
            params: options.symlog_params(),
            mode: ResolutionMode::Full,
        };
        engine.set_c(c)?;
        debug!(
            points = engine.points.len(),
            downres_factor = downres_factor.get(),
            weighted = engine.weights.is_some(),
            "density engine created"
        );
        Ok(engine)
    }

    /// Switch to coarse binning over the subsampled points.
    pub fn downres(&mut self) {
        trace!("downres");
        self.mode = ResolutionMode::Downres;
    }

    /// Switch back to full resolution.
    pub fn upres(&mut self) {
        trace!("upres");
        self.mode = ResolutionMode::Full;
    }

    pub fn is_downres(&self) -> bool {
        self.mode == ResolutionMode::Downres
    }

    pub fn mode(&self) -> ResolutionMode {
        self.mode
    }

    /// Replace the points.
    ///
    /// Recomputes the subsampled coordinates and drops every transformed
    /// column; they are rebuilt on the next call that needs them. Weights are
    /// kept as they are.
    pub fn set_xy(&mut self, x: Vec<f64>, y: Vec<f64>) -> Result<()> {
        self.points = PointSet::new(x, y, self.stride())?;
        self.cache.clear();
        debug!(points = self.points.len(), "points replaced");
        Ok(())
    }

    /// Replace the weights, or clear them with `None` to count points.
    pub fn set_c(&mut self, c: Option<Vec<f64>>) -> Result<()> {
        self.weights = match c {
            None => None,
            Some(c) => {
                if c.len() != self.points.len() {
                    return Err(DensityError::length_mismatch(
                        "weights",
                        self.points.len(),
                        c.len(),
                    ));
                }
                let sub = subsample(&c, self.stride());
                Some(WeightSet {
                    full: c.into(),
                    sub,
                })
            }
        };
        Ok(())
    }

    /// Set the symlog linear threshold.
    ///
    /// Already computed symlog columns are not invalidated; see
    /// [`clear_scale_cache`](Self::clear_scale_cache).
    pub fn set_linthresh(&mut self, linthresh: Option<f64>) {
        self.params.linthresh = linthresh;
    }

    /// Set the symlog linear-region scale. Does not invalidate cached columns.
    pub fn set_linscale(&mut self, linscale: Option<f64>) {
        self.params.linscale = linscale;
    }

    /// Set the symlog logarithm base. Does not invalidate cached columns.
    pub fn set_base(&mut self, base: f64) {
        self.params.base = base;
    }

    /// Drop all transformed columns so they are rebuilt with the current
    /// symlog parameters.
    pub fn clear_scale_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cache_state(&self, axis: Axis, kind: ScaleKind) -> SlotState {
        self.cache.state(axis, kind)
    }

    /// Transformed column for `(axis, kind)`, if it has been computed
    pub fn cached_column(&self, axis: Axis, kind: ScaleKind) -> Option<&Column> {
        self.cache.get(axis, kind)
    }

    pub fn x(&self) -> &[f64] {
        self.points.column(Axis::X).full()
    }

    pub fn y(&self) -> &[f64] {
        self.points.column(Axis::Y).full()
    }

    pub fn c(&self) -> Option<&[f64]> {
        self.weights.as_ref().map(|w| &*w.full)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn downres_factor(&self) -> u32 {
        self.downres_factor.get()
    }

    /// Subsampling stride, `downres_factor²`
    pub fn stride(&self) -> usize {
        self.downres_factor.stride()
    }

    pub fn symlog_params(&self) -> SymlogParams {
        self.params
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Bin the points for a view of `bins = (rows, cols)` over
    /// `range = ((ymin, ymax), (xmin, xmax))`, given in display coordinates.
    ///
    /// Returns counts, or per-bin weighted averages when weights are set.
    pub fn compute(&mut self, bins: BinShape, range: BinRange) -> Result<Array2<f64>> {
        Ok(self.compute_histogram(bins, range)?.into_values())
    }

    /// Like [`compute`](Self::compute), also reporting the geometry used.
    pub fn compute_histogram(&mut self, bins: BinShape, range: BinRange) -> Result<DensityGrid> {
        let x_kind = ScaleKind::parse(Axis::X, self.surface.x_scale())?;
        let y_kind = ScaleKind::parse(Axis::Y, self.surface.y_scale())?;
        // Parameters are read now, not when a cached column was built
        let x_transform = ScaleTransform::resolve(x_kind, &self.params)?;
        let y_transform = ScaleTransform::resolve(y_kind, &self.params)?;

        let ((ymin, ymax), (xmin, xmax)) = range;
        let range = (
            y_transform.transform_range((ymin, ymax)),
            x_transform.transform_range((xmin, xmax)),
        );

        let mode = self.mode;
        let x = self.coordinates(Axis::X, &x_transform, mode);
        let y = self.coordinates(Axis::Y, &y_transform, mode);

        let (ny, nx) = bins;
        let bins = match mode {
            ResolutionMode::Full => (ny, nx),
            ResolutionMode::Downres => (
                self.downres_factor.reduce(ny),
                self.downres_factor.reduce(nx),
            ),
        };

        let weights = self.weights.as_ref().map(|w| Arc::clone(w.select(mode)));
        if let Some(w) = &weights {
            if w.len() != x.len() {
                return Err(DensityError::length_mismatch("weights", x.len(), w.len()));
            }
        }

        debug!(
            %x_kind,
            %y_kind,
            %mode,
            points = x.len(),
            rows = bins.0,
            cols = bins.1,
            weighted = weights.is_some(),
            "binning"
        );

        let values = match weights {
            None => self.histogram.histogram2d(&y, &x, bins, range, None),
            Some(w) => {
                let sum = self.histogram.histogram2d(&y, &x, bins, range, Some(&w[..]));
                let count = self.histogram.histogram2d(&y, &x, bins, range, None);
                // Empty bins become 0 / 0 = NaN
                sum / &count
            }
        };

        Ok(DensityGrid {
            values,
            bins,
            range,
            x_scale: x_kind,
            y_scale: y_kind,
            mode,
        })
    }

    /// Coordinates of `axis` in the space of `transform`, filling the cache
    /// slot on first use.
    fn coordinates(
        &mut self,
        axis: Axis,
        transform: &ScaleTransform,
        mode: ResolutionMode,
    ) -> Arc<[f64]> {
        let raw = self.points.column(axis);
        match transform.kind() {
            ScaleKind::Linear => Arc::clone(raw.select(mode)),
            kind => {
                let stride = self.downres_factor.stride();
                let column = self.cache.get_or_compute(axis, kind, stride, || {
                    transform.transform_all(raw.full())
                });
                Arc::clone(column.select(mode))
            }
        }
    }
}
