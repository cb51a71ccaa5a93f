use ndarray::Array2;
use rayon::prelude::*;

/// Grid shape as `(rows, cols)`, i.e. `(y bins, x bins)`
pub type BinShape = (usize, usize);

/// Binning bounds as `((ymin, ymax), (xmin, xmax))`
pub type BinRange = ((f64, f64), (f64, f64));

/// Point count from which [`DenseHistogram`] folds in parallel
///
/// Below this the per-thread grid allocation and the final reduction cost more
/// than they save.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 500_000;

/// Fast 2D histogram primitive
///
/// Implementations must bin counts and weighted sums with identical geometry,
/// so that dividing one by the other gives an aligned per-bin average.
///
/// Contract:
/// - the output has shape `bins`, rows indexed by `y`, columns by `x`;
/// - bin `i` along an axis covers `[min + i*w, min + (i+1)*w)` with
///   `w = (max - min) / n`, the last bin also including `max`;
/// - NaN, infinite and out-of-range coordinates are skipped;
/// - a non-finite or empty range yields an all-zero grid.
pub trait Histogram2d {
    fn histogram2d(
        &self,
        y: &[f64],
        x: &[f64],
        bins: BinShape,
        range: BinRange,
        weights: Option<&[f64]>,
    ) -> Array2<f64>;
}

impl<H: Histogram2d + ?Sized> Histogram2d for &H {
    fn histogram2d(
        &self,
        y: &[f64],
        x: &[f64],
        bins: BinShape,
        range: BinRange,
        weights: Option<&[f64]>,
    ) -> Array2<f64> {
        (**self).histogram2d(y, x, bins, range, weights)
    }
}

/// Uniform bins along one axis
#[derive(Debug, Clone, Copy)]
struct AxisBins {
    min: f64,
    max: f64,
    last: usize,
    /// 1.0, or 0.5 when `max - min` overflows f64
    prescale: f64,
    origin: f64,
    scale: f64,
}

impl AxisBins {
    fn new(n: usize, (min, max): (f64, f64)) -> Option<Self> {
        if n == 0 || !min.is_finite() || !max.is_finite() || max <= min {
            return None;
        }
        // Halving is exact, so ordinary ranges bin exactly as without it
        let prescale = if (max - min).is_finite() { 1.0 } else { 0.5 };
        let origin = min * prescale;
        Some(Self {
            min,
            max,
            last: n - 1,
            prescale,
            origin,
            scale: n as f64 / (max * prescale - origin),
        })
    }

    #[inline]
    fn index(&self, value: f64) -> Option<usize> {
        // Written so that NaN fails the test
        if !(value >= self.min && value <= self.max) {
            return None;
        }
        let idx = ((value * self.prescale - self.origin) * self.scale) as usize;
        Some(idx.min(self.last))
    }
}

/// Dense, array-backed histogram
///
/// Sequential for typical plot sizes; large inputs are folded into at most one
/// grid per rayon thread and summed.
#[derive(Debug, Clone, Copy)]
pub struct DenseHistogram {
    parallel_threshold: usize,
}

impl Default for DenseHistogram {
    fn default() -> Self {
        Self {
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl DenseHistogram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parallel_threshold(parallel_threshold: usize) -> Self {
        Self { parallel_threshold }
    }
}

impl Histogram2d for DenseHistogram {
    fn histogram2d(
        &self,
        y: &[f64],
        x: &[f64],
        bins: BinShape,
        range: BinRange,
        weights: Option<&[f64]>,
    ) -> Array2<f64> {
        let (ny, nx) = bins;
        let ((ymin, ymax), (xmin, xmax)) = range;
        let (Some(y_bins), Some(x_bins)) =
            (AxisBins::new(ny, (ymin, ymax)), AxisBins::new(nx, (xmin, xmax)))
        else {
            return Array2::zeros((ny, nx));
        };

        let n = match weights {
            Some(w) => y.len().min(x.len()).min(w.len()),
            None => y.len().min(x.len()),
        };
        let weight_at = |i: usize| weights.map_or(1.0, |w| w[i]);
        let locate = |i: usize| Some((y_bins.index(y[i])?, x_bins.index(x[i])?));

        if n >= self.parallel_threshold {
            // Each split allocates a full grid; keep splits to one per thread
            let min_len = n.div_ceil(rayon::current_num_threads()).max(1);
            (0..n)
                .into_par_iter()
                .with_min_len(min_len)
                .fold(
                    || Array2::<f64>::zeros((ny, nx)),
                    |mut acc, i| {
                        if let Some(cell) = locate(i) {
                            acc[cell] += weight_at(i);
                        }
                        acc
                    },
                )
                .reduce(|| Array2::<f64>::zeros((ny, nx)), |a, b| a + b)
        } else {
            let mut grid = Array2::<f64>::zeros((ny, nx));
            for i in 0..n {
                if let Some(cell) = locate(i) {
                    grid[cell] += weight_at(i);
                }
            }
            grid
        }
    }
}
