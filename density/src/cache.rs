use crate::points::Column;
use crate::scale::{Axis, ScaleKind};
use rustc_hash::FxHashMap;

/// Cache key for a transformed coordinate column
pub type ScaleCacheKey = (Axis, ScaleKind);

/// State of a single cache slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    /// Not computed since the last point assignment
    Absent,
    /// Holds the transformed column for the current points
    Computed,
}

/// Lazily filled transformed coordinates, keyed by (axis, scale)
///
/// Slots are filled on first use and all go back to [`SlotState::Absent`]
/// when the underlying points are replaced. Linear columns are never cached;
/// they are the raw points.
#[derive(Debug, Default)]
pub struct ScaleCache {
    slots: FxHashMap<ScaleCacheKey, Column>,
}

impl ScaleCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, axis: Axis, kind: ScaleKind) -> SlotState {
        if self.slots.contains_key(&(axis, kind)) {
            SlotState::Computed
        } else {
            SlotState::Absent
        }
    }

    pub fn get(&self, axis: Axis, kind: ScaleKind) -> Option<&Column> {
        self.slots.get(&(axis, kind))
    }

    /// Return the slot for `(axis, kind)`, computing it with `transform` if absent.
    ///
    /// The subsampled projection is taken from the transformed column with the
    /// same `stride` as the raw points, so both stay index-aligned.
    pub fn get_or_compute(
        &mut self,
        axis: Axis,
        kind: ScaleKind,
        stride: usize,
        transform: impl FnOnce() -> Vec<f64>,
    ) -> &Column {
        self.slots.entry((axis, kind)).or_insert_with(|| {
            tracing::trace!(%axis, %kind, "populating scale cache slot");
            Column::new(transform(), stride)
        })
    }

    /// Reset every slot to [`SlotState::Absent`]
    pub fn clear(&mut self) {
        self.slots.clear();
    }

    /// Number of computed slots
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
