use crate::scale::ScaleKind;
use serde::{Deserialize, Serialize};

/// Query side of the plotting surface the density image is drawn on
///
/// The engine asks for both scale names on every binning call, since the
/// user can switch an axis between linear, log and symlog without the data
/// changing. Names are returned as reported by the surface and validated by
/// the engine, so a surface may legitimately report a scale the engine does
/// not support.
pub trait AxisScales {
    fn x_scale(&self) -> &str;
    fn y_scale(&self) -> &str;
}

impl<T: AxisScales + ?Sized> AxisScales for &T {
    fn x_scale(&self) -> &str {
        (**self).x_scale()
    }

    fn y_scale(&self) -> &str {
        (**self).y_scale()
    }
}

/// Fixed, settable scale names for hosts without a live surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticScales {
    pub x: String,
    pub y: String,
}

impl Default for StaticScales {
    fn default() -> Self {
        Self::uniform(ScaleKind::Linear)
    }
}

impl StaticScales {
    pub fn new(x: impl Into<String>, y: impl Into<String>) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
        }
    }

    /// Both axes on the same scale
    pub fn uniform(kind: ScaleKind) -> Self {
        Self::new(kind.as_ref(), kind.as_ref())
    }

    pub fn set_x_scale(&mut self, name: impl Into<String>) {
        self.x = name.into();
    }

    pub fn set_y_scale(&mut self, name: impl Into<String>) {
        self.y = name.into();
    }
}

impl AxisScales for StaticScales {
    fn x_scale(&self) -> &str {
        &self.x
    }

    fn y_scale(&self) -> &str {
        &self.y
    }
}
