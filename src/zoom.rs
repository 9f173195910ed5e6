//! Pinch-to-zoom mapping
//!
//! A pinch gesture reports a scale factor relative to where it began. The
//! mapper multiplies that scale onto the zoom captured at gesture start, maps
//! the product from a fixed reference domain onto the device's zoom range and
//! clamps the result. It is a pure transform, cheap enough to run on every
//! gesture update.

use serde::{Deserialize, Serialize};

/// Reference input domain the raw `baseline * scale` value is mapped from
pub const ZOOM_REFERENCE_DOMAIN: [f32; 2] = [1.0, 10.0];

/// Inclusive zoom range reported by a device
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomBounds {
    pub min: f32,
    pub max: f32,
}

impl ZoomBounds {
    /// Build bounds, swapping the ends if a device reports them reversed.
    /// A non-finite end collapses onto the other one (1x when both are bad).
    pub fn new(min: f32, max: f32) -> Self {
        let (min, max) = match (min.is_finite(), max.is_finite()) {
            (true, true) => (min, max),
            (true, false) => (min, min),
            (false, true) => (max, max),
            (false, false) => (1.0, 1.0),
        };
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    /// Clamp into range. NaN maps to `min`.
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            return self.min;
        }
        value.clamp(self.min, self.max)
    }

    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Linearly map `raw` from `domain` onto `bounds`, saturating outside the domain.
pub fn interpolate_zoom(raw: f32, domain: [f32; 2], bounds: ZoomBounds) -> f32 {
    let [d0, d1] = domain;
    let span = d1 - d0;
    if span <= 0.0 || !span.is_finite() {
        return bounds.clamp(raw);
    }
    if raw.is_nan() {
        return bounds.min;
    }

    let t = ((raw - d0) / span).clamp(0.0, 1.0);
    bounds.clamp(bounds.min + t * (bounds.max - bounds.min))
}

/// Zoom state for one pinch gesture
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomGesture {
    baseline: f32,
}

impl ZoomGesture {
    /// Start a gesture from the zoom current at this instant
    pub fn begin(current: Option<f32>, neutral_zoom: f32) -> Self {
        let baseline = match current {
            Some(z) if z.is_finite() => z,
            _ => neutral_zoom,
        };
        Self { baseline }
    }

    pub fn baseline(&self) -> f32 {
        self.baseline
    }

    /// Zoom level for a scale factor relative to gesture start
    pub fn update(&self, scale: f32, domain: [f32; 2], bounds: ZoomBounds) -> f32 {
        let raw = self.baseline * scale;
        if raw.is_nan() {
            return bounds.clamp(self.baseline);
        }
        interpolate_zoom(raw, domain, bounds)
    }
}
