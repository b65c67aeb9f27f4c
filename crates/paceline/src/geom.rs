//! Bounding boxes and camera fitting for route display.
//!
//! Zoom here is the slippy-map kind: at zoom `z` the world is `256 * 2^z`
//! pixels wide, with latitude squeezed through the Web Mercator projection.

use std::f64::consts::PI;

/// Highest zoom a fit will request. Reached for single-point tracks, where
/// the box has no extent at all.
pub const MAX_FIT_ZOOM: f64 = 17.0;

/// Geographic bounding box, degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl GeoBounds {
    /// Bounds of the given coordinates, or `None` when there are none.
    pub fn from_coords(coords: impl IntoIterator<Item = (f64, f64)>) -> Option<Self> {
        let mut it = coords.into_iter();
        let (lat, lon) = it.next()?;
        let mut bounds = GeoBounds {
            min_lat: lat,
            max_lat: lat,
            min_lon: lon,
            max_lon: lon,
        };
        for (lat, lon) in it {
            bounds.min_lat = bounds.min_lat.min(lat);
            bounds.max_lat = bounds.max_lat.max(lat);
            bounds.min_lon = bounds.min_lon.min(lon);
            bounds.max_lon = bounds.max_lon.max(lon);
        }
        Some(bounds)
    }

    /// Visual center: longitude midpoint, latitude midpoint taken in
    /// Mercator space so the box sits centered on screen.
    pub fn center(&self) -> (f64, f64) {
        let lon = (self.min_lon + self.max_lon) / 2.0;
        let y = (mercator_y(self.min_lat) + mercator_y(self.max_lat)) / 2.0;
        (mercator_lat(y), lon)
    }
}

/// Camera placement produced by [`fit_camera`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraFit {
    pub lat: f64,
    pub lon: f64,
    pub zoom: f64,
}

/// Fit `bounds` inside a `width` x `height` surface, keeping `padding`
/// pixels free on every side. Degenerate boxes (a single point) fit at
/// [`MAX_FIT_ZOOM`]; surfaces smaller than the padding collapse to a
/// 1 px interior rather than inverting.
pub fn fit_camera(bounds: &GeoBounds, width: f32, height: f32, padding: f32) -> CameraFit {
    let inner_w = f64::from((width - 2.0 * padding).max(1.0));
    let inner_h = f64::from((height - 2.0 * padding).max(1.0));

    let span_x = (bounds.max_lon - bounds.min_lon).abs() / 360.0;
    let span_y = (mercator_y(bounds.min_lat) - mercator_y(bounds.max_lat)).abs();

    let zoom_x = zoom_for_span(span_x, inner_w);
    let zoom_y = zoom_for_span(span_y, inner_h);
    let zoom = zoom_x.min(zoom_y).clamp(0.0, MAX_FIT_ZOOM);

    let (lat, lon) = bounds.center();
    CameraFit { lat, lon, zoom }
}

/// Zoom at which a normalized world span occupies exactly `pixels`.
fn zoom_for_span(span: f64, pixels: f64) -> f64 {
    if span <= 0.0 {
        return MAX_FIT_ZOOM;
    }
    (pixels / (256.0 * span)).log2()
}

/// Normalized Web Mercator y in [0, 1], 0 at the north clip edge.
fn mercator_y(lat: f64) -> f64 {
    let rad = lat.clamp(-85.0511, 85.0511).to_radians();
    (1.0 - rad.tan().asinh() / PI) / 2.0
}

/// Inverse of [`mercator_y`], degrees.
fn mercator_lat(y: f64) -> f64 {
    (PI * (1.0 - 2.0 * y)).sinh().atan().to_degrees()
}
