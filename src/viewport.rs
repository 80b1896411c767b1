//! # Viewport Scaling
//!
//! Scale management for an interactive preview of the fixed page. The page
//! never reflows; the host applies the scale factor returned here as a
//! uniform transform and re-queries on every container resize and gesture.
//!
//! Two zoom channels feed the same scale value. Auto-fit follows the
//! container until the user zooms by hand, which pins the scale; pinch
//! gestures use a wider clamp than the button zoom so touch users can
//! magnify past the button ceiling.

use crate::model::{PAGE_HEIGHT, PAGE_WIDTH};

/// Increment applied per zoom button press.
pub const ZOOM_STEP: f64 = 0.1;
/// Lower clamp shared by button zoom and pinch.
pub const MIN_SCALE: f64 = 0.3;
/// Upper clamp for button zoom.
pub const MAX_SCALE: f64 = 1.5;
/// Upper clamp for pinch zoom.
pub const PINCH_MAX_SCALE: f64 = 3.0;
/// Auto-fit never shrinks the page below this.
pub const AUTO_FIT_MIN: f64 = 0.45;
/// Auto-fit never magnifies past natural size.
pub const AUTO_FIT_MAX: f64 = 1.0;

/// Margin the auto-fit reserves around the page, in logical units.
const FIT_MARGIN: f64 = 32.0;

/// Compute the pinch scale from the distance ratio of the two touch
/// points, clamped to the pinch range.
pub fn pinch_scale(start_distance: f64, current_distance: f64, base_scale: f64) -> f64 {
    if start_distance <= 0.0 {
        return base_scale;
    }
    let scaled = base_scale * (current_distance / start_distance);
    scaled.clamp(MIN_SCALE, PINCH_MAX_SCALE)
}

/// One tracked touch point, in container coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    pub id: u64,
    pub x: f64,
    pub y: f64,
}

/// Stateful scale controller for the page preview.
#[derive(Debug, Clone)]
pub struct ViewportScaler {
    scale: f64,
    /// Set once the user zooms manually; auto-fit stops overriding.
    manual_zoom: bool,
    touch_points: Vec<TouchPoint>,
    pinch_start_distance: Option<f64>,
    pinch_base_scale: f64,
}

impl Default for ViewportScaler {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewportScaler {
    pub fn new() -> Self {
        Self {
            scale: 0.6,
            manual_zoom: false,
            touch_points: Vec::new(),
            pinch_start_distance: None,
            pinch_base_scale: 0.6,
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn is_pinned(&self) -> bool {
        self.manual_zoom
    }

    /// Fit the page into a container of the given size. A no-op once the
    /// user has zoomed manually.
    pub fn auto_fit(&mut self, container_width: f64, container_height: f64) -> f64 {
        if !self.manual_zoom {
            let fit_w = (container_width - FIT_MARGIN) / PAGE_WIDTH;
            let fit_h = (container_height - FIT_MARGIN) / PAGE_HEIGHT;
            self.scale = fit_w.min(fit_h).clamp(AUTO_FIT_MIN, AUTO_FIT_MAX);
        }
        self.scale
    }

    pub fn zoom_in(&mut self) -> f64 {
        self.manual_zoom = true;
        self.scale = (self.scale + ZOOM_STEP).clamp(MIN_SCALE, MAX_SCALE);
        self.scale
    }

    pub fn zoom_out(&mut self) -> f64 {
        self.manual_zoom = true;
        self.scale = (self.scale - ZOOM_STEP).clamp(MIN_SCALE, MAX_SCALE);
        self.scale
    }

    /// Clear the manual pin and let the next `auto_fit` take over again.
    pub fn reset(&mut self) {
        self.manual_zoom = false;
    }

    pub fn touch_down(&mut self, point: TouchPoint) {
        self.touch_points.retain(|p| p.id != point.id);
        self.touch_points.push(point);
        if self.touch_points.len() == 2 {
            self.pinch_start_distance = Some(distance(self.touch_points[0], self.touch_points[1]));
            self.pinch_base_scale = self.scale;
        }
    }

    pub fn touch_up(&mut self, id: u64) {
        self.touch_points.retain(|p| p.id != id);
        if self.touch_points.len() < 2 {
            // The reference distance is stale once a finger lifts.
            self.pinch_start_distance = None;
        }
    }

    /// Update a moving touch point. Only adjusts the scale while exactly
    /// two points are down; pinching pins the scale like button zoom does.
    pub fn pinch_move(&mut self, point: TouchPoint) -> f64 {
        if let Some(existing) = self.touch_points.iter_mut().find(|p| p.id == point.id) {
            *existing = point;
        }
        if self.touch_points.len() == 2 {
            if let Some(start) = self.pinch_start_distance {
                let current = distance(self.touch_points[0], self.touch_points[1]);
                self.scale = pinch_scale(start, current, self.pinch_base_scale);
                self.manual_zoom = true;
            }
        }
        self.scale
    }
}

fn distance(a: TouchPoint, b: TouchPoint) -> f64 {
    ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
}
