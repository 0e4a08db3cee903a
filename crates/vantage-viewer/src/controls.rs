//! Pure input-to-transform mappings for the viewer.

/// Zoom factor for one scroll notch: scrolling up narrows the view.
pub fn zoom_scale(y_offset: f64) -> f32 {
    if y_offset > 0.0 { 0.95 } else { 1.05 }
}

/// Pixels of drag per radian, halved.
const DRAG_PIXELS: f64 = 1000.0;

/// Converts a cursor move into `(roll, yaw)` degrees.
///
/// Horizontal drag turns the model about Y, vertical drag about Z.
pub fn drag_degrees(prev: (f64, f64), now: (f64, f64)) -> (f32, f32) {
    let roll = (prev.0 - now.0) / DRAG_PIXELS * 2.0;
    let yaw = (prev.1 - now.1) / DRAG_PIXELS * 2.0;
    (roll.to_degrees() as f32, yaw.to_degrees() as f32)
}
