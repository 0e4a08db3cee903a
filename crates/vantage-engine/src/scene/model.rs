use glam::Mat4;

use crate::core::Engine;
use crate::render::{MatrixSink, RenderError, RenderHandle, RenderObject};

/// Rotation axis of a [`Model`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Axis {
    /// About X.
    Pitch,
    /// About Y.
    Roll,
    /// About Z.
    Yaw,
}

/// Wraps an angle in degrees into `[0, 360)`.
pub fn wrap_degrees(angle: f32) -> f32 {
    let wrapped = angle - (angle / 360.0).floor() * 360.0;
    // A tiny negative input rounds up to exactly 360.
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Model matrix from three Euler angles in degrees.
///
/// The matrix is `Rz(yaw) * Ry(roll) * Rx(pitch)`, rebuilt from the angles
/// on every change.
pub struct Model {
    object: RenderObject,
    pitch: f32,
    roll: f32,
    yaw: f32,
}

impl Model {
    pub fn new(engine: &Engine, sink: impl MatrixSink + 'static) -> Self {
        Self {
            object: RenderObject::new(engine, "model", sink),
            pitch: 0.0,
            roll: 0.0,
            yaw: 0.0,
        }
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn roll(&self) -> f32 {
        self.roll
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn angle(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Pitch => self.pitch,
            Axis::Roll => self.roll,
            Axis::Yaw => self.yaw,
        }
    }

    /// Adds `delta` degrees to one axis.
    pub fn rotate(&mut self, axis: Axis, delta: f32) -> Result<(), RenderError> {
        self.set(axis, self.angle(axis) + delta)
    }

    pub fn inc_pitch(&mut self, delta: f32) -> Result<(), RenderError> {
        self.rotate(Axis::Pitch, delta)
    }

    pub fn inc_roll(&mut self, delta: f32) -> Result<(), RenderError> {
        self.rotate(Axis::Roll, delta)
    }

    pub fn inc_yaw(&mut self, delta: f32) -> Result<(), RenderError> {
        self.rotate(Axis::Yaw, delta)
    }

    pub fn set_pitch(&mut self, angle: f32) -> Result<(), RenderError> {
        self.set(Axis::Pitch, angle)
    }

    pub fn set_roll(&mut self, angle: f32) -> Result<(), RenderError> {
        self.set(Axis::Roll, angle)
    }

    pub fn set_yaw(&mut self, angle: f32) -> Result<(), RenderError> {
        self.set(Axis::Yaw, angle)
    }

    /// Sets one axis, wrapped into `[0, 360)`, and pushes the new matrix.
    pub fn set(&mut self, axis: Axis, angle: f32) -> Result<(), RenderError> {
        let angle = wrap_degrees(angle);
        match axis {
            Axis::Pitch => self.pitch = angle,
            Axis::Roll => self.roll = angle,
            Axis::Yaw => self.yaw = angle,
        }
        log::trace!("{axis:?}: {angle}");

        self.object.set_transform(self.matrix())?;
        self.object.render(true)
    }

    /// The matrix the current angles describe.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_rotation_z(self.yaw.to_radians())
            * Mat4::from_rotation_y(self.roll.to_radians())
            * Mat4::from_rotation_x(self.pitch.to_radians())
    }

    pub fn handle(&self) -> RenderHandle {
        self.object.handle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::ManualTimer;
    use crate::render::testing::RecordingSink;
    use std::sync::Arc;

    fn model() -> (Model, RecordingSink) {
        let engine = Engine::with_timers(Arc::new(ManualTimer::new()));
        engine.render_thread().bind_current();
        let sink = RecordingSink::default();
        (Model::new(&engine, sink.clone()), sink)
    }

    #[test]
    fn wrap_degrees_stays_in_range() {
        assert_eq!(wrap_degrees(0.0), 0.0);
        assert_eq!(wrap_degrees(360.0), 0.0);
        assert_eq!(wrap_degrees(370.0), 10.0);
        assert_eq!(wrap_degrees(720.0), 0.0);
        assert_eq!(wrap_degrees(-90.0), 270.0);
        assert_eq!(wrap_degrees(-1e-7), 0.0);
        for a in [-1000.5f32, -360.0, -0.25, 359.9, 12345.0] {
            let w = wrap_degrees(a);
            assert!((0.0..360.0).contains(&w), "{a} wrapped to {w}");
        }
    }

    #[test]
    fn twelve_thirty_degree_steps_return_to_zero() {
        let (mut model, sink) = model();
        for _ in 0..12 {
            model.inc_pitch(30.0).unwrap();
        }

        assert_eq!(model.pitch(), 0.0);
        assert_eq!(sink.writes().len(), 12);
        let last = sink.last().unwrap();
        assert!(last.abs_diff_eq(Mat4::IDENTITY, 1e-5));
    }

    #[test]
    fn full_turns_wrap_to_zero_for_any_partition() {
        for axis in [Axis::Pitch, Axis::Roll, Axis::Yaw] {
            for (steps, delta) in [(12, 30.0f32), (24, 15.0), (8, 45.0), (12, -30.0), (4, -90.0)] {
                let (mut model, sink) = model();
                for _ in 0..steps {
                    model.rotate(axis, delta).unwrap();
                    let angle = model.angle(axis);
                    assert!((0.0..360.0).contains(&angle), "{axis:?} at {angle}");
                }

                assert_eq!(model.angle(axis), 0.0, "{axis:?} {steps}x{delta}");
                assert_eq!(sink.writes().len(), steps);
                assert!(sink.last().unwrap().abs_diff_eq(Mat4::IDENTITY, 1e-5));
            }
        }
    }

    #[test]
    fn inc_helpers_match_rotate() {
        let (mut model, _) = model();
        model.inc_roll(-30.0).unwrap();
        model.inc_yaw(390.0).unwrap();
        model.inc_pitch(-720.0).unwrap();

        assert_eq!(model.roll(), 330.0);
        assert_eq!(model.yaw(), 30.0);
        assert_eq!(model.pitch(), 0.0);
    }

    #[test]
    fn each_axis_rotates_about_its_own_axis() {
        let (mut model, _) = model();

        model.set_pitch(90.0).unwrap();
        assert!(model.matrix().abs_diff_eq(Mat4::from_rotation_x(90f32.to_radians()), 1e-6));

        model.set_pitch(0.0).unwrap();
        model.set_roll(90.0).unwrap();
        assert!(model.matrix().abs_diff_eq(Mat4::from_rotation_y(90f32.to_radians()), 1e-6));

        model.set_roll(0.0).unwrap();
        model.set_yaw(-90.0).unwrap();
        assert_eq!(model.yaw(), 270.0);
        assert!(model.matrix().abs_diff_eq(Mat4::from_rotation_z(270f32.to_radians()), 1e-6));
    }

    #[test]
    fn composition_order_is_yaw_roll_pitch() {
        let (mut model, sink) = model();
        model.set_pitch(10.0).unwrap();
        model.set_roll(20.0).unwrap();
        model.set_yaw(30.0).unwrap();

        let expected = Mat4::from_rotation_z(30f32.to_radians())
            * Mat4::from_rotation_y(20f32.to_radians())
            * Mat4::from_rotation_x(10f32.to_radians());
        assert!(sink.last().unwrap().abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn same_angles_give_same_matrix() {
        let (mut model, sink) = model();
        model.rotate(Axis::Roll, 45.0).unwrap();
        model.set_roll(45.0).unwrap();

        let writes = sink.writes();
        assert_eq!(writes[0], writes[1]);
    }
}
