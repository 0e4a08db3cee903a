use glam::{Mat4, Vec3};

use crate::core::Engine;
use crate::render::{MatrixSink, RenderError, RenderHandle, RenderObject};

/// View matrix from an eye position looking at a target.
pub struct Camera {
    object: RenderObject,
    eye: Vec3,
    center: Vec3,
    up: Vec3,
}

impl Camera {
    /// Starts at identity; nothing reaches the sink until [`Camera::look_at`].
    pub fn new(engine: &Engine, sink: impl MatrixSink + 'static) -> Self {
        Self {
            object: RenderObject::new(engine, "camera", sink),
            eye: Vec3::ZERO,
            center: Vec3::NEG_Z,
            up: Vec3::Y,
        }
    }

    /// Right-handed look-at. `eye` and `center` must differ and `up` must not
    /// be parallel to the view direction.
    pub fn look_at(&mut self, eye: Vec3, center: Vec3, up: Vec3) -> Result<(), RenderError> {
        self.eye = eye;
        self.center = center;
        self.up = up;

        self.object.set_transform(Mat4::look_at_rh(eye, center, up))?;
        self.object.render(true)
    }

    pub fn eye(&self) -> Vec3 {
        self.eye
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn handle(&self) -> RenderHandle {
        self.object.handle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::testing::RecordingSink;
    use crate::render::ManualTimer;
    use std::sync::Arc;

    #[test]
    fn look_at_pushes_view_matrix_now() {
        let timer = Arc::new(ManualTimer::new());
        let engine = Engine::with_timers(timer.clone());
        engine.render_thread().bind_current();

        let sink = RecordingSink::default();
        let mut camera = Camera::new(&engine, sink.clone());
        assert!(sink.writes().is_empty());

        let eye = Vec3::new(3.0, 3.0, 3.0);
        camera.look_at(eye, Vec3::ZERO, Vec3::Y).unwrap();

        let view = sink.last().unwrap();
        assert_eq!(view, Mat4::look_at_rh(eye, Vec3::ZERO, Vec3::Y));
        assert_eq!(timer.pending(), 0);

        // The eye lands at the view-space origin.
        assert!(view.transform_point3(eye).length() < 1e-5);
        assert_eq!(camera.eye(), eye);
    }

    #[test]
    fn repeated_look_at_is_idempotent() {
        let engine = Engine::with_timers(Arc::new(ManualTimer::new()));
        engine.render_thread().bind_current();

        let sink = RecordingSink::default();
        let mut camera = Camera::new(&engine, sink.clone());
        let eye = Vec3::new(0.0, 2.0, 5.0);
        camera.look_at(eye, Vec3::ZERO, Vec3::Y).unwrap();
        camera.look_at(eye, Vec3::ZERO, Vec3::Y).unwrap();

        let writes = sink.writes();
        assert_eq!(writes.len(), 2);
        assert_eq!(writes[0], writes[1]);
    }
}
