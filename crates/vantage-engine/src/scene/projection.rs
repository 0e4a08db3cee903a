use glam::Mat4;

use crate::core::Engine;
use crate::render::{MatrixSink, RenderError, RenderHandle, RenderObject};

/// Perspective projection with a zoom factor on the focal terms.
pub struct Projection {
    object: RenderObject,
    fov_deg: f32,
    aspect: f32,
    near: f32,
    far: f32,
    zoom: f32,
}

impl Projection {
    /// Starts at identity; nothing reaches the sink until
    /// [`Projection::perspective`].
    pub fn new(engine: &Engine, sink: impl MatrixSink + 'static) -> Self {
        Self {
            object: RenderObject::new(engine, "projection", sink),
            fov_deg: 45.0,
            aspect: 1.0,
            near: 0.1,
            far: 100.0,
            zoom: 1.0,
        }
    }

    /// Right-handed perspective with `[0, 1]` depth. Resets zoom.
    pub fn perspective(
        &mut self,
        fov_deg: f32,
        aspect: f32,
        near: f32,
        far: f32,
    ) -> Result<(), RenderError> {
        self.fov_deg = fov_deg;
        self.aspect = aspect;
        self.near = near;
        self.far = far;
        self.zoom = 1.0;
        self.apply()
    }

    /// Multiplies the zoom factor by `scale`. Below 1 widens the view.
    pub fn zoom(&mut self, scale: f32) -> Result<(), RenderError> {
        self.zoom *= scale;
        log::trace!("zoom: {}", self.zoom);
        self.apply()
    }

    /// Follows a framebuffer resize, keeping field of view and zoom.
    ///
    /// Degenerate aspects (minimized window) are ignored.
    pub fn set_aspect(&mut self, aspect: f32) -> Result<(), RenderError> {
        if !(aspect.is_finite() && aspect > 0.0) {
            log::debug!("ignoring aspect {aspect}");
            return Ok(());
        }
        self.aspect = aspect;
        self.apply()
    }

    pub fn fov_deg(&self) -> f32 {
        self.fov_deg
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn zoom_factor(&self) -> f32 {
        self.zoom
    }

    /// The matrix the current parameters describe.
    pub fn matrix(&self) -> Mat4 {
        let mut m = Mat4::perspective_rh(self.fov_deg.to_radians(), self.aspect, self.near, self.far);
        m.x_axis.x *= self.zoom;
        m.y_axis.y *= self.zoom;
        m
    }

    pub fn handle(&self) -> RenderHandle {
        self.object.handle()
    }

    fn apply(&self) -> Result<(), RenderError> {
        self.object.set_transform(self.matrix())?;
        self.object.render(true)
    }
}
