use std::sync::Arc;

use anyhow::{Context, Result};
use glam::Vec3;
use parking_lot::Mutex;
use vantage_engine::core::{Engine, RunCtx};
use vantage_engine::input::MouseButton;
use vantage_engine::render::{MeshRenderer, MeshUniform};
use vantage_engine::scene::{Camera, Model, Projection};

use crate::controls;
use crate::cube;

const FOV_DEG: f32 = 45.0;
const NEAR: f32 = 0.1;
const FAR: f32 = 100.0;
const EYE: Vec3 = Vec3::new(3.0, 3.0, 3.0);

/// The cube scene and its interaction state.
struct Viewer {
    mesh: MeshRenderer,
    // Written once at startup; held so its sink stays live.
    _camera: Camera,
    projection: Mutex<Projection>,
    model: Mutex<Model>,
    /// Last cursor position while the right button is held.
    drag: Mutex<Option<(f64, f64)>>,
}

/// Builds the scene once the GPU exists and wires input to it.
pub fn install(engine: &Engine) {
    let engine_ref = engine.clone();
    engine.events().on_run(move |ctx| {
        let viewer = Arc::new(build(&engine_ref, ctx)?);
        subscribe(&engine_ref, viewer);
        log::info!("viewer ready at {}x{}", ctx.framebuffer.0, ctx.framebuffer.1);
        Ok(())
    });
}

fn build(engine: &Engine, ctx: &RunCtx) -> Result<Viewer> {
    let gpu = ctx.gpu.as_ref().context("the viewer needs a GPU device")?;
    let mesh = MeshRenderer::new(gpu, &cube::VERTICES);

    let mut projection = Projection::new(engine, mesh.slot(MeshUniform::Projection));
    projection.perspective(FOV_DEG, ctx.aspect(), NEAR, FAR)?;

    let mut camera = Camera::new(engine, mesh.slot(MeshUniform::Camera));
    camera.look_at(EYE, Vec3::ZERO, Vec3::Y)?;

    let mut model = Model::new(engine, mesh.slot(MeshUniform::Model));
    model.set_pitch(0.0)?;

    Ok(Viewer {
        mesh,
        _camera: camera,
        projection: Mutex::new(projection),
        model: Mutex::new(model),
        drag: Mutex::new(None),
    })
}

fn subscribe(engine: &Engine, viewer: Arc<Viewer>) {
    let events = engine.events();

    let v = viewer.clone();
    events.on_scroll(move |ev| {
        v.projection.lock().zoom(controls::zoom_scale(ev.y_offset))?;
        Ok(())
    });

    let v = viewer.clone();
    events.on_framebuffer_size(move |ev| {
        if ev.height > 0 {
            v.projection.lock().set_aspect(ev.width as f32 / ev.height as f32)?;
        }
        Ok(())
    });

    let v = viewer.clone();
    let input = engine.input().clone();
    events.on_cursor_pos(move |ev| {
        let mut drag = v.drag.lock();
        if !input.button_down(MouseButton::Right) {
            *drag = None;
            return Ok(());
        }
        if let Some(prev) = drag.replace((ev.x, ev.y)) {
            let (roll, yaw) = controls::drag_degrees(prev, (ev.x, ev.y));
            let mut model = v.model.lock();
            model.inc_roll(roll)?;
            model.inc_yaw(yaw)?;
        }
        Ok(())
    });

    // Subscribed after the transforms, so their flushes land first.
    events.on_draw(move |frame| {
        if let Some(pass) = frame.pass.as_mut() {
            viewer.mesh.draw(pass);
        }
        Ok(())
    });
}
