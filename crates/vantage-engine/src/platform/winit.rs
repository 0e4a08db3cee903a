use std::time::Duration;

use anyhow::{Context, Result};
use ouroboros::self_referencing;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, MouseButton as WinitMouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{KeyCode, ModifiersState, PhysicalKey};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Fullscreen, Window, WindowId};

use crate::core::{DrawPass, FrameCtx, FrameInfo, RunCtx};
use crate::device::{Gpu, GpuInit};
use crate::events::{CursorPos, EventBus, FramebufferSize, KeyEvent, MouseButtonEvent, Scroll};
use crate::input::{Action, Key, Modifiers, MouseButton};

use super::{Platform, PlatformConfig};

/// Event pumps allowed for the window to come up before giving up.
const STARTUP_PUMPS: usize = 500;

/// Pixel scroll deltas are reported in lines of this height.
const PIXELS_PER_LINE: f64 = 20.0;

#[self_referencing]
struct WindowEntry {
    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

struct PumpState {
    config: PlatformConfig,
    gpu_init: GpuInit,

    entry: Option<WindowEntry>,
    startup_error: Option<anyhow::Error>,

    close_requested: bool,
    modifiers: Modifiers,
    framebuffer: (u32, u32),
}

impl PumpState {
    fn create_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let config = &self.config;
        let mut attrs = Window::default_attributes()
            .with_title(config.title.clone())
            .with_inner_size(LogicalSize::new(f64::from(config.width), f64::from(config.height)))
            .with_resizable(config.resizable);
        if config.fullscreen {
            attrs = attrs.with_fullscreen(Some(Fullscreen::Borderless(None)));
        }

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.gpu_init.clone();
        let entry = WindowEntryTryBuilder {
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .try_build()
        .context("GPU initialization failed")?;

        let size = entry.with_gpu(|gpu| gpu.size());
        self.framebuffer = (size.width, size.height);
        self.entry = Some(entry);

        log::info!(
            "window `{}` created ({}x{} px)",
            self.config.title,
            size.width,
            size.height
        );
        Ok(())
    }
}

/// Handler for one pump. `events` is `None` during startup, when input has
/// nowhere to go yet.
struct Pump<'a> {
    state: &'a mut PumpState,
    events: Option<&'a EventBus>,
}

impl ApplicationHandler for Pump<'_> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.entry.is_some() || self.state.startup_error.is_some() {
            return;
        }

        if let Err(err) = self.state.create_window(event_loop) {
            self.state.startup_error = Some(err);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let state = &mut *self.state;

        match event {
            WindowEvent::CloseRequested => {
                log::info!("close requested");
                state.close_requested = true;
            }

            WindowEvent::Resized(size) => {
                if let Some(entry) = state.entry.as_mut() {
                    entry.with_gpu_mut(|gpu| gpu.resize(size));
                }
                state.framebuffer = (size.width, size.height);
                if let Some(bus) = self.events {
                    bus.fire_framebuffer_size(&FramebufferSize {
                        width: size.width,
                        height: size.height,
                    });
                }
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(entry) = state.entry.as_mut() {
                    let size = entry.with_window(|w| w.inner_size());
                    entry.with_gpu_mut(|gpu| gpu.resize(size));
                    state.framebuffer = (size.width, size.height);
                }
            }

            WindowEvent::ModifiersChanged(m) => {
                state.modifiers = map_modifiers(m.state());
            }

            WindowEvent::KeyboardInput { event, .. } => {
                let Some(bus) = self.events else { return };
                let Some(key) = map_key(event.physical_key) else {
                    log::trace!("unmapped key {:?}", event.physical_key);
                    return;
                };

                let action = match (event.state, event.repeat) {
                    (ElementState::Pressed, true) => Action::Repeat,
                    (ElementState::Pressed, false) => Action::Press,
                    (ElementState::Released, _) => Action::Release,
                };

                bus.fire_key(&KeyEvent {
                    key,
                    code: key.code(),
                    action,
                    modifiers: state.modifiers,
                });
            }

            WindowEvent::MouseInput {
                state: st, button, ..
            } => {
                let Some(bus) = self.events else { return };
                let button = map_mouse_button(button);
                let action = match st {
                    ElementState::Pressed => Action::Press,
                    ElementState::Released => Action::Release,
                };

                bus.fire_mouse_button(&MouseButtonEvent {
                    button,
                    code: button.code(),
                    action,
                    modifiers: state.modifiers,
                });
            }

            WindowEvent::CursorMoved { position, .. } => {
                if let Some(bus) = self.events {
                    bus.fire_cursor_pos(&CursorPos {
                        x: position.x,
                        y: position.y,
                    });
                }
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let Some(bus) = self.events else { return };
                let (x_offset, y_offset) = match delta {
                    MouseScrollDelta::LineDelta(x, y) => (f64::from(x), f64::from(y)),
                    MouseScrollDelta::PixelDelta(p) => (p.x / PIXELS_PER_LINE, p.y / PIXELS_PER_LINE),
                };
                bus.fire_scroll(&Scroll { x_offset, y_offset });
            }

            _ => {}
        }
    }
}

/// Desktop platform: one winit window with a wgpu surface.
///
/// The event loop is pumped rather than run, so the frame scheduler keeps
/// ownership of the loop.
pub struct WinitPlatform {
    // Declared first so the window drops before the event loop.
    state: PumpState,
    event_loop: EventLoop<()>,
}

impl WinitPlatform {
    /// Opens the window and initializes the GPU.
    ///
    /// Failure here is fatal to the application: there is nothing to draw
    /// into.
    pub fn new(config: PlatformConfig) -> Result<Self> {
        let mut event_loop = EventLoop::new().context("failed to create winit EventLoop")?;

        let mut state = PumpState {
            gpu_init: GpuInit::from_platform(&config),
            config,
            entry: None,
            startup_error: None,
            close_requested: false,
            modifiers: Modifiers::default(),
            framebuffer: (0, 0),
        };

        for _ in 0..STARTUP_PUMPS {
            let status = event_loop.pump_app_events(
                Some(Duration::from_millis(10)),
                &mut Pump {
                    state: &mut state,
                    events: None,
                },
            );

            if let Some(err) = state.startup_error.take() {
                return Err(err);
            }
            if state.entry.is_some() {
                break;
            }
            if let PumpStatus::Exit(code) = status {
                anyhow::bail!("event loop exited during startup (code {code})");
            }
        }

        anyhow::ensure!(state.entry.is_some(), "window did not come up");
        Ok(Self { state, event_loop })
    }

    pub fn framebuffer_size(&self) -> (u32, u32) {
        self.state.framebuffer
    }

    /// Asks the loop to end after the current frame.
    pub fn request_close(&mut self) {
        self.state.close_requested = true;
    }
}

impl Platform for WinitPlatform {
    fn should_close(&self) -> bool {
        self.state.close_requested
    }

    fn run_ctx(&self) -> RunCtx {
        RunCtx {
            gpu: self
                .state
                .entry
                .as_ref()
                .map(|entry| entry.with_gpu(|gpu| gpu.handles().clone())),
            framebuffer: self.state.framebuffer,
        }
    }

    fn render_frame(
        &mut self,
        info: FrameInfo,
        draw: &mut dyn FnMut(&mut FrameCtx<'_>),
    ) -> Result<()> {
        let clear_color = self.state.config.clear_color;
        let Some(entry) = self.state.entry.as_mut() else {
            draw(&mut FrameCtx::headless(info));
            return Ok(());
        };

        entry.with_gpu_mut(|gpu| {
            let size = gpu.size();
            if size.width == 0 || size.height == 0 {
                draw(&mut FrameCtx::headless(info));
                return Ok(());
            }

            let mut frame = match gpu.begin_frame() {
                Ok(frame) => frame,
                Err(err) => {
                    let reason = err.to_string();
                    let action = gpu.handle_surface_error(err);
                    anyhow::ensure!(action.is_recoverable(), "surface error: {reason}");

                    log::debug!("frame skipped ({reason}): {action:?}");
                    draw(&mut FrameCtx::headless(info));
                    return Ok(());
                }
            };

            clear_targets(&mut frame.encoder, &frame.view, gpu.depth_view(), clear_color);

            {
                let mut ctx = FrameCtx {
                    info,
                    pass: Some(DrawPass {
                        gpu: gpu.handles(),
                        encoder: &mut frame.encoder,
                        color_view: &frame.view,
                        depth_view: gpu.depth_view(),
                    }),
                };
                draw(&mut ctx);
            }

            gpu.submit(frame);
            Ok(())
        })
    }

    fn poll_events(&mut self, bus: &EventBus) {
        let status = self.event_loop.pump_app_events(
            Some(Duration::ZERO),
            &mut Pump {
                state: &mut self.state,
                events: Some(bus),
            },
        );

        if let PumpStatus::Exit(code) = status {
            log::info!("event loop exited (code {code})");
            self.state.close_requested = true;
        }
    }
}

fn clear_targets(
    encoder: &mut wgpu::CommandEncoder,
    color: &wgpu::TextureView,
    depth: &wgpu::TextureView,
    clear_color: wgpu::Color,
) {
    let _pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("vantage clear pass"),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: color,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(clear_color),
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        })],
        depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
            view: depth,
            depth_ops: Some(wgpu::Operations {
                load: wgpu::LoadOp::Clear(1.0),
                store: wgpu::StoreOp::Store,
            }),
            stencil_ops: None,
        }),
        timestamp_writes: None,
        occlusion_query_set: None,
        multiview_mask: None,
    });
}

fn map_modifiers(m: ModifiersState) -> Modifiers {
    Modifiers {
        shift: m.shift_key(),
        ctrl: m.control_key(),
        alt: m.alt_key(),
        meta: m.super_key(),
    }
}

fn map_mouse_button(b: WinitMouseButton) -> MouseButton {
    match b {
        WinitMouseButton::Left => MouseButton::Left,
        WinitMouseButton::Right => MouseButton::Right,
        WinitMouseButton::Middle => MouseButton::Middle,
        WinitMouseButton::Back => MouseButton::Back,
        WinitMouseButton::Forward => MouseButton::Forward,
        WinitMouseButton::Other(v) => MouseButton::Other(v),
    }
}

/// Physical key to engine key. Keys without a latch slot map to `None`.
fn map_key(pk: PhysicalKey) -> Option<Key> {
    let PhysicalKey::Code(code) = pk else {
        return None;
    };

    let key = match code {
        KeyCode::Escape => Key::Escape,
        KeyCode::Enter => Key::Enter,
        KeyCode::Tab => Key::Tab,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Space => Key::Space,

        KeyCode::Insert => Key::Insert,
        KeyCode::Delete => Key::Delete,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::PageUp => Key::PageUp,
        KeyCode::PageDown => Key::PageDown,

        KeyCode::ArrowUp => Key::ArrowUp,
        KeyCode::ArrowDown => Key::ArrowDown,
        KeyCode::ArrowLeft => Key::ArrowLeft,
        KeyCode::ArrowRight => Key::ArrowRight,

        KeyCode::ShiftLeft => Key::LeftShift,
        KeyCode::ShiftRight => Key::RightShift,
        KeyCode::ControlLeft => Key::LeftControl,
        KeyCode::ControlRight => Key::RightControl,
        KeyCode::AltLeft => Key::LeftAlt,
        KeyCode::AltRight => Key::RightAlt,
        KeyCode::SuperLeft => Key::LeftSuper,
        KeyCode::SuperRight => Key::RightSuper,

        KeyCode::KeyA => Key::A,
        KeyCode::KeyB => Key::B,
        KeyCode::KeyC => Key::C,
        KeyCode::KeyD => Key::D,
        KeyCode::KeyE => Key::E,
        KeyCode::KeyF => Key::F,
        KeyCode::KeyG => Key::G,
        KeyCode::KeyH => Key::H,
        KeyCode::KeyI => Key::I,
        KeyCode::KeyJ => Key::J,
        KeyCode::KeyK => Key::K,
        KeyCode::KeyL => Key::L,
        KeyCode::KeyM => Key::M,
        KeyCode::KeyN => Key::N,
        KeyCode::KeyO => Key::O,
        KeyCode::KeyP => Key::P,
        KeyCode::KeyQ => Key::Q,
        KeyCode::KeyR => Key::R,
        KeyCode::KeyS => Key::S,
        KeyCode::KeyT => Key::T,
        KeyCode::KeyU => Key::U,
        KeyCode::KeyV => Key::V,
        KeyCode::KeyW => Key::W,
        KeyCode::KeyX => Key::X,
        KeyCode::KeyY => Key::Y,
        KeyCode::KeyZ => Key::Z,

        KeyCode::Digit0 => Key::Digit0,
        KeyCode::Digit1 => Key::Digit1,
        KeyCode::Digit2 => Key::Digit2,
        KeyCode::Digit3 => Key::Digit3,
        KeyCode::Digit4 => Key::Digit4,
        KeyCode::Digit5 => Key::Digit5,
        KeyCode::Digit6 => Key::Digit6,
        KeyCode::Digit7 => Key::Digit7,
        KeyCode::Digit8 => Key::Digit8,
        KeyCode::Digit9 => Key::Digit9,

        KeyCode::F1 => Key::F1,
        KeyCode::F2 => Key::F2,
        KeyCode::F3 => Key::F3,
        KeyCode::F4 => Key::F4,
        KeyCode::F5 => Key::F5,
        KeyCode::F6 => Key::F6,
        KeyCode::F7 => Key::F7,
        KeyCode::F8 => Key::F8,
        KeyCode::F9 => Key::F9,
        KeyCode::F10 => Key::F10,
        KeyCode::F11 => Key::F11,
        KeyCode::F12 => Key::F12,

        _ => return None,
    };

    Some(key)
}
