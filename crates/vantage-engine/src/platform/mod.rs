//! Window and input source.
//!
//! The frame scheduler only sees the [`Platform`] trait, so it can run
//! against a scripted platform in tests. [`WinitPlatform`] is the desktop
//! implementation on winit + wgpu.

mod winit;

pub use self::winit::WinitPlatform;

use crate::core::{FrameCtx, FrameInfo, RunCtx};
use crate::events::EventBus;

/// Window configuration.
#[derive(Debug, Clone)]
pub struct PlatformConfig {
    pub title: String,
    /// Initial inner size in logical pixels.
    pub width: u32,
    pub height: u32,
    pub fullscreen: bool,
    pub resizable: bool,
    pub vsync: bool,
    pub clear_color: wgpu::Color,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            title: "Vantage".to_string(),
            width: 800,
            height: 600,
            fullscreen: false,
            resizable: true,
            vsync: true,
            clear_color: wgpu::Color::WHITE,
        }
    }
}

/// What the frame scheduler needs from a window system.
pub trait Platform {
    /// Polled once per loop iteration; `true` ends the loop.
    fn should_close(&self) -> bool;

    /// Context handed to `run` subscribers before the first frame.
    fn run_ctx(&self) -> RunCtx;

    /// Clears the frame, calls `draw` once with the frame context, and
    /// presents.
    ///
    /// When no frame can be acquired `draw` still runs, with no GPU pass, so
    /// render-object flushes are never skipped. An error is fatal to the loop.
    fn render_frame(
        &mut self,
        info: FrameInfo,
        draw: &mut dyn FnMut(&mut FrameCtx<'_>),
    ) -> anyhow::Result<()>;

    /// Drains pending window events into `bus`.
    fn poll_events(&mut self, bus: &EventBus);
}
