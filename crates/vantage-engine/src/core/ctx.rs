use crate::device::GpuHandles;

/// Per-frame timing published by the frame scheduler.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct FrameInfo {
    /// Monotonic frame counter, starting at 0.
    pub frame_index: u64,

    /// Clamped wall-clock time since the previous frame, in seconds.
    pub frame_time: f64,

    /// Frames counted over the last completed one-second window.
    pub frame_rate: u32,

    /// Fixed-step ticks consumed during this frame.
    pub ticks: u32,
}

/// GPU handles for recording draw calls into the current frame.
///
/// Color and depth targets have already been cleared; passes should load,
/// not clear.
pub struct DrawPass<'a> {
    pub gpu: &'a GpuHandles,
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub color_view: &'a wgpu::TextureView,
    pub depth_view: &'a wgpu::TextureView,
}

/// Context passed to `draw` subscribers.
///
/// Lifetimes:
/// - `'a` is the duration of the draw phase for one frame
pub struct FrameCtx<'a> {
    pub info: FrameInfo,

    /// `None` when no surface frame could be acquired (headless runs, skipped
    /// frames). Non-GPU work such as render-object flushes still happens.
    pub pass: Option<DrawPass<'a>>,
}

impl<'a> FrameCtx<'a> {
    pub fn headless(info: FrameInfo) -> Self {
        Self { info, pass: None }
    }
}

/// Context passed to `run` subscribers, once, before the first frame.
#[derive(Clone, Default)]
pub struct RunCtx {
    pub gpu: Option<GpuHandles>,

    /// Framebuffer size in physical pixels.
    pub framebuffer: (u32, u32),
}

impl RunCtx {
    /// Width over height, or 1.0 for a degenerate framebuffer.
    pub fn aspect(&self) -> f32 {
        let (w, h) = self.framebuffer;
        if w == 0 || h == 0 {
            1.0
        } else {
            w as f32 / h as f32
        }
    }
}
