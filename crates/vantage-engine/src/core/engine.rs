use std::sync::Arc;

use anyhow::{Context, Result};

use crate::events::EventBus;
use crate::input::InputLatch;
use crate::render::{RenderThread, ThreadTimer, TimerFacility};

/// Shared handles every subsystem hangs off.
///
/// Cheap to clone; all clones refer to the same bus, latch, timer facility
/// and render-thread binding.
#[derive(Clone)]
pub struct Engine {
    events: Arc<EventBus>,
    input: Arc<InputLatch>,
    timers: Arc<dyn TimerFacility>,
    render_thread: RenderThread,
}

impl Engine {
    /// Creates an engine backed by a background timer thread.
    pub fn new() -> Result<Self> {
        let timers = ThreadTimer::spawn().context("failed to start timer thread")?;
        Ok(Self::with_timers(Arc::new(timers)))
    }

    /// Creates an engine with a caller-supplied timer facility.
    ///
    /// The input latch is attached to the bus first, so key and button state
    /// is current by the time later subscribers see the same event.
    pub fn with_timers(timers: Arc<dyn TimerFacility>) -> Self {
        let events = Arc::new(EventBus::new());
        let input = Arc::new(InputLatch::new());
        input.attach(&events);

        Self {
            events,
            input,
            timers,
            render_thread: RenderThread::default(),
        }
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    pub fn input(&self) -> &Arc<InputLatch> {
        &self.input
    }

    pub fn timers(&self) -> &Arc<dyn TimerFacility> {
        &self.timers
    }

    pub fn render_thread(&self) -> &RenderThread {
        &self.render_thread
    }
}
