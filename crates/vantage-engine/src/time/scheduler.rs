use std::sync::Arc;

use anyhow::Result;

use crate::core::{Engine, FrameInfo};
use crate::events::FireReport;
use crate::platform::Platform;

use super::clock::{Clock, SystemClock};
use super::fixed_step::{FIXED_DELTA_TIME, FixedStep, StepOutcome};

/// Lifecycle of a [`FrameScheduler`]. Only moves forward.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SchedulerState {
    Created,
    Running,
    Terminated,
}

/// Frame scheduler configuration.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Fixed tick length in seconds.
    pub fixed_delta: f64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            fixed_delta: FIXED_DELTA_TIME,
        }
    }
}

/// Timing counters snapshot.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct FrameStats {
    /// Frames over the last completed one-second window.
    pub frame_rate: u32,
    pub frames: u64,
    pub ticks: u64,
    /// Unconsumed time, always below one fixed tick.
    pub accumulator: f64,
    /// `run`/`draw` subscriber failures seen so far.
    pub subscriber_failures: u64,
}

type TickHook = Box<dyn FnMut(f64)>;

/// Owns the main loop.
///
/// Each iteration measures the frame time, consumes it in fixed ticks,
/// fires `draw` once through the platform, then polls platform events.
/// Polling after present means input reaches subscribers one frame late.
pub struct FrameScheduler<C: Clock = SystemClock> {
    engine: Engine,
    clock: C,
    fixed: FixedStep,
    state: SchedulerState,
    current_time: f64,
    tick_hook: Option<TickHook>,
    subscriber_failures: u64,
}

impl FrameScheduler<SystemClock> {
    pub fn new(engine: &Engine, config: SchedulerConfig) -> Self {
        Self::with_clock(engine, config, SystemClock::new())
    }
}

impl<C: Clock> FrameScheduler<C> {
    pub fn with_clock(engine: &Engine, config: SchedulerConfig, clock: C) -> Self {
        let current_time = clock.now();
        Self {
            engine: engine.clone(),
            clock,
            fixed: FixedStep::new(config.fixed_delta),
            state: SchedulerState::Created,
            current_time,
            tick_hook: None,
            subscriber_failures: 0,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Installs the fixed-step update, called with the tick length once per
    /// consumed tick. Nothing runs on ticks until a hook is set.
    pub fn set_tick_hook(&mut self, hook: impl FnMut(f64) + 'static) {
        self.tick_hook = Some(Box::new(hook));
    }

    pub fn stats(&self) -> FrameStats {
        FrameStats {
            frame_rate: self.fixed.frame_rate(),
            frames: self.fixed.frames(),
            ticks: self.fixed.ticks(),
            accumulator: self.fixed.accumulator(),
            subscriber_failures: self.subscriber_failures,
        }
    }

    /// Consumes one frame's time: clamps, runs the tick hook per fixed step,
    /// and updates the frame-rate window.
    pub fn step(&mut self, frame_time: f64) -> StepOutcome {
        let hook = &mut self.tick_hook;
        let out = self.fixed.advance(frame_time, |dt| {
            if let Some(hook) = hook.as_mut() {
                hook(dt);
            }
        });

        if let Some(fps) = out.frame_rate {
            log::debug!("{fps} fps");
        }
        out
    }

    /// Runs the loop on the calling thread until the platform asks to close.
    ///
    /// The calling thread becomes the render thread. `run` subscribers fire
    /// once before the first frame. Only a platform frame error ends the loop
    /// early; subscriber failures are counted and the loop goes on.
    pub fn run(&mut self, platform: &mut dyn Platform) -> Result<()> {
        anyhow::ensure!(
            self.state == SchedulerState::Created,
            "frame scheduler cannot run from state {:?}",
            self.state
        );

        self.engine.render_thread().bind_current();
        self.state = SchedulerState::Running;
        log::info!("frame loop started");

        let report = self.engine.events().fire_run(&platform.run_ctx());
        self.record(&report);

        self.current_time = self.clock.now();
        let result = self.run_loop(platform);

        self.state = SchedulerState::Terminated;
        match &result {
            Ok(()) => log::info!("frame loop finished after {} frames", self.fixed.frames()),
            Err(err) => log::error!("frame loop aborted: {err:#}"),
        }
        result
    }

    fn run_loop(&mut self, platform: &mut dyn Platform) -> Result<()> {
        let events = Arc::clone(self.engine.events());

        while !platform.should_close() {
            let now = self.clock.now();
            let frame_time = now - self.current_time;
            self.current_time = now;

            let out = self.step(frame_time);
            let info = FrameInfo {
                frame_index: self.fixed.frames() - 1,
                frame_time: out.frame_time,
                frame_rate: self.fixed.frame_rate(),
                ticks: out.ticks,
            };

            let mut failures = 0;
            platform.render_frame(info, &mut |ctx| {
                failures += events.fire_draw(ctx).failures.len() as u64;
            })?;
            self.subscriber_failures += failures;

            platform.poll_events(&events);
        }

        Ok(())
    }

    fn record(&mut self, report: &FireReport) {
        self.subscriber_failures += report.failures.len() as u64;
    }
}
