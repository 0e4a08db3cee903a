/// Logical update cadence, in seconds.
pub const FIXED_DELTA_TIME: f64 = 1.0 / 60.0;

/// Ceiling for a single frame's measured time, in seconds.
///
/// Stalls (debugger, window drag, suspend) beyond this are treated as this
/// long so the tick loop cannot spiral.
pub const MAX_FRAME_TIME: f64 = 0.25;

/// Clamps a measured frame time into `[0, MAX_FRAME_TIME]`. NaN becomes 0.
pub fn clamp_frame_time(raw: f64) -> f64 {
    if raw.is_nan() {
        return 0.0;
    }
    raw.clamp(0.0, MAX_FRAME_TIME)
}

/// Result of one [`FixedStep::advance`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct StepOutcome {
    /// Clamped frame time that was accumulated.
    pub frame_time: f64,

    /// Fixed ticks consumed this frame.
    pub ticks: u32,

    /// Set when a one-second window closed on this frame.
    pub frame_rate: Option<u32>,
}

/// Fixed-timestep accumulator with a rolling frames-per-second counter.
///
/// Pure arithmetic: no clock, no I/O. The frame scheduler feeds it measured
/// frame times.
#[derive(Debug, Clone)]
pub struct FixedStep {
    fixed_delta: f64,
    accumulator: f64,

    /// Frames in the current one-second window.
    frame_count: u32,
    /// Seconds elapsed in the current window; keeps its overshoot.
    frame_count_reset: f64,
    frame_rate: u32,

    frames: u64,
    ticks: u64,
}

impl FixedStep {
    /// Creates an accumulator ticking every `fixed_delta` seconds.
    ///
    /// A non-positive or non-finite delta would never drain the accumulator;
    /// it is replaced with [`FIXED_DELTA_TIME`].
    pub fn new(fixed_delta: f64) -> Self {
        let fixed_delta = if fixed_delta.is_finite() && fixed_delta > 0.0 {
            fixed_delta
        } else {
            log::warn!("invalid fixed delta {fixed_delta}, using {FIXED_DELTA_TIME}");
            FIXED_DELTA_TIME
        };

        Self {
            fixed_delta,
            accumulator: 0.0,
            frame_count: 0,
            frame_count_reset: 0.0,
            frame_rate: 0,
            frames: 0,
            ticks: 0,
        }
    }

    /// Accumulates one frame and runs `on_tick` once per whole fixed step.
    pub fn advance(&mut self, raw_frame_time: f64, mut on_tick: impl FnMut(f64)) -> StepOutcome {
        let frame_time = clamp_frame_time(raw_frame_time);

        self.accumulator += frame_time;
        let mut ticks = 0;
        while self.accumulator >= self.fixed_delta {
            on_tick(self.fixed_delta);
            self.accumulator -= self.fixed_delta;
            ticks += 1;
        }
        self.ticks += u64::from(ticks);

        self.frames += 1;
        self.frame_count += 1;
        self.frame_count_reset += frame_time;

        let frame_rate = if self.frame_count_reset >= 1.0 {
            self.frame_rate = self.frame_count;
            self.frame_count = 0;
            // Subtract, don't zero: the overshoot belongs to the next window.
            self.frame_count_reset -= 1.0;
            Some(self.frame_rate)
        } else {
            None
        };

        StepOutcome {
            frame_time,
            ticks,
            frame_rate,
        }
    }

    pub fn fixed_delta(&self) -> f64 {
        self.fixed_delta
    }

    pub fn accumulator(&self) -> f64 {
        self.accumulator
    }

    /// Frames counted over the last completed window; 0 before the first.
    pub fn frame_rate(&self) -> u32 {
        self.frame_rate
    }

    pub fn frame_count_reset(&self) -> f64 {
        self.frame_count_reset
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

impl Default for FixedStep {
    fn default() -> Self {
        Self::new(FIXED_DELTA_TIME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn clamps_pathological_frame_times() {
        assert_eq!(clamp_frame_time(-0.5), 0.0);
        assert_eq!(clamp_frame_time(0.1), 0.1);
        assert_eq!(clamp_frame_time(10.0), MAX_FRAME_TIME);
        assert_eq!(clamp_frame_time(f64::NAN), 0.0);
        assert_eq!(clamp_frame_time(f64::INFINITY), MAX_FRAME_TIME);
    }

    #[test]
    fn accumulates_ticks_across_clamped_frames() {
        let mut step = FixedStep::default();
        let mut hook_calls = 0;

        let mut total = 0;
        for raw in [0.1, 0.5, 0.02] {
            let out = step.advance(raw, |dt| {
                assert_eq!(dt, FIXED_DELTA_TIME);
                hook_calls += 1;
            });
            total += out.ticks;
        }

        // 0.1 + 0.25 + 0.02 = 0.37s = 22 whole ticks.
        assert_eq!(total, 22);
        assert_eq!(hook_calls, 22);
        assert_eq!(step.ticks(), 22);
        assert!((step.accumulator() - (0.37 - 22.0 / 60.0)).abs() < EPS);
        assert!(step.accumulator() < FIXED_DELTA_TIME);
    }

    #[test]
    fn frame_time_below_one_tick_carries_over() {
        let mut step = FixedStep::default();
        let out = step.advance(0.01, |_| {});
        assert_eq!(out.ticks, 0);
        let out = step.advance(0.01, |_| {});
        assert_eq!(out.ticks, 1);
        assert!((step.accumulator() - (0.02 - FIXED_DELTA_TIME)).abs() < EPS);
    }

    #[test]
    fn frame_rate_window_keeps_remainder() {
        let mut step = FixedStep::default();
        let published: Vec<Option<u32>> = (0..9).map(|_| step.advance(0.24, |_| {}).frame_rate).collect();

        // 1.2s closes the first window; its 0.2s overshoot shortens the second.
        assert_eq!(
            published,
            vec![None, None, None, None, Some(5), None, None, None, Some(4)]
        );
        assert_eq!(step.frame_rate(), 4);
        assert!((step.frame_count_reset() - 0.16).abs() < EPS);
        assert!(step.frame_count_reset() > 0.0);
        assert_eq!(step.frames(), 9);
    }

    #[test]
    fn overshoot_survives_the_first_window() {
        let mut step = FixedStep::default();
        for _ in 0..5 {
            step.advance(0.24, |_| {});
        }
        assert_eq!(step.frame_rate(), 5);
        assert!((step.frame_count_reset() - 0.2).abs() < EPS);
    }

    #[test]
    fn zero_frame_time_counts_a_frame_without_ticks() {
        let mut step = FixedStep::default();
        let out = step.advance(0.0, |_| panic!("no tick expected"));
        assert_eq!(out.ticks, 0);
        assert_eq!(out.frame_time, 0.0);
        assert_eq!(step.frames(), 1);
    }

    #[test]
    fn invalid_fixed_delta_falls_back() {
        assert_eq!(FixedStep::new(0.0).fixed_delta(), FIXED_DELTA_TIME);
        assert_eq!(FixedStep::new(-1.0).fixed_delta(), FIXED_DELTA_TIME);
        assert_eq!(FixedStep::new(f64::NAN).fixed_delta(), FIXED_DELTA_TIME);
        assert_eq!(FixedStep::new(0.01).fixed_delta(), 0.01);
    }
}
