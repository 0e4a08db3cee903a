//! Time subsystem.
//!
//! - [`FixedStep`]: fixed-timestep accumulator and frame-rate window
//! - [`FrameScheduler`]: the main loop driving it against a [`Platform`](crate::platform::Platform)
//! - [`Clock`]: injectable time source, real or manual

mod clock;
mod fixed_step;
mod scheduler;

pub use clock::{Clock, ManualClock, SystemClock};
pub use fixed_step::{FIXED_DELTA_TIME, FixedStep, MAX_FRAME_TIME, StepOutcome, clamp_frame_time};
pub use scheduler::{FrameScheduler, FrameStats, SchedulerConfig, SchedulerState};
