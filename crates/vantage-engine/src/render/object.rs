use std::ops::Deref;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use glam::Mat4;
use parking_lot::{Mutex, RwLock};

use crate::core::Engine;

use super::error::RenderError;
use super::sink::MatrixSink;
use super::thread::RenderThread;
use super::timer::{TimerFacility, TimerHandle};

/// Debounce window applied to new render objects.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

const IDLE: u8 = 0;
const PENDING: u8 = 1;

/// Deferred-flush state of a render object.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FlushState {
    Idle,
    /// The debounce timer expired; the next draw phase writes the sink.
    Pending,
}

struct Shared {
    label: String,
    matrix: RwLock<Mat4>,
    sink: Box<dyn MatrixSink>,

    flush: AtomicU8,
    /// An immediate write was requested off the render thread.
    redirected: AtomicBool,
    released: AtomicBool,

    /// Bumped on every arm, disarm and release. A timer expiry whose
    /// generation no longer matches is stale and ignored.
    generation: AtomicU64,
    /// Guards `generation` bumps together with the handle they belong to.
    timer: Mutex<Option<TimerHandle>>,
    debounce: Mutex<Option<Duration>>,

    timers: Arc<dyn TimerFacility>,
    render_thread: RenderThread,
}

impl Shared {
    fn ensure_live(&self) -> Result<(), RenderError> {
        if !self.released.load(Ordering::Acquire) {
            return Ok(());
        }

        log::error!("render object `{}` used after release", self.label);
        debug_assert!(false, "render object `{}` used after release", self.label);
        Err(RenderError::UseAfterRelease {
            label: self.label.clone(),
        })
    }

    /// Writes the current matrix to the sink. Render thread only.
    fn write_sink(&self) -> Result<(), RenderError> {
        let matrix = self.matrix.read();
        self.sink.write(&matrix).map_err(|source| {
            log::warn!("sink write for `{}` failed: {source}", self.label);
            RenderError::SinkWriteFailed {
                label: self.label.clone(),
                source,
            }
        })
    }

    fn write_now(&self) -> Result<(), RenderError> {
        if self.render_thread.is_current() {
            return self.write_sink();
        }

        log::trace!("`{}` write redirected to the next draw phase", self.label);
        self.redirected.store(true, Ordering::Release);
        Ok(())
    }

    fn arm(self: &Arc<Self>, delay: Duration) {
        let mut slot = self.timer.lock();
        if let Some(previous) = slot.take() {
            previous.cancel();
        }

        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        let weak: Weak<Self> = Arc::downgrade(self);

        *slot = Some(self.timers.schedule(
            delay,
            Box::new(move || {
                if let Some(shared) = weak.upgrade() {
                    shared.mark_ready(generation);
                }
            }),
        ));
    }

    fn disarm(&self) {
        let mut slot = self.timer.lock();
        self.generation.fetch_add(1, Ordering::AcqRel);
        if let Some(previous) = slot.take() {
            previous.cancel();
        }
    }

    /// Timer expiry: only flips the flag.
    fn mark_ready(&self, generation: u64) {
        if self.released.load(Ordering::Acquire) {
            return;
        }
        if self.generation.load(Ordering::Acquire) != generation {
            return;
        }
        self.flush.store(PENDING, Ordering::Release);
    }

    /// Draw-phase hook: at most one sink write per call.
    fn flush(&self) -> Result<(), RenderError> {
        if self.released.load(Ordering::Acquire) {
            return Ok(());
        }

        let pending = self.flush.swap(IDLE, Ordering::AcqRel) == PENDING;
        let redirected = self.redirected.swap(false, Ordering::AcqRel);

        if pending || redirected {
            self.write_sink()
        } else {
            Ok(())
        }
    }

    fn release(&self) {
        if self.released.swap(true, Ordering::AcqRel) {
            return;
        }

        self.disarm();
        self.flush.store(IDLE, Ordering::Release);
        self.redirected.store(false, Ordering::Release);
        log::debug!("render object `{}` released", self.label);
    }
}

/// Cloneable handle to a render object, usable from any thread.
///
/// Every mutator fails with [`RenderError::UseAfterRelease`] once the owning
/// [`RenderObject`] has been released or dropped.
#[derive(Clone)]
pub struct RenderHandle {
    shared: Arc<Shared>,
}

impl RenderHandle {
    pub fn label(&self) -> &str {
        &self.shared.label
    }

    /// Replaces the matrix. Does not render.
    pub fn set_transform(&self, matrix: Mat4) -> Result<(), RenderError> {
        self.shared.ensure_live()?;
        *self.shared.matrix.write() = matrix;
        Ok(())
    }

    /// Snapshot of the current matrix.
    pub fn transform(&self) -> Mat4 {
        *self.shared.matrix.read()
    }

    /// Post-multiplies the current matrix: `M = M * rhs`.
    pub fn mul_transform(&self, rhs: Mat4) -> Result<(), RenderError> {
        self.shared.ensure_live()?;
        let mut matrix = self.shared.matrix.write();
        *matrix *= rhs;
        Ok(())
    }

    /// Resets the matrix to identity.
    pub fn ident(&self) -> Result<(), RenderError> {
        self.set_transform(Mat4::IDENTITY)
    }

    /// Requests that the current matrix reach the sink.
    ///
    /// With `force`, or with deferred mode off, the write is immediate when
    /// called on the render thread and redirected to the next draw phase
    /// otherwise. Without `force` in deferred mode the debounce timer is
    /// (re)armed and its expiry marks the object pending; calls inside one
    /// window collapse into a single write of the last matrix.
    ///
    /// Forced requests never touch the debounce timer.
    pub fn render(&self, force: bool) -> Result<(), RenderError> {
        self.shared.ensure_live()?;

        let debounce = *self.shared.debounce.lock();
        match debounce {
            Some(delay) if !force => {
                self.shared.arm(delay);
                Ok(())
            }
            _ => self.shared.write_now(),
        }
    }

    /// Sets the debounce window. `None` turns deferred mode off, so every
    /// render takes the immediate path; an armed timer is cancelled.
    pub fn set_debounce(&self, debounce: Option<Duration>) -> Result<(), RenderError> {
        self.shared.ensure_live()?;
        *self.shared.debounce.lock() = debounce;
        if debounce.is_none() {
            self.shared.disarm();
        }
        Ok(())
    }

    pub fn debounce(&self) -> Option<Duration> {
        *self.shared.debounce.lock()
    }

    pub fn flush_state(&self) -> FlushState {
        match self.shared.flush.load(Ordering::Acquire) {
            PENDING => FlushState::Pending,
            _ => FlushState::Idle,
        }
    }

    pub fn is_released(&self) -> bool {
        self.shared.released.load(Ordering::Acquire)
    }

    /// Runs the draw-phase flush directly. The engine calls this from its
    /// `draw` subscription; exposed for platforms driving draw by hand.
    pub fn flush(&self) -> Result<(), RenderError> {
        self.shared.flush()
    }
}

/// Owner of a matrix bound to a sink, with coalesced writes.
///
/// Creating one subscribes it to the engine's draw phase. Dropping it
/// releases it: the debounce timer is cancelled before `drop` returns and
/// outstanding [`RenderHandle`]s start failing.
pub struct RenderObject {
    handle: RenderHandle,
}

impl RenderObject {
    pub fn new(engine: &Engine, label: impl Into<String>, sink: impl MatrixSink + 'static) -> Self {
        let shared = Arc::new(Shared {
            label: label.into(),
            matrix: RwLock::new(Mat4::IDENTITY),
            sink: Box::new(sink),
            flush: AtomicU8::new(IDLE),
            redirected: AtomicBool::new(false),
            released: AtomicBool::new(false),
            generation: AtomicU64::new(0),
            timer: Mutex::new(None),
            debounce: Mutex::new(Some(DEFAULT_DEBOUNCE)),
            timers: Arc::clone(engine.timers()),
            render_thread: engine.render_thread().clone(),
        });

        // The bus never drops subscribers, so it must not keep objects alive.
        let weak = Arc::downgrade(&shared);
        engine.events().on_draw(move |_| match weak.upgrade() {
            Some(shared) => Ok(shared.flush()?),
            None => Ok(()),
        });

        Self {
            handle: RenderHandle { shared },
        }
    }

    /// A cloneable handle for other threads.
    pub fn handle(&self) -> RenderHandle {
        self.handle.clone()
    }

    /// Cancels any armed timer and marks the object released. Idempotent.
    pub fn release(&self) {
        self.handle.shared.release();
    }
}

impl Deref for RenderObject {
    type Target = RenderHandle;

    fn deref(&self) -> &RenderHandle {
        &self.handle
    }
}

impl Drop for RenderObject {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FrameCtx, FrameInfo};
    use crate::render::ManualTimer;
    use crate::render::testing::RecordingSink as Recorder;

    fn setup() -> (Engine, Arc<ManualTimer>) {
        let timer = Arc::new(ManualTimer::new());
        let engine = Engine::with_timers(timer.clone());
        engine.render_thread().bind_current();
        (engine, timer)
    }

    fn draw(engine: &Engine) -> crate::events::FireReport {
        let mut ctx = FrameCtx::headless(FrameInfo::default());
        engine.events().fire_draw(&mut ctx)
    }

    fn m(v: f32) -> Mat4 {
        Mat4::from_scale(glam::Vec3::splat(v))
    }

    #[test]
    fn deferred_renders_coalesce_to_last_matrix() {
        let (engine, timer) = setup();
        let sink = Recorder::default();
        let obj = RenderObject::new(&engine, "model", sink.clone());

        obj.set_transform(m(1.0)).unwrap();
        obj.render(false).unwrap();
        timer.advance(Duration::from_millis(100));
        obj.set_transform(m(2.0)).unwrap();
        obj.render(false).unwrap();

        // First window was re-armed; 500ms after the first call nothing fired.
        timer.advance(Duration::from_millis(400));
        assert_eq!(obj.flush_state(), FlushState::Idle);
        draw(&engine);
        assert!(sink.writes().is_empty());

        timer.advance(Duration::from_millis(100));
        assert_eq!(obj.flush_state(), FlushState::Pending);
        assert!(sink.writes().is_empty());

        draw(&engine);
        assert_eq!(sink.writes(), vec![m(2.0)]);
        assert_eq!(obj.flush_state(), FlushState::Idle);

        draw(&engine);
        assert_eq!(sink.writes().len(), 1);
    }

    #[test]
    fn forced_render_writes_now_and_leaves_timer_alone() {
        let (engine, timer) = setup();
        let sink = Recorder::default();
        let obj = RenderObject::new(&engine, "camera", sink.clone());

        obj.set_transform(m(3.0)).unwrap();
        obj.render(true).unwrap();
        assert_eq!(sink.writes(), vec![m(3.0)]);
        assert_eq!(timer.pending(), 0);

        obj.render(false).unwrap();
        assert_eq!(timer.pending(), 1);
        obj.render(true).unwrap();
        assert_eq!(timer.pending(), 1);
        assert_eq!(sink.writes().len(), 2);

        timer.advance(DEFAULT_DEBOUNCE);
        draw(&engine);
        assert_eq!(sink.writes().len(), 3);
    }

    #[test]
    fn deferred_mode_off_renders_immediately() {
        let (engine, timer) = setup();
        let sink = Recorder::default();
        let obj = RenderObject::new(&engine, "projection", sink.clone());

        obj.set_debounce(None).unwrap();
        obj.render(false).unwrap();
        assert_eq!(sink.writes(), vec![Mat4::IDENTITY]);
        assert_eq!(timer.pending(), 0);
    }

    #[test]
    fn off_thread_write_is_redirected_to_draw() {
        let (engine, _timer) = setup();
        let sink = Recorder::default();
        let obj = RenderObject::new(&engine, "model", sink.clone());
        let handle = obj.handle();

        std::thread::spawn(move || {
            handle.set_transform(m(5.0)).unwrap();
            handle.render(true).unwrap();
            handle.render(true).unwrap();
        })
        .join()
        .unwrap();

        assert!(sink.writes().is_empty());
        draw(&engine);
        assert_eq!(sink.writes(), vec![m(5.0)]);
    }

    #[test]
    fn pending_and_redirected_collapse_into_one_write() {
        let (engine, timer) = setup();
        let sink = Recorder::default();
        let obj = RenderObject::new(&engine, "model", sink.clone());
        let handle = obj.handle();

        obj.render(false).unwrap();
        timer.advance(DEFAULT_DEBOUNCE);
        std::thread::spawn(move || handle.render(true).unwrap())
            .join()
            .unwrap();

        draw(&engine);
        assert_eq!(sink.writes().len(), 1);
    }

    #[test]
    fn release_cancels_pending_write() {
        let (engine, timer) = setup();
        let sink = Recorder::default();
        let obj = RenderObject::new(&engine, "model", sink.clone());

        obj.render(false).unwrap();
        assert_eq!(timer.pending(), 1);

        obj.release();
        assert_eq!(timer.pending(), 0);
        assert!(obj.is_released());

        timer.advance(DEFAULT_DEBOUNCE);
        draw(&engine);
        assert!(sink.writes().is_empty());
    }

    #[test]
    fn dropped_object_stops_flushing() {
        let (engine, timer) = setup();
        let sink = Recorder::default();
        let obj = RenderObject::new(&engine, "model", sink.clone());
        let handle = obj.handle();

        obj.render(false).unwrap();
        drop(obj);

        timer.advance(DEFAULT_DEBOUNCE);
        assert!(draw(&engine).is_ok());
        assert!(sink.writes().is_empty());
        assert!(handle.is_released());
    }

    #[test]
    #[cfg_attr(debug_assertions, should_panic(expected = "used after release"))]
    fn mutating_after_release_is_rejected() {
        let (engine, _timer) = setup();
        let obj = RenderObject::new(&engine, "model", Recorder::default());
        let handle = obj.handle();
        obj.release();

        let err = handle.set_transform(Mat4::IDENTITY).unwrap_err();
        assert_eq!(
            err,
            RenderError::UseAfterRelease {
                label: "model".into()
            }
        );
    }

    #[test]
    fn sink_failure_is_recorded_and_others_still_flush() {
        let (engine, _timer) = setup();
        let broken = Recorder::failing();
        let healthy = Recorder::default();

        let a = RenderObject::new(&engine, "broken", broken.clone());
        let b = RenderObject::new(&engine, "healthy", healthy.clone());

        let handles = (a.handle(), b.handle());
        std::thread::spawn(move || {
            handles.0.render(true).unwrap();
            handles.1.render(true).unwrap();
        })
        .join()
        .unwrap();

        let report = draw(&engine);
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].message.contains("broken"));
        assert_eq!(healthy.writes().len(), 1);
    }

    #[test]
    fn immediate_sink_failure_is_returned() {
        let (engine, _timer) = setup();
        let obj = RenderObject::new(&engine, "camera", Recorder::failing());

        match obj.render(true) {
            Err(RenderError::SinkWriteFailed { label, .. }) => assert_eq!(label, "camera"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn mul_and_ident() {
        let (engine, _timer) = setup();
        let obj = RenderObject::new(&engine, "model", Recorder::default());

        obj.set_transform(m(2.0)).unwrap();
        obj.mul_transform(Mat4::from_translation(glam::Vec3::X)).unwrap();
        assert_eq!(
            obj.transform(),
            m(2.0) * Mat4::from_translation(glam::Vec3::X)
        );

        obj.ident().unwrap();
        assert_eq!(obj.transform(), Mat4::IDENTITY);
    }

    #[test]
    fn concurrent_deferred_renders_yield_one_write() {
        let (engine, timer) = setup();
        let sink = Recorder::default();
        let obj = RenderObject::new(&engine, "model", sink.clone());

        let workers: Vec<_> = (0..4)
            .map(|i| {
                let h = obj.handle();
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        h.set_transform(m(i as f32 + 1.0)).unwrap();
                        h.render(false).unwrap();
                    }
                })
            })
            .collect();
        for w in workers {
            w.join().unwrap();
        }

        timer.advance(DEFAULT_DEBOUNCE);
        draw(&engine);
        draw(&engine);
        assert_eq!(sink.writes().len(), 1);
        assert_eq!(sink.writes()[0], obj.transform());
    }
}
