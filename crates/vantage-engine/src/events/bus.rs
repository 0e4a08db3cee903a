use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::core::{FrameCtx, RunCtx};

use super::types::{CursorPos, EventKind, FramebufferSize, KeyEvent, MouseButtonEvent, Scroll};

type KeyCallback = dyn Fn(&KeyEvent) -> anyhow::Result<()> + Send + Sync;
type MouseButtonCallback = dyn Fn(&MouseButtonEvent) -> anyhow::Result<()> + Send + Sync;
type CursorPosCallback = dyn Fn(&CursorPos) -> anyhow::Result<()> + Send + Sync;
type ScrollCallback = dyn Fn(&Scroll) -> anyhow::Result<()> + Send + Sync;
type FramebufferSizeCallback = dyn Fn(&FramebufferSize) -> anyhow::Result<()> + Send + Sync;
type RunCallback = dyn Fn(&RunCtx) -> anyhow::Result<()> + Send + Sync;
type DrawCallback = dyn Fn(&mut FrameCtx<'_>) -> anyhow::Result<()> + Send + Sync;

/// A subscriber that returned an error or panicked during a fire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriberFailure {
    pub kind: EventKind,
    /// Registration index of the failing subscriber.
    pub index: usize,
    pub message: String,
}

/// Outcome of a single fire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FireReport {
    pub kind: EventKind,
    /// Subscribers invoked, failed ones included.
    pub invoked: usize,
    pub failures: Vec<SubscriberFailure>,
}

impl FireReport {
    fn new(kind: EventKind) -> Self {
        Self {
            kind,
            invoked: 0,
            failures: Vec::new(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Append-only subscriber list for one event kind.
struct Registry<F: ?Sized> {
    kind: EventKind,
    subscribers: RwLock<Vec<Arc<F>>>,
}

impl<F: ?Sized> Registry<F> {
    fn new(kind: EventKind) -> Self {
        Self {
            kind,
            subscribers: RwLock::new(Vec::new()),
        }
    }

    fn push(&self, callback: Arc<F>) {
        self.subscribers.write().push(callback);
    }

    fn len(&self) -> usize {
        self.subscribers.read().len()
    }

    /// Runs every subscriber registered at the time of the call.
    ///
    /// The list is copied out of the lock first so a subscriber may register
    /// further subscribers without deadlocking; those run from the next fire.
    fn fire(&self, mut call: impl FnMut(&F) -> anyhow::Result<()>) -> FireReport {
        let subscribers: Vec<Arc<F>> = self.subscribers.read().clone();
        let mut report = FireReport::new(self.kind);

        for (index, subscriber) in subscribers.iter().enumerate() {
            report.invoked += 1;

            let message = match panic::catch_unwind(AssertUnwindSafe(|| call(&**subscriber))) {
                Ok(Ok(())) => continue,
                Ok(Err(err)) => format!("{err:#}"),
                Err(payload) => panic_message(payload.as_ref()),
            };

            log::error!("{} subscriber #{index} failed: {message}", self.kind);
            report.failures.push(SubscriberFailure {
                kind: self.kind,
                index,
                message,
            });
        }

        report
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_string()
    }
}

/// Multi-subscriber callback registries.
///
/// Subscribing never fails and never deduplicates; there is no removal, so
/// subscriptions live as long as the bus. Registration takes a write lock,
/// firing a read lock.
///
/// Failure policy is isolate-and-continue: a subscriber returning `Err` or
/// panicking is logged and recorded in the [`FireReport`], and the remaining
/// subscribers of the same fire still run.
pub struct EventBus {
    key: Registry<KeyCallback>,
    mouse_button: Registry<MouseButtonCallback>,
    cursor_pos: Registry<CursorPosCallback>,
    scroll: Registry<ScrollCallback>,
    framebuffer_size: Registry<FramebufferSizeCallback>,
    run: Registry<RunCallback>,
    draw: Registry<DrawCallback>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            key: Registry::new(EventKind::Key),
            mouse_button: Registry::new(EventKind::MouseButton),
            cursor_pos: Registry::new(EventKind::CursorPos),
            scroll: Registry::new(EventKind::Scroll),
            framebuffer_size: Registry::new(EventKind::FramebufferSize),
            run: Registry::new(EventKind::Run),
            draw: Registry::new(EventKind::Draw),
        }
    }

    // ── subscribe ────────────────────────────────────────────────────────

    pub fn on_key<F>(&self, f: F)
    where
        F: Fn(&KeyEvent) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.key.push(Arc::new(f));
    }

    pub fn on_mouse_button<F>(&self, f: F)
    where
        F: Fn(&MouseButtonEvent) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.mouse_button.push(Arc::new(f));
    }

    pub fn on_cursor_pos<F>(&self, f: F)
    where
        F: Fn(&CursorPos) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.cursor_pos.push(Arc::new(f));
    }

    pub fn on_scroll<F>(&self, f: F)
    where
        F: Fn(&Scroll) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.scroll.push(Arc::new(f));
    }

    pub fn on_framebuffer_size<F>(&self, f: F)
    where
        F: Fn(&FramebufferSize) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.framebuffer_size.push(Arc::new(f));
    }

    pub fn on_run<F>(&self, f: F)
    where
        F: Fn(&RunCtx) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.run.push(Arc::new(f));
    }

    pub fn on_draw<F>(&self, f: F)
    where
        F: Fn(&mut FrameCtx<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.draw.push(Arc::new(f));
    }

    // ── fire ─────────────────────────────────────────────────────────────

    pub fn fire_key(&self, ev: &KeyEvent) -> FireReport {
        self.key.fire(|cb| cb(ev))
    }

    pub fn fire_mouse_button(&self, ev: &MouseButtonEvent) -> FireReport {
        self.mouse_button.fire(|cb| cb(ev))
    }

    pub fn fire_cursor_pos(&self, ev: &CursorPos) -> FireReport {
        self.cursor_pos.fire(|cb| cb(ev))
    }

    pub fn fire_scroll(&self, ev: &Scroll) -> FireReport {
        self.scroll.fire(|cb| cb(ev))
    }

    pub fn fire_framebuffer_size(&self, ev: &FramebufferSize) -> FireReport {
        self.framebuffer_size.fire(|cb| cb(ev))
    }

    pub fn fire_run(&self, ctx: &RunCtx) -> FireReport {
        self.run.fire(|cb| cb(ctx))
    }

    pub fn fire_draw(&self, ctx: &mut FrameCtx<'_>) -> FireReport {
        self.draw.fire(|cb| cb(&mut *ctx))
    }

    /// Number of subscribers currently registered for `kind`.
    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        match kind {
            EventKind::Key => self.key.len(),
            EventKind::MouseButton => self.mouse_button.len(),
            EventKind::CursorPos => self.cursor_pos.len(),
            EventKind::Scroll => self.scroll.len(),
            EventKind::FramebufferSize => self.framebuffer_size.len(),
            EventKind::Run => self.run.len(),
            EventKind::Draw => self.draw.len(),
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
