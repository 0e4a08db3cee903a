use std::cmp::Ordering as CmpOrdering;
use std::collections::BinaryHeap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

/// Work run when a one-shot timer expires.
pub type TimerCallback = Box<dyn FnOnce() + Send + 'static>;

/// Process-wide one-shot timer scheduling.
///
/// Callbacks may run on any thread and must return promptly.
pub trait TimerFacility: Send + Sync {
    /// Runs `callback` once after `delay` unless the returned handle is
    /// cancelled first.
    fn schedule(&self, delay: Duration, callback: TimerCallback) -> TimerHandle;
}

/// Cancellation handle for a scheduled timer.
///
/// Cancelling an expired or already cancelled timer is a no-op.
#[derive(Debug, Clone)]
pub struct TimerHandle {
    cancelled: Arc<AtomicBool>,
}

impl TimerHandle {
    fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

struct Entry {
    deadline: Instant,
    seq: u64,
    handle: TimerHandle,
    callback: TimerCallback,
}

// Min-heap on (deadline, seq).
impl Ord for Entry {
    fn cmp(&self, other: &Self) -> CmpOrdering {
        other
            .deadline
            .cmp(&self.deadline)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.deadline == other.deadline && self.seq == other.seq
    }
}

impl Eq for Entry {}

#[derive(Default)]
struct Queue {
    heap: BinaryHeap<Entry>,
    next_seq: u64,
    shutdown: bool,
}

struct TimerShared {
    queue: Mutex<Queue>,
    wake: Condvar,
}

/// Timer facility backed by one background thread.
///
/// Dropping it stops the thread; timers still pending at that point never
/// fire.
pub struct ThreadTimer {
    shared: Arc<TimerShared>,
    worker: Option<JoinHandle<()>>,
}

impl ThreadTimer {
    pub fn spawn() -> std::io::Result<Self> {
        let shared = Arc::new(TimerShared {
            queue: Mutex::new(Queue::default()),
            wake: Condvar::new(),
        });

        let worker_shared = Arc::clone(&shared);
        let worker = std::thread::Builder::new()
            .name("vantage-timer".to_string())
            .spawn(move || timer_loop(&worker_shared))?;

        Ok(Self {
            shared,
            worker: Some(worker),
        })
    }
}

fn timer_loop(shared: &TimerShared) {
    let mut queue = shared.queue.lock();

    loop {
        if queue.shutdown {
            return;
        }

        let Some(next) = queue.heap.peek() else {
            shared.wake.wait(&mut queue);
            continue;
        };

        let deadline = next.deadline;
        if Instant::now() < deadline {
            shared.wake.wait_until(&mut queue, deadline);
            continue;
        }

        let Some(entry) = queue.heap.pop() else { continue };
        if entry.handle.is_cancelled() {
            continue;
        }

        // Never hold the queue lock while user code runs.
        drop(queue);
        (entry.callback)();
        queue = shared.queue.lock();
    }
}

impl TimerFacility for ThreadTimer {
    fn schedule(&self, delay: Duration, callback: TimerCallback) -> TimerHandle {
        let handle = TimerHandle::new();
        let mut queue = self.shared.queue.lock();

        let seq = queue.next_seq;
        queue.next_seq += 1;
        queue.heap.push(Entry {
            deadline: Instant::now() + delay,
            seq,
            handle: handle.clone(),
            callback,
        });

        // Drop expired cancellations so re-arming does not grow the heap unbounded.
        if queue.heap.len() > 64 {
            let live: Vec<Entry> = queue
                .heap
                .drain()
                .filter(|e| !e.handle.is_cancelled())
                .collect();
            queue.heap.extend(live);
        }

        drop(queue);
        self.shared.wake.notify_one();
        handle
    }
}

impl Drop for ThreadTimer {
    fn drop(&mut self) {
        self.shared.queue.lock().shutdown = true;
        self.shared.wake.notify_one();

        if let Some(worker) = self.worker.take() {
            // The last owner can be a callback running on the worker itself;
            // it exits on its own once the callback returns.
            if worker.thread().id() == std::thread::current().id() {
                return;
            }
            if worker.join().is_err() {
                log::error!("timer thread panicked");
            }
        }
    }
}

// ── manual timer ──────────────────────────────────────────────────────────

struct ManualEntry {
    due: Duration,
    seq: u64,
    handle: TimerHandle,
    callback: TimerCallback,
}

#[derive(Default)]
struct ManualState {
    now: Duration,
    next_seq: u64,
    entries: Vec<ManualEntry>,
}

/// Deterministic timer facility driven by [`ManualTimer::advance`].
///
/// Intended for tests and replays: nothing fires until time is advanced, and
/// due callbacks run on the advancing thread in deadline order.
#[derive(Default)]
pub struct ManualTimer {
    state: Mutex<ManualState>,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves virtual time forward and fires every timer that came due.
    pub fn advance(&self, by: Duration) {
        let due = {
            let mut state = self.state.lock();
            state.now += by;
            let now = state.now;

            let (mut due, pending): (Vec<_>, Vec<_>) =
                state.entries.drain(..).partition(|e| e.due <= now);
            state.entries = pending;

            due.sort_by_key(|e| (e.due, e.seq));
            due
        };

        for entry in due {
            if !entry.handle.is_cancelled() {
                (entry.callback)();
            }
        }
    }

    /// Timers scheduled and neither fired nor cancelled.
    pub fn pending(&self) -> usize {
        self.state
            .lock()
            .entries
            .iter()
            .filter(|e| !e.handle.is_cancelled())
            .count()
    }
}

impl TimerFacility for ManualTimer {
    fn schedule(&self, delay: Duration, callback: TimerCallback) -> TimerHandle {
        let handle = TimerHandle::new();
        let mut state = self.state.lock();

        let seq = state.next_seq;
        state.next_seq += 1;
        let due = state.now + delay;
        state.entries.push(ManualEntry {
            due,
            seq,
            handle: handle.clone(),
            callback,
        });

        handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::mpsc;

    fn counter() -> (Arc<AtomicUsize>, impl Fn() -> TimerCallback) {
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        let make = move || {
            let h = Arc::clone(&h);
            Box::new(move || {
                h.fetch_add(1, Ordering::SeqCst);
            }) as TimerCallback
        };
        (hits, make)
    }

    #[test]
    fn manual_timer_fires_only_when_due() {
        let timer = ManualTimer::new();
        let (hits, make) = counter();

        timer.schedule(Duration::from_millis(500), make());
        timer.advance(Duration::from_millis(499));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert_eq!(timer.pending(), 1);

        timer.advance(Duration::from_millis(1));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(timer.pending(), 0);

        timer.advance(Duration::from_secs(10));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn manual_timer_skips_cancelled() {
        let timer = ManualTimer::new();
        let (hits, make) = counter();

        let handle = timer.schedule(Duration::from_millis(10), make());
        handle.cancel();
        assert!(handle.is_cancelled());
        assert_eq!(timer.pending(), 0);

        timer.advance(Duration::from_millis(20));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn manual_timer_fires_in_deadline_order() {
        let timer = ManualTimer::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for (delay, tag) in [(30u64, "c"), (10, "a"), (20, "b")] {
            let o = Arc::clone(&order);
            timer.schedule(
                Duration::from_millis(delay),
                Box::new(move || o.lock().push(tag)),
            );
        }

        timer.advance(Duration::from_millis(30));
        assert_eq!(*order.lock(), vec!["a", "b", "c"]);
    }

    #[test]
    fn thread_timer_fires_on_background_thread() {
        let timer = ThreadTimer::spawn().unwrap();
        let (tx, rx) = mpsc::channel();
        let caller = std::thread::current().id();

        timer.schedule(
            Duration::from_millis(5),
            Box::new(move || {
                let _ = tx.send(std::thread::current().id());
            }),
        );

        let fired_on = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_ne!(fired_on, caller);
    }

    #[test]
    fn thread_timer_respects_cancel() {
        let timer = ThreadTimer::spawn().unwrap();
        let (hits, make) = counter();

        let handle = timer.schedule(Duration::from_millis(20), make());
        handle.cancel();

        // A later timer acts as a barrier: once it fires, the cancelled one
        // would have fired too.
        let (tx, rx) = mpsc::channel();
        timer.schedule(
            Duration::from_millis(40),
            Box::new(move || {
                let _ = tx.send(());
            }),
        );
        rx.recv_timeout(Duration::from_secs(5)).unwrap();

        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn thread_timer_dropped_from_its_own_callback() {
        let timer = Arc::new(ThreadTimer::spawn().unwrap());
        let slot = Arc::new(Mutex::new(Some(Arc::clone(&timer))));
        let (released_tx, released_rx) = mpsc::channel::<()>();
        let (done_tx, done_rx) = mpsc::channel();

        let s = Arc::clone(&slot);
        timer.schedule(
            Duration::from_millis(5),
            Box::new(move || {
                let _ = released_rx.recv_timeout(Duration::from_secs(5));
                // Drops the last owner on the worker thread.
                drop(s.lock().take());
                let _ = done_tx.send(());
            }),
        );

        drop(timer);
        released_tx.send(()).unwrap();

        done_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(slot.lock().is_none());
    }
}
