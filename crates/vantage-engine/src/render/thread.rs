use std::sync::Arc;
use std::thread::{self, ThreadId};

use parking_lot::RwLock;

/// Identity of the thread allowed to perform sink writes.
///
/// The frame scheduler binds the thread it runs on; until then no thread is
/// the render thread and every immediate write is redirected to the next
/// draw phase.
#[derive(Debug, Clone, Default)]
pub struct RenderThread {
    id: Arc<RwLock<Option<ThreadId>>>,
}

impl RenderThread {
    /// Makes the calling thread the render thread.
    pub fn bind_current(&self) {
        let id = thread::current().id();
        let previous = self.id.write().replace(id);
        if previous.is_some_and(|p| p != id) {
            log::warn!("render thread rebound from {previous:?} to {id:?}");
        }
    }

    pub fn is_bound(&self) -> bool {
        self.id.read().is_some()
    }

    pub fn is_current(&self) -> bool {
        *self.id.read() == Some(thread::current().id())
    }
}
