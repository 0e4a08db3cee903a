use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use glam::Mat4;
use parking_lot::Mutex;

use super::{MatrixSink, SinkError};

/// Sink recording every matrix it receives, optionally rejecting writes.
#[derive(Clone, Default)]
pub(crate) struct RecordingSink {
    writes: Arc<Mutex<Vec<Mat4>>>,
    fail: Arc<AtomicBool>,
}

impl RecordingSink {
    pub(crate) fn failing() -> Self {
        let sink = Self::default();
        sink.fail.store(true, Ordering::SeqCst);
        sink
    }

    pub(crate) fn writes(&self) -> Vec<Mat4> {
        self.writes.lock().clone()
    }

    pub(crate) fn last(&self) -> Option<Mat4> {
        self.writes.lock().last().copied()
    }
}

impl MatrixSink for RecordingSink {
    fn write(&self, matrix: &Mat4) -> Result<(), SinkError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(SinkError::Rejected("uniform location gone".into()));
        }
        self.writes.lock().push(*matrix);
        Ok(())
    }
}
