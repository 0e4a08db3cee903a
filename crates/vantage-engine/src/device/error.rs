/// What the frame loop should do after a surface error.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface was reconfigured; rendering resumes next frame.
    Reconfigured,
    /// Transient error; skip the current frame.
    SkipFrame,
    /// Unrecoverable (out of memory); stop the loop.
    Fatal,
}

impl SurfaceErrorAction {
    /// Whether the loop can keep going.
    pub fn is_recoverable(self) -> bool {
        !matches!(self, SurfaceErrorAction::Fatal)
    }
}
