/// Capture session state machine.
///
/// State transitions:
/// ```text
/// idle → configuring → running ⇄ capturing
///          ↑              │
///          └── switch ────┘        stop: any → idle
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaptureSessionState {
    Idle,
    Configuring,
    Running,
    Capturing,
}

impl CaptureSessionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    pub fn is_capturing(&self) -> bool {
        matches!(self, Self::Capturing)
    }

    /// Whether the hardware session is live (frames flowing).
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Running | Self::Capturing)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Configuring => "configuring",
            Self::Running => "running",
            Self::Capturing => "capturing",
        }
    }
}

impl std::fmt::Display for CaptureSessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
