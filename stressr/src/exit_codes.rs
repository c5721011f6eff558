#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,

    /// The report could not be read or normalized.
    ReportError = 20,

    /// Invalid CLI/config/options (bad flags, unknown function type, unreadable profile, etc.).
    InvalidInput = 30,

    /// Internal/runtime error (failed to spawn locust, IO errors while archiving, etc.).
    RuntimeError = 40,
}

impl ExitCode {
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}
