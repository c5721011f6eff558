use stressr_report::ReportErrorKind;

use crate::exit_codes::ExitCode;

#[derive(Debug)]
pub enum RunError {
    InvalidInput(anyhow::Error),
    ReportError(anyhow::Error),
    RuntimeError(anyhow::Error),
}

impl RunError {
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::InvalidInput(_) => ExitCode::InvalidInput,
            Self::ReportError(_) => ExitCode::ReportError,
            Self::RuntimeError(_) => ExitCode::RuntimeError,
        }
    }

    #[must_use]
    pub fn anyhow(&self) -> &anyhow::Error {
        match self {
            Self::InvalidInput(e) | Self::ReportError(e) | Self::RuntimeError(e) => e,
        }
    }

    /// Wraps a report failure, tagging the message with its stable kind.
    #[must_use]
    pub fn report(err: stressr_report::Error) -> Self {
        let kind = err.kind();
        Self::ReportError(anyhow::Error::new(err).context(kind))
    }

    /// Like [`RunError::report`], for a report that a load test was expected to produce.
    #[must_use]
    pub fn produced_report(err: stressr_report::Error) -> Self {
        if err.kind() != ReportErrorKind::ReportUnreadable {
            return Self::report(err);
        }
        Self::ReportError(anyhow::Error::new(err).context(
            "load test did not leave a readable report (check the target and payload format)",
        ))
    }
}

impl std::fmt::Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput(e) | Self::ReportError(e) | Self::RuntimeError(e) => {
                write!(f, "{e:#}")
            }
        }
    }
}

impl std::error::Error for RunError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.anyhow().as_ref())
    }
}
