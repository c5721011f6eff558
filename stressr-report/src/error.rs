use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum ReportErrorKind {
    ReportUnreadable,
    ReportMalformed,
    KeyValueMismatch,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read report {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed report: {0}")]
    Malformed(String),

    #[error("malformed report: row {index} has neither header nor data cells")]
    UnclassifiedRow { index: usize },

    #[error("report has {keys} header cell(s) but {values} data cell(s)")]
    KeyValueMismatch { keys: usize, values: usize },
}

impl Error {
    #[must_use]
    pub fn kind(&self) -> ReportErrorKind {
        match self {
            Self::Unreadable { .. } => ReportErrorKind::ReportUnreadable,
            Self::Malformed(_) | Self::UnclassifiedRow { .. } => ReportErrorKind::ReportMalformed,
            Self::KeyValueMismatch { .. } => ReportErrorKind::KeyValueMismatch,
        }
    }
}
