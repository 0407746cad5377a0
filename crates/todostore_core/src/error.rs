use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    #[error("invalid_input - {0}")]
    InvalidInput(String),
    #[error("invalid_data - {0}")]
    InvalidData(String),
    #[error("store_unavailable - {0}")]
    StoreUnavailable(String),
    #[error("not_found - task {0} not found")]
    NotFound(i64),
    #[error("write_failed - {0}")]
    WriteFailed(String),
    #[error("read_failed - {0}")]
    ReadFailed(String),
    #[error("io_error - {0}")]
    Io(String),
}

impl AppError {
    pub fn invalid_input<M: Into<String>>(message: M) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn invalid_data<M: Into<String>>(message: M) -> Self {
        Self::InvalidData(message.into())
    }

    pub fn store_unavailable<M: Into<String>>(message: M) -> Self {
        Self::StoreUnavailable(message.into())
    }

    pub fn write_failed<M: Into<String>>(message: M) -> Self {
        Self::WriteFailed(message.into())
    }

    pub fn read_failed<M: Into<String>>(message: M) -> Self {
        Self::ReadFailed(message.into())
    }

    pub fn io<M: Into<String>>(message: M) -> Self {
        Self::Io(message.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::InvalidData(_) => "invalid_data",
            Self::StoreUnavailable(_) => "store_unavailable",
            Self::NotFound(_) => "not_found",
            Self::WriteFailed(_) => "write_failed",
            Self::ReadFailed(_) => "read_failed",
            Self::Io(_) => "io_error",
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::NotFound(id) => format!("task {id} not found"),
            Self::InvalidInput(message)
            | Self::InvalidData(message)
            | Self::StoreUnavailable(message)
            | Self::WriteFailed(message)
            | Self::ReadFailed(message)
            | Self::Io(message) => message.clone(),
        }
    }

    /// True when a store operation matched no row, as opposed to failing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Maps a failure while opening or preparing the database file.
pub(crate) fn store_unavailable_from(path: &std::path::Path, err: rusqlite::Error) -> AppError {
    AppError::store_unavailable(format!("{}: {}", path.display(), err))
}

/// Maps a failure raised by an INSERT, UPDATE or DELETE statement.
pub(crate) fn write_failed_from(op: &str, err: rusqlite::Error) -> AppError {
    AppError::write_failed(format!("{op} failed: {err}"))
}

/// Maps a failure raised while running a query or stepping its rows.
pub(crate) fn read_failed_from(err: rusqlite::Error) -> AppError {
    AppError::read_failed(format!("query failed: {err}"))
}
