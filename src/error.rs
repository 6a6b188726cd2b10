use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::format::FormatError;

/// Failure of a pack, unpack or list run.
///
/// None of these are recovered from inside the library; the caller decides
/// whether to report and exit.
#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("{} is not an archive", .0.display())]
    NotAnArchive(PathBuf),
    #[error("{}: {source}", .path.display())]
    Format {
        path: PathBuf,
        #[source]
        source: FormatError,
    },
    #[error("{} already exists", .0.display())]
    AlreadyExists(PathBuf),
    #[error("Path is not valid UTF-8: {}", .0.display())]
    NonUtf8Path(PathBuf),
    #[error("Failed to {op} {}: {source}", .path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type ArchiveResult<T> = Result<T, ArchiveError>;

impl ArchiveError {
    pub(crate) fn io(op: &'static str, path: impl AsRef<Path>) -> impl FnOnce(io::Error) -> Self {
        let path = path.as_ref().to_path_buf();
        move |source| ArchiveError::Io { op, path, source }
    }

    /// Attach the archive path to a wire-format error.
    pub(crate) fn format(path: impl AsRef<Path>) -> impl FnOnce(FormatError) -> Self {
        let path = path.as_ref().to_path_buf();
        move |source| match source {
            FormatError::InvalidMagic => ArchiveError::NotAnArchive(path),
            source => ArchiveError::Format { path, source },
        }
    }
}
