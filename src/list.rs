//! Read-only listing of an archive's entries.
//!
//! ```no_run
//! for entry in flatarch::list("docs.arch")? {
//!     println!("{:?} {} {:?}", entry.kind, entry.path, entry.size);
//! }
//! # Ok::<(), flatarch::ArchiveError>(())
//! ```

use serde::Serialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::{ArchiveError, ArchiveResult};
use crate::format::{EntryHeader, EntryKind, EntryReader, COPY_BUFFER_SIZE};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListedEntry {
    pub kind: EntryKind,
    /// Path exactly as stored, original root included.
    pub path: String,
    /// Content length; `None` for folders.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

/// Every entry of `archive`, in stream order.
pub fn list(archive: impl AsRef<Path>) -> ArchiveResult<Vec<ListedEntry>> {
    let archive = archive.as_ref();
    let file = File::open(archive).map_err(ArchiveError::io("open", archive))?;
    let mut reader = EntryReader::new(BufReader::with_capacity(COPY_BUFFER_SIZE, file))
        .map_err(ArchiveError::format(archive))?;

    let mut entries = Vec::new();
    while let Some(entry) = reader.next_entry().map_err(ArchiveError::format(archive))? {
        let kind = entry.kind();
        let listed = match entry {
            EntryHeader::Folder { path } => ListedEntry { kind, path, size: None },
            EntryHeader::File { path, content_length } => {
                reader.skip_content(content_length).map_err(ArchiveError::format(archive))?;
                ListedEntry { kind, path, size: Some(content_length) }
            }
        };
        entries.push(listed);
    }
    Ok(entries)
}
