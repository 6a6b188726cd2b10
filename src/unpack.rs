//! Decoder: replays an archive stream onto the filesystem.
//!
//! Entries are applied strictly in stream order.  Each stored path has its
//! archived root rewritten to the destination root (see
//! [`crate::path::substitute_root`]); an empty destination root extracts
//! every entry at exactly the path it was packed from.
//!
//! Nothing is ever overwritten.  The first entry whose destination already
//! exists aborts the run, and whatever was extracted before it stays on disk.
//!
//! ```no_run
//! use flatarch::unpack::unpack;
//!
//! // "docs/a.txt" in the archive lands at "restored/a.txt".
//! let stats = unpack("docs.arch", "restored")?;
//! println!("{} files, {} folders", stats.files, stats.folders);
//! # Ok::<(), flatarch::ArchiveError>(())
//! ```

use log::{debug, info};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use crate::error::{ArchiveError, ArchiveResult};
use crate::format::{EntryHeader, EntryReader, FormatError, COPY_BUFFER_SIZE};
use crate::path::substitute_root;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnpackStats {
    pub files:   u64,
    pub folders: u64,
    pub bytes:   u64,
}

/// Extract `archive` under `destination_root`, or in place if it is empty.
pub fn unpack(archive: impl AsRef<Path>, destination_root: &str) -> ArchiveResult<UnpackStats> {
    let archive = archive.as_ref();
    let file = File::open(archive).map_err(ArchiveError::io("open", archive))?;
    let mut reader = EntryReader::new(BufReader::with_capacity(COPY_BUFFER_SIZE, file))
        .map_err(ArchiveError::format(archive))?;
    let root_len = reader.root_name_length();
    debug!("unpacking {} (root {root_len} bytes) to {destination_root:?}", archive.display());

    let mut stats = UnpackStats::default();
    while let Some(entry) = reader.next_entry().map_err(ArchiveError::format(archive))? {
        let target = destination_for(entry.path(), root_len, destination_root)
            .map_err(ArchiveError::format(archive))?;

        if target.symlink_metadata().is_ok() {
            return Err(ArchiveError::AlreadyExists(target));
        }

        match entry {
            EntryHeader::Folder { .. } => {
                fs::create_dir(&target).map_err(ArchiveError::io("create directory", &target))?;
                stats.folders += 1;
                debug!("folder {}", target.display());
            }
            EntryHeader::File { content_length, .. } => {
                let mut out = OpenOptions::new()
                    .write(true)
                    .create_new(true)
                    .open(&target)
                    .map_err(ArchiveError::io("create", &target))?;
                let copied = io::copy(&mut reader.content(content_length), &mut out)
                    .map_err(ArchiveError::io("extract", &target))?;
                if copied != content_length {
                    return Err(ArchiveError::Format {
                        path:   archive.to_path_buf(),
                        source: FormatError::Truncated,
                    });
                }
                stats.files += 1;
                stats.bytes += copied;
                info!("unpacked {}", target.display());
            }
        }
    }
    Ok(stats)
}

fn destination_for(stored: &str, root_len: u64, new_root: &str) -> Result<PathBuf, FormatError> {
    usize::try_from(root_len)
        .ok()
        .and_then(|n| substitute_root(stored, n, new_root))
        .map(PathBuf::from)
        .ok_or_else(|| FormatError::RootMismatch { path: stored.to_owned(), root_len })
}
