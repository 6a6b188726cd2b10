//! Encoder: walks a file or directory tree into an archive stream.
//!
//! ```no_run
//! use flatarch::pack::{pack, PackOutcome};
//! use flatarch::prompt::AssumeNo;
//!
//! match pack("docs", "docs.arch", &mut AssumeNo)? {
//!     PackOutcome::Written(stats) => println!("{} files", stats.files),
//!     PackOutcome::Declined       => println!("kept the existing archive"),
//! }
//! # Ok::<(), flatarch::ArchiveError>(())
//! ```
//!
//! Entries are written depth-first, pre-order: a directory's FOLDER entry
//! comes before anything inside it.  Children are visited in whatever order
//! the filesystem returns them.
//!
//! A failed pack leaves a truncated archive at the destination.  Nothing is
//! cleaned up.

use log::{debug, info, warn};
use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{ArchiveError, ArchiveResult};
use crate::format::{EntryWriter, FormatError, COPY_BUFFER_SIZE};
use crate::path::dedup_slashes;
use crate::prompt::OverwritePrompt;

/// Archive name used by the CLI when no destination is given.
pub const DEFAULT_ARCHIVE_NAME: &str = "archive.arch";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PackStats {
    pub files:   u64,
    pub folders: u64,
    /// Content bytes, headers excluded.
    pub bytes:   u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackOutcome {
    Written(PackStats),
    /// The destination existed and the prompt said no.  Nothing was touched.
    Declined,
}

/// Pack `source` into a new archive at `destination`.
///
/// If `destination` already exists, `prompt` decides whether it is removed
/// and replaced.
pub fn pack<P>(
    source:      impl AsRef<Path>,
    destination: impl AsRef<Path>,
    prompt:      &mut P,
) -> ArchiveResult<PackOutcome>
where
    P: OverwritePrompt + ?Sized,
{
    let source = source.as_ref();
    let destination = destination.as_ref();

    let root = source
        .to_str()
        .map(dedup_slashes)
        .ok_or_else(|| ArchiveError::NonUtf8Path(source.to_path_buf()))?;
    fs::metadata(&root).map_err(ArchiveError::io("stat", &root))?;

    if destination.symlink_metadata().is_ok() {
        let overwrite = prompt
            .confirm_overwrite(destination)
            .map_err(ArchiveError::io("confirm overwrite of", destination))?;
        if !overwrite {
            info!("kept existing {}", destination.display());
            return Ok(PackOutcome::Declined);
        }
        fs::remove_file(destination).map_err(ArchiveError::io("remove", destination))?;
    }

    let file = File::create(destination).map_err(ArchiveError::io("create", destination))?;
    let out = EntryWriter::new(BufWriter::with_capacity(COPY_BUFFER_SIZE, file), &root)
        .map_err(|e| write_error(destination, &root, e))?;
    debug!("packing {root} ({} byte root) into {}", root.len(), destination.display());

    let mut packer = Packer {
        out,
        archive: destination,
        archive_canonical: fs::canonicalize(destination).ok(),
        stats: PackStats::default(),
    };
    packer.walk(&root)?;

    let Packer { out, stats, .. } = packer;
    out.finish().map_err(|e| write_error(destination, &root, e))?;
    Ok(PackOutcome::Written(stats))
}

struct Packer<'a> {
    out:     EntryWriter<BufWriter<File>>,
    archive: &'a Path,
    /// Resolved archive path, so a destination inside the source tree is
    /// not packed into itself.
    archive_canonical: Option<PathBuf>,
    stats:   PackStats,
}

impl Packer<'_> {
    /// Pre-order walk: `WalkDir` yields a directory before its contents and
    /// siblings in `read_dir` order.  It never yields "." or "..".
    fn walk(&mut self, root: &str) -> ArchiveResult<()> {
        for ent in WalkDir::new(root).follow_links(false) {
            let ent = ent.map_err(|e| {
                let path = e.path().map_or_else(|| PathBuf::from(root), Path::to_path_buf);
                let msg = e.to_string();
                let source = e
                    .into_io_error()
                    .unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, msg));
                ArchiveError::Io { op: "read directory", path, source }
            })?;

            let path = ent
                .path()
                .to_str()
                .map(dedup_slashes)
                .ok_or_else(|| ArchiveError::NonUtf8Path(ent.path().to_path_buf()))?;

            // The root is followed even when it is a symlink.
            let file_type = if ent.depth() == 0 {
                fs::metadata(ent.path()).map_err(ArchiveError::io("stat", &path))?.file_type()
            } else {
                ent.file_type()
            };
            if file_type.is_dir() {
                self.out.write_folder(&path).map_err(|e| write_error(self.archive, &path, e))?;
                self.stats.folders += 1;
                debug!("folder {path}");
            } else if file_type.is_file() {
                if self.is_archive(ent.path()) {
                    warn!("skipping {path}: it is the archive being written");
                    continue;
                }
                self.pack_file(&path)?;
            } else {
                warn!("skipping {path}: not a regular file or directory");
            }
        }
        Ok(())
    }

    fn is_archive(&self, path: &Path) -> bool {
        let Some(archive) = self.archive_canonical.as_deref() else { return false };
        path.file_name() == archive.file_name()
            && fs::canonicalize(path).is_ok_and(|p| p == archive)
    }

    fn pack_file(&mut self, path: &str) -> ArchiveResult<()> {
        let file = File::open(path).map_err(ArchiveError::io("open", path))?;
        let len = file.metadata().map_err(ArchiveError::io("stat", path))?.len();

        self.out
            .write_file(path, len, file)
            .map_err(|e| write_error(self.archive, path, e))?;

        self.stats.files += 1;
        self.stats.bytes += len;
        info!("packed {path}");
        Ok(())
    }
}

fn write_error(archive: &Path, entry: &str, e: FormatError) -> ArchiveError {
    match e {
        FormatError::Io(source) => ArchiveError::Io { op: "write", path: archive.to_path_buf(), source },
        FormatError::Truncated => ArchiveError::Io {
            op:     "read",
            path:   entry.into(),
            source: io::Error::new(io::ErrorKind::UnexpectedEof, "file shrank while being packed"),
        },
        source => ArchiveError::Format { path: entry.into(), source },
    }
}
