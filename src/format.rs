//! Wire format of the archive stream.
//!
//! ```text
//! header : MAGIC (5 bytes) | root_name_length u64
//! entry  : kind u8 | path_length u64 | path bytes + NUL
//!          [content_length u64 | content bytes]     (FILE only)
//! ```
//!
//! Integers are native-endian.  There is no index and no trailer: the
//! stream ends where the last entry ends, and the only way to find an entry
//! is to read every entry before it.

use byteorder::{NativeEndian, ReadBytesExt, WriteBytesExt};
use serde::Serialize;
use std::io::{self, Read, Write};
use thiserror::Error;

pub const MAGIC_LEN: usize = 5;
pub const MAGIC: &[u8; MAGIC_LEN] = b"ARCH\0";
/// Upper bound on a stored path, NUL included.
pub const MAX_PATH_LEN: u64 = 4096;
/// Buffer size for the archive file on both sides.
pub const COPY_BUFFER_SIZE: usize = 64 * 1024;

#[derive(Error, Debug)]
pub enum FormatError {
    #[error("Invalid magic tag")]
    InvalidMagic,
    #[error("Unknown entry kind: {0:#04x}")]
    UnknownKind(u8),
    #[error("Path length {0} is out of range")]
    PathLength(u64),
    #[error("Stored path is not a NUL-terminated UTF-8 string")]
    MalformedPath,
    #[error("Stored path {path:?} is shorter than the {root_len}-byte archive root")]
    RootMismatch { path: String, root_len: u64 },
    #[error("Archive ends in the middle of an entry")]
    Truncated,
    #[error("IO error: {0}")]
    Io(io::Error),
}

impl From<io::Error> for FormatError {
    fn from(e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            FormatError::Truncated
        } else {
            FormatError::Io(e)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum EntryKind {
    File   = 0,
    Folder = 1,
}

impl TryFrom<u8> for EntryKind {
    type Error = FormatError;

    fn try_from(v: u8) -> Result<Self, FormatError> {
        match v {
            0 => Ok(EntryKind::File),
            1 => Ok(EntryKind::Folder),
            other => Err(FormatError::UnknownKind(other)),
        }
    }
}

/// Descriptor of one entry, as read from the stream.
///
/// For a file, the `content_length` bytes that follow are still unread when
/// this is returned; see [`EntryReader::content`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryHeader {
    Folder { path: String },
    File { path: String, content_length: u64 },
}

impl EntryHeader {
    pub fn kind(&self) -> EntryKind {
        match self {
            EntryHeader::Folder { .. } => EntryKind::Folder,
            EntryHeader::File { .. } => EntryKind::File,
        }
    }

    pub fn path(&self) -> &str {
        match self {
            EntryHeader::Folder { path } | EntryHeader::File { path, .. } => path,
        }
    }
}

// ── Writer ───────────────────────────────────────────────────────────────────

/// Append-only writer for the archive stream.
pub struct EntryWriter<W: Write> {
    writer: W,
}

impl<W: Write> EntryWriter<W> {
    /// Write the header.  `root` is the path every stored entry starts with.
    pub fn new(mut writer: W, root: &str) -> Result<Self, FormatError> {
        writer.write_all(MAGIC)?;
        writer.write_u64::<NativeEndian>(root.len() as u64)?;
        Ok(Self { writer })
    }

    pub fn write_folder(&mut self, path: &str) -> Result<(), FormatError> {
        self.write_descriptor(EntryKind::Folder, path)
    }

    /// Write a FILE descriptor followed by exactly `len` bytes from `content`.
    pub fn write_file<R: Read>(&mut self, path: &str, len: u64, content: R) -> Result<(), FormatError> {
        self.write_descriptor(EntryKind::File, path)?;
        self.writer.write_u64::<NativeEndian>(len)?;
        let copied = io::copy(&mut content.take(len), &mut self.writer)?;
        if copied != len {
            return Err(FormatError::Truncated);
        }
        Ok(())
    }

    /// Flush and hand back the underlying writer.
    pub fn finish(mut self) -> Result<W, FormatError> {
        self.writer.flush()?;
        Ok(self.writer)
    }

    fn write_descriptor(&mut self, kind: EntryKind, path: &str) -> Result<(), FormatError> {
        let path_length = path.len() as u64 + 1;
        if path_length > MAX_PATH_LEN {
            return Err(FormatError::PathLength(path_length));
        }
        if path.contains('\0') {
            return Err(FormatError::MalformedPath);
        }
        self.writer.write_u8(kind as u8)?;
        self.writer.write_u64::<NativeEndian>(path_length)?;
        self.writer.write_all(path.as_bytes())?;
        self.writer.write_u8(0)?;
        Ok(())
    }
}

// ── Reader ───────────────────────────────────────────────────────────────────

/// Forward-only reader for the archive stream.
pub struct EntryReader<R: Read> {
    reader: R,
    root_name_length: u64,
}

impl<R: Read> EntryReader<R> {
    /// Read and check the header.  A stream too short to hold the magic tag
    /// counts as a bad tag.
    pub fn new(mut reader: R) -> Result<Self, FormatError> {
        let mut magic = [0u8; MAGIC_LEN];
        reader.read_exact(&mut magic).map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => FormatError::InvalidMagic,
            _ => FormatError::Io(e),
        })?;
        if &magic != MAGIC {
            return Err(FormatError::InvalidMagic);
        }
        let root_name_length = reader.read_u64::<NativeEndian>()?;
        Ok(Self { reader, root_name_length })
    }

    pub fn root_name_length(&self) -> u64 {
        self.root_name_length
    }

    /// Read the next descriptor, or `None` at a clean end of stream.
    ///
    /// A FILE entry's content must be consumed through [`Self::content`] or
    /// [`Self::skip_content`] before calling this again.
    pub fn next_entry(&mut self) -> Result<Option<EntryHeader>, FormatError> {
        let kind = match self.read_kind_byte()? {
            Some(b) => EntryKind::try_from(b)?,
            None => return Ok(None),
        };

        let path_length = self.reader.read_u64::<NativeEndian>()?;
        if path_length == 0 || path_length > MAX_PATH_LEN {
            return Err(FormatError::PathLength(path_length));
        }
        let mut buf = vec![0u8; path_length as usize];
        self.reader.read_exact(&mut buf)?;
        if buf.pop() != Some(0) || buf.contains(&0) {
            return Err(FormatError::MalformedPath);
        }
        let path = String::from_utf8(buf).map_err(|_| FormatError::MalformedPath)?;

        Ok(Some(match kind {
            EntryKind::Folder => EntryHeader::Folder { path },
            EntryKind::File => {
                let content_length = self.reader.read_u64::<NativeEndian>()?;
                EntryHeader::File { path, content_length }
            }
        }))
    }

    /// Borrow the next `len` content bytes as a reader.
    pub fn content(&mut self, len: u64) -> io::Take<&mut R> {
        (&mut self.reader).take(len)
    }

    /// Read past `len` content bytes without keeping them.
    pub fn skip_content(&mut self, len: u64) -> Result<(), FormatError> {
        let skipped = io::copy(&mut self.content(len), &mut io::sink())?;
        if skipped != len {
            return Err(FormatError::Truncated);
        }
        Ok(())
    }

    fn read_kind_byte(&mut self) -> Result<Option<u8>, FormatError> {
        let mut byte = [0u8; 1];
        loop {
            match self.reader.read(&mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(byte[0])),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }
}
