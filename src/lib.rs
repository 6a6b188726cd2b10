pub mod error;
pub mod format;
pub mod list;
pub mod pack;
pub mod path;
pub mod prompt;
pub mod unpack;

pub use error::{ArchiveError, ArchiveResult};
pub use format::{EntryHeader, EntryKind, EntryReader, EntryWriter, FormatError, MAGIC};
pub use list::{list, ListedEntry};
pub use pack::{pack, PackOutcome, PackStats, DEFAULT_ARCHIVE_NAME};
pub use prompt::{AssumeNo, AssumeYes, OverwritePrompt, TerminalPrompt};
pub use unpack::{unpack, UnpackStats};
