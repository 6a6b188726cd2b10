use clap::{Parser, Subcommand};
use flatarch::{
    list, pack, unpack, ArchiveError, AssumeYes, EntryKind, OverwritePrompt, PackOutcome,
    TerminalPrompt, DEFAULT_ARCHIVE_NAME,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "flatarch", version, about = "Pack a directory tree into one flat archive and back")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pack a file or directory into an archive
    Pack {
        source: PathBuf,
        #[arg(default_value = DEFAULT_ARCHIVE_NAME)]
        destination: PathBuf,
        /// Overwrite an existing archive without asking
        #[arg(short, long)]
        yes: bool,
    },
    /// Unpack an archive; without DESTINATION, entries go back to where they were packed from
    Unpack {
        archive: PathBuf,
        destination: Option<String>,
    },
    /// List archive entries
    List {
        archive: PathBuf,
        /// Print entries as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .format_target(false)
        .init();

    match run(Cli::parse().command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {

        // ── Pack ─────────────────────────────────────────────────────────────
        Commands::Pack { source, destination, yes } => {
            require_exists(&source)?;
            let mut prompt: Box<dyn OverwritePrompt> =
                if yes { Box::new(AssumeYes) } else { Box::new(TerminalPrompt) };
            match pack(&source, &destination, prompt.as_mut())? {
                PackOutcome::Written(stats) => println!(
                    "Created: {} ({} files, {} folders, {} bytes)",
                    destination.display(), stats.files, stats.folders, stats.bytes
                ),
                PackOutcome::Declined => println!("Nothing to do: {} left unchanged", destination.display()),
            }
        }

        // ── Unpack ───────────────────────────────────────────────────────────
        Commands::Unpack { archive, destination } => {
            require_exists(&archive)?;
            let destination = destination.unwrap_or_default();
            let stats = unpack(&archive, &destination)?;
            let target = if destination.is_empty() { "original location" } else { destination.as_str() };
            println!(
                "Unpacked to: {target} ({} files, {} folders, {} bytes)",
                stats.files, stats.folders, stats.bytes
            );
        }

        // ── List ─────────────────────────────────────────────────────────────
        Commands::List { archive, json } => {
            require_exists(&archive)?;
            let entries = list(&archive)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                println!("Archive: {}", archive.display());
                println!("{:<6} {:>12}  Path", "Kind", "Size");
                for e in &entries {
                    let kind = match e.kind {
                        EntryKind::File   => "file",
                        EntryKind::Folder => "folder",
                    };
                    let size = e.size.map(|s| s.to_string()).unwrap_or_else(|| "-".into());
                    println!("{:<6} {:>12}  {}", kind, size, e.path);
                }
            }
        }
    }

    Ok(())
}

// ── helpers ──────────────────────────────────────────────────────────────────

fn require_exists(path: &Path) -> Result<(), ArchiveError> {
    match path.symlink_metadata() {
        Ok(_) => Ok(()),
        Err(source) => Err(ArchiveError::Io { op: "find", path: path.to_path_buf(), source }),
    }
}
