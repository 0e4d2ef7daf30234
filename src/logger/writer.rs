//! Log writer module
//!
//! Output targets for the tracing subscriber: stdout, stderr or an
//! append-only file.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use tracing_subscriber::fmt::MakeWriter;

/// Log output target
#[derive(Debug)]
pub enum LogTarget {
    /// Write to stdout
    Stdout,
    /// Write to stderr
    Stderr,
    /// Write to file
    File(File),
}

impl LogTarget {
    /// Open `path` for appending, or use `default` when no path is configured
    pub fn open(path: Option<&str>, default: Self) -> io::Result<Self> {
        match path {
            Some(p) => open_log_file(p).map(Self::File),
            None => Ok(default),
        }
    }
}

/// Writer handed out per event
pub enum TargetWriter {
    Stdout(io::Stdout),
    Stderr(io::Stderr),
    File(File),
}

impl Write for TargetWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Stdout(w) => w.write(buf),
            Self::Stderr(w) => w.write(buf),
            Self::File(f) => f.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::Stderr(w) => w.flush(),
            Self::File(f) => f.flush(),
        }
    }
}

impl<'a> MakeWriter<'a> for LogTarget {
    type Writer = TargetWriter;

    fn make_writer(&'a self) -> Self::Writer {
        match self {
            Self::Stdout => TargetWriter::Stdout(io::stdout()),
            Self::Stderr => TargetWriter::Stderr(io::stderr()),
            // A failed clone loses the file target for this event only
            Self::File(f) => f
                .try_clone()
                .map_or_else(|_| TargetWriter::Stderr(io::stderr()), TargetWriter::File),
        }
    }
}

/// Open or create a log file for appending
fn open_log_file(path: &str) -> io::Result<File> {
    // Create parent directories if they don't exist
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    OpenOptions::new().create(true).append(true).open(path)
}
