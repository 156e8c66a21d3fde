//! Tracing setup for the `jsoncap` binary.
//!
//! Events go to an append-only log file next to the settings under
//! `$XDG_STATE_HOME/jsoncap/`. `RUST_LOG` overrides the default filter, e.g.
//! `RUST_LOG=warn,jsoncap_core::capture=debug` to see only why each request
//! was skipped or staged.

use anyhow::Result;
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

/// Pipeline decisions (filtered, staged, downloaded, evicted) log at debug in
/// our own crates; dependencies stay at info.
const DEFAULT_FILTER: &str = "info,jsoncap_core=debug,jsoncap_cli=debug";

enum FileOrStderr {
    File(fs::File),
    Stderr,
}

impl io::Write for FileOrStderr {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            FileOrStderr::File(f) => f.write(buf),
            FileOrStderr::Stderr => io::stderr().lock().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            FileOrStderr::File(f) => f.flush(),
            FileOrStderr::Stderr => io::stderr().lock().flush(),
        }
    }
}

/// Hands each event a clone of the log file handle, or stderr if cloning fails.
struct FileMakeWriter(fs::File);

impl<'a> MakeWriter<'a> for FileMakeWriter {
    type Writer = FileOrStderr;

    fn make_writer(&'a self) -> Self::Writer {
        self.0
            .try_clone()
            .map(FileOrStderr::File)
            .unwrap_or(FileOrStderr::Stderr)
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Sends events to `jsoncap.log` in the jsoncap state dir, without ANSI colors.
///
/// Fails if the state dir or log file can't be opened, or if a subscriber is
/// already installed; `main` then calls [`init_logging_stderr`].
pub fn init_logging() -> Result<()> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("jsoncap")?;
    let log_dir = xdg_dirs.get_state_home().join("jsoncap");

    fs::create_dir_all(&log_dir)?;
    let log_file_path: PathBuf = log_dir.join("jsoncap.log");

    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file_path)?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(BoxMakeWriter::new(FileMakeWriter(file)))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))?;

    tracing::info!("jsoncap logging initialized at {}", log_file_path.display());
    Ok(())
}

/// Same filter as [`init_logging`], written to stderr. A second call is a no-op.
pub fn init_logging_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(io::stderr)
        .with_ansi(false)
        .try_init();
}
