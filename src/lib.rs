//! # pdfmetaupdate
//!
//! A Rust library for batch-rewriting the Producer and Creator metadata of PDF files.
//!
//! ## What this crate does
//!
//! 1. **Prepare folders** — makes sure `input/`, `output/` and `config/` exist
//!    next to the program.
//! 2. **Resolve metadata** — loads `config/config.ini`, asking the operator to
//!    confirm stored Producer/Creator values or to type new ones.
//! 3. **Rewrite PDFs** — copies the pages of every `.pdf` in `input/` into a new
//!    document carrying the resolved metadata and writes it to `output/` under
//!    the same name.
//!
//! ## Quick example
//!
//! ```no_run
//! use pdfmetaupdate::{BatchProcessor, MetadataResolver, UpdaterConfig, Workspace};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = UpdaterConfig::from_env()?;
//! let workspace = Workspace::new(&config.root).ensure()?;
//!
//! let stdin = std::io::stdin();
//! let mut resolver = MetadataResolver::new(stdin.lock(), std::io::stdout());
//! let values = resolver.resolve(workspace.config_file(&config))?;
//!
//! let report = BatchProcessor::new(&workspace, &config).run(&values)?;
//! for file in &report.files {
//!     println!("{} — {} page(s)", file.file_name, file.page_count);
//! }
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;
use thiserror::Error;

mod batch;
mod metadata_config;
mod pdf_utils;
mod resolver;
mod rewriter;
mod workspace;

pub use batch::{BatchProcessor, BatchReport, ProcessedFile};
pub use metadata_config::{MetadataConfigFile, MetadataField, MetadataValues};
pub use resolver::MetadataResolver;
pub use rewriter::MetadataRewriter;
pub use workspace::Workspace;

// ── Configuration ────────────────────────────────────────────────────────────

/// Environment variable that overrides the directory holding `input/`,
/// `output/` and `config/`.
pub const ROOT_ENV_VAR: &str = "PDFMETAUPDATE_ROOT";

/// Runtime configuration for a metadata update run.
#[derive(Debug, Clone)]
pub struct UpdaterConfig {
    /// Directory under which the `input`, `output` and `config` folders live.
    pub root: PathBuf,

    /// File name of the metadata config inside the `config` folder.
    pub config_file_name: String,

    /// When `true`, unfiltered streams of every written document are
    /// Flate-compressed before saving.
    pub compress_output: bool,
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            config_file_name: "config.ini".into(),
            compress_output: true,
        }
    }
}

impl UpdaterConfig {
    /// Build the configuration for the running binary.
    ///
    /// The root is the directory of the current executable unless
    /// [`ROOT_ENV_VAR`] is set to a non-empty path.
    pub fn from_env() -> Result<Self> {
        let root = match std::env::var_os(ROOT_ENV_VAR) {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => {
                let exe = std::env::current_exe()?;
                exe.parent()
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("."))
            }
        };

        Ok(Self {
            root,
            ..Default::default()
        })
    }
}

// ── Error type ───────────────────────────────────────────────────────────────

/// Every error that this crate can produce.
#[derive(Error, Debug)]
pub enum UpdateError {
    /// A filesystem I/O error occurred (folders, config file, prompts).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The underlying lopdf library returned an error.
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// A file of the batch could not be loaded.
    #[error("Failed to process '{file}': {source}")]
    Document {
        file: String,
        #[source]
        source: lopdf::Error,
    },

    /// A rewritten file could not be saved to the output folder.
    #[error("Failed to write '{file}': {source}")]
    Write {
        file: String,
        #[source]
        source: std::io::Error,
    },

    /// A file of the batch parsed but is missing a usable page tree.
    #[error("Invalid PDF '{file}': {reason}")]
    InvalidDocument { file: String, reason: String },

    /// Standard input was closed while waiting for an answer.
    #[error("Input closed while waiting for an answer")]
    InputClosed,
}

/// Convenience alias used throughout this crate.
pub type Result<T> = std::result::Result<T, UpdateError>;
