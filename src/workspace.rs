use crate::{Result, UpdaterConfig};
use std::path::{Path, PathBuf};

const INPUT_DIR: &str = "input";
const OUTPUT_DIR: &str = "output";
const CONFIG_DIR: &str = "config";

// ── Workspace ────────────────────────────────────────────────────────────────

/// The three folders a run works in, all rooted at the same directory.
///
/// ```no_run
/// use pdfmetaupdate::Workspace;
///
/// let ws = Workspace::new("/opt/pdfmeta").ensure().unwrap();
/// assert!(ws.input_dir().ends_with("input"));
/// ```
#[derive(Debug, Clone)]
pub struct Workspace {
    input: PathBuf,
    output: PathBuf,
    config: PathBuf,
}

impl Workspace {
    /// Derive the folder paths from `root`. Nothing is touched on disk.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref();
        Self {
            input: root.join(INPUT_DIR),
            output: root.join(OUTPUT_DIR),
            config: root.join(CONFIG_DIR),
        }
    }

    /// Create any of the three folders that do not exist yet.
    ///
    /// Calling this on an already prepared workspace is a no-op.
    pub fn ensure(self) -> Result<Self> {
        for dir in [&self.output, &self.input, &self.config] {
            std::fs::create_dir_all(dir)?;
            log::debug!("folder ready: {}", dir.display());
        }
        Ok(self)
    }

    pub fn input_dir(&self) -> &Path {
        &self.input
    }

    pub fn output_dir(&self) -> &Path {
        &self.output
    }

    pub fn config_dir(&self) -> &Path {
        &self.config
    }

    /// Path of the metadata config file named by `config`.
    pub fn config_file(&self, config: &UpdaterConfig) -> PathBuf {
        self.config.join(&config.config_file_name)
    }
}
