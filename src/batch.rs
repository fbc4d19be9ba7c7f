use crate::{MetadataRewriter, MetadataValues, Result, UpdateError, UpdaterConfig, Workspace};
use lopdf::Document;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

/// Case-sensitive suffix a file name needs to be picked up.
const PDF_SUFFIX: &[u8] = b".pdf";

// ── Report types ─────────────────────────────────────────────────────────────

/// Outcome of rewriting one input file.
#[derive(Debug, Clone)]
pub struct ProcessedFile {
    /// File name shared by the input and the output file.
    pub file_name: String,

    /// Number of pages copied into the output document.
    pub page_count: usize,

    /// Where the rewritten document was written.
    pub output_path: PathBuf,
}

/// Every file written by one [`BatchProcessor::run`], in processing order.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub files: Vec<ProcessedFile>,
}

impl BatchReport {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn total_pages(&self) -> usize {
        self.files.iter().map(|f| f.page_count).sum()
    }
}

// ── BatchProcessor ───────────────────────────────────────────────────────────

/// Rewrites every `.pdf` file of the workspace's input folder into its
/// output folder.
pub struct BatchProcessor<'a> {
    workspace: &'a Workspace,
    config: &'a UpdaterConfig,
}

impl<'a> BatchProcessor<'a> {
    pub fn new(workspace: &'a Workspace, config: &'a UpdaterConfig) -> Self {
        Self { workspace, config }
    }

    /// Process the whole input folder with `values` as Producer/Creator.
    ///
    /// Files are handled in name order. The first file that cannot be
    /// loaded, rebuilt or saved aborts the run with [`UpdateError::Document`],
    /// [`UpdateError::InvalidDocument`] or [`UpdateError::Write`]; files
    /// written before it stay in the output folder.
    pub fn run(&self, values: &MetadataValues) -> Result<BatchReport> {
        let rewriter = MetadataRewriter::new(values).with_compression(self.config.compress_output);
        let mut report = BatchReport::default();

        for (name, path) in self.collect_inputs()? {
            report.files.push(self.process_file(&rewriter, &name, &path)?);
        }

        Ok(report)
    }

    /// List the input files to rewrite, sorted by name.
    fn collect_inputs(&self) -> Result<Vec<(OsString, PathBuf)>> {
        let mut inputs = Vec::new();

        for entry in std::fs::read_dir(self.workspace.input_dir())? {
            let entry = entry?;
            let name = entry.file_name();
            if !is_pdf_name(&name) {
                continue;
            }

            let path = entry.path();
            if !path.is_file() {
                log::debug!("skipping {}: not a regular file", path.display());
                continue;
            }
            inputs.push((name, path));
        }

        inputs.sort();
        Ok(inputs)
    }

    fn process_file(
        &self,
        rewriter: &MetadataRewriter,
        name: &OsStr,
        path: &Path,
    ) -> Result<ProcessedFile> {
        let file_name = name.to_string_lossy().into_owned();

        let source = Document::load(path).map_err(|source| UpdateError::Document {
            file: file_name.clone(),
            source,
        })?;

        let mut document = rewriter.rebuild(&file_name, &source)?;
        let page_count = document.get_pages().len();

        let output_path = self.workspace.output_dir().join(name);
        document
            .save(&output_path)
            .map_err(|source| UpdateError::Write {
                file: file_name.clone(),
                source,
            })?;

        log::info!(
            "{file_name}: {page_count} page(s) written to {}",
            output_path.display()
        );

        Ok(ProcessedFile {
            file_name,
            page_count,
            output_path,
        })
    }
}

/// Returns `true` when `name` ends in exactly `.pdf` (lower case).
pub(crate) fn is_pdf_name(name: &OsStr) -> bool {
    name.as_encoded_bytes().ends_with(PDF_SUFFIX)
}
