use crate::{MetadataConfigFile, MetadataField, MetadataValues, Result, UpdateError};
use std::io::{BufRead, Write};
use std::path::Path;

// ── MetadataResolver ─────────────────────────────────────────────────────────

/// Interactive dialogue that settles the Producer/Creator pair for a run.
///
/// Input and output are generic so the binary can hand in the locked stdin
/// and stdout while tests use in-memory buffers.
///
/// ```
/// use pdfmetaupdate::MetadataResolver;
/// use std::io::Cursor;
///
/// let dir = tempfile::tempdir().unwrap();
/// let path = dir.path().join("config.ini");
///
/// let answers = Cursor::new("Acme PDF\nScanner 3\n");
/// let mut resolver = MetadataResolver::new(answers, Vec::new());
/// let values = resolver.resolve(&path).unwrap();
///
/// assert_eq!(values.producer, "Acme PDF");
/// assert_eq!(values.creator, "Scanner 3");
/// ```
pub struct MetadataResolver<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> MetadataResolver<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Load (or create) the config at `path` and walk the operator through
    /// Producer, then Creator.
    ///
    /// Stored values are offered for reuse; only an answer of `n` replaces
    /// them. Empty values are always asked for. Every change is written to
    /// the config file before the next question.
    pub fn resolve<P: AsRef<Path>>(&mut self, path: P) -> Result<MetadataValues> {
        let mut file = MetadataConfigFile::open_or_create(path)?;

        for field in MetadataField::ALL {
            self.resolve_field(&mut file, field)?;
        }

        Ok(file.into_values())
    }

    /// Give back the output sink, e.g. to inspect what was printed.
    pub fn into_output(self) -> W {
        self.output
    }

    fn resolve_field(&mut self, file: &mut MetadataConfigFile, field: MetadataField) -> Result<()> {
        let current = file.values().get(field).to_owned();

        if current.is_empty() {
            let value = self.ask_value(field)?;
            file.set(field, value)?;
            writeln!(self.output, "Metadata added to config")?;
            return Ok(());
        }

        writeln!(self.output, "Existing metadata value found in the config file:")?;
        writeln!(self.output, "{field}: {current}")?;
        let answer = self.ask("Do you want to use this value? (y/n): ")?;

        if answer.to_lowercase() == "n" {
            let value = self.ask_value(field)?;
            file.set(field, value)?;
            writeln!(self.output, "Metadata updated")?;
        } else {
            writeln!(self.output, "Using existing metadata value.")?;
        }
        Ok(())
    }

    /// Ask for a field value until a non-blank one is given.
    fn ask_value(&mut self, field: MetadataField) -> Result<String> {
        loop {
            let value = self.ask(&format!("Enter the value for {field}: "))?;
            if !value.is_empty() {
                return Ok(value);
            }
            writeln!(self.output, "{field} must not be empty.")?;
        }
    }

    /// Print `prompt` and return the next line of input, trimmed.
    fn ask(&mut self, prompt: &str) -> Result<String> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(UpdateError::InputClosed);
        }
        Ok(line.trim().to_owned())
    }
}
