use crate::{pdf_utils, Result};
use lopdf::Document;
use std::fmt;
use std::path::{Path, PathBuf};

const SECTION: &str = "Metadata";

// ── MetadataField ────────────────────────────────────────────────────────────

/// One of the two Info dictionary entries this crate manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataField {
    Producer,
    Creator,
}

impl MetadataField {
    /// Fields in the order the operator is asked about them.
    pub const ALL: [MetadataField; 2] = [MetadataField::Producer, MetadataField::Creator];

    /// Key used both in the config file and in the PDF Info dictionary.
    pub fn key(self) -> &'static str {
        match self {
            MetadataField::Producer => "Producer",
            MetadataField::Creator => "Creator",
        }
    }

    fn from_key(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|field| field.key().eq_ignore_ascii_case(key))
    }
}

impl fmt::Display for MetadataField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

// ── MetadataValues ───────────────────────────────────────────────────────────

/// The Producer/Creator pair stamped onto every output document.
///
/// An empty string means "not set".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataValues {
    pub producer: String,
    pub creator: String,
}

impl MetadataValues {
    pub fn new(producer: impl Into<String>, creator: impl Into<String>) -> Self {
        Self {
            producer: producer.into(),
            creator: creator.into(),
        }
    }

    pub fn get(&self, field: MetadataField) -> &str {
        match field {
            MetadataField::Producer => &self.producer,
            MetadataField::Creator => &self.creator,
        }
    }

    pub fn set(&mut self, field: MetadataField, value: impl Into<String>) {
        let value = value.into();
        match field {
            MetadataField::Producer => self.producer = value,
            MetadataField::Creator => self.creator = value,
        }
    }

    /// Read Producer/Creator from the document's trailer `/Info` dictionary.
    ///
    /// Missing entries (or a missing Info dictionary) read as empty strings.
    pub fn from_document(document: &Document) -> Self {
        let info = document
            .trailer
            .get(b"Info")
            .and_then(|obj| obj.as_reference())
            .and_then(|id| document.get_object(id))
            .and_then(|obj| obj.as_dict());

        let mut values = Self::default();
        if let Ok(info) = info {
            for field in MetadataField::ALL {
                if let Some(value) = pdf_utils::extract_string_from_dict(info, field.key().as_bytes())
                {
                    values.set(field, value);
                }
            }
        }
        values
    }

    /// Parse the INI-style text of a config file.
    ///
    /// Only keys inside the `[Metadata]` section are read; anything else is
    /// ignored. Keys match case-insensitively and may use `=` or `:`.
    pub fn parse(text: &str) -> Self {
        let mut values = Self::default();
        let mut in_section = false;

        for (number, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                in_section = name.trim() == SECTION;
                continue;
            }

            let Some((key, value)) = line.split_once(['=', ':']) else {
                log::warn!("config line {}: ignoring '{line}'", number + 1);
                continue;
            };

            let key = key.trim();
            match MetadataField::from_key(key) {
                Some(field) if in_section => values.set(field, value.trim()),
                _ => log::warn!("config line {}: ignoring key '{key}'", number + 1),
            }
        }

        values
    }

    /// Render the config file text. Unset fields are left out.
    pub fn render(&self) -> String {
        let mut out = format!("[{SECTION}]\n");
        for field in MetadataField::ALL {
            let value = self.get(field);
            if !value.is_empty() {
                out.push_str(&format!("{} = {}\n", field.key(), value));
            }
        }
        out
    }
}

// ── MetadataConfigFile ───────────────────────────────────────────────────────

/// The on-disk config file together with its current values.
///
/// Every mutation goes through [`MetadataConfigFile::set`], which rewrites
/// the whole file immediately.
#[derive(Debug, Clone)]
pub struct MetadataConfigFile {
    path: PathBuf,
    values: MetadataValues,
}

impl MetadataConfigFile {
    /// Load the config at `path`, creating it with an empty `[Metadata]`
    /// section first if it does not exist.
    pub fn open_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if !path.is_file() {
            let empty = MetadataValues::default();
            std::fs::write(&path, empty.render())?;
            log::info!("created config file {}", path.display());
            return Ok(Self {
                path,
                values: empty,
            });
        }

        let text = std::fs::read_to_string(&path)?;
        Ok(Self {
            values: MetadataValues::parse(&text),
            path,
        })
    }

    pub fn values(&self) -> &MetadataValues {
        &self.values
    }

    pub fn into_values(self) -> MetadataValues {
        self.values
    }

    /// Change one field and persist the whole file.
    pub fn set(&mut self, field: MetadataField, value: impl Into<String>) -> Result<()> {
        self.values.set(field, value);
        self.save()
    }

    pub fn save(&self) -> Result<()> {
        std::fs::write(&self.path, self.values.render())?;
        log::debug!("wrote config file {}", self.path.display());
        Ok(())
    }
}
