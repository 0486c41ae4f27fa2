//! Writing extracted records
//!
//! An [`Extractor`] drives one run: for every input buffer it writes the
//! diagnostic tag catalog, decodes the records and hands each payload to a
//! [`Sink`] together with a manifest entry. The manifest accumulates across
//! inputs and is written once by [`Extractor::finish`].

use crate::archive::{ExtractConfig, ManifestEntry, MetaField, Record, FALLBACK_PREFIX};
use crate::decoder::Decoder;
use crate::detect::{detect_file_type, FileKind};
use crate::sanitize::clean_filename;
use crate::scanner::extract_all_tags;
use anyhow::{Context, Result};
use sha1::{Digest, Sha1};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Destination for extracted files
pub trait Sink {
    /// Store `data` under the file name `name`, replacing any earlier file
    fn write(&mut self, name: &str, data: &[u8]) -> Result<()>;
}

/// Writes files into a directory on disk
#[derive(Debug, Clone)]
pub struct DirSink {
    dir: PathBuf,
}

impl DirSink {
    /// Use `dir` as the output directory, creating it if needed
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Sink for DirSink {
    fn write(&mut self, name: &str, data: &[u8]) -> Result<()> {
        let path = self.dir.join(name);
        fs::write(&path, data).with_context(|| format!("Failed to write: {}", path.display()))
    }
}

/// Keeps written files in memory, in write order
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub files: Vec<(String, Vec<u8>)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent data written under `name`
    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.files
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, data)| data.as_slice())
    }
}

impl Sink for MemorySink {
    fn write(&mut self, name: &str, data: &[u8]) -> Result<()> {
        self.files.push((name.to_string(), data.to_vec()));
        Ok(())
    }
}

/// Outcome of [`Extractor::run`]
#[derive(Debug, Default)]
pub struct RunReport {
    /// Inputs processed without error
    pub succeeded: usize,
    /// Inputs that failed, with the reason
    pub failures: Vec<(PathBuf, anyhow::Error)>,
}

/// Extracts records from archive buffers into a sink
#[derive(Debug)]
pub struct Extractor<S: Sink> {
    sink: S,
    config: ExtractConfig,
    decoder: Decoder,
    manifest: Vec<ManifestEntry>,
}

impl<S: Sink> Extractor<S> {
    /// Create an extractor with the default configuration
    pub fn new(sink: S) -> Self {
        Self::with_config(sink, ExtractConfig::default())
    }

    pub fn with_config(sink: S, config: ExtractConfig) -> Self {
        Self {
            sink,
            config,
            decoder: Decoder::new(),
            manifest: Vec::new(),
        }
    }

    /// Replace the decoder used for every input
    pub fn with_decoder(mut self, decoder: Decoder) -> Self {
        self.decoder = decoder;
        self
    }

    /// Entries for every record saved so far, in save order
    pub fn manifest(&self) -> &[ManifestEntry] {
        &self.manifest
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Process each input in turn
    ///
    /// A failing input is logged and recorded; the others still run. The
    /// manifest is written at the end regardless.
    pub fn run<P: AsRef<Path>>(&mut self, inputs: &[P]) -> Result<RunReport> {
        let mut report = RunReport::default();

        for input in inputs {
            let input = input.as_ref();
            match self.extract_file(input) {
                Ok(_) => report.succeeded += 1,
                Err(err) => {
                    warn!(input = %input.display(), "{:#}", err);
                    report.failures.push((input.to_path_buf(), err));
                }
            }
        }

        self.finish()?;
        Ok(report)
    }

    /// Read an archive from disk and extract it
    pub fn extract_file(&mut self, path: &Path) -> Result<usize> {
        let data = fs::read(path).with_context(|| format!("Failed to read: {}", path.display()))?;
        let count = self.extract(&data)?;
        info!(input = %path.display(), records = count, "Parsed archive");
        Ok(count)
    }

    /// Extract every record in an archive buffer, returning how many were saved
    pub fn extract(&mut self, data: &[u8]) -> Result<usize> {
        if let Some(catalog_file) = &self.config.catalog_file {
            let catalog = extract_all_tags(data).join("\n");
            self.sink.write(catalog_file, catalog.as_bytes())?;
        }

        let decoder = self.decoder.clone();
        let mut count = 0;
        for record in decoder.records(data) {
            self.save_record(&record)?;
            count += 1;
        }
        Ok(count)
    }

    /// Write one record's payload and append its manifest entry
    pub fn save_record(&mut self, record: &Record) -> Result<ManifestEntry> {
        let kind = detect_file_type(&record.payload, record.metadata.type_hint());
        let filename = self.resolve_name(record, kind);

        self.sink.write(&filename, &record.payload)?;
        info!("Saved {} ({} bytes, type: {})", filename, record.payload.len(), kind);

        let entry = ManifestEntry {
            filename,
            file_type: kind.label().to_string(),
            guid: record.metadata.guid.clone(),
            size_bytes: record.payload.len(),
            sha1: sha1_hex(&record.payload),
        };
        self.manifest.push(entry.clone());
        Ok(entry)
    }

    /// Pick the on-disk name: `FILENAME`, then `GUID`, then `file_<n>`
    pub fn resolve_name(&self, record: &Record, kind: FileKind) -> String {
        let fallback = || format!("{}{}", FALLBACK_PREFIX, self.manifest.len());

        let raw = record
            .metadata
            .non_empty(MetaField::Filename)
            .or_else(|| record.metadata.non_empty(MetaField::Guid))
            .map(str::to_string)
            .unwrap_or_else(fallback);

        let mut name = clean_filename(&raw);
        if name.is_empty() {
            debug!(raw = %raw, "name sanitized to nothing, using fallback");
            name = fallback();
        }
        if self.config.append_extension && !name.contains('.') {
            name = format!("{}.{}", name, kind.extension());
        }
        name
    }

    /// Serialize the manifest and write it through the sink
    pub fn finish(&mut self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.manifest).context("Failed to serialize manifest")?;
        self.sink.write(&self.config.manifest_file, json.as_bytes())
    }

    pub fn into_inner(self) -> (S, Vec<ManifestEntry>) {
        (self.sink, self.manifest)
    }
}

/// Lowercase hex SHA-1 of `data`
pub fn sha1_hex(data: &[u8]) -> String {
    hex::encode(Sha1::digest(data))
}
