// Export loading: directory scan, decoding and CSV parsing

use crate::error::{LoadError, Result};
use crate::export::ExportKind;
use crate::table::Table;
use csv::{ReaderBuilder, Trim};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Tables loaded from one crawl, keyed by export.
#[derive(Debug, Clone, Default)]
pub struct ExportSet {
    tables: BTreeMap<ExportKind, Table>,
    sources: BTreeMap<ExportKind, PathBuf>,
    warnings: Vec<String>,
}

impl ExportSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, kind: ExportKind, table: Table) {
        self.tables.insert(kind, table);
    }

    pub fn get(&self, kind: ExportKind) -> Option<&Table> {
        self.tables.get(&kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = ExportKind> + '_ {
        self.tables.keys().copied()
    }

    pub fn source(&self, kind: ExportKind) -> Option<&Path> {
        self.sources.get(&kind).map(PathBuf::as_path)
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Files that were found but could not be used.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn push_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }
}

/// Load every recognised CSV export in `dir`.
///
/// Only an unreadable directory is fatal. Files that fail to decode or parse
/// are skipped and recorded in [`ExportSet::warnings`].
pub fn load_exports(dir: &Path) -> Result<ExportSet> {
    let entries = fs::read_dir(dir).map_err(|source| LoadError::Directory {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    files.sort();

    let mut set = ExportSet::new();

    for path in files {
        let file_name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name.to_string(),
            None => continue,
        };

        let Some(kind) = ExportKind::from_file_name(&file_name) else {
            debug!("Ignoring {}: not a recognised export", file_name);
            continue;
        };

        if let Some(existing) = set.source(kind) {
            let message = format!(
                "{} ignored: {} export already loaded from {}",
                file_name,
                kind,
                existing.display()
            );
            warn!("{}", message);
            set.push_warning(message);
            continue;
        }

        match load_table(&path) {
            Ok(table) => {
                info!("Loaded {} ({} rows) from {}", kind, table.len(), path.display());
                set.sources.insert(kind, path.clone());
                set.insert(kind, table);
            }
            Err(e) => {
                let message = format!("Could not load {} export from {}: {}", kind, file_name, e);
                warn!("{}", message);
                set.push_warning(message);
            }
        }
    }

    Ok(set)
}

/// Read and parse a single export file.
pub fn load_table(path: &Path) -> Result<Table> {
    let bytes = fs::read(path)?;
    let content = decode(&bytes, path);
    let file = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    parse_table(&content, &file)
}

/// Parse CSV text into a [`Table`]. `file` only labels errors.
pub fn parse_table(content: &str, file: &str) -> Result<Table> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|source| LoadError::CsvError {
            file: file.to_string(),
            source,
        })?
        .iter()
        .map(String::from)
        .collect();

    if headers.iter().all(|h| h.trim_start_matches('\u{feff}').trim().is_empty()) {
        return Err(LoadError::MissingHeader(file.to_string()));
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| LoadError::CsvError {
            file: file.to_string(),
            source,
        })?;
        rows.push(record.iter().map(String::from).collect());
    }

    Ok(Table::new(headers, rows))
}

/// Decode export bytes: UTF-8 first, Windows-1252 when that fails.
pub fn decode(bytes: &[u8], path: &Path) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            debug!("{} is not valid UTF-8, decoding as Windows-1252", path.display());
            let (text, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            text.into_owned()
        }
    }
}
