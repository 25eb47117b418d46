use std::{
    env,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use crate::errors::{LedgerError, Result};
use crate::ledger::Document;

use super::StorageBackend;

const DEFAULT_DIR_NAME: &str = ".moliya";
const DOCUMENT_FILE: &str = "moliya.json";
const TMP_SUFFIX: &str = "tmp";

/// JSON-file persistence for the application document.
///
/// The document is written pretty-printed to a temp file and renamed into
/// place, so a crash mid-save never leaves a truncated store behind.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    root: PathBuf,
    document_file: PathBuf,
}

impl JsonStorage {
    pub fn new(root: Option<PathBuf>) -> Result<Self> {
        let root = root.unwrap_or_else(default_data_dir);
        ensure_dir(&root)?;
        let document_file = root.join(DOCUMENT_FILE);
        Ok(Self {
            root,
            document_file,
        })
    }

    pub fn new_default() -> Result<Self> {
        Self::new(None)
    }

    pub fn base_dir(&self) -> &Path {
        &self.root
    }

    pub fn document_path(&self) -> &Path {
        &self.document_file
    }

    /// Writes a backup/interchange copy of the document to an arbitrary
    /// path. The file is the same shape as the managed store.
    pub fn export_to(&self, document: &Document, path: &Path) -> Result<()> {
        save_document_to_path(document, path)
    }

    /// Reads a previously exported document. Malformed input fails with
    /// [`LedgerError::ImportParse`] and current state stays untouched.
    pub fn import_from(&self, path: &Path) -> Result<Document> {
        let data = fs::read_to_string(path)?;
        serde_json::from_str(&data).map_err(|err| LedgerError::ImportParse(err.to_string()))
    }
}

impl StorageBackend for JsonStorage {
    fn save(&self, document: &Document) -> Result<()> {
        save_document_to_path(document, &self.document_file)?;
        tracing::info!(path = %self.document_file.display(), "document saved");
        Ok(())
    }

    fn load(&self) -> Result<Document> {
        if !self.document_file.exists() {
            return Ok(Document::default());
        }
        let data = fs::read_to_string(&self.document_file)?;
        let document: Document = serde_json::from_str(&data)?;
        Ok(document)
    }
}

pub fn save_document_to_path(document: &Document, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let json = serde_json::to_string_pretty(document)?;
    let tmp = tmp_path(path);
    write_file(&tmp, &json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// The application data directory, defaulting to `~/.moliya`.
pub fn default_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os("MOLIYA_HOME") {
        return PathBuf::from(custom);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_file(path: &Path, data: &str) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn storage_with_temp_dir() -> (JsonStorage, TempDir) {
        let temp = TempDir::new().expect("temp dir");
        let storage = JsonStorage::new(Some(temp.path().to_path_buf())).expect("json storage");
        (storage, temp)
    }

    fn sample_document() -> Document {
        let mut doc = Document::new();
        doc.add_bank("Kapital Bank");
        doc.add_card("Основная карта", "Kapital Bank", 1_500.0);
        doc
    }

    #[test]
    fn save_and_load_roundtrip() {
        let (storage, _guard) = storage_with_temp_dir();
        let doc = sample_document();
        storage.save(&doc).expect("save document");
        let loaded = storage.load().expect("load document");
        assert_eq!(loaded, doc);
    }

    #[test]
    fn loading_a_missing_store_yields_an_empty_document() {
        let (storage, _guard) = storage_with_temp_dir();
        let loaded = storage.load().expect("load document");
        assert_eq!(loaded, Document::default());
    }

    #[test]
    fn import_of_malformed_data_is_an_import_parse_error() {
        let (storage, guard) = storage_with_temp_dir();
        let path = guard.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = storage.import_from(&path).expect_err("import must fail");
        assert!(matches!(err, LedgerError::ImportParse(_)));
    }

    #[test]
    fn export_import_roundtrip_is_lossless() {
        let (storage, guard) = storage_with_temp_dir();
        let doc = sample_document();
        let path = guard.path().join("backup.json");
        storage.export_to(&doc, &path).expect("export");
        let imported = storage.import_from(&path).expect("import");
        assert_eq!(imported, doc);
    }

    #[test]
    fn legacy_documents_without_new_collections_still_load() {
        let (storage, guard) = storage_with_temp_dir();
        let path = guard.path().join("legacy.json");
        std::fs::write(
            &path,
            r#"{"banks":[],"cards":[],"cash":[],"deposits":[],"credits":[],"transactions":[]}"#,
        )
        .unwrap();
        let imported = storage.import_from(&path).expect("legacy import");
        assert!(imported.budgets.is_empty());
        assert!(imported.recurring.is_empty());
    }
}
