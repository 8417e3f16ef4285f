//! Reading and writing document files.

use crate::{CliError, CliResult};
use serde_json::Value;
use shapy_core::{DocumentChange, Editor, EditorConfig};
use shapy_render::{FsImageLoader, HeadlessSurface};
use std::path::Path;

/// Read a document file.
///
/// Accepts the `{json, width, height}` triple the editor saves, or a bare
/// scene snapshot (`{"objects": [...]}`), whose workspace size then comes
/// from the snapshot itself.
pub fn read_document(path: &Path) -> CliResult<DocumentChange> {
    let text = std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let value: Value = serde_json::from_str(&text).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    if value.get("json").is_some_and(Value::is_string) {
        return serde_json::from_value(value).map_err(|source| CliError::Json {
            path: path.to_path_buf(),
            source,
        });
    }
    if value.get("objects").is_some_and(Value::is_array) {
        return Ok(DocumentChange {
            json: text,
            width: 0.0,
            height: 0.0,
        });
    }
    Err(CliError::InvalidDocument(path.to_path_buf()))
}

/// Write a document as a pretty-printed `{json, width, height}` triple.
pub fn write_document(path: &Path, document: &DocumentChange) -> CliResult<()> {
    let text = serde_json::to_string_pretty(document).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    write_file(path, text.as_bytes())?;
    log::info!("wrote document to {}", path.display());
    Ok(())
}

pub(crate) fn write_file(path: &Path, bytes: &[u8]) -> CliResult<()> {
    std::fs::write(path, bytes).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Open `document` in a headless editor. Relative image paths resolve
/// against `base_dir`.
pub fn open_editor(config: EditorConfig, document: Option<DocumentChange>, base_dir: &Path) -> Editor {
    Editor::open(
        config,
        Box::new(HeadlessSurface::new()),
        Box::new(FsImageLoader::with_base_dir(base_dir)),
        document,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_both_document_forms() {
        let dir = tempfile::tempdir().unwrap();

        let triple = dir.path().join("triple.json");
        let change = DocumentChange {
            json: r#"{"objects":[],"version":"1"}"#.to_string(),
            width: 640.0,
            height: 480.0,
        };
        write_document(&triple, &change).unwrap();
        assert_eq!(read_document(&triple).unwrap(), change);

        let raw = dir.path().join("raw.json");
        std::fs::write(&raw, r#"{"objects": []}"#).unwrap();
        let read = read_document(&raw).unwrap();
        assert_eq!(read.width, 0.0);
        assert!(read.json.contains("objects"));
    }

    #[test]
    fn test_rejects_other_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("other.json");
        std::fs::write(&path, "[1, 2]").unwrap();
        assert!(matches!(read_document(&path), Err(CliError::InvalidDocument(_))));
        assert!(matches!(
            read_document(&dir.path().join("missing.json")),
            Err(CliError::Io { .. })
        ));
    }
}
