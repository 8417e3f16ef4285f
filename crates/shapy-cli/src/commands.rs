//! Subcommand implementations.

use crate::document::{open_editor, read_document, write_document, write_file};
use crate::{CliError, CliResult};
use shapy_core::storage::{ProjectRecord, Storage};
use shapy_core::surface::decode_data_url;
use shapy_core::{EditorConfig, ExportFormat};
use std::path::Path;

fn parent_dir(path: &Path) -> &Path {
    path.parent().unwrap_or_else(|| Path::new("."))
}

/// Export `input` to `output`; the format follows the output extension.
pub fn export(config: EditorConfig, input: &Path, output: &Path) -> CliResult<ExportFormat> {
    let extension = output
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default();
    let format =
        ExportFormat::from_extension(extension).ok_or_else(|| CliError::UnknownFormat(extension.to_string()))?;

    let document = read_document(input)?;
    let mut editor = open_editor(config, Some(document), parent_dir(input));
    let file = editor.export(format)?;
    let (_, bytes) = decode_data_url(&file.data_url).ok_or(CliError::InvalidDataUrl)?;
    write_file(output, &bytes)?;
    log::info!("exported {} ({} bytes)", output.display(), bytes.len());
    Ok(format)
}

/// Add `image` to `input`, stretched over the workspace, and save the
/// result to `output`.
pub fn place_image(config: EditorConfig, input: &Path, image: &str, output: &Path) -> CliResult<()> {
    let document = read_document(input)?;
    let mut editor = open_editor(config, Some(document), parent_dir(input));
    pollster::block_on(editor.add_image(image))?;
    write_document(output, &editor.document()?)
}

/// Store `input` as a project named `name` (default: the file stem). The
/// file stem is the project id.
pub fn import(
    config: EditorConfig,
    storage: &dyn Storage,
    input: &Path,
    name: Option<&str>,
) -> CliResult<ProjectRecord> {
    let document = read_document(input)?;
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| CliError::InvalidDocument(input.to_path_buf()))?;

    // Round-trip through an editor so raw snapshots gain a workspace.
    let editor = open_editor(config, Some(document), parent_dir(input));
    let record = ProjectRecord::new(stem, name.unwrap_or(stem), editor.document()?);
    pollster::block_on(storage.save(&record))?;
    log::info!("imported project {}", record.id);
    Ok(record)
}

/// Ids of every stored project.
pub fn list(storage: &dyn Storage) -> CliResult<Vec<String>> {
    Ok(pollster::block_on(storage.list())?)
}
