/*
 * Writes text to disk: the assembled block when the user saves it to a file,
 * and a file's content after an in-session edit. Hidden behind
 * `ExporterOperations` so the application logic tests can record writes
 * instead of touching the filesystem.
 */
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum ExportError {
    Io(io::Error),
    MissingParent(PathBuf),
}

impl From<io::Error> for ExportError {
    fn from(err: io::Error) -> Self {
        ExportError::Io(err)
    }
}

impl std::fmt::Display for ExportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportError::Io(e) => write!(f, "Export I/O error: {e}"),
            ExportError::MissingParent(p) => {
                write!(f, "Cannot write {}: parent folder does not exist", p.display())
            }
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExportError::Io(e) => Some(e),
            ExportError::MissingParent(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ExportError>;

pub trait ExporterOperations: Send + Sync {
    fn write_text(&self, path: &Path, text: &str) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct CoreExporter;

impl ExporterOperations for CoreExporter {
    /* Creates or truncates `path`. The parent folder must already exist. */
    fn write_text(&self, path: &Path, text: &str) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.is_dir() {
                return Err(ExportError::MissingParent(path.to_path_buf()));
            }
        }
        let mut writer = BufWriter::new(File::create(path)?);
        writer.write_all(text.as_bytes())?;
        writer.flush()?;
        log::info!("Exporter: Wrote {} bytes to {path:?}.", text.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_write_text_creates_and_overwrites() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("out.txt");

        CoreExporter.write_text(&target, "first").unwrap();
        CoreExporter.write_text(&target, "second").unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "second");
    }

    #[test]
    fn test_write_text_requires_existing_parent() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("missing").join("out.txt");
        assert!(matches!(
            CoreExporter.write_text(&target, "x"),
            Err(ExportError::MissingParent(_))
        ));
    }
}
