//! Source tree traversal and scoped target document writes.

use std::fs;
use std::path::{Path, PathBuf};

use transmute_api::{ConvertError, DocumentCodec, Section};
use walkdir::WalkDir;

use crate::context::Codecs;
use crate::error::EngineError;

/// A document found below a source root.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Path relative to the walked root.
    pub relative: PathBuf,
}

impl SourceFile {
    /// File name without extension; the id prefix of every entry inside.
    pub fn prefix(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Every document below `root` a codec can read, sorted by path.
/// Unreadable directory entries are logged and skipped.
pub fn documents(root: &Path, codecs: &Codecs) -> Result<Vec<SourceFile>, EngineError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(e) => e,
            Err(e) if e.depth() == 0 => return Err(e.into()),
            Err(e) => {
                tracing::error!(root = %root.display(), error = %e, "cannot read directory entry, skipping");
                continue;
            }
        };
        if !entry.file_type().is_file() || codecs.for_path(entry.path()).is_none() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| PathBuf::from(entry.file_name()));
        files.push(SourceFile {
            path: entry.path().to_path_buf(),
            relative,
        });
    }
    Ok(files)
}

pub fn read_document(path: &Path, codecs: &Codecs) -> Result<Section, ConvertError> {
    let codec = codecs
        .for_path(path)
        .ok_or_else(|| ConvertError::unsupported(format!("no codec for {}", path.display())))?;
    let bytes = fs::read(path).map_err(|e| ConvertError::from(e).with_context(path.display()))?;
    codec
        .decode(&bytes)
        .map_err(|e| e.with_context(path.display()))
}

/// `relative` re-rooted under `output_root` with the output extension.
pub fn mirrored(output_root: &Path, relative: &Path, extension: &str) -> PathBuf {
    output_root.join(relative).with_extension(extension)
}

/// Build a target document in `body` and write it to `path`.
///
/// The document is written when `body` returns and also while a panic in
/// `body` unwinds. Under `panic = "abort"` (the release profile) nothing is
/// unwound, so a panicking body leaves no document behind. Only the normal
/// exit reports write errors to the caller.
pub fn write_scoped<R>(
    path: &Path,
    codec: &dyn DocumentCodec,
    body: impl FnOnce(&mut Section) -> R,
) -> Result<R, ConvertError> {
    let mut scope = DocumentScope {
        path,
        codec,
        document: Section::new(),
        flushed: false,
    };
    let out = body(&mut scope.document);
    scope.flush()?;
    Ok(out)
}

struct DocumentScope<'a> {
    path: &'a Path,
    codec: &'a dyn DocumentCodec,
    document: Section,
    flushed: bool,
}

impl DocumentScope<'_> {
    fn flush(&mut self) -> Result<(), ConvertError> {
        self.flushed = true;
        write_document(self.path, self.codec, &self.document)
    }
}

impl Drop for DocumentScope<'_> {
    fn drop(&mut self) {
        if !self.flushed {
            if let Err(e) = self.flush() {
                tracing::error!(path = %self.path.display(), error = %e, "failed to write document");
            }
        }
    }
}

pub fn write_document(path: &Path, codec: &dyn DocumentCodec, document: &Section) -> Result<(), ConvertError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| ConvertError::from(e).with_context(parent.display()))?;
    }
    let bytes = codec.encode(document)?;
    fs::write(path, bytes).map_err(|e| ConvertError::from(e).with_context(path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use transmute_format_yaml::YamlCodec;

    #[test]
    fn test_documents_sorted_and_filtered() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("b.yml"), "a: 1\n").unwrap();
        fs::write(dir.path().join("a.json"), "{}").unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();
        fs::write(dir.path().join("sub/c.yaml"), "c: 1\n").unwrap();

        let files = documents(dir.path(), &Codecs::default()).unwrap();
        let rel: Vec<String> = files
            .iter()
            .map(|f| f.relative.to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(rel, vec!["a.json", "b.yml", "sub/c.yaml"]);
        assert_eq!(files[2].prefix(), "c");
    }

    #[test]
    fn test_missing_root_is_error() {
        let dir = TempDir::new().unwrap();
        assert!(documents(&dir.path().join("nope"), &Codecs::default()).is_err());
    }

    #[test]
    fn test_write_scoped_flushes_on_error_result() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out/doc.yml");
        let result: Result<Result<(), &str>, _> = write_scoped(&path, &YamlCodec, |doc| {
            doc.set("a.b", 1);
            Err("body failed")
        });
        assert!(result.unwrap().is_err());
        let written = read_document(&path, &Codecs::default()).unwrap();
        assert_eq!(written.i64_or("a.b", 0), 1);
    }

    #[test]
    fn test_write_scoped_flushes_while_unwinding() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("panic.yml");
        let caught = std::panic::catch_unwind(|| {
            let _ = write_scoped(&path, &YamlCodec, |doc| {
                doc.set("partial", true);
                if !doc.is_empty() {
                    panic!("body panicked");
                }
            });
        });
        assert!(caught.is_err());
        assert!(path.exists());
    }

    #[test]
    fn test_mirrored() {
        let out = mirrored(Path::new("/out/items"), Path::new("tools/weapons.yaml"), "yml");
        assert_eq!(out, PathBuf::from("/out/items/tools/weapons.yml"));
    }
}
