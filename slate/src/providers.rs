//! Filesystem-backed source resolution for the command-line driver.

use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use slate_foundation::{
    errors::Diagnostic,
    source::{SourceLoadResult, SourceProvider},
    span::SourceUri,
};

/// Resolves `using` imports against the directory of the importing file and
/// a list of extra include roots, in that order.
///
/// Namespace imports (`using Standard.Collections;`) map onto paths by
/// replacing dots with separators and appending the `.slt` extension.
#[derive(Debug, Clone, Default)]
pub struct FileSourceProvider {
    roots: Vec<Utf8PathBuf>,
}

impl FileSourceProvider {
    pub fn new(roots: Vec<Utf8PathBuf>) -> Self {
        Self { roots }
    }

    fn requested_to_relative(requested: &str) -> Utf8PathBuf {
        if requested.ends_with(".slt") || requested.contains('/') {
            Utf8PathBuf::from(requested)
        } else {
            let mut path = Utf8PathBuf::from(requested.replace('.', "/"));
            path.set_extension("slt");
            path
        }
    }

    fn candidates(&self, requested: &str, current: Option<&SourceUri>) -> Vec<Utf8PathBuf> {
        let relative = Self::requested_to_relative(requested);
        let mut candidates = vec![];
        if let Some(current) = current {
            if let Some(parent) = Utf8Path::new(current.as_str()).parent() {
                candidates.push(parent.join(&relative));
            }
        }
        for root in &self.roots {
            candidates.push(root.join(&relative));
        }
        candidates
    }
}

impl SourceProvider for FileSourceProvider {
    fn try_load(&self, requested: &str, current: Option<&SourceUri>) -> SourceLoadResult {
        for candidate in self.candidates(requested, current) {
            match read_source_file(&candidate) {
                Ok(source) => {
                    return SourceLoadResult::Loaded {
                        source: source.into(),
                        uri: SourceUri::from(candidate.as_str()),
                    }
                }
                Err(error) if error.kind() == io::ErrorKind::NotFound => continue,
                Err(error) => {
                    return SourceLoadResult::Error(Diagnostic::error(format!(
                        "cannot read {candidate}: {error}"
                    )))
                }
            }
        }
        SourceLoadResult::NotExists
    }
}

/// Reads a source file, tolerating byte-order marks: UTF-16 files (both
/// endiannesses) are converted, and a UTF-8 BOM is stripped.
pub fn read_source_file(path: &Utf8Path) -> io::Result<String> {
    let bytes = std::fs::read(path)?;
    if bytes.starts_with(&[0xFE, 0xFF]) {
        let words: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16(&words)
            .map_err(|error| io::Error::new(io::ErrorKind::InvalidData, error))
    } else if bytes.starts_with(&[0xFF, 0xFE]) {
        let words: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16(&words)
            .map_err(|error| io::Error::new(io::ErrorKind::InvalidData, error))
    } else {
        let bytes = match bytes.strip_prefix(&[0xEF, 0xBB, 0xBF][..]) {
            Some(rest) => rest.to_vec(),
            None => bytes,
        };
        String::from_utf8(bytes).map_err(|error| io::Error::new(io::ErrorKind::InvalidData, error))
    }
}
