use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};

/// Ordered list of the photographs of one game.
///
/// Files are taken in lexicographic name order, which is assumed to be the
/// order they were shot in. Hidden files such as `.DS_Store` are skipped.
#[derive(Debug, Clone)]
pub struct ImageSource {
    dir: PathBuf,
    files: Vec<PathBuf>,
}

impl ImageSource {
    pub fn scan<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        if !dir.is_dir() {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("Picture directory not found: {}", dir.display()),
            )));
        }

        let mut names: Vec<OsString> = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            // Follows symlinks; dangling links are skipped
            match fs::metadata(entry.path()) {
                Ok(metadata) if metadata.is_file() => {}
                _ => continue,
            }
            let name = entry.file_name();
            if name.as_encoded_bytes().starts_with(b".") {
                continue;
            }
            names.push(name);
        }
        names.sort();

        if names.is_empty() {
            return Err(Error::NoFrames { dir });
        }

        debug!("Found {} images in {}", names.len(), dir.display());
        let files = names.into_iter().map(|name| dir.join(name)).collect();
        Ok(ImageSource { dir, files })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
