//! File items flowing through the pipeline.

use std::fmt;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// Extension stripped from icon base names.
pub const ICON_EXTENSION: &str = ".svg";

/// Content carried by a file item.
pub enum Contents {
    /// No content (directory markers and other placeholders).
    Null,
    /// Fully buffered content.
    Buffer(Vec<u8>),
    /// Content still to be read.
    Stream(Box<dyn Read + Send>),
}

impl Contents {
    /// Drain the content into memory.
    pub fn into_bytes(self) -> io::Result<Vec<u8>> {
        match self {
            Contents::Null => Ok(Vec::new()),
            Contents::Buffer(bytes) => Ok(bytes),
            Contents::Stream(mut reader) => {
                let mut bytes = Vec::new();
                reader.read_to_end(&mut bytes)?;
                Ok(bytes)
            }
        }
    }
}

impl fmt::Debug for Contents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Contents::Null => write!(f, "Null"),
            Contents::Buffer(bytes) => write!(f, "Buffer({} bytes)", bytes.len()),
            Contents::Stream(_) => write!(f, "Stream"),
        }
    }
}

/// A source file moving through the pipeline.
#[derive(Debug)]
pub struct FileItem {
    /// Full path of the file.
    pub path: PathBuf,
    /// Base directory the file was discovered under.
    pub base: PathBuf,
    /// Working directory of the producer.
    pub cwd: PathBuf,
    pub contents: Contents,
}

impl FileItem {
    pub fn new(
        path: impl Into<PathBuf>,
        base: impl Into<PathBuf>,
        cwd: impl Into<PathBuf>,
        contents: Contents,
    ) -> Self {
        Self {
            path: path.into(),
            base: base.into(),
            cwd: cwd.into(),
            contents,
        }
    }

    /// Create a buffered item with `base` as its base and working directory.
    pub fn buffer(path: impl Into<PathBuf>, base: impl Into<PathBuf>, bytes: Vec<u8>) -> Self {
        let base = base.into();
        Self::new(path, base.clone(), base, Contents::Buffer(bytes))
    }

    pub fn is_null(&self) -> bool {
        matches!(self.contents, Contents::Null)
    }

    pub fn is_buffer(&self) -> bool {
        matches!(self.contents, Contents::Buffer(_))
    }

    pub fn is_stream(&self) -> bool {
        matches!(self.contents, Contents::Stream(_))
    }

    /// The file name component of the path.
    pub fn basename(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// The icon name: the base name with the `.svg` extension stripped.
    pub fn icon_name(&self) -> String {
        let basename = self.basename();
        match basename.strip_suffix(ICON_EXTENSION) {
            Some(stem) if !stem.is_empty() => stem.to_string(),
            _ => basename,
        }
    }

    /// Path relative to the base directory, or the full path if outside it.
    pub fn relative(&self) -> &Path {
        self.path.strip_prefix(&self.base).unwrap_or(&self.path)
    }

    /// Prefix the base name, keeping the directory.
    pub fn prefix_basename(&mut self, prefix: &str) {
        let renamed = format!("{}{}", prefix, self.basename());
        self.path = match self.path.parent() {
            Some(dir) => dir.join(renamed),
            None => PathBuf::from(renamed),
        };
    }
}
