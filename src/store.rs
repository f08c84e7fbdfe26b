//! Persisted glyph map.
//!
//! A JSON array of `{fileName, codePoint, originalFileName?}` kept between
//! runs so icons keep their codepoints. A missing file is an empty map; any
//! other read or parse failure is an error.

use std::collections::HashSet;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{IconError, Result};
use crate::types::GlyphEntry;

/// Reads and writes one glyph map file.
#[derive(Debug, Clone)]
pub struct GlyphMapStore {
    path: PathBuf,
}

impl GlyphMapStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the saved glyphs. A missing or empty file yields no glyphs.
    pub fn load(&self) -> Result<Vec<GlyphEntry>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(IconError::Io {
                    path: self.path.clone(),
                    message: format!("Failed to read glyph map: {}", e),
                })
            }
        };

        parse_glyph_map(&content).map_err(|e| match e {
            IconError::Parse { message, help } => IconError::Parse {
                message: format!("{}: {}", self.path.display(), message),
                help,
            },
            other => other,
        })
    }

    /// Sort and write the glyphs, replacing the file atomically.
    ///
    /// The new map is written to a temporary file next to the destination and
    /// renamed over it, so a failed write leaves the previous map intact.
    pub fn save(&self, glyphs: &[GlyphEntry]) -> Result<()> {
        let json = to_json(glyphs)?;

        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(|e| self.io_error("create directory for", e))?;

        let mut file = NamedTempFile::new_in(&dir).map_err(|e| self.io_error("stage", e))?;
        if let Some(permissions) = self.target_permissions() {
            file.as_file()
                .set_permissions(permissions)
                .map_err(|e| self.io_error("stage", e))?;
        }
        file.write_all(json.as_bytes())
            .map_err(|e| self.io_error("write", e))?;
        file.flush().map_err(|e| self.io_error("write", e))?;
        file.as_file()
            .sync_all()
            .map_err(|e| self.io_error("sync", e))?;
        file.persist(&self.path)
            .map_err(|e| self.io_error("replace", e.error))?;

        Ok(())
    }

    /// Permissions for the replacement file: those of the current map, or
    /// the usual `0644` for a new one.
    fn target_permissions(&self) -> Option<fs::Permissions> {
        match fs::metadata(&self.path) {
            Ok(meta) if meta.is_file() => Some(meta.permissions()),
            _ => default_permissions(),
        }
    }

    fn io_error(&self, action: &str, e: io::Error) -> IconError {
        IconError::Io {
            path: self.path.clone(),
            message: format!("Failed to {} glyph map: {}", action, e),
        }
    }
}

#[cfg(unix)]
fn default_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_permissions() -> Option<fs::Permissions> {
    None
}

/// Parse glyph map JSON.
pub fn parse_glyph_map(content: &str) -> Result<Vec<GlyphEntry>> {
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(content).map_err(|e| IconError::Parse {
        message: format!("Invalid glyph map: {}", e),
        help: Some(
            "Expected a JSON array of {\"fileName\", \"codePoint\"} objects".to_string(),
        ),
    })
}

/// Order glyphs for persisting: ascending codepoint, stable for ties, with
/// repeated names dropped after their first occurrence.
pub fn sorted_for_persist(glyphs: &[GlyphEntry]) -> Vec<GlyphEntry> {
    let mut seen = HashSet::new();
    let mut sorted: Vec<GlyphEntry> = glyphs
        .iter()
        .filter(|g| seen.insert(g.file_name.as_str()))
        .cloned()
        .collect();
    sorted.sort_by_key(|g| g.code_point);
    sorted
}

/// Serialize glyphs the way they are persisted.
pub fn to_json(glyphs: &[GlyphEntry]) -> Result<String> {
    serde_json::to_string_pretty(&sorted_for_persist(glyphs)).map_err(|e| IconError::Parse {
        message: format!("Failed to serialize glyph map: {}", e),
        help: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CodePoint;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn glyph(name: &str, code_point: u32) -> GlyphEntry {
        GlyphEntry::new(name, CodePoint::new(code_point))
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let store = GlyphMapStore::new(dir.path().join("glyphs.json"));

        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_load_empty_file_is_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("glyphs.json");
        fs::write(&path, "").unwrap();

        assert!(GlyphMapStore::new(path).load().unwrap().is_empty());
    }

    #[test]
    fn test_load_malformed_is_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("glyphs.json");

        fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            GlyphMapStore::new(&path).load(),
            Err(IconError::Parse { .. })
        ));

        fs::write(&path, r#"{"fileName":"home","codePoint":"E001"}"#).unwrap();
        assert!(matches!(
            GlyphMapStore::new(&path).load(),
            Err(IconError::Parse { .. })
        ));

        fs::write(&path, r#"[{"fileName":"home","codePoint":"nope"}]"#).unwrap();
        assert!(matches!(
            GlyphMapStore::new(&path).load(),
            Err(IconError::Parse { .. })
        ));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let store = GlyphMapStore::new(dir.path().join("maps").join("glyphs.json"));
        let home = glyph("home", 0xE002);
        let glyphs = vec![home.clone(), GlyphEntry::alias("house", &home), glyph("user", 0xE001)];

        store.save(&glyphs).unwrap();
        let loaded = store.load().unwrap();

        assert_eq!(
            loaded,
            vec![glyph("user", 0xE001), home.clone(), GlyphEntry::alias("house", &home)]
        );
    }

    #[test]
    fn test_saved_file_is_sorted_json_array() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("glyphs.json");
        let glyphs = vec![glyph("c", 0xE003), glyph("a", 0xE001), glyph("b", 0xE002)];

        GlyphMapStore::new(&path).save(&glyphs).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        let codes: Vec<&str> = value
            .as_array()
            .unwrap()
            .iter()
            .map(|g| g["codePoint"].as_str().unwrap())
            .collect();
        assert_eq!(codes, vec!["E001", "E002", "E003"]);
    }

    #[test]
    fn test_save_replaces_previous_map() {
        let dir = tempdir().unwrap();
        let store = GlyphMapStore::new(dir.path().join("glyphs.json"));

        store.save(&[glyph("old", 0xE001)]).unwrap();
        store.save(&[glyph("new", 0xE005)]).unwrap();

        assert_eq!(store.load().unwrap(), vec![glyph("new", 0xE005)]);
        // Only the map itself remains; no staging files left behind.
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_sort_is_numeric_for_mixed_widths() {
        let sorted = sorted_for_persist(&[glyph("wide", 0x1F600), glyph("narrow", 0xF000)]);
        let names: Vec<&str> = sorted.iter().map(|g| g.file_name.as_str()).collect();

        assert_eq!(names, vec!["narrow", "wide"]);
    }

    #[test]
    fn test_sort_drops_repeated_names() {
        let sorted = sorted_for_persist(&[glyph("home", 0xE001), glyph("home", 0xE009)]);
        assert_eq!(sorted, vec![glyph("home", 0xE001)]);
    }

    #[test]
    fn test_failed_save_leaves_no_staging_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("glyphs.json");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep.txt"), "keep").unwrap();

        let err = GlyphMapStore::new(&path)
            .save(&[glyph("home", 0xE001)])
            .unwrap_err();

        assert!(matches!(err, IconError::Io { .. }));
        assert!(path.is_dir());
        assert_eq!(fs::read_to_string(path.join("keep.txt")).unwrap(), "keep");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_save_keeps_previous_map() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let maps = dir.path().join("maps");
        let store = GlyphMapStore::new(maps.join("glyphs.json"));
        store.save(&[glyph("home", 0xE001)]).unwrap();
        let before = fs::read(store.path()).unwrap();

        fs::set_permissions(&maps, fs::Permissions::from_mode(0o555)).unwrap();
        // Directory permissions do not bind a privileged user.
        let writable = fs::write(maps.join("check"), "").is_ok();
        let result = store.save(&[glyph("user", 0xE002)]);
        fs::set_permissions(&maps, fs::Permissions::from_mode(0o755)).unwrap();
        if writable {
            return;
        }

        assert!(matches!(result, Err(IconError::Io { .. })));
        assert_eq!(fs::read(store.path()).unwrap(), before);
    }

    #[cfg(unix)]
    #[test]
    fn test_save_keeps_existing_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("glyphs.json");
        let store = GlyphMapStore::new(&path);
        let mode = |p: &Path| fs::metadata(p).unwrap().permissions().mode() & 0o777;

        store.save(&[glyph("home", 0xE001)]).unwrap();
        assert_eq!(mode(&path), 0o644);

        fs::set_permissions(&path, fs::Permissions::from_mode(0o664)).unwrap();
        store.save(&[glyph("user", 0xE002)]).unwrap();
        assert_eq!(mode(&path), 0o664);
    }
}
