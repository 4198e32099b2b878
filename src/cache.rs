//! URL-keyed store of fetched post content.
//!
//! The whole mapping lives in one pretty-printed JSON object on disk. It is
//! read once when a run starts and rewritten once after the fetch phase.
//! Entries never expire: a post body does not change after it is posted.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use crate::models::CacheMap;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("writing cache {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("encoding cache: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct ContentCache {
    path: PathBuf,
}

impl ContentCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file is an empty cache; so is one that cannot be read or parsed.
    pub fn load(&self) -> CacheMap {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return CacheMap::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "cache unreadable; starting cold");
                return CacheMap::new();
            }
        };
        match serde_json::from_str::<CacheMap>(&text) {
            Ok(map) => {
                info!(path = %self.path.display(), entries = map.len(), "cache loaded");
                map
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "cache corrupt; starting cold");
                CacheMap::new()
            }
        }
    }

    /// Replaces the file with `map`: written next to the target, then renamed
    /// over it, so a crash mid-write leaves the previous file intact.
    pub fn save(&self, map: &CacheMap) -> Result<(), CacheError> {
        let io_err = |source: io::Error| CacheError::Io { path: self.path.clone(), source };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }

        let json = serde_json::to_string_pretty(map)?;
        let tmp = self.tmp_path();
        let mut file = fs::File::create(&tmp).map_err(io_err)?;
        file.write_all(json.as_bytes()).map_err(io_err)?;
        file.sync_all().map_err(io_err)?;
        drop(file);
        fs::rename(&tmp, &self.path).map_err(io_err)?;

        info!(path = %self.path.display(), entries = map.len(), "cache saved");
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CacheEntry;

    fn entry(content: &str, comments: &[&str]) -> CacheEntry {
        CacheEntry {
            content: content.to_string(),
            top_comments: comments.iter().map(|c| c.to_string()).collect(),
        }
    }

    #[test]
    fn save_then_load_reproduces_the_mapping() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ContentCache::new(dir.path().join("posts_cache.json"));

        let mut map = CacheMap::new();
        map.insert("https://x/1".into(), entry("a", &["c1"]));
        cache.save(&map).unwrap();

        assert_eq!(cache.load(), map);
    }

    #[test]
    fn file_format_uses_camel_case_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("posts_cache.json");
        fs::write(&path, r#"{"https://x/1": {"content":"a","topComments":["c1"]}}"#).unwrap();

        let map = ContentCache::new(&path).load();
        assert_eq!(map.get("https://x/1"), Some(&entry("a", &["c1"])));

        ContentCache::new(&path).save(&map).unwrap();
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("\"topComments\""));
        assert!(written.contains("\n  \"https://x/1\""));
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ContentCache::new(dir.path().join("nope.json")).load().is_empty());
    }

    #[test]
    fn corrupt_file_is_a_cold_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("posts_cache.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(ContentCache::new(&path).load().is_empty());

        fs::write(&path, r#"["wrong", "shape"]"#).unwrap();
        assert!(ContentCache::new(&path).load().is_empty());
    }

    #[test]
    fn save_creates_parent_dirs_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ContentCache::new(dir.path().join("output").join("nested").join("cache.json"));

        let mut map = CacheMap::new();
        map.insert("https://x/1".into(), entry("first", &[]));
        map.insert("https://x/2".into(), entry("second", &[]));
        cache.save(&map).unwrap();

        map.remove("https://x/2");
        cache.save(&map).unwrap();

        let loaded = cache.load();
        assert_eq!(loaded.len(), 1);
        assert!(!cache.tmp_path().exists());
    }
}
