//! Content-addressed response cache (spec §4.4): one JSON blob per request
//! URL, keyed by the SHA-256 hex of the URL, under a per-ontology directory.
//! Concurrent writers are tolerated — content for a given key is
//! deterministic, so last-writer-wins is safe (spec §5).

use std::fs;
use std::path::{Path, PathBuf};

use context_error::{BoxedError, Context, CreateError};
use sha2::{Digest, Sha256};

use crate::error::CvError;

#[derive(Clone, Debug)]
pub struct ResponseCache {
    root: PathBuf,
}

impl ResponseCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Default cache root under the platform's project cache directory
    /// (`org.culturemech.culturemech`), mirroring `mzcv::CVSource::default_stem`.
    /// Falls back to `./.culturemech-cache` if the platform has no standard
    /// cache directory (e.g. some containerized environments).
    pub fn default_root() -> PathBuf {
        directories::ProjectDirs::from("org", "culturemech", "culturemech")
            .map(|dirs| dirs.cache_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from(".culturemech-cache"))
    }

    fn key_for(url: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(url.as_bytes());
        let digest = hasher.finalize();
        digest.iter().map(|b| format!("{b:02x}")).collect()
    }

    fn path_for(&self, ontology: &str, url: &str) -> PathBuf {
        self.root.join(ontology).join(format!("{}.json", Self::key_for(url)))
    }

    pub fn get(&self, ontology: &str, url: &str) -> Option<String> {
        fs::read_to_string(self.path_for(ontology, url)).ok()
    }

    pub fn put(
        &self,
        ontology: &str,
        url: &str,
        body: &str,
    ) -> Result<(), BoxedError<'static, CvError>> {
        let path = self.path_for(ontology, url);
        let dir = path.parent().unwrap_or(Path::new("."));
        fs::create_dir_all(dir).map_err(|e| {
            BoxedError::new(
                CvError::CacheCouldNotBeWritten,
                "could not create cache directory",
                e.to_string(),
                Context::default().source(dir.to_string_lossy()).to_owned(),
            )
        })?;

        // Write via a per-key temp file then rename, so concurrent readers
        // never observe a partial write; a concurrent writer of the same key
        // simply loses the race, which is fine because content is
        // deterministic for a given URL.
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, body).map_err(|e| {
            BoxedError::new(
                CvError::CacheCouldNotBeWritten,
                "could not write cache entry",
                e.to_string(),
                Context::default().source(path.to_string_lossy()).to_owned(),
            )
        })?;
        fs::rename(&tmp_path, &path).map_err(|e| {
            BoxedError::new(
                CvError::CacheCouldNotBeWritten,
                "could not publish cache entry",
                e.to_string(),
                Context::default().source(path.to_string_lossy()).to_owned(),
            )
        })?;
        Ok(())
    }
}
