//! The four-layer filesystem store (spec §4.1).
//!
//! `raw/`, `raw_yaml/`, `normalized_yaml/`, and `merge_yaml/` each hold one
//! subdirectory per source. Layer 1 is immutable; layers 2 and 4 are
//! regenerable; layer 3 is mutated only through the curation updater.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use context_error::{BoxedError, Context, CreateError};
use tempfile::NamedTempFile;

use crate::error::CoreError;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Layer {
    Raw = 1,
    RawYaml = 2,
    NormalizedYaml = 3,
    MergeYaml = 4,
}

impl Layer {
    const fn dirname(self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::RawYaml => "raw_yaml",
            Self::NormalizedYaml => "normalized_yaml",
            Self::MergeYaml => "merge_yaml",
        }
    }

    const fn is_regenerable(self) -> bool {
        matches!(self, Self::RawYaml | Self::MergeYaml)
    }

    const fn is_immutable(self) -> bool {
        matches!(self, Self::Raw)
    }
}

/// Root handle onto the four-layer directory tree.
#[derive(Clone, Debug)]
pub struct LayerStore {
    root: PathBuf,
}

impl LayerStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn source_dir(&self, layer: Layer, source: &str) -> PathBuf {
        self.root.join(layer.dirname()).join(source)
    }

    fn record_path(&self, layer: Layer, source: &str, key: &str) -> PathBuf {
        self.source_dir(layer, source).join(key)
    }

    /// Write a record. Fails on an immutable layer, and on Layer 4 if `key`
    /// already exists under a different `fingerprint`.
    pub fn put(
        &self,
        layer: Layer,
        source: &str,
        key: &str,
        content: &str,
        fingerprint: Option<&str>,
    ) -> Result<(), BoxedError<'static, CoreError>> {
        if layer.is_immutable() {
            return Err(BoxedError::new(
                CoreError::LayerImmutable,
                "cannot write to an immutable layer",
                format!("attempted put into {:?} for {source}/{key}", layer),
                Context::none(),
            ));
        }

        let dir = self.source_dir(layer, source);
        if layer == Layer::MergeYaml {
            if let (Some(new_fp), Ok(existing)) = (fingerprint, self.get(layer, source, key)) {
                if let Some(existing_fp) = extract_merge_fingerprint(&existing) {
                    if existing_fp != new_fp {
                        return Err(BoxedError::new(
                            CoreError::FingerprintCollision,
                            "Layer-4 key collides with a differently-fingerprinted record",
                            format!("key {key} already has fingerprint {existing_fp}, new is {new_fp}"),
                            Context::none(),
                        ));
                    }
                }
            }
        }

        fs::create_dir_all(&dir).map_err(|e| io_error(CoreError::RecordCouldNotBeWritten, &dir, e))?;
        let path = dir.join(key);
        atomic_write(&path, content)
            .map_err(|e| io_error(CoreError::RecordCouldNotBeWritten, &path, e))?;
        Ok(())
    }

    pub fn get(
        &self,
        layer: Layer,
        source: &str,
        key: &str,
    ) -> Result<String, BoxedError<'static, CoreError>> {
        let path = self.record_path(layer, source, key);
        fs::read_to_string(&path).map_err(|e| io_error(CoreError::RecordCouldNotBeRead, &path, e))
    }

    /// Lazily iterate every record under `layer`, optionally restricted to
    /// one `source`. Each item is `(source, key, content)`.
    pub fn scan(
        &self,
        layer: Layer,
        source: Option<&str>,
    ) -> Box<dyn Iterator<Item = Result<(String, String, String), BoxedError<'static, CoreError>>>>
    {
        let layer_dir = self.root.join(layer.dirname());
        let sources: Vec<PathBuf> = match source {
            Some(s) => vec![layer_dir.join(s)],
            None => fs::read_dir(&layer_dir)
                .into_iter()
                .flatten()
                .filter_map(Result::ok)
                .map(|e| e.path())
                .filter(|p| p.is_dir())
                .collect(),
        };

        let mut records = Vec::new();
        for source_dir in sources {
            let source_name = source_dir
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            let Ok(entries) = fs::read_dir(&source_dir) else {
                continue;
            };
            for entry in entries.filter_map(Result::ok) {
                let path = entry.path();
                if path.is_file() {
                    records.push((source_name.clone(), path));
                }
            }
        }

        Box::new(records.into_iter().map(|(source_name, path)| {
            let key = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            fs::read_to_string(&path)
                .map(|content| (source_name, key, content))
                .map_err(|e| io_error(CoreError::RecordCouldNotBeRead, &path, e))
        }))
    }

    /// Clear and rebuild a regenerable layer (2 or 4 only).
    pub fn regenerate(&self, layer: Layer) -> Result<(), BoxedError<'static, CoreError>> {
        if !layer.is_regenerable() {
            return Err(BoxedError::new(
                CoreError::NotRegenerable,
                "only layers 2 and 4 may be regenerated",
                format!("{:?} is not regenerable", layer),
                Context::none(),
            ));
        }
        let dir = self.root.join(layer.dirname());
        if dir.exists() {
            fs::remove_dir_all(&dir).map_err(|e| io_error(CoreError::RecordCouldNotBeWritten, &dir, e))?;
        }
        fs::create_dir_all(&dir).map_err(|e| io_error(CoreError::RecordCouldNotBeWritten, &dir, e))?;
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn atomic_write(path: &Path, content: &str) -> io::Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    io::Write::write_all(&mut tmp, content.as_bytes())?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

fn io_error(kind: CoreError, path: &Path, source: io::Error) -> BoxedError<'static, CoreError> {
    BoxedError::new(
        kind,
        "filesystem operation failed",
        format!("{}: {source}", path.display()),
        Context::default().source(path.to_string_lossy()).to_owned(),
    )
}

/// Best-effort scrape of `merge_fingerprint: <hex>` from a Layer-4 YAML
/// blob, used only to decide whether a `put` collides (spec §4.1).
fn extract_merge_fingerprint(content: &str) -> Option<&str> {
    content.lines().find_map(|line| {
        line.strip_prefix("merge_fingerprint:")
            .map(|rest| rest.trim().trim_matches('"'))
    })
}
