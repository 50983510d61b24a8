use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use karmanator_core::{KarmaError, KarmaMap, KarmaRecord, Name, fold_name};

/// YAML-backed karma store.
///
/// Holds no in-memory copy between calls. `load` reads the whole document
/// and `save` replaces it in one rename, so the file at rest is always a
/// complete mapping as of the last successful write.
#[derive(Debug, Clone)]
pub struct KarmaStore {
    path: PathBuf,
}

impl KarmaStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        info!(?path, "using karma store");
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the full mapping. An absent or empty file is an empty mapping;
    /// a document that does not parse is `KarmaError::MalformedStore`.
    pub fn load(&self) -> karmanator_core::Result<KarmaMap> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = ?self.path, "karma store absent, starting empty");
                return Ok(KarmaMap::new());
            }
            Err(e) => {
                return Err(KarmaError::Persistence {
                    path: self.path.clone(),
                    reason: e.to_string(),
                });
            }
        };

        if raw.trim().is_empty() {
            return Ok(KarmaMap::new());
        }

        // `~`/`null` is what an empty map looks like to some YAML writers.
        let parsed: Option<KarmaMap> =
            serde_yml::from_str(&raw).map_err(|e| KarmaError::MalformedStore {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;
        let map = parsed.unwrap_or_default();

        // Files written by hand may carry mixed-case keys; merge them.
        if map.keys().all(|k| *k == fold_name(k)) {
            return Ok(map);
        }
        let mut folded = KarmaMap::new();
        for (name, record) in map {
            folded.entry(fold_name(&name)).or_default().merge(&record);
        }
        Ok(folded)
    }

    /// Serialize the full mapping and atomically replace the store file.
    pub fn save(&self, map: &KarmaMap) -> karmanator_core::Result<()> {
        let contents = serde_yml::to_string(map).map_err(|e| KarmaError::Persistence {
            path: self.path.clone(),
            reason: format!("failed to serialize: {e}"),
        })?;

        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let persist_err = |e: std::io::Error| KarmaError::Persistence {
            path: self.path.clone(),
            reason: e.to_string(),
        };

        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(persist_err)?;
        // The temp file starts out 0600; the rename must not narrow the store's mode.
        if let Some(perms) = self.target_permissions()? {
            tmp.as_file().set_permissions(perms).map_err(persist_err)?;
        }
        tmp.write_all(contents.as_bytes()).map_err(persist_err)?;
        tmp.as_file().sync_all().map_err(persist_err)?;
        tmp.persist(&self.path).map_err(|e| persist_err(e.error))?;

        debug!(path = ?self.path, names = map.len(), "karma store written");
        Ok(())
    }

    /// Mode for the next write: the existing file's, or `0644` for a new one.
    fn target_permissions(&self) -> karmanator_core::Result<Option<std::fs::Permissions>> {
        match std::fs::metadata(&self.path) {
            Ok(meta) => Ok(Some(meta.permissions())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(default_permissions()),
            Err(e) => Err(KarmaError::Persistence {
                path: self.path.clone(),
                reason: e.to_string(),
            }),
        }
    }

    /// Load and return one name's record, if it has one.
    pub fn record(&self, name: &str) -> karmanator_core::Result<Option<KarmaRecord>> {
        Ok(self.load()?.remove(&fold_name(name)))
    }

    /// Every name that has a record, in folded form and sorted.
    pub fn names(&self) -> karmanator_core::Result<Vec<Name>> {
        Ok(self.load()?.into_keys().collect())
    }
}

#[cfg(unix)]
fn default_permissions() -> Option<std::fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(std::fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_permissions() -> Option<std::fs::Permissions> {
    None
}
