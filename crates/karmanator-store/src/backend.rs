use std::path::Path;

use karmanator_core::{KarmaMap, Result};

use crate::store::KarmaStore;

/// Whole-document persistence for the karma mapping.
///
/// Implementations must make `save` all-or-nothing: when it fails, the
/// previously saved document is what the next `load` returns.
pub trait KarmaBackend: Send + Sync {
    /// Where the document lives, for log fields.
    fn location(&self) -> &Path;

    fn load(&self) -> Result<KarmaMap>;

    fn save(&self, map: &KarmaMap) -> Result<()>;
}

impl KarmaBackend for KarmaStore {
    fn location(&self) -> &Path {
        self.path()
    }

    fn load(&self) -> Result<KarmaMap> {
        KarmaStore::load(self)
    }

    fn save(&self, map: &KarmaMap) -> Result<()> {
        KarmaStore::save(self, map)
    }
}
