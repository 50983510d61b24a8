use tracing::{debug, info};

use karmanator_core::{AwardKind, KarmaMap, fold_name};
use karmanator_store::{KarmaBackend, KarmaStore};

/// How many names `!topkarma` lists. Fewer distinct names means no reply.
pub const TOP_COUNT: usize = 3;

/// Applies awards and answers queries against a [`KarmaBackend`], the
/// YAML [`KarmaStore`] unless told otherwise.
///
/// Every operation is a full load (and, for awards, save) of the store, so
/// callers must not run two operations at once.
#[derive(Debug, Clone)]
pub struct KarmaEngine<S = KarmaStore> {
    store: S,
}

impl<S: KarmaBackend> KarmaEngine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Add one `kind` award to `name` and return the confirmation line.
    ///
    /// Nothing is written when the load fails, so a malformed store is never
    /// overwritten with a fresh mapping. A failed save leaves the previous
    /// document in place and the award is lost.
    pub fn award(
        &self,
        sender: &str,
        name: &str,
        kind: AwardKind,
    ) -> karmanator_core::Result<String> {
        let key = fold_name(name);
        let mut map = self.store.load()?;
        map.entry(key.clone()).or_default().increment(kind);
        self.store.save(&map)?;

        info!(
            sender = %sender,
            name = %key,
            kind = %kind,
            store = ?self.store.location(),
            "karma awarded"
        );
        Ok(format!("{sender}: Gave {kind} to {name}"))
    }

    /// `Karma for <name>: <net> (++: <p> | --: <m> | +-: <pm>)`, zeros for an unknown name.
    pub fn query_one(&self, name: &str) -> karmanator_core::Result<String> {
        let key = fold_name(name);
        let record = self.store.load()?.remove(&key).unwrap_or_default();
        debug!(name = %key, net = record.net(), "karma queried");
        Ok(format!(
            "Karma for {}: {} (++: {} | --: {} | +-: {})",
            key,
            record.net(),
            record.count(AwardKind::PlusPlus),
            record.count(AwardKind::MinusMinus),
            record.count(AwardKind::PlusMinus),
        ))
    }

    /// `Top 3 karma: <n1> (<s1>), <n2> (<s2>), <n3> (<s3>)`, or `None` while
    /// fewer than [`TOP_COUNT`] names have a record.
    pub fn query_top(&self) -> karmanator_core::Result<Option<String>> {
        let map = self.store.load()?;
        if map.len() < TOP_COUNT {
            debug!(names = map.len(), "too few names for a top list");
            return Ok(None);
        }
        let entries: Vec<String> = rank(&map)
            .into_iter()
            .take(TOP_COUNT)
            .map(|(name, net)| format!("{name} ({net})"))
            .collect();
        Ok(Some(format!("Top {TOP_COUNT} karma: {}", entries.join(", "))))
    }
}

/// Every name with its net score, highest first. Ties go to the
/// alphabetically earlier name.
pub fn rank(map: &KarmaMap) -> Vec<(&str, i64)> {
    let mut ranked: Vec<(&str, i64)> = map
        .iter()
        .map(|(name, record)| (name.as_str(), record.net()))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked
}
