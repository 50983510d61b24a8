use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A case-folded user name, the key of the karma store.
pub type Name = String;

/// The full persisted mapping: name → counters.
pub type KarmaMap = BTreeMap<Name, KarmaRecord>;

/// Fold a name to the form used for every store read and write.
pub fn fold_name(name: &str) -> Name {
    name.to_lowercase()
}

/// The three kinds of award a name can receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AwardKind {
    #[serde(rename = "++")]
    PlusPlus,
    #[serde(rename = "--")]
    MinusMinus,
    #[serde(rename = "+-")]
    PlusMinus,
}

impl AwardKind {
    pub const ALL: [AwardKind; 3] = [
        AwardKind::PlusPlus,
        AwardKind::MinusMinus,
        AwardKind::PlusMinus,
    ];

    /// The two-character token suffix for this kind.
    pub fn suffix(self) -> &'static str {
        match self {
            AwardKind::PlusPlus => "++",
            AwardKind::MinusMinus => "--",
            AwardKind::PlusMinus => "+-",
        }
    }

    pub fn from_suffix(suffix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.suffix() == suffix)
    }
}

impl fmt::Display for AwardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// One name's counters. Missing kinds count as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KarmaRecord {
    counts: BTreeMap<AwardKind, u64>,
}

impl KarmaRecord {
    pub fn count(&self, kind: AwardKind) -> u64 {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    pub fn increment(&mut self, kind: AwardKind) {
        let count = self.counts.entry(kind).or_insert(0);
        *count = count.saturating_add(1);
    }

    /// Add every counter of `other` into this record.
    pub fn merge(&mut self, other: &KarmaRecord) {
        for (kind, n) in &other.counts {
            let count = self.counts.entry(*kind).or_insert(0);
            *count = count.saturating_add(*n);
        }
    }

    /// `++` minus `--`. The `+-` count never contributes.
    pub fn net(&self) -> i64 {
        let plus = i64::try_from(self.count(AwardKind::PlusPlus)).unwrap_or(i64::MAX);
        let minus = i64::try_from(self.count(AwardKind::MinusMinus)).unwrap_or(i64::MAX);
        plus.saturating_sub(minus)
    }
}

/// A single award parsed out of a chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Award {
    /// The name as written in the message (not yet folded).
    pub name: String,
    pub kind: AwardKind,
}

impl Award {
    pub fn new(name: impl Into<String>, kind: AwardKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}
