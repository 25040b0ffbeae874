//! In-memory reference lists with exact and fuzzy lookup.

use std::collections::BTreeMap;
use std::fmt;

use tracing::{debug, warn};

use crate::domain::{StationCode, TrainNumber};

use super::fuzzy::weighted_ratio;

/// Which reference list an entry belongs to.
///
/// Both lists arrive as `"A - B"` strings, but stations put the code last
/// (`"NEW DELHI - NDLS"`) while trains put the number first
/// (`"12301 - RAJDHANI EXP"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Stations,
    Trains,
}

impl ReferenceKind {
    /// Endpoint name relative to the enquiry base URL.
    pub fn endpoint(self) -> &'static str {
        match self {
            ReferenceKind::Stations => "FetchAutoComplete",
            ReferenceKind::Trains => "FetchTrainData",
        }
    }

    /// Cache file name inside the cache directory.
    pub fn file_name(self) -> &'static str {
        match self {
            ReferenceKind::Stations => "stations.json",
            ReferenceKind::Trains => "trains.json",
        }
    }

    /// Extract the key from a raw `"A - B"` entry.
    pub fn key_of(self, entry: &str) -> Option<&str> {
        let (leading, trailing) = entry.split_once(" - ")?;
        let key = match self {
            ReferenceKind::Stations => trailing.rsplit(" - ").next().unwrap_or(trailing),
            ReferenceKind::Trains => leading,
        };
        let key = key.trim();
        (!key.is_empty()).then_some(key)
    }
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceKind::Stations => f.write_str("stations"),
            ReferenceKind::Trains => f.write_str("trains"),
        }
    }
}

/// A typed key of a reference list.
pub trait ReferenceKey: Clone + Ord + fmt::Display + fmt::Debug {
    /// The list this key type indexes.
    const KIND: ReferenceKind;

    fn parse_key(s: &str) -> Option<Self>;

    fn key_str(&self) -> &str;
}

impl ReferenceKey for StationCode {
    const KIND: ReferenceKind = ReferenceKind::Stations;

    fn parse_key(s: &str) -> Option<Self> {
        StationCode::parse(s).ok()
    }

    fn key_str(&self) -> &str {
        self.as_str()
    }
}

impl ReferenceKey for TrainNumber {
    const KIND: ReferenceKind = ReferenceKind::Trains;

    fn parse_key(s: &str) -> Option<Self> {
        TrainNumber::parse(s).ok()
    }

    fn key_str(&self) -> &str {
        self.as_str()
    }
}

/// A scored candidate from [`ReferenceList::search`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match<'a, K> {
    pub key: &'a K,
    /// The full `"A - B"` entry.
    pub entry: &'a str,
    /// Similarity score, 0-100.
    pub score: u8,
}

/// Key → full entry mapping for one reference list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceList<K: ReferenceKey> {
    entries: BTreeMap<K, String>,
}

/// Station code → `"NAME - CODE"` entries.
pub type StationList = ReferenceList<StationCode>;

/// Train number → `"NUMBER - NAME"` entries.
pub type TrainList = ReferenceList<TrainNumber>;

impl<K: ReferenceKey> ReferenceList<K> {
    /// Build a list from raw `"A - B"` entries as returned by the site.
    ///
    /// Entries without a separator or with an invalid key are skipped.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut map = BTreeMap::new();
        let mut skipped = 0usize;

        for entry in entries {
            let entry = entry.as_ref().trim();
            match K::KIND.key_of(entry).and_then(K::parse_key) {
                Some(key) => {
                    map.insert(key, entry.to_string());
                }
                None => skipped += 1,
            }
        }

        if skipped > 0 {
            warn!(kind = %K::KIND, skipped, "skipped malformed reference entries");
        }

        Self { entries: map }
    }

    /// Build a list from a cached key → entry map.
    pub fn from_map(map: BTreeMap<String, String>) -> Self {
        let mut entries = BTreeMap::new();
        for (raw_key, entry) in map {
            match K::parse_key(&raw_key) {
                Some(key) => {
                    entries.insert(key, entry);
                }
                None => warn!(kind = %K::KIND, key = %raw_key, "ignoring invalid cached key"),
            }
        }
        Self { entries }
    }

    /// The key → entry map in its cached form.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.entries
            .iter()
            .map(|(k, v)| (k.key_str().to_string(), v.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The full entry for a key.
    pub fn get(&self, key: &K) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &str)> {
        self.entries.iter().map(|(k, v)| (k, v.as_str()))
    }

    /// Exact, case-insensitive key lookup.
    pub fn lookup(&self, query: &str) -> Option<&K> {
        let key = K::parse_key(&query.trim().to_uppercase())?;
        self.entries.get_key_value(&key).map(|(k, _)| k)
    }

    /// Resolve free text to a key.
    ///
    /// Tries an exact key lookup first, then falls back to the best fuzzy
    /// match over the full entries. Any best match is accepted, however
    /// weak; `None` only when the list is empty.
    pub fn resolve(&self, query: &str) -> Option<&K> {
        if let Some(key) = self.lookup(query) {
            return Some(key);
        }

        let best = self.search(query, 1).into_iter().next()?;
        debug!(
            kind = %K::KIND,
            query,
            key = %best.key,
            score = best.score,
            "fuzzy resolved reference"
        );
        Some(best.key)
    }

    /// The `limit` best fuzzy matches, best first.
    ///
    /// Equal scores keep key order.
    pub fn search(&self, query: &str, limit: usize) -> Vec<Match<'_, K>> {
        let mut matches: Vec<Match<'_, K>> = self
            .entries
            .iter()
            .map(|(key, entry)| Match {
                key,
                entry,
                score: weighted_ratio(query, entry),
            })
            .collect();
        matches.sort_by(|a, b| b.score.cmp(&a.score));
        matches.truncate(limit);
        matches
    }
}

impl<K: ReferenceKey> Default for ReferenceList<K> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}
