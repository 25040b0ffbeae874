//! Station and train reference lists.
//!
//! The lists are downloaded once and cached on disk as JSON objects of
//! key → full entry. A cached list is reused until the file is deleted.

mod cache;
mod client;
mod error;
mod fuzzy;
mod list;

use std::path::Path;

use tracing::info;

pub use cache::ReferenceCache;
pub use client::ReferenceClient;
pub use error::ReferenceError;
pub use fuzzy::{normalize, partial_ratio, ratio, token_sort_ratio, weighted_ratio};
pub use list::{Match, ReferenceKey, ReferenceKind, ReferenceList, StationList, TrainList};

/// Download a reference list and write it to the cache, replacing any
/// existing file.
pub async fn fetch_and_store<K: ReferenceKey>(
    client: &ReferenceClient,
    cache_dir: &Path,
) -> Result<ReferenceList<K>, ReferenceError> {
    let entries = client.fetch_entries(K::KIND).await?;
    let list = ReferenceList::<K>::from_entries(&entries);

    let cache = ReferenceCache::new(cache_dir.join(K::KIND.file_name()));
    cache.save(&list.to_map())?;

    info!(
        kind = %K::KIND,
        count = list.len(),
        path = %cache.path().display(),
        "stored reference list"
    );
    Ok(list)
}

/// Load a reference list from the cache, downloading it only if the cache
/// file does not exist.
pub async fn load_or_fetch<K: ReferenceKey>(
    client: &ReferenceClient,
    cache_dir: &Path,
) -> Result<ReferenceList<K>, ReferenceError> {
    let cache = ReferenceCache::new(cache_dir.join(K::KIND.file_name()));

    match cache.load()? {
        Some(map) => {
            let list = ReferenceList::<K>::from_map(map);
            info!(kind = %K::KIND, count = list.len(), "loaded cached reference list");
            Ok(list)
        }
        None => fetch_and_store(client, cache_dir).await,
    }
}
